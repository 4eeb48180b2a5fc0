use arbcti_codec::{command_code, CodecError, Fields};
use arbcti_msg::{identify, Direction, MessageKind};
use bytes::BytesMut;
use tracing::{debug, error, warn};

use crate::store::ChannelStore;

/// Build the response to one complete request.
///
/// An empty response means nothing should be sent: the command code is
/// unknown, the message is itself a response, or it could not be decoded.
pub fn respond(request: &[u8], store: &ChannelStore) -> Vec<u8> {
    let Some((kind, direction)) = identify(request) else {
        warn!(
            command_code = ?command_code(request),
            "unknown command code, sending empty response"
        );
        return Vec::new();
    };
    if direction == Direction::Server {
        warn!(%kind, "received a server response as a request");
        return Vec::new();
    }

    match build_response(kind, request, store) {
        Ok(response) => response.to_vec(),
        Err(err) => {
            error!(%kind, error = %err, "failed to build response");
            Vec::new()
        }
    }
}

fn build_response(
    kind: MessageKind,
    request: &[u8],
    store: &ChannelStore,
) -> Result<BytesMut, CodecError> {
    let fields = kind.unpack(Direction::Client, request)?;
    debug!(%kind, len = request.len(), "request");

    let response = match kind {
        MessageKind::Login => {
            let overrides = Fields::new().with("num_channels", store.num_channels() as u64);
            kind.pack(Direction::Server, &overrides)?
        }
        MessageKind::ChannelInfo => {
            let requested = fields.int("channel").unwrap_or(0);
            let record = usize::try_from(requested)
                .ok()
                .and_then(|channel| store.fetch(channel))
                .unwrap_or_else(|| {
                    warn!(channel = requested, "status requested for unknown channel");
                    Fields::new()
                });
            kind.pack(Direction::Server, &record)?
        }
        MessageKind::AssignSchedule
        | MessageKind::StartSchedule
        | MessageKind::StopSchedule
        | MessageKind::SetMetaVariable
        | MessageKind::JumpChannel => {
            let mut overrides = Fields::new();
            if let Some(channel) = fields.get("channel") {
                overrides.insert("channel", channel.clone());
            }
            kind.pack(Direction::Server, &overrides)?
        }
    };
    Ok(response)
}
