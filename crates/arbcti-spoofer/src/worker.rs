use std::net::{Shutdown, SocketAddr, TcpStream};
use std::sync::mpsc::{self, Receiver, Sender, TryRecvError};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use arbcti_frame::{FrameConfig, FrameError, MessageReader, MessageWriter};
use tracing::{debug, info, warn};

use crate::dispatch::respond;
use crate::error::Result;
use crate::store::ChannelStore;

/// One serviced client connection.
pub(crate) struct Worker {
    id: u64,
    shutdown: Sender<()>,
    socket: TcpStream,
    handle: JoinHandle<()>,
}

impl Worker {
    pub(crate) fn spawn(
        id: u64,
        stream: TcpStream,
        peer: SocketAddr,
        store: Arc<ChannelStore>,
        config: FrameConfig,
    ) -> Result<Self> {
        // Accepted sockets may inherit the listener's non-blocking mode.
        stream.set_nonblocking(false)?;
        let socket = stream.try_clone()?;
        let reader = MessageReader::with_config_tcp(stream.try_clone()?, config.clone())?;
        let writer = MessageWriter::with_config_tcp(stream, config)?;
        let (shutdown, signal) = mpsc::channel();

        let handle = thread::Builder::new()
            .name(format!("arbcti-worker-{id}"))
            .spawn(move || serve(id, peer, reader, writer, &store, &signal))?;

        info!(id, %peer, "client connected");
        Ok(Self {
            id,
            shutdown,
            socket,
            handle,
        })
    }

    pub(crate) fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Signal the worker, unblock its socket and wait for it to exit.
    pub(crate) fn stop(self) {
        let _ = self.shutdown.send(());
        let _ = self.socket.shutdown(Shutdown::Both);
        self.join();
    }

    pub(crate) fn join(self) {
        if self.handle.join().is_err() {
            warn!(id = self.id, "worker thread panicked");
        }
    }
}

fn serve(
    id: u64,
    peer: SocketAddr,
    mut reader: MessageReader<TcpStream>,
    mut writer: MessageWriter<TcpStream>,
    store: &ChannelStore,
    signal: &Receiver<()>,
) {
    loop {
        match reader.read_message() {
            Ok(request) => {
                let response = respond(&request, store);
                if let Err(err) = writer.send(&response) {
                    warn!(id, %peer, error = %err, "failed to send response");
                    break;
                }
            }
            Err(err) if err.is_timeout() => match signal.try_recv() {
                Err(TryRecvError::Empty) => continue,
                Ok(()) | Err(TryRecvError::Disconnected) => break,
            },
            Err(FrameError::ConnectionClosed) => break,
            Err(err) => {
                warn!(id, %peer, error = %err, "dropping connection");
                break;
            }
        }
    }
    debug!(id, %peer, "worker finished");
}
