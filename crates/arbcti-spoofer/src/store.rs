use arbcti_codec::Fields;
use arbcti_msg::{is_record_field, pack_channel_info, CHANNEL_INFO_SERVER};
use parking_lot::RwLock;
use tracing::debug;

use crate::error::StoreError;

/// Per-channel status records served by the reference server.
///
/// Channels are 0-based. Every record starts as the default status response
/// with `channel` set to its index. Reads and updates are atomic per call.
#[derive(Debug)]
pub struct ChannelStore {
    num_channels: usize,
    records: RwLock<Vec<Fields>>,
}

impl ChannelStore {
    pub fn new(num_channels: usize) -> Self {
        let records = (0..num_channels)
            .map(|index| {
                let mut record = CHANNEL_INFO_SERVER.defaults();
                record.insert("channel", index as u64);
                record
            })
            .collect();
        Self {
            num_channels,
            records: RwLock::new(records),
        }
    }

    pub fn num_channels(&self) -> usize {
        self.num_channels
    }

    /// Copy of the record for `channel`, or `None` when out of range.
    pub fn fetch(&self, channel: usize) -> Option<Fields> {
        self.records.read().get(channel).cloned()
    }

    /// Merge `updates` into the record for `channel`.
    ///
    /// Keys must be status field names or aux series names, and the merged
    /// record must still pack. On any error the stored record is untouched.
    pub fn update(&self, channel: usize, updates: Fields) -> Result<(), StoreError> {
        if channel >= self.num_channels {
            return Err(StoreError::ChannelOutOfRange {
                channel,
                num_channels: self.num_channels,
            });
        }
        if let Some(field) = updates.keys().find(|k| !is_record_field(k)) {
            return Err(StoreError::UnknownField {
                channel,
                field: field.to_string(),
            });
        }

        let mut records = self.records.write();
        let Some(record) = records.get_mut(channel) else {
            return Err(StoreError::ChannelOutOfRange {
                channel,
                num_channels: self.num_channels,
            });
        };

        let mut merged = record.clone();
        let changed = updates.len();
        merged.merge(updates);
        pack_channel_info(&merged).map_err(|source| StoreError::Rejected { channel, source })?;
        *record = merged;

        debug!(channel, changed, "channel record updated");
        Ok(())
    }
}
