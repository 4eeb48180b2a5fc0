use std::io::ErrorKind;
use std::net::{SocketAddr, TcpListener};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use arbcti_codec::Fields;
use arbcti_frame::FrameConfig;
use tracing::{info, warn};

use crate::config::SpooferConfig;
use crate::error::{Result, SpooferError, StoreError};
use crate::store::ChannelStore;
use crate::worker::Worker;

/// Reference cycler server.
///
/// Answers every supported request with a well-formed response, serving
/// channel status out of a [`ChannelStore`] that tests can update while the
/// server runs.
pub struct SpooferServer {
    listener: Option<TcpListener>,
    local_addr: SocketAddr,
    store: Arc<ChannelStore>,
    accept_timeout: Duration,
    frame_config: FrameConfig,
    running: Option<Running>,
}

struct Running {
    shutdown: Sender<()>,
    handle: JoinHandle<()>,
}

impl SpooferServer {
    /// Bind the listening socket. Connections are not served until
    /// [`start`](Self::start).
    pub fn bind(config: &SpooferConfig) -> Result<Self> {
        config.validate()?;
        let accept_timeout = config.accept_timeout()?;
        let frame_config = FrameConfig {
            buffer_size: config.buffer_size,
            ..FrameConfig::with_timeout(config.receive_timeout()?)
        };

        let listener = TcpListener::bind(config.socket_addr())?;
        listener.set_nonblocking(true)?;
        let local_addr = listener.local_addr()?;
        info!(addr = %local_addr, num_channels = config.num_channels, "spoofer bound");

        Ok(Self {
            listener: Some(listener),
            local_addr,
            store: Arc::new(ChannelStore::new(config.num_channels)),
            accept_timeout,
            frame_config,
            running: None,
        })
    }

    /// Start the accept loop on a background thread.
    pub fn start(&mut self) -> Result<()> {
        let listener = self.listener.take().ok_or(SpooferError::AlreadyStarted)?;
        let (shutdown, signal) = mpsc::channel();
        let store = Arc::clone(&self.store);
        let frame_config = self.frame_config.clone();
        let accept_timeout = self.accept_timeout;

        let handle = thread::Builder::new()
            .name("arbcti-spoofer".to_string())
            .spawn(move || accept_loop(&listener, &store, &frame_config, accept_timeout, &signal))?;

        self.running = Some(Running { shutdown, handle });
        info!(addr = %self.local_addr, "spoofer started");
        Ok(())
    }

    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    pub fn is_running(&self) -> bool {
        self.running
            .as_ref()
            .is_some_and(|r| !r.handle.is_finished())
    }

    pub fn num_channels(&self) -> usize {
        self.store.num_channels()
    }

    /// Shared status records.
    pub fn store(&self) -> &ChannelStore {
        &self.store
    }

    /// Merge `updates` into a channel's status record (0-based).
    pub fn update_channel_status(
        &self,
        channel: usize,
        updates: Fields,
    ) -> std::result::Result<(), StoreError> {
        self.store.update(channel, updates)
    }

    /// Current status record of a channel (0-based).
    pub fn fetch_channel_status(&self, channel: usize) -> Option<Fields> {
        self.store.fetch(channel)
    }

    /// Stop accepting, stop every connection worker and wait for them.
    ///
    /// Idempotent. Shutdown latency is bounded by the accept timeout.
    pub fn stop(&mut self) {
        self.listener = None;
        let Some(running) = self.running.take() else {
            return;
        };
        let _ = running.shutdown.send(());
        if running.handle.join().is_err() {
            warn!("accept loop panicked");
        }
        info!(addr = %self.local_addr, "spoofer stopped");
    }
}

impl Drop for SpooferServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn accept_loop(
    listener: &TcpListener,
    store: &Arc<ChannelStore>,
    frame_config: &FrameConfig,
    accept_timeout: Duration,
    signal: &Receiver<()>,
) {
    let mut workers: Vec<Worker> = Vec::new();
    let mut next_id = 1u64;

    loop {
        loop {
            match listener.accept() {
                Ok((stream, peer)) => {
                    match Worker::spawn(next_id, stream, peer, Arc::clone(store), frame_config.clone()) {
                        Ok(worker) => workers.push(worker),
                        Err(err) => warn!(%peer, error = %err, "failed to start worker"),
                    }
                    next_id += 1;
                }
                Err(err) if err.kind() == ErrorKind::WouldBlock => break,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => {
                    warn!(error = %err, "accept failed");
                    break;
                }
            }
        }

        let (finished, live): (Vec<_>, Vec<_>) =
            workers.into_iter().partition(Worker::is_finished);
        finished.into_iter().for_each(Worker::join);
        workers = live;

        match signal.recv_timeout(accept_timeout) {
            Err(RecvTimeoutError::Timeout) => continue,
            Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
        }
    }

    workers.into_iter().for_each(Worker::stop);
}
