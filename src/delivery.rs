//! Single-consumer delivery channel.
//!
//! The channel owns the one outbound connection slot. The slot starts
//! pending: the connection acceptor installs at most one peer through a
//! oneshot handoff, which keeps installation and the first write properly
//! synchronized. Once the peer errors or closes, the slot is permanently
//! empty for the rest of the process lifetime — there is no reconnection.

use tokio::io::AsyncWriteExt;
use tokio::net::TcpStream;
use tokio::sync::oneshot;
use tracing::{debug, info};

use crate::encode::EncodedRecord;
use crate::error::{BridgeError, Result};

/// Sending half of the peer handoff, owned by the connection acceptor.
pub type PeerSender = oneshot::Sender<TcpStream>;

/// The single outbound connection slot.
pub struct DeliveryChannel {
    pending: Option<oneshot::Receiver<TcpStream>>,
    peer: Option<TcpStream>,
}

impl DeliveryChannel {
    /// Create the channel plus the sender the acceptor installs the peer
    /// with.
    pub fn new() -> (Self, PeerSender) {
        let (tx, rx) = oneshot::channel();
        (Self { pending: Some(rx), peer: None }, tx)
    }

    /// Poll the handoff without blocking and report whether a peer is
    /// attached.
    pub fn attached(&mut self) -> bool {
        if self.peer.is_some() {
            return true;
        }
        if let Some(rx) = self.pending.as_mut() {
            match rx.try_recv() {
                Ok(stream) => {
                    if let Ok(addr) = stream.peer_addr() {
                        info!(%addr, "delivery peer attached");
                    }
                    self.peer = Some(stream);
                    self.pending = None;
                    return true;
                }
                Err(oneshot::error::TryRecvError::Empty) => {}
                Err(oneshot::error::TryRecvError::Closed) => {
                    // Acceptor gone without a peer; the slot stays empty.
                    self.pending = None;
                }
            }
        }
        false
    }

    /// Write one record whole.
    ///
    /// Partial writes are retried internally until the record is fully on
    /// the wire; back-pressure is the blocking send beneath, not queueing
    /// here. Any transport failure maps to [`BridgeError::PeerGone`] and
    /// permanently empties the slot. Writing with no peer attached is a
    /// quiet no-op so frames drop silently while unconnected.
    pub async fn write(&mut self, record: &EncodedRecord) -> Result<()> {
        let Some(peer) = self.peer.as_mut() else {
            return Ok(());
        };
        match peer.write_all(record.as_bytes()).await {
            Ok(()) => Ok(()),
            Err(source) => {
                self.peer = None;
                Err(BridgeError::peer_gone(source))
            }
        }
    }

    /// Close the peer connection if present. Idempotent; part of teardown.
    pub async fn close(&mut self) {
        if let Some(mut peer) = self.peer.take() {
            let _ = peer.shutdown().await;
            debug!("delivery peer closed");
        }
        self.pending = None;
    }
}
