use crate::transport::Connection;
use tokio::sync::mpsc;

/// Connection adapter backed by an unbounded tokio channel.
///
/// `send` copies the frame into the channel and never blocks; a writer task
/// owns the receiving half and drains frames onto the real socket. A send on
/// a channel whose receiver is gone reports failure, which the pool treats
/// the same as a closed connection.
pub struct ChannelConnection {
    tx: mpsc::UnboundedSender<Vec<u8>>,
}

impl ChannelConnection {
    /// Create the adapter together with the receiving half for the writer.
    pub fn new() -> (Self, mpsc::UnboundedReceiver<Vec<u8>>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

impl Connection for ChannelConnection {
    fn send(&self, frame: &[u8]) -> bool {
        match self.tx.send(frame.to_vec()) {
            Ok(()) => true,
            Err(_) => {
                tracing::debug!(len = frame.len(), "send on closed channel connection");
                false
            }
        }
    }
}
