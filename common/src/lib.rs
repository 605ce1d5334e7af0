pub mod channel;
pub mod transport;

pub use channel::ChannelConnection;
pub use transport::{Connection, Delivery, MessageId, Protocol};

// Test-only helpers are feature-gated so production builds never link the
// recording mocks. Downstream crates enable `test_helpers` from their
// dev-dependencies.
#[cfg(feature = "test_helpers")]
pub mod test_helpers;
