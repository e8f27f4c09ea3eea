//! Two-player synchronization
//!
//! Each side polls a match server on its own timer, announcing points it
//! earned and picking up balls the opponent earned. There is no sequencing
//! or acknowledgement; a lost exchange is simply superseded by the next one.

pub mod channel;
pub mod poller;
pub mod protocol;
pub mod transport;

pub use channel::{PeerSync, Verdict};
pub use poller::{POLL_CHECK_INTERVAL, PollOutcome, Poller, poll_once};
pub use protocol::{Payload, PeerError, PeerRequest, PeerResponse, RemoteStatus, parse_response};
pub use transport::{HttpTransport, PeerTransport};
