pub mod channel;
pub mod diff;
pub mod protocol;
pub mod worker;

pub use channel::{Correlation, HighlightChannel};
pub use protocol::{HighlightReply, HighlightRequest, RequestId};
