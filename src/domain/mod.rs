pub mod fingerprint;
pub mod snapshot;
pub mod topic;

pub use fingerprint::{fingerprint, Fingerprint};
pub use snapshot::FeedSnapshot;
pub use topic::{shortcodify, Topic};
