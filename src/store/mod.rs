pub mod file;
pub mod memory;

use crate::app::Result;
use crate::domain::{Fingerprint, Topic};

pub use file::FileStore;
pub use memory::MemoryStore;

/// Last-seen content fingerprint per (topic, feed title).
///
/// Single writer assumed: two runs touching the same pair at the same time
/// may interleave reads and writes.
pub trait DedupStore {
    /// `Ok(None)` when nothing has been recorded yet.
    fn read(&self, topic: &Topic, feed_title: &str) -> Result<Option<Fingerprint>>;
    fn write(&self, topic: &Topic, feed_title: &str, fingerprint: Fingerprint) -> Result<()>;
    /// Forget the record. Removing a missing record is not an error.
    fn remove(&self, topic: &Topic, feed_title: &str) -> Result<()>;
}
