use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use crate::app::Result;
use crate::domain::{Fingerprint, Topic};
use crate::store::DedupStore;

/// Dedup records as small text files:
/// `<root>/<fingerprint(topic)>/<fingerprint(feed title)>`.
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new<P: AsRef<Path>>(root: P) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    pub fn record_path(&self, topic: &Topic, feed_title: &str) -> PathBuf {
        self.root
            .join(Fingerprint::of(&[topic.as_str()]).to_string())
            .join(Fingerprint::of(&[feed_title]).to_string())
    }
}

impl DedupStore for FileStore {
    fn read(&self, topic: &Topic, feed_title: &str) -> Result<Option<Fingerprint>> {
        let path = self.record_path(topic, feed_title);
        match fs::read_to_string(&path) {
            Ok(content) => {
                let fingerprint = content.parse::<Fingerprint>()?;
                tracing::trace!(path = %path.display(), %fingerprint, "Read dedup record");
                Ok(Some(fingerprint))
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn write(&self, topic: &Topic, feed_title: &str, fingerprint: Fingerprint) -> Result<()> {
        let path = self.record_path(topic, feed_title);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write beside the record and rename over it so a reader never sees
        // a half-written number.
        let tmp = path.with_extension("tmp");
        {
            let mut file = fs::File::create(&tmp)?;
            writeln!(file, "{}", fingerprint)?;
            file.sync_all()?;
        }
        fs::rename(&tmp, &path)?;

        tracing::trace!(path = %path.display(), %fingerprint, "Wrote dedup record");
        Ok(())
    }

    fn remove(&self, topic: &Topic, feed_title: &str) -> Result<()> {
        let path = self.record_path(topic, feed_title);
        match fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}
