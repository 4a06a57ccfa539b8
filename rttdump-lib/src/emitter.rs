use crate::Result;
use std::fs::File;
use std::io::Write;
use std::path::PathBuf;

pub const DEFAULT_PREFIX: &str = "buffer_";

/// Receives every reconstructed up buffer.
///
/// Called in ascending channel index order, once per channel that produced
/// data. Skipped channels leave a gap in the index sequence.
pub trait ChannelEmitter {
    fn emit(&mut self, index: usize, data: &[u8]) -> Result<()>;
}

/// File name of the artifact for channel `index`, e.g. `buffer_2.bin`.
pub fn artifact_name(prefix: &str, index: usize) -> String {
    format!("{}{}.bin", prefix, index)
}

/// Writes each channel to `<dir>/<prefix><index>.bin`.
#[derive(Debug, Clone)]
pub struct FileEmitter {
    dir: PathBuf,
    prefix: String,
    written: Vec<PathBuf>,
}

impl FileEmitter {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
            written: Vec::new(),
        }
    }

    pub fn path_for(&self, index: usize) -> PathBuf {
        self.dir.join(artifact_name(&self.prefix, index))
    }

    /// Paths written so far, in emission order.
    pub fn written(&self) -> &[PathBuf] {
        &self.written
    }
}

impl Default for FileEmitter {
    fn default() -> Self {
        Self::new(".", DEFAULT_PREFIX)
    }
}

impl ChannelEmitter for FileEmitter {
    fn emit(&mut self, index: usize, data: &[u8]) -> Result<()> {
        std::fs::create_dir_all(&self.dir)?;
        let path = self.path_for(index);
        let mut file = File::create(&path)?;
        file.write_all(data)?;
        tracing::info!(
            "Wrote {} bytes of up buffer {} to {}",
            data.len(),
            index,
            path.display()
        );
        self.written.push(path);
        Ok(())
    }
}
