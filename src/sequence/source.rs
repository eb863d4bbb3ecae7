//! Ordered fragment lists the sequencer walks.

use crate::image::PixelBuffer;
use crate::util::{StripJoinError, StripJoinResult};
#[cfg(feature = "image-io")]
use std::path::{Path, PathBuf};

/// An ordered, indexable list of fragments decoded on demand.
///
/// The sequencer loads at most a run plus one candidate at a time, so
/// implementations should decode lazily.
pub trait FragmentSource {
    /// Number of fragments.
    fn len(&self) -> usize;

    /// Returns true when there are no fragments.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Display name of fragment `index`.
    fn name(&self, index: usize) -> String;

    /// Decodes fragment `index`.
    fn load(&self, index: usize) -> StripJoinResult<PixelBuffer>;
}

/// Fragments already held in memory.
#[derive(Clone, Debug, Default)]
pub struct MemorySource {
    entries: Vec<(String, Option<PixelBuffer>)>,
}

impl MemorySource {
    /// Creates an empty source.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a decodable fragment.
    pub fn push(&mut self, name: impl Into<String>, buf: PixelBuffer) {
        self.entries.push((name.into(), Some(buf)));
    }

    /// Appends an entry that fails to decode.
    pub fn push_undecodable(&mut self, name: impl Into<String>) {
        self.entries.push((name.into(), None));
    }
}

impl FragmentSource for MemorySource {
    fn len(&self) -> usize {
        self.entries.len()
    }

    fn name(&self, index: usize) -> String {
        self.entries
            .get(index)
            .map(|(name, _)| name.clone())
            .unwrap_or_default()
    }

    fn load(&self, index: usize) -> StripJoinResult<PixelBuffer> {
        let (name, buf) = self
            .entries
            .get(index)
            .ok_or(StripJoinError::InvalidInput("fragment index out of range"))?;
        buf.clone().ok_or_else(|| StripJoinError::Decode {
            name: name.clone(),
            reason: "not an image".to_string(),
        })
    }
}

/// Fragments on disk, loaded with their EXIF orientation applied.
#[cfg(feature = "image-io")]
#[derive(Clone, Debug, Default)]
pub struct FileSource {
    paths: Vec<PathBuf>,
}

#[cfg(feature = "image-io")]
impl FileSource {
    /// Uses the given paths in the given order.
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }

    /// Lists the regular files of `dir`, sorted by file name.
    ///
    /// Non-image files stay in the list; they fail to decode and are
    /// reported as skipped.
    pub fn from_dir<P: AsRef<Path>>(dir: P) -> StripJoinResult<Self> {
        let io_err = |err: std::io::Error| StripJoinError::ImageIo {
            reason: err.to_string(),
        };
        let mut paths = Vec::new();
        for entry in std::fs::read_dir(dir.as_ref()).map_err(io_err)? {
            let entry = entry.map_err(io_err)?;
            if entry.file_type().map_err(io_err)?.is_file() {
                paths.push(entry.path());
            }
        }
        paths.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
        Ok(Self { paths })
    }

    /// Returns the listed paths.
    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}

#[cfg(feature = "image-io")]
impl FragmentSource for FileSource {
    fn len(&self) -> usize {
        self.paths.len()
    }

    fn name(&self, index: usize) -> String {
        self.paths
            .get(index)
            .map(|p| p.display().to_string())
            .unwrap_or_default()
    }

    fn load(&self, index: usize) -> StripJoinResult<PixelBuffer> {
        let path = self
            .paths
            .get(index)
            .ok_or(StripJoinError::InvalidInput("fragment index out of range"))?;
        crate::image::io::load_oriented(path)
    }
}
