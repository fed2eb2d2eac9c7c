use std::io;
use std::path::{Path, PathBuf};

use tempfile::TempPath;

/// Exclusively owned temporary file; removed from disk when dropped.
#[derive(Debug)]
pub struct ScratchAsset {
    path: TempPath,
}

impl ScratchAsset {
    pub fn new(path: TempPath) -> Self {
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Deletes the file now and reports the failure, if any.
    pub fn close(self) -> io::Result<()> {
        self.path.close()
    }
}

/// Backing storage of a chunk: either the whole request asset, which the
/// orchestrator keeps owning, or a dedicated sub-file owned by the chunk.
#[derive(Debug)]
pub enum ChunkAsset {
    Whole(PathBuf),
    Scratch(ScratchAsset),
}

impl ChunkAsset {
    pub fn path(&self) -> &Path {
        match self {
            Self::Whole(path) => path,
            Self::Scratch(asset) => asset.path(),
        }
    }

    pub fn release(self) -> io::Result<()> {
        match self {
            Self::Whole(_) => Ok(()),
            Self::Scratch(asset) => asset.close(),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn scratch_file() -> ScratchAsset {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        file.write_all(b"RIFF").expect("write");
        ScratchAsset::new(file.into_temp_path())
    }

    #[test]
    fn dropping_scratch_asset_removes_file() {
        let asset = scratch_file();
        let path = asset.path().to_path_buf();
        assert!(path.exists());
        drop(asset);
        assert!(!path.exists());
    }

    #[test]
    fn releasing_whole_asset_keeps_file() {
        let asset = scratch_file();
        let chunk = ChunkAsset::Whole(asset.path().to_path_buf());
        chunk.release().expect("no-op");
        assert!(asset.path().exists());
    }

    #[test]
    fn releasing_scratch_chunk_removes_file() {
        let asset = scratch_file();
        let path = asset.path().to_path_buf();
        ChunkAsset::Scratch(asset).release().expect("removed");
        assert!(!path.exists());
    }
}
