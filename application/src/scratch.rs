use std::io::Write;
use std::path::PathBuf;

use asr_domain::ScratchAsset;

use crate::ApplicationError;

/// Where per-request audio files are written; the system temp dir by default.
#[derive(Debug, Clone, Default)]
pub struct ScratchSpace {
    dir: Option<PathBuf>,
}

impl ScratchSpace {
    pub fn new(dir: Option<PathBuf>) -> Self {
        Self { dir }
    }

    pub fn persist(&self, bytes: &[u8]) -> Result<ScratchAsset, ApplicationError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("asr-request-").suffix(".wav");
        let file = match &self.dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        };
        let mut file = file.map_err(|err| {
            ApplicationError::Internal(format!("failed to create scratch file: {err}"))
        })?;
        file.write_all(bytes)
            .and_then(|()| file.flush())
            .map_err(|err| ApplicationError::Internal(format!("failed to write scratch file: {err}")))?;
        Ok(ScratchAsset::new(file.into_temp_path()))
    }
}
