use std::path::{Path, PathBuf};

use asr_domain::{AudioChunker, DomainError, ScratchAsset};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

/// Measures and splits WAV files on frame boundaries.
///
/// Chunks are written next to the other scratch files and are removed when
/// the returned [`ScratchAsset`]s are dropped.
pub struct WavChunker {
    scratch_dir: Option<PathBuf>,
}

impl WavChunker {
    pub fn new(scratch_dir: Option<PathBuf>) -> Self {
        Self { scratch_dir }
    }

    fn create_chunk_file(&self) -> Result<ScratchAsset, DomainError> {
        let mut builder = tempfile::Builder::new();
        builder.prefix("asr-chunk-").suffix(".wav");
        let file = match &self.scratch_dir {
            Some(dir) => builder.tempfile_in(dir),
            None => builder.tempfile(),
        }?;
        Ok(ScratchAsset::new(file.into_temp_path()))
    }

    fn write_chunks<S: hound::Sample + Copy>(
        &self,
        spec: WavSpec,
        samples: &[S],
        frames_per_chunk: usize,
    ) -> Result<Vec<ScratchAsset>, DomainError> {
        let samples_per_chunk = frames_per_chunk * usize::from(spec.channels);
        let mut chunks = Vec::with_capacity(samples.len().div_ceil(samples_per_chunk));
        for part in samples.chunks(samples_per_chunk) {
            let asset = self.create_chunk_file()?;
            let mut writer = WavWriter::create(asset.path(), spec).map_err(write_error)?;
            for sample in part {
                writer.write_sample(*sample).map_err(write_error)?;
            }
            writer.finalize().map_err(write_error)?;
            chunks.push(asset);
        }
        Ok(chunks)
    }
}

impl AudioChunker for WavChunker {
    fn duration_secs(&self, path: &Path) -> Result<f64, DomainError> {
        let reader = WavReader::open(path).map_err(read_error)?;
        let spec = reader.spec();
        Ok(f64::from(reader.duration()) / f64::from(spec.sample_rate))
    }

    fn split(&self, path: &Path, max_duration_secs: f64) -> Result<Vec<ScratchAsset>, DomainError> {
        let reader = WavReader::open(path).map_err(read_error)?;
        let spec = reader.spec();
        let frames_per_chunk = ((max_duration_secs * f64::from(spec.sample_rate)).floor() as usize).max(1);

        let chunks = match spec.sample_format {
            SampleFormat::Float => {
                let samples = reader
                    .into_samples::<f32>()
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(read_error)?;
                self.write_chunks(spec, &samples, frames_per_chunk)?
            }
            SampleFormat::Int => {
                let samples = reader
                    .into_samples::<i32>()
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(read_error)?;
                self.write_chunks(spec, &samples, frames_per_chunk)?
            }
        };

        tracing::debug!(
            path = %path.display(),
            max_duration_secs,
            frames_per_chunk,
            chunk_count = chunks.len(),
            "split audio"
        );
        Ok(chunks)
    }
}

fn read_error(err: hound::Error) -> DomainError {
    DomainError::invalid_input(&format!("unreadable WAV audio: {err}"))
}

fn write_error(err: hound::Error) -> DomainError {
    DomainError::internal_error(&format!("failed to write audio chunk: {err}"))
}
