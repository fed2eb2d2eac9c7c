use std::path::Path;
use std::sync::Arc;

use asr_domain::{AudioChunker, ChunkAsset, ChunkDescriptor};

use crate::ApplicationError;

/// Slack allowed between measured chunk durations and the source duration.
const DURATION_TOLERANCE_SECS: f64 = 0.01;

#[derive(Debug)]
pub struct ChunkPlan {
    pub total_duration: f64,
    pub chunks: Vec<ChunkDescriptor>,
}

impl ChunkPlan {
    pub fn is_split(&self) -> bool {
        self.chunks
            .iter()
            .any(|chunk| matches!(chunk.asset, ChunkAsset::Scratch(_)))
    }
}

pub struct ChunkPlanner {
    chunker: Arc<dyn AudioChunker>,
    max_chunk_duration_secs: f64,
}

impl ChunkPlanner {
    pub fn new(chunker: Arc<dyn AudioChunker>, max_chunk_duration_secs: f64) -> Self {
        Self {
            chunker,
            max_chunk_duration_secs,
        }
    }

    /// Measures `asset` and splits it when it is longer than the threshold.
    ///
    /// Returned descriptors are contiguous: chunk `i` starts where chunk
    /// `i - 1` ends and their durations add up to the total.
    pub fn plan(&self, asset: &Path) -> Result<ChunkPlan, ApplicationError> {
        let total_duration = self.chunker.duration_secs(asset)?;

        if total_duration <= self.max_chunk_duration_secs {
            tracing::debug!(duration_secs = total_duration, "audio fits in a single chunk");
            return Ok(ChunkPlan {
                total_duration,
                chunks: vec![ChunkDescriptor {
                    index: 0,
                    start_offset: 0.0,
                    duration: total_duration,
                    asset: ChunkAsset::Whole(asset.to_path_buf()),
                }],
            });
        }

        tracing::info!(
            duration_secs = total_duration,
            max_chunk_duration_secs = self.max_chunk_duration_secs,
            "audio longer than chunk threshold, using chunked inference"
        );

        let parts = self.chunker.split(asset, self.max_chunk_duration_secs)?;
        let mut chunks = Vec::with_capacity(parts.len());
        let mut offset = 0.0;
        for (index, part) in parts.into_iter().enumerate() {
            let duration = self.chunker.duration_secs(part.path())?;
            if duration > self.max_chunk_duration_secs + DURATION_TOLERANCE_SECS {
                return Err(ApplicationError::Internal(format!(
                    "chunk {index} lasts {duration:.3}s, above the {:.3}s threshold",
                    self.max_chunk_duration_secs
                )));
            }
            chunks.push(ChunkDescriptor {
                index,
                start_offset: offset,
                duration,
                asset: ChunkAsset::Scratch(part),
            });
            offset += duration;
        }

        if chunks.is_empty() || (offset - total_duration).abs() > DURATION_TOLERANCE_SECS {
            return Err(ApplicationError::Internal(format!(
                "chunks cover {offset:.3}s of {total_duration:.3}s audio"
            )));
        }

        tracing::debug!(chunk_count = chunks.len(), "audio split into chunks");
        Ok(ChunkPlan {
            total_duration,
            chunks,
        })
    }
}
