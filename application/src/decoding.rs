use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMutexGuard};

use asr_domain::{ChunkTranscript, DecodingProfile, DomainError, InferencePort, InferenceRequest};

use crate::ApplicationError;

struct SharedInference {
    capability: Box<dyn InferencePort>,
    active: DecodingProfile,
}

/// Owns the process-wide model and its active decoding profile.
///
/// All access goes through one async mutex: a request takes it in
/// [`DecodingConfigManager::ensure`] and keeps it, through the returned
/// [`InferenceLease`], until its last chunk is transcribed. Reconfiguration
/// therefore never overlaps an inference call, and a request always decodes
/// every chunk under the profile it asked for.
pub struct DecodingConfigManager {
    shared: Arc<Mutex<SharedInference>>,
    supports_timestamps: bool,
}

impl DecodingConfigManager {
    pub fn new(
        mut capability: Box<dyn InferencePort>,
        initial: DecodingProfile,
    ) -> Result<Self, ApplicationError> {
        capability
            .reconfigure_decoding(&initial)
            .map_err(|source| ApplicationError::DecodingReconfigurationFailed {
                beam_size: initial.beam_size,
                source,
            })?;
        let supports_timestamps = capability.supports_timestamps();
        tracing::info!(
            beam_size = initial.beam_size,
            supports_timestamps,
            "decoding profile initialized"
        );

        Ok(Self {
            shared: Arc::new(Mutex::new(SharedInference {
                capability,
                active: initial,
            })),
            supports_timestamps,
        })
    }

    pub fn supports_timestamps(&self) -> bool {
        self.supports_timestamps
    }

    pub async fn active_profile(&self) -> DecodingProfile {
        self.shared.lock().await.active
    }

    /// Waits for exclusive access, switches to `profile` if it differs from
    /// the active one and hands the capability back as a lease.
    pub async fn ensure(&self, profile: DecodingProfile) -> Result<InferenceLease, ApplicationError> {
        let mut guard = Arc::clone(&self.shared).lock_owned().await;
        if guard.active != profile {
            tracing::info!(
                from_beam_size = guard.active.beam_size,
                to_beam_size = profile.beam_size,
                "reconfiguring decoding strategy"
            );
            guard
                .capability
                .reconfigure_decoding(&profile)
                .map_err(|source| ApplicationError::DecodingReconfigurationFailed {
                    beam_size: profile.beam_size,
                    source,
                })?;
            guard.active = profile;
        }

        Ok(InferenceLease { guard: Some(guard) })
    }
}

/// Exclusive access to the model under a fixed decoding profile.
pub struct InferenceLease {
    guard: Option<OwnedMutexGuard<SharedInference>>,
}

impl InferenceLease {
    /// Runs one blocking inference call on the blocking pool.
    pub async fn transcribe(
        &mut self,
        request: InferenceRequest,
    ) -> Result<Vec<ChunkTranscript>, DomainError> {
        let mut guard = self
            .guard
            .take()
            .ok_or_else(|| DomainError::internal_error("inference lease lost its model guard"))?;

        let (guard, result) = tokio::task::spawn_blocking(move || {
            let result = guard.capability.transcribe(&request);
            (guard, result)
        })
        .await
        .map_err(|err| DomainError::internal_error(&format!("inference task failed: {err}")))?;

        self.guard = Some(guard);
        result
    }
}
