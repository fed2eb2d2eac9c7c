pub mod chunking;
pub mod decoding;
pub mod dto;
pub mod error;
pub mod format;
pub mod invoker;
pub mod policy;
pub mod reconcile;
pub mod scratch;
pub mod usecase;
pub mod validation;

pub use chunking::{ChunkPlan, ChunkPlanner};
pub use decoding::{DecodingConfigManager, InferenceLease};
pub use dto::*;
pub use error::ApplicationError;
pub use format::{OutputFormatter, TranscriptionPayload};
pub use invoker::{ChunkParameters, TranscriptionInvoker};
pub use policy::TimestampPolicy;
pub use reconcile::TimestampReconciler;
pub use scratch::ScratchSpace;
pub use usecase::{AsrUseCase, AsrUseCaseConfig, AsrUseCaseImpl, RequestLimits};
pub use validation::InputValidator;
