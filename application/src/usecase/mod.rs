pub mod asr;

pub use asr::{AsrUseCase, AsrUseCaseConfig, AsrUseCaseImpl, RequestLimits};
