pub mod asr;
pub mod health;
mod upload;

pub use asr::{inference_handler, openai_transcriptions_handler};
pub use health::health_handler;
