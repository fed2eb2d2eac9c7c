use std::sync::Arc;

use asr_application::{AsrUseCase, RequestDefaults};

#[derive(Clone)]
pub struct AppState {
    pub usecase: Arc<dyn AsrUseCase>,
    pub defaults: RequestDefaults,
}

impl AppState {
    pub fn new(usecase: Arc<dyn AsrUseCase>) -> Self {
        Self {
            usecase,
            defaults: RequestDefaults::default(),
        }
    }

    /// Decoding values used when `/inference` omits `beam_size` or `batch_size`.
    pub fn with_defaults(mut self, defaults: RequestDefaults) -> Self {
        self.defaults = defaults;
        self
    }
}
