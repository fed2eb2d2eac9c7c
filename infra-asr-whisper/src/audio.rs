use std::path::Path;

use asr_domain::DomainError;
use hound::{SampleFormat, WavReader};

/// Sample rate whisper models are trained on.
pub const WHISPER_SAMPLE_RATE_HZ: u32 = 16_000;

/// Reads a canonical mono WAV into `f32` samples in `[-1, 1]`.
pub fn read_mono_samples(path: &Path) -> Result<Vec<f32>, DomainError> {
    let reader = WavReader::open(path).map_err(|err| {
        DomainError::external_service_error("whisper", &format!("cannot open chunk audio: {err}"))
    })?;
    let spec = reader.spec();
    if spec.channels != 1 || spec.sample_rate != WHISPER_SAMPLE_RATE_HZ {
        return Err(DomainError::internal_error(&format!(
            "expected mono {WHISPER_SAMPLE_RATE_HZ} Hz audio, got {} channel(s) at {} Hz",
            spec.channels, spec.sample_rate
        )));
    }

    let samples: Result<Vec<f32>, hound::Error> = match spec.sample_format {
        SampleFormat::Float => reader.into_samples::<f32>().collect(),
        SampleFormat::Int => {
            let scale = (1_i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|sample| sample.map(|value| value as f32 / scale))
                .collect()
        }
    };
    samples.map_err(|err| {
        DomainError::external_service_error("whisper", &format!("cannot decode chunk audio: {err}"))
    })
}
