use std::io::Cursor;

use asr_domain::{AudioCanonicalizer, DomainError};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::resample_linear;

/// Converts any PCM or float WAV into mono 16-bit PCM at a fixed rate.
pub struct WavCanonicalizer {
    target_sample_rate_hz: u32,
}

impl WavCanonicalizer {
    pub fn new(target_sample_rate_hz: u32) -> Self {
        Self {
            target_sample_rate_hz,
        }
    }
}

impl AudioCanonicalizer for WavCanonicalizer {
    fn to_mono_wav(&self, audio: &[u8]) -> Result<Vec<u8>, DomainError> {
        let reader = WavReader::new(Cursor::new(audio))
            .map_err(|err| DomainError::invalid_input(&format!("unreadable WAV audio: {err}")))?;
        let spec = reader.spec();
        let interleaved = read_normalized(reader)?;
        let mono = downmix(&interleaved, spec.channels);
        let resampled = resample_linear(&mono, spec.sample_rate, self.target_sample_rate_hz);

        tracing::debug!(
            source_channels = spec.channels,
            source_rate_hz = spec.sample_rate,
            target_rate_hz = self.target_sample_rate_hz,
            frames = resampled.len(),
            "canonicalized audio"
        );
        encode_pcm16(&resampled, self.target_sample_rate_hz)
    }
}

fn read_normalized(reader: WavReader<Cursor<&[u8]>>) -> Result<Vec<f32>, DomainError> {
    let spec = reader.spec();
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
    samples.map_err(|err| DomainError::invalid_input(&format!("corrupt WAV samples: {err}")))
}

fn downmix(interleaved: &[f32], channels: u16) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    let channels = usize::from(channels);
    interleaved
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() / channels as f32)
        .collect()
}

fn encode_pcm16(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>, DomainError> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut buffer = Vec::new();
    let mut writer = WavWriter::new(Cursor::new(&mut buffer), spec).map_err(encode_error)?;
    for sample in samples {
        let value = (sample.clamp(-1.0, 1.0) * f32::from(i16::MAX)).round() as i16;
        writer.write_sample(value).map_err(encode_error)?;
    }
    writer.finalize().map_err(encode_error)?;
    Ok(buffer)
}

fn encode_error(err: hound::Error) -> DomainError {
    DomainError::internal_error(&format!("failed to encode canonical WAV: {err}"))
}

#[cfg(test)]
mod tests {
    use approx::assert_abs_diff_eq;

    use super::*;

    fn stereo_float_wav(sample_rate: u32, frames: usize) -> Vec<u8> {
        let spec = WavSpec {
            channels: 2,
            sample_rate,
            bits_per_sample: 32,
            sample_format: SampleFormat::Float,
        };
        let mut buffer = Vec::new();
        let mut writer = WavWriter::new(Cursor::new(&mut buffer), spec).expect("writer");
        for _ in 0..frames {
            writer.write_sample(0.5_f32).expect("left");
            writer.write_sample(-0.25_f32).expect("right");
        }
        writer.finalize().expect("finalize");
        buffer
    }

    #[test]
    fn stereo_input_becomes_mono_pcm16_at_target_rate() {
        let input = stereo_float_wav(32_000, 32_000);

        let output = WavCanonicalizer::new(16_000)
            .to_mono_wav(&input)
            .expect("canonicalizes");

        let reader = WavReader::new(Cursor::new(output.as_slice())).expect("valid wav");
        let spec = reader.spec();
        assert_eq!(spec.channels, 1);
        assert_eq!(spec.sample_rate, 16_000);
        assert_eq!(spec.bits_per_sample, 16);
        assert_eq!(spec.sample_format, SampleFormat::Int);
        assert_eq!(reader.duration(), 16_000);

        let samples: Vec<i16> = reader
            .into_samples::<i16>()
            .collect::<Result<_, _>>()
            .expect("samples");
        let expected = 0.125 * f32::from(i16::MAX);
        assert_abs_diff_eq!(f32::from(samples[100]), expected, epsilon = 1.0);
    }

    #[test]
    fn mono_pcm16_at_target_rate_keeps_its_samples() {
        let spec = WavSpec {
            channels: 1,
            sample_rate: 16_000,
            bits_per_sample: 16,
            sample_format: SampleFormat::Int,
        };
        let mut input = Vec::new();
        let mut writer = WavWriter::new(Cursor::new(&mut input), spec).expect("writer");
        for value in [0_i16, 1000, -1000, 12000] {
            writer.write_sample(value).expect("sample");
        }
        writer.finalize().expect("finalize");

        let output = WavCanonicalizer::new(16_000)
            .to_mono_wav(&input)
            .expect("canonicalizes");
        let samples: Vec<i16> = WavReader::new(Cursor::new(output.as_slice()))
            .expect("valid wav")
            .into_samples::<i16>()
            .collect::<Result<_, _>>()
            .expect("samples");
        assert_eq!(samples, vec![0, 1000, -1000, 12000]);
    }

    #[test]
    fn non_wav_bytes_are_invalid_input() {
        let err = WavCanonicalizer::new(16_000)
            .to_mono_wav(b"RIFF but not really a wav")
            .expect_err("rejected");
        assert!(matches!(err, DomainError::InvalidInput(_)));
    }
}
