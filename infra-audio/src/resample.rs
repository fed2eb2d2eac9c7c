/// Linear-interpolation resampler for mono `f32` samples.
pub fn resample_linear(samples: &[f32], source_rate_hz: u32, target_rate_hz: u32) -> Vec<f32> {
    if source_rate_hz == target_rate_hz || samples.len() <= 1 {
        return samples.to_vec();
    }

    let output_len = ((samples.len() as u64 * u64::from(target_rate_hz))
        / u64::from(source_rate_hz))
    .max(1) as usize;
    if output_len == 1 {
        return vec![samples[0]];
    }

    let step = f64::from(source_rate_hz) / f64::from(target_rate_hz);
    let last = samples.len() - 1;
    (0..output_len)
        .map(|out_idx| {
            let source_pos = out_idx as f64 * step;
            let left_idx = (source_pos.floor() as usize).min(last);
            let right_idx = (left_idx + 1).min(last);
            let frac = (source_pos - left_idx as f64) as f32;
            samples[left_idx] * (1.0 - frac) + samples[right_idx] * frac
        })
        .collect()
}
