//! Channel mixing and sample-rate conversion for decoded uploads.
//!
//! Whisper consumes **16 kHz mono `f32`**; uploaded files arrive at whatever
//! rate and channel layout they were recorded with.

/// Sample rate Whisper expects.
pub const WHISPER_SAMPLE_RATE: u32 = 16_000;

/// Average interleaved frames of `channels` samples down to one sample each.
///
/// `channels == 1` copies the input; `channels == 0` yields nothing.  A
/// trailing partial frame is dropped.
///
/// ```rust
/// use banking_ai::stt::resample::downmix;
///
/// let stereo = vec![0.5_f32, -0.5, 0.2, 0.4]; // L R L R
/// let mono = downmix(&stereo, 2);
/// assert_eq!(mono.len(), 2);
/// assert!((mono[1] - 0.3).abs() < 1e-6);
/// ```
pub fn downmix(samples: &[f32], channels: usize) -> Vec<f32> {
    if channels == 0 {
        return Vec::new();
    }
    let scale = 1.0 / channels as f32;
    samples
        .chunks_exact(channels)
        .map(|frame| frame.iter().sum::<f32>() * scale)
        .collect()
}

/// Linear-interpolation resample from `source_rate` to
/// [`WHISPER_SAMPLE_RATE`].
///
/// Source positions are tracked as exact fractions of the two rates, so
/// long recordings do not drift.  Output length is
/// `ceil(len * 16 000 / source_rate)`; a zero `source_rate` yields nothing.
pub fn to_whisper_rate(samples: &[f32], source_rate: u32) -> Vec<f32> {
    if source_rate == WHISPER_SAMPLE_RATE {
        return samples.to_vec();
    }
    let (Some(&tail), true) = (samples.last(), source_rate > 0) else {
        return Vec::new();
    };

    let target = u64::from(WHISPER_SAMPLE_RATE);
    let source = u64::from(source_rate);
    let output_len = (samples.len() as u64 * target).div_ceil(source);

    (0..output_len)
        .map(|n| {
            // Output sample n sits at n * source / target in the input.
            let scaled = n * source;
            let index = (scaled / target) as usize;
            let weight = (scaled % target) as f32 / target as f32;
            let left = samples.get(index).copied().unwrap_or(tail);
            let right = samples.get(index + 1).copied().unwrap_or(left);
            left + (right - left) * weight
        })
        .collect()
}

/// Downmix then resample: the full conversion for a decoded file.
pub fn to_whisper_pcm(samples: &[f32], sample_rate: u32, channels: usize) -> Vec<f32> {
    to_whisper_rate(&downmix(samples, channels), sample_rate)
}
