//! Test fixtures: synthetic signals and WAV files.

use std::path::Path;

/// Write `samples` (interleaved, `[-1, 1]`) as a 16-bit PCM WAV file.
pub(crate) fn write_wav(path: &Path, samples: &[f32], sample_rate: u32, channels: u16) {
    let spec = hound::WavSpec {
        channels,
        sample_rate,
        bits_per_sample: 16,
        sample_format: hound::SampleFormat::Int,
    };
    let mut writer = hound::WavWriter::create(path, spec).expect("create wav");
    for &s in samples {
        let v = (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16;
        writer.write_sample(v).expect("write sample");
    }
    writer.finalize().expect("finalize wav");
}

/// `secs` seconds of a sine wave at `freq` Hz.
pub(crate) fn sine(freq: f32, sample_rate: u32, secs: f32, amplitude: f32) -> Vec<f32> {
    let n = (secs * sample_rate as f32) as usize;
    (0..n)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            amplitude * (2.0 * std::f32::consts::PI * freq * t).sin()
        })
        .collect()
}

/// A crude "speech-like" clip: a few harmonics under a slow amplitude
/// envelope, so frames differ from one another.
pub(crate) fn speech_like(sample_rate: u32, secs: f32) -> Vec<f32> {
    let n = (secs * sample_rate as f32) as usize;
    (0..n)
        .map(|i| {
            let t = i as f32 / sample_rate as f32;
            let envelope = 0.5 + 0.5 * (2.0 * std::f32::consts::PI * 3.0 * t).sin().abs();
            let voiced = (2.0 * std::f32::consts::PI * 180.0 * t).sin()
                + 0.5 * (2.0 * std::f32::consts::PI * 360.0 * t).sin()
                + 0.25 * (2.0 * std::f32::consts::PI * 1_250.0 * t).sin();
            0.3 * envelope * voiced
        })
        .collect()
}
