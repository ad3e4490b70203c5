//! Centred framing shared by every frame-wise descriptor.
//!
//! A signal of `n` samples is padded by `frame_length / 2` on both sides and
//! cut into windows of `frame_length` samples every `hop` samples, so frame
//! `t` is centred on sample `t * hop`.  This yields
//! [`frame_count`](crate::config::constants::frame_count) frames.

/// How the borders of a signal are extended before framing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PadMode {
    /// Pad with zeros.
    Constant,
    /// Repeat the first / last sample.
    Edge,
}

/// Pad `signal` by `frame_length / 2` samples on both sides.
pub fn pad_center(signal: &[f32], frame_length: usize, mode: PadMode) -> Vec<f32> {
    let pad = frame_length / 2;
    let (head, tail) = match mode {
        PadMode::Constant => (0.0, 0.0),
        PadMode::Edge => (
            signal.first().copied().unwrap_or(0.0),
            signal.last().copied().unwrap_or(0.0),
        ),
    };

    let mut padded = Vec::with_capacity(signal.len() + 2 * pad);
    padded.resize(pad, head);
    padded.extend_from_slice(signal);
    padded.resize(signal.len() + 2 * pad, tail);
    padded
}

/// Iterate over the `frame_length`-sample windows of an already padded
/// signal, advancing `hop` samples each step.
///
/// Trailing samples that do not fill a whole window are not visited.
pub fn frames(
    padded: &[f32],
    frame_length: usize,
    hop: usize,
) -> impl Iterator<Item = &[f32]> + '_ {
    let count = if hop == 0 || padded.len() < frame_length {
        0
    } else {
        1 + (padded.len() - frame_length) / hop
    };
    (0..count).map(move |t| &padded[t * hop..t * hop + frame_length])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::constants::frame_count;

    #[test]
    fn constant_padding_adds_zeros() {
        let padded = pad_center(&[1.0, 2.0, 3.0], 4, PadMode::Constant);
        assert_eq!(padded, vec![0.0, 0.0, 1.0, 2.0, 3.0, 0.0, 0.0]);
    }

    #[test]
    fn edge_padding_repeats_borders() {
        let padded = pad_center(&[1.0, 2.0, 3.0], 4, PadMode::Edge);
        assert_eq!(padded, vec![1.0, 1.0, 1.0, 2.0, 3.0, 3.0, 3.0]);
    }

    #[test]
    fn edge_padding_of_empty_signal_is_zero() {
        let padded = pad_center(&[], 4, PadMode::Edge);
        assert_eq!(padded, vec![0.0; 4]);
    }

    #[test]
    fn frame_iterator_agrees_with_frame_count() {
        for len in [0usize, 1, 511, 512, 513, 4_096, 180_000] {
            let signal = vec![0.0_f32; len];
            let padded = pad_center(&signal, 2_048, PadMode::Constant);
            let n = frames(&padded, 2_048, 512).count();
            assert_eq!(Some(n), frame_count(len, 2_048, 512), "len = {len}");
        }
    }

    #[test]
    fn frames_are_centred_on_hop_multiples() {
        let signal: Vec<f32> = (0..16).map(|i| i as f32).collect();
        let padded = pad_center(&signal, 4, PadMode::Constant);
        let all: Vec<&[f32]> = frames(&padded, 4, 4).collect();
        // Frame 1 is centred on sample 4: samples 2..6.
        assert_eq!(all[1], &[2.0, 3.0, 4.0, 5.0]);
        assert_eq!(all.len(), 5);
    }
}
