//! Test fixtures: safetensors files with deterministic weights.

use std::borrow::Cow;
use std::path::Path;

use safetensors::tensor::{serialize_to_file, Dtype, View};

use crate::config::constants::{INPUT_SHAPE, LSTM_UNITS_1, LSTM_UNITS_2, NUM_EMOTIONS};

use super::classifier::LstmClassifier;
use super::weights::ClassifierWeights;

/// One named tensor, stored as `f32` and encoded to `dtype` on write.
///
/// Only `F32`, `BF16` and `F64` are encodable.
#[derive(Debug, Clone)]
pub(crate) struct TensorFixture {
    pub name: String,
    pub shape: Vec<usize>,
    pub values: Vec<f32>,
    pub dtype: Dtype,
}

impl View for &TensorFixture {
    fn dtype(&self) -> Dtype {
        self.dtype
    }

    fn shape(&self) -> &[usize] {
        &self.shape
    }

    fn data(&self) -> Cow<'_, [u8]> {
        let mut out = Vec::with_capacity(self.data_len());
        for &v in &self.values {
            match self.dtype {
                Dtype::BF16 => out.extend_from_slice(&((v.to_bits() >> 16) as u16).to_le_bytes()),
                Dtype::F64 => out.extend_from_slice(&(v as f64).to_le_bytes()),
                _ => out.extend_from_slice(&v.to_le_bytes()),
            }
        }
        Cow::Owned(out)
    }

    fn data_len(&self) -> usize {
        let width = match self.dtype {
            Dtype::BF16 => 2,
            Dtype::F64 => 8,
            _ => 4,
        };
        self.values.len() * width
    }
}

pub(crate) fn write_safetensors(path: &Path, tensors: &[TensorFixture]) {
    let views = tensors.iter().map(|t| (t.name.as_str(), t));
    serialize_to_file(views, None, path).expect("serialize safetensors");
}

/// Small deterministic values in `[-0.25, 0.25)`.
fn lcg(seed: u64, n: usize) -> Vec<f32> {
    let mut state = seed.wrapping_mul(6_364_136_223_846_793_005).wrapping_add(1);
    (0..n)
        .map(|_| {
            state = state
                .wrapping_mul(6_364_136_223_846_793_005)
                .wrapping_add(1_442_695_040_888_963_407);
            ((state >> 40) as f32 / (1u64 << 24) as f32 - 0.5) * 0.5
        })
        .collect()
}

/// The full tensor set for the default architecture.
pub(crate) fn seeded_tensors(seed: u64, dtype: Dtype) -> Vec<TensorFixture> {
    let (f, u1, u2) = (INPUT_SHAPE.1, LSTM_UNITS_1, LSTM_UNITS_2);
    let specs: [(&str, Vec<usize>); 8] = [
        ("lstm_1.kernel", vec![f, 4 * u1]),
        ("lstm_1.recurrent_kernel", vec![u1, 4 * u1]),
        ("lstm_1.bias", vec![4 * u1]),
        ("lstm_2.kernel", vec![u1, 4 * u2]),
        ("lstm_2.recurrent_kernel", vec![u2, 4 * u2]),
        ("lstm_2.bias", vec![4 * u2]),
        ("dense.kernel", vec![u2, NUM_EMOTIONS]),
        ("dense.bias", vec![NUM_EMOTIONS]),
    ];
    specs
        .into_iter()
        .enumerate()
        .map(|(i, (name, shape))| {
            let n = shape.iter().product();
            TensorFixture {
                name: name.to_string(),
                values: lcg(seed.wrapping_add(i as u64 * 7_919), n),
                shape,
                dtype,
            }
        })
        .collect()
}

/// Write a complete F32 model to `dir/ser.safetensors` and return its path.
pub(crate) fn write_seeded_model(dir: &Path, seed: u64) -> std::path::PathBuf {
    let path = dir.join("ser.safetensors");
    write_safetensors(&path, &seeded_tensors(seed, Dtype::F32));
    path
}

/// In-memory classifier with deterministic weights.
pub(crate) fn seeded_classifier(seed: u64) -> LstmClassifier {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = write_seeded_model(dir.path(), seed);
    let weights = ClassifierWeights::load(&path, INPUT_SHAPE.1).expect("load fixture");
    LstmClassifier::from_weights(weights, INPUT_SHAPE.0).expect("fixture shapes")
}
