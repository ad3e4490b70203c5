//! Safetensors-backed classifier weight loading.
//!
//! Tensor layout (Keras convention, gates ordered `[i, f, c, o]`):
//!
//! | name                      | shape            |
//! |---------------------------|------------------|
//! | `lstm_1.kernel`           | `[F, 4·U₁]`      |
//! | `lstm_1.recurrent_kernel` | `[U₁, 4·U₁]`     |
//! | `lstm_1.bias`             | `[4·U₁]`         |
//! | `lstm_2.kernel`           | `[U₁, 4·U₂]`     |
//! | `lstm_2.recurrent_kernel` | `[U₂, 4·U₂]`     |
//! | `lstm_2.bias`             | `[4·U₂]`         |
//! | `dense.kernel`            | `[U₂, 6]`        |
//! | `dense.bias`              | `[6]`            |

use std::path::Path;

use ndarray::{Array1, Array2};
use safetensors::tensor::Dtype;
use safetensors::SafeTensors;
use thiserror::Error;

use crate::config::constants::{LSTM_UNITS_1, LSTM_UNITS_2, NUM_EMOTIONS};

// ---------------------------------------------------------------------------
// ModelError
// ---------------------------------------------------------------------------

/// The classifier could not be made available.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ModelError {
    /// No weights file at the resolved path.
    #[error("model weights not found: {0}")]
    NotFound(String),

    /// The weights file exists but could not be read.
    #[error("cannot read model weights {path}: {reason}")]
    Io { path: String, reason: String },

    /// The file is not a valid safetensors container.
    #[error("invalid safetensors file: {0}")]
    Format(String),

    /// A required tensor is absent.
    #[error("missing tensor: {0}")]
    MissingTensor(String),

    /// A tensor uses a dtype other than F32 or BF16.
    #[error("unsupported dtype for {name}: {dtype}")]
    UnsupportedDtype { name: String, dtype: String },

    /// A tensor has the wrong shape for the architecture.
    #[error("tensor {name} has shape {got:?}, expected {expected:?}")]
    ShapeMismatch {
        name: String,
        expected: Vec<usize>,
        got: Vec<usize>,
    },
}

// ---------------------------------------------------------------------------
// Weight structs
// ---------------------------------------------------------------------------

/// Parameters of one LSTM layer.
#[derive(Debug, Clone)]
pub struct LstmWeights {
    /// Input kernel, `(input, 4·units)`.
    pub kernel: Array2<f32>,
    /// Recurrent kernel, `(units, 4·units)`.
    pub recurrent_kernel: Array2<f32>,
    /// Bias, `(4·units)`.
    pub bias: Array1<f32>,
}

/// Parameters of the output layer.
#[derive(Debug, Clone)]
pub struct DenseWeights {
    pub kernel: Array2<f32>,
    pub bias: Array1<f32>,
}

/// All classifier parameters.
#[derive(Debug, Clone)]
pub struct ClassifierWeights {
    pub lstm_1: LstmWeights,
    pub lstm_2: LstmWeights,
    pub dense: DenseWeights,
}

impl ClassifierWeights {
    /// Read weights for an input width of `n_features` from `path`.
    pub fn load(path: impl AsRef<Path>, n_features: usize) -> Result<Self, ModelError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ModelError::NotFound(path.display().to_string()));
        }
        let bytes = std::fs::read(path).map_err(|e| ModelError::Io {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_bytes(&bytes, n_features)
    }

    /// Parse an in-memory safetensors buffer.
    pub fn from_bytes(bytes: &[u8], n_features: usize) -> Result<Self, ModelError> {
        let st = SafeTensors::deserialize(bytes).map_err(|e| ModelError::Format(e.to_string()))?;

        let (u1, u2) = (LSTM_UNITS_1, LSTM_UNITS_2);
        Ok(Self {
            lstm_1: LstmWeights {
                kernel: matrix(&st, "lstm_1.kernel", n_features, 4 * u1)?,
                recurrent_kernel: matrix(&st, "lstm_1.recurrent_kernel", u1, 4 * u1)?,
                bias: vector(&st, "lstm_1.bias", 4 * u1)?,
            },
            lstm_2: LstmWeights {
                kernel: matrix(&st, "lstm_2.kernel", u1, 4 * u2)?,
                recurrent_kernel: matrix(&st, "lstm_2.recurrent_kernel", u2, 4 * u2)?,
                bias: vector(&st, "lstm_2.bias", 4 * u2)?,
            },
            dense: DenseWeights {
                kernel: matrix(&st, "dense.kernel", u2, NUM_EMOTIONS)?,
                bias: vector(&st, "dense.bias", NUM_EMOTIONS)?,
            },
        })
    }
}

// ---------------------------------------------------------------------------
// Tensor decoding
// ---------------------------------------------------------------------------

fn tensor_f32(st: &SafeTensors<'_>, name: &str, expected: &[usize]) -> Result<Vec<f32>, ModelError> {
    let tv = st
        .tensor(name)
        .map_err(|_| ModelError::MissingTensor(name.to_string()))?;

    if tv.shape() != expected {
        return Err(ModelError::ShapeMismatch {
            name: name.to_string(),
            expected: expected.to_vec(),
            got: tv.shape().to_vec(),
        });
    }

    let raw = tv.data();
    let data = match tv.dtype() {
        Dtype::F32 => raw
            .chunks_exact(4)
            .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect(),
        Dtype::BF16 => raw
            .chunks_exact(2)
            .map(|c| f32::from_bits((u16::from_le_bytes([c[0], c[1]]) as u32) << 16))
            .collect(),
        other => {
            return Err(ModelError::UnsupportedDtype {
                name: name.to_string(),
                dtype: format!("{other:?}"),
            })
        }
    };
    Ok(data)
}

fn matrix(
    st: &SafeTensors<'_>,
    name: &str,
    rows: usize,
    cols: usize,
) -> Result<Array2<f32>, ModelError> {
    let data = tensor_f32(st, name, &[rows, cols])?;
    Array2::from_shape_vec((rows, cols), data).map_err(|e| ModelError::Format(format!("{name}: {e}")))
}

fn vector(st: &SafeTensors<'_>, name: &str, len: usize) -> Result<Array1<f32>, ModelError> {
    Ok(Array1::from_vec(tensor_f32(st, name, &[len])?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::testing::{seeded_tensors, write_safetensors, TensorFixture};
    use tempfile::tempdir;

    #[test]
    fn loads_f32_model() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ser.safetensors");
        write_safetensors(&path, &seeded_tensors(7, Dtype::F32));

        let w = ClassifierWeights::load(&path, 15).unwrap();
        assert_eq!(w.lstm_1.kernel.dim(), (15, 256));
        assert_eq!(w.lstm_1.recurrent_kernel.dim(), (64, 256));
        assert_eq!(w.lstm_2.kernel.dim(), (64, 256));
        assert_eq!(w.dense.kernel.dim(), (64, 6));
        assert_eq!(w.dense.bias.len(), 6);
    }

    #[test]
    fn bf16_values_are_widened() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("bf16.safetensors");
        let mut tensors = seeded_tensors(7, Dtype::BF16);
        let bias = tensors.iter_mut().find(|t| t.name == "dense.bias").unwrap();
        bias.values = vec![1.0, -2.0, 0.5, 0.0, 0.25, -0.125];
        write_safetensors(&path, &tensors);

        let w = ClassifierWeights::load(&path, 15).unwrap();
        assert_eq!(w.dense.bias.to_vec(), vec![1.0, -2.0, 0.5, 0.0, 0.25, -0.125]);
    }

    #[test]
    fn missing_file_is_not_found() {
        let err = ClassifierWeights::load("/nonexistent/ser.safetensors", 15).unwrap_err();
        assert!(matches!(err, ModelError::NotFound(_)), "got {err:?}");
    }

    #[test]
    fn garbage_is_format_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("junk.safetensors");
        std::fs::write(&path, b"this is not a safetensors file").unwrap();
        let err = ClassifierWeights::load(&path, 15).unwrap_err();
        assert!(matches!(err, ModelError::Format(_)), "got {err:?}");
    }

    #[test]
    fn missing_tensor_is_reported_by_name() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("partial.safetensors");
        let tensors: Vec<TensorFixture> = seeded_tensors(1, Dtype::F32)
            .into_iter()
            .filter(|t| t.name != "dense.kernel")
            .collect();
        write_safetensors(&path, &tensors);

        let err = ClassifierWeights::load(&path, 15).unwrap_err();
        assert_eq!(err, ModelError::MissingTensor("dense.kernel".into()));
    }

    #[test]
    fn wrong_input_width_is_shape_mismatch() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ser.safetensors");
        write_safetensors(&path, &seeded_tensors(1, Dtype::F32));

        let err = ClassifierWeights::load(&path, 20).unwrap_err();
        assert_eq!(
            err,
            ModelError::ShapeMismatch {
                name: "lstm_1.kernel".into(),
                expected: vec![20, 256],
                got: vec![15, 256],
            }
        );
    }

    #[test]
    fn unsupported_dtype_is_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("f64.safetensors");
        let mut tensors = seeded_tensors(1, Dtype::F32);
        let bias = tensors.iter_mut().find(|t| t.name == "dense.bias").unwrap();
        bias.dtype = Dtype::F64;
        write_safetensors(&path, &tensors);

        let err = ClassifierWeights::load(&path, 15).unwrap_err();
        assert!(
            matches!(&err, ModelError::UnsupportedDtype { name, .. } if name == "dense.bias"),
            "got {err:?}"
        );
    }
}
