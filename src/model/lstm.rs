//! LSTM forward pass.
//!
//! Per time step `t`, with gates packed `[i, f, c, o]` along the last axis:
//!
//! ```text
//! z  = x_t·W + h_{t-1}·U + b
//! i  = σ(z_i)   f = σ(z_f)   o = σ(z_o)   ĉ = tanh(z_c)
//! c_t = f ⊙ c_{t-1} + i ⊙ ĉ
//! h_t = o ⊙ tanh(c_t)
//! ```
//!
//! State starts at zero and lives on the caller's stack, so a layer can run
//! any number of sequences concurrently.

use ndarray::{Array1, Array2, ArrayView2};

use super::weights::LstmWeights;

#[inline]
fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

#[derive(Debug, Clone)]
pub struct LstmLayer {
    kernel: Array2<f32>,
    recurrent_kernel: Array2<f32>,
    bias: Array1<f32>,
}

impl LstmLayer {
    pub fn new(weights: LstmWeights) -> Self {
        Self {
            kernel: weights.kernel,
            recurrent_kernel: weights.recurrent_kernel,
            bias: weights.bias,
        }
    }

    pub fn units(&self) -> usize {
        self.recurrent_kernel.nrows()
    }

    pub fn input_size(&self) -> usize {
        self.kernel.nrows()
    }

    /// Hidden state at every step, shape `(T, units)`.
    pub fn forward_sequence(&self, input: ArrayView2<'_, f32>) -> Array2<f32> {
        let mut out = Array2::<f32>::zeros((input.nrows(), self.units()));
        self.run(input, |t, h| out.row_mut(t).assign(h));
        out
    }

    /// Hidden state after the last step, shape `(units)`.
    pub fn forward_last(&self, input: ArrayView2<'_, f32>) -> Array1<f32> {
        let mut last = Array1::<f32>::zeros(self.units());
        self.run(input, |_, h| last.assign(h));
        last
    }

    fn run(&self, input: ArrayView2<'_, f32>, mut emit: impl FnMut(usize, &Array1<f32>)) {
        let u = self.units();

        // Input projections for all steps at once.
        let mut projected = input.dot(&self.kernel);
        projected += &self.bias;

        let mut h = Array1::<f32>::zeros(u);
        let mut c = Array1::<f32>::zeros(u);

        for (t, x_proj) in projected.outer_iter().enumerate() {
            let z = &x_proj + &h.dot(&self.recurrent_kernel);
            for k in 0..u {
                let i = sigmoid(z[k]);
                let f = sigmoid(z[u + k]);
                let cand = z[2 * u + k].tanh();
                let o = sigmoid(z[3 * u + k]);
                c[k] = f * c[k] + i * cand;
                h[k] = o * c[k].tanh();
            }
            emit(t, &h);
        }
    }
}
