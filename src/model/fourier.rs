//! Parameter-free token mixing with a 2D discrete Fourier transform.

use std::f64::consts::PI;

use burn::{
    module::Module,
    tensor::{backend::Backend, Tensor, TensorData},
};

/// Real part of the unnormalized 2D DFT over the sequence and feature axes.
///
/// For a real input `X` of shape `[seq, hidden]` the transform is `F_S · X · F_H`
/// with `F_N = C_N - i·S_N`, so its real part is `C_S · X · C_H - S_S · X · S_H`.
/// Everything stays as tensor ops, so gradients flow through the mixing step.
#[derive(Module, Clone, Debug, Default)]
pub struct FourierMixing;

impl FourierMixing {
    pub fn new() -> Self {
        Self
    }

    /// Forward: [batch, seq, hidden] -> [batch, seq, hidden]
    pub fn forward<B: Backend>(&self, input: Tensor<B, 3>) -> Tensor<B, 3> {
        let [batch_size, seq_len, hidden] = input.dims();
        let device = input.device();

        let (cos_seq, sin_seq) = dft_matrices::<B>(seq_len, &device);
        let (cos_hidden, sin_hidden) = dft_matrices::<B>(hidden, &device);

        let real = batched(cos_seq, batch_size)
            .matmul(input.clone())
            .matmul(batched(cos_hidden, batch_size));
        let imag_product = batched(sin_seq, batch_size)
            .matmul(input)
            .matmul(batched(sin_hidden, batch_size));

        real - imag_product
    }
}

/// Cosine and sine halves of the `n`-point DFT matrix: `cos(2πkj/n)` and `sin(2πkj/n)`.
///
/// The index product is reduced modulo `n` before the angle is formed so large
/// sizes keep full precision.
pub fn dft_matrices<B: Backend>(n: usize, device: &B::Device) -> (Tensor<B, 2>, Tensor<B, 2>) {
    let mut cos = Vec::with_capacity(n * n);
    let mut sin = Vec::with_capacity(n * n);

    for k in 0..n {
        for j in 0..n {
            let angle = 2.0 * PI * ((k * j) % n) as f64 / n as f64;
            cos.push(angle.cos() as f32);
            sin.push(angle.sin() as f32);
        }
    }

    (
        Tensor::from_data(TensorData::new(cos, [n, n]), device),
        Tensor::from_data(TensorData::new(sin, [n, n]), device),
    )
}

/// [n, n] -> [batch, n, n]
fn batched<B: Backend>(matrix: Tensor<B, 2>, batch_size: usize) -> Tensor<B, 3> {
    let [rows, cols] = matrix.dims();
    matrix.unsqueeze::<3>().expand([batch_size, rows, cols])
}
