use burn::{
    config::Config,
    module::Module,
    tensor::{backend::Backend, Tensor},
};

use crate::{
    error::{self, check_width},
    model::{
        batch_norm::{BatchNorm, BatchNormConfig},
        feedforward::{Forward, ForwardConfig},
        fourier::FourierMixing,
    },
};

/// Configuration for one FNet mixing block
#[derive(Config, Debug)]
pub struct FNetBlockConfig {
    /// Feature width at which mixing and normalization operate
    pub hidden_dim: usize,
    /// Dropout used inside the feed-forward sublayer
    #[config(default = 0.1)]
    pub dropout_rate: f64,
    /// Variance epsilon of both normalization layers
    #[config(default = 1e-3)]
    pub epsilon: f64,
    /// Running-statistics momentum of both normalization layers
    #[config(default = 0.01)]
    pub momentum: f64,
}

impl FNetBlockConfig {
    fn ffn_config(&self) -> ForwardConfig {
        ForwardConfig::new(self.hidden_dim, self.dropout_rate)
    }

    fn norm_config(&self) -> BatchNormConfig {
        BatchNormConfig::new(self.hidden_dim)
            .with_epsilon(self.epsilon)
            .with_momentum(self.momentum)
    }

    pub fn validate(&self) -> error::Result<()> {
        check_width("hidden_dim", self.hidden_dim)?;
        self.ffn_config().validate()?;
        self.norm_config().validate()
    }

    pub fn try_init<B: Backend>(&self, device: &B::Device) -> error::Result<FNetBlock<B>> {
        self.validate()?;

        log::debug!(
            "building FNet block: hidden_dim {}, dropout {}",
            self.hidden_dim,
            self.dropout_rate
        );

        // The sublayer is always built at hidden_dim, so both residuals line up.
        Ok(FNetBlock {
            fourier: FourierMixing::new(),
            norm_fourier: self.norm_config().try_init(device)?,
            ffn: self.ffn_config().try_init(device)?,
            norm_ffn: self.norm_config().try_init(device)?,
            hidden_dim: self.hidden_dim,
        })
    }

    /// Initializes the block on the given device, panicking on invalid values
    pub fn init<B: Backend>(&self, device: &B::Device) -> FNetBlock<B> {
        self.try_init(device).unwrap_or_else(|err| panic!("{err}"))
    }

    /// Counts trainable parameters; running statistics are not included
    pub fn count_parameters(&self) -> usize {
        // two normalization layers, gamma and beta each
        self.ffn_config().count_parameters() + 2 * 2 * self.hidden_dim
    }
}

/// One FNet encoder block:
/// x -> Re(FFT2D) -> + x -> BatchNorm
///   -> Forward -> residual -> BatchNorm
#[derive(Module, Debug)]
pub struct FNetBlock<B: Backend> {
    fourier: FourierMixing,
    norm_fourier: BatchNorm<B>,
    ffn: Forward<B>,
    norm_ffn: BatchNorm<B>,
    hidden_dim: usize,
}

impl<B: Backend> FNetBlock<B> {
    /// Forward: [batch, seq_len, hidden] -> [batch, seq_len, hidden]
    pub fn forward(&self, x: Tensor<B, 3>, training: bool) -> Tensor<B, 3> {
        // Token mixing, no learned parameters
        let x_fft = self.fourier.forward(x.clone());
        let x_norm1 = self.norm_fourier.forward(x_fft + x, training);

        let x_dense = self.ffn.forward(x_norm1.clone(), training);
        self.norm_ffn.forward(x_dense + x_norm1, training)
    }

    pub fn hidden_dim(&self) -> usize {
        self.hidden_dim
    }

    /// Reports the configuration needed to rebuild an identically shaped block
    pub fn config(&self) -> FNetBlockConfig {
        let norm = self.norm_fourier.config();
        FNetBlockConfig::new(self.hidden_dim)
            .with_dropout_rate(self.ffn.dropout_rate())
            .with_epsilon(norm.epsilon)
            .with_momentum(norm.momentum)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::{Autodiff, NdArray};
    use burn::tensor::Distribution;

    type TestBackend = NdArray<f32>;

    fn values(tensor: Tensor<TestBackend, 3>) -> Vec<f32> {
        tensor.into_data().to_vec::<f32>().unwrap()
    }

    #[test]
    fn preserves_input_shape() {
        let device = Default::default();
        let block = FNetBlockConfig::new(8).init::<TestBackend>(&device);
        let x = Tensor::<TestBackend, 3>::random([3, 6, 8], Distribution::Default, &device);

        assert_eq!(block.forward(x.clone(), true).dims(), [3, 6, 8]);
        assert_eq!(block.forward(x, false).dims(), [3, 6, 8]);
    }

    #[test]
    fn zero_input_gives_finite_output() {
        let device = Default::default();
        let block = FNetBlockConfig::new(8).init::<TestBackend>(&device);
        let x = Tensor::<TestBackend, 3>::zeros([1, 4, 8], &device);

        let out = block.forward(x, false);
        assert_eq!(out.dims(), [1, 4, 8]);
        assert!(values(out).iter().all(|v| v.is_finite()));
    }

    #[test]
    fn zero_input_in_training_mode_stays_finite() {
        let device = Default::default();
        let block = FNetBlockConfig::new(8).init::<TestBackend>(&device);
        let x = Tensor::<TestBackend, 3>::zeros([1, 4, 8], &device);

        assert!(values(block.forward(x, true)).iter().all(|v| v.is_finite()));
    }

    #[test]
    fn inference_is_repeatable() {
        let device = Default::default();
        let block = FNetBlockConfig::new(8).init::<TestBackend>(&device);
        let x = Tensor::<TestBackend, 3>::random([2, 4, 8], Distribution::Default, &device);

        assert_eq!(values(block.forward(x.clone(), false)), values(block.forward(x, false)));
    }

    #[test]
    fn training_moves_running_statistics() {
        let device = Default::default();
        let block = FNetBlockConfig::new(4)
            .with_dropout_rate(0.0)
            .init::<TestBackend>(&device);
        let x = Tensor::<TestBackend, 3>::random([2, 3, 4], Distribution::Normal(5.0, 1.0), &device);

        let before = values(block.forward(x.clone(), false));
        block.forward(x.clone(), true);
        let after = values(block.forward(x, false));

        assert_ne!(before, after);
    }

    #[test]
    fn config_round_trip() {
        let device = Default::default();
        let block = FNetBlockConfig::new(16)
            .with_dropout_rate(0.2)
            .init::<TestBackend>(&device);

        let config = block.config();
        assert_eq!(config.hidden_dim, 16);
        assert_eq!(config.dropout_rate, 0.2);
        assert_eq!(config.epsilon, 1e-3);
        assert_eq!(config.momentum, 0.01);

        let rebuilt = config.init::<TestBackend>(&device);
        assert_eq!(rebuilt.hidden_dim(), 16);

        let parsed = FNetBlockConfig::load_binary(config.to_string().as_bytes()).unwrap();
        assert_eq!(parsed.hidden_dim, 16);
        assert_eq!(parsed.dropout_rate, 0.2);
    }

    #[test]
    fn counts_parameters() {
        // ffn: 8*8 + 8 + 8*8 + 8 = 144, norms: 2 * (8 + 8) = 32
        assert_eq!(FNetBlockConfig::new(8).count_parameters(), 176);
    }

    #[test]
    fn rejects_zero_hidden_dim() {
        let result = FNetBlockConfig::new(0).try_init::<TestBackend>(&Default::default());
        assert!(result.is_err());
    }

    #[test]
    fn gradients_reach_input_and_dense_layers() {
        type Ad = Autodiff<TestBackend>;
        let device = Default::default();
        let block = FNetBlockConfig::new(4).init::<Ad>(&device);
        let x = Tensor::<Ad, 3>::random([2, 3, 4], Distribution::Default, &device).require_grad();
        let weights = Tensor::<Ad, 3>::random([2, 3, 4], Distribution::Default, &device);

        let grads = (block.forward(x.clone(), true) * weights).sum().backward();

        assert_eq!(x.grad(&grads).unwrap().dims(), [2, 3, 4]);
        assert!(block.ffn.dense1.weight.grad(&grads).is_some());
        assert!(block.ffn.dense2.weight.grad(&grads).is_some());
    }
}
