use burn::{
    config::Config,
    module::{Module, Param, RunningState},
    nn::Initializer,
    tensor::{backend::Backend, Tensor},
};

use crate::error::{self, check_width, FNetError};

/// Configuration for [`BatchNorm`]
#[derive(Config, Debug)]
pub struct BatchNormConfig {
    /// Width of the feature (last) axis
    pub num_features: usize,
    /// Added to the variance before taking the square root
    #[config(default = 1e-3)]
    pub epsilon: f64,
    /// Weight of the current batch in the running statistics
    #[config(default = 0.01)]
    pub momentum: f64,
}

impl BatchNormConfig {
    pub fn validate(&self) -> error::Result<()> {
        check_width("num_features", self.num_features)?;
        if !(self.epsilon > 0.0) {
            return Err(FNetError::InvalidConfig(format!(
                "epsilon must be positive, got {}",
                self.epsilon
            )));
        }
        if !(0.0..=1.0).contains(&self.momentum) {
            return Err(FNetError::InvalidConfig(format!(
                "momentum must be in [0, 1], got {}",
                self.momentum
            )));
        }
        Ok(())
    }

    pub fn try_init<B: Backend>(&self, device: &B::Device) -> error::Result<BatchNorm<B>> {
        self.validate()?;

        Ok(BatchNorm {
            gamma: Initializer::Ones.init([self.num_features], device),
            beta: Initializer::Zeros.init([self.num_features], device),
            running_mean: RunningState::new(Tensor::zeros([self.num_features], device)),
            running_var: RunningState::new(Tensor::ones([self.num_features], device)),
            momentum: self.momentum,
            epsilon: self.epsilon,
        })
    }

    pub fn init<B: Backend>(&self, device: &B::Device) -> BatchNorm<B> {
        self.try_init(device).unwrap_or_else(|err| panic!("{err}"))
    }
}

/// Batch normalization over the last axis.
///
/// Statistics are taken per feature across every leading axis, so a
/// `[batch, seq, hidden]` input is normalized with `hidden` means and variances.
/// Training mode normalizes with the batch statistics and folds them into the
/// running statistics; inference mode uses the running statistics only.
#[derive(Module, Debug)]
pub struct BatchNorm<B: Backend> {
    gamma: Param<Tensor<B, 1>>,
    beta: Param<Tensor<B, 1>>,
    running_mean: RunningState<Tensor<B, 1>>,
    running_var: RunningState<Tensor<B, 1>>,
    momentum: f64,
    epsilon: f64,
}

impl<B: Backend> BatchNorm<B> {
    /// Forward: [..., features] -> [..., features]
    pub fn forward<const D: usize>(&self, input: Tensor<B, D>, training: bool) -> Tensor<B, D> {
        let dims = input.dims();
        let features = dims[D - 1];
        let rows = dims[..D - 1].iter().product::<usize>();
        let flat: Tensor<B, 2> = input.reshape([rows, features]);

        let (mean, var) = if training {
            let mean = flat.clone().mean_dim(0); // [1, features]
            let var = (flat.clone() - mean.clone()).powi_scalar(2).mean_dim(0);
            self.update_running(mean.clone(), var.clone(), features);
            (mean, var)
        } else {
            (
                self.running_mean.value_sync().unsqueeze::<2>(),
                self.running_var.value_sync().unsqueeze::<2>(),
            )
        };

        let std_dev = var.add_scalar(self.epsilon).sqrt();
        let normalized = (flat - mean) / std_dev;
        let output = normalized * self.gamma.val().unsqueeze::<2>()
            + self.beta.val().unsqueeze::<2>();

        output.reshape(dims)
    }

    fn update_running(&self, mean: Tensor<B, 2>, var: Tensor<B, 2>, features: usize) {
        let mean = mean.detach().reshape([features]);
        let var = var.detach().reshape([features]);

        let running_mean = self
            .running_mean
            .value_sync()
            .mul_scalar(1.0 - self.momentum)
            .add(mean.mul_scalar(self.momentum));
        let running_var = self
            .running_var
            .value_sync()
            .mul_scalar(1.0 - self.momentum)
            .add(var.mul_scalar(self.momentum));

        self.running_mean.update(running_mean.detach());
        self.running_var.update(running_var.detach());
    }

    pub fn num_features(&self) -> usize {
        self.gamma.dims()[0]
    }

    /// Reports the configuration this layer was built from
    pub fn config(&self) -> BatchNormConfig {
        BatchNormConfig::new(self.num_features())
            .with_epsilon(self.epsilon)
            .with_momentum(self.momentum)
    }
}
