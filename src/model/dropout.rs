use burn::{
    config::Config,
    module::Module,
    tensor::{backend::Backend, Distribution, Tensor},
};

use crate::error::{self, check_rate};

/// Configuration for [`Dropout`]
#[derive(Config, Debug)]
pub struct DropoutConfig {
    /// Probability of zeroing an element during training
    pub prob: f64,
}

impl DropoutConfig {
    pub fn validate(&self) -> error::Result<()> {
        check_rate("dropout probability", self.prob)
    }

    pub fn try_init(&self) -> error::Result<Dropout> {
        self.validate()?;
        Ok(Dropout { prob: self.prob })
    }

    pub fn init(&self) -> Dropout {
        self.try_init().unwrap_or_else(|err| panic!("{err}"))
    }
}

/// Dropout driven by an explicit training flag.
///
/// In training mode each element is zeroed with probability `prob` and survivors are
/// scaled by `1 / (1 - prob)`. In inference mode the input is returned untouched.
#[derive(Module, Clone, Debug)]
pub struct Dropout {
    pub prob: f64,
}

impl Dropout {
    pub fn forward<B: Backend, const D: usize>(
        &self,
        input: Tensor<B, D>,
        training: bool,
    ) -> Tensor<B, D> {
        if !training || self.prob == 0.0 {
            return input;
        }

        let prob_keep = 1.0 - self.prob;
        let mask = input.random_like(Distribution::Bernoulli(prob_keep));
        (input * mask).div_scalar(prob_keep)
    }
}
