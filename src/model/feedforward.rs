use burn::{
    config::Config,
    module::Module,
    nn::{Gelu, Initializer, Linear, LinearConfig},
    tensor::{backend::Backend, Tensor},
};

use crate::{
    error::{self, check_rate, check_width},
    model::dropout::{Dropout, DropoutConfig},
};

/// Configuration for the feed-forward sublayer
#[derive(Config, Debug)]
pub struct ForwardConfig {
    /// Width of both dense transforms
    pub units: usize,
    /// Dropout probability applied after each dense transform
    pub dropout_rate: f64,
    /// Width of the incoming features, `units` when unset
    #[config(default = "None")]
    pub d_input: Option<usize>,
}

impl ForwardConfig {
    pub fn input_width(&self) -> usize {
        self.d_input.unwrap_or(self.units)
    }

    pub fn validate(&self) -> error::Result<()> {
        check_width("units", self.units)?;
        check_width("d_input", self.input_width())?;
        check_rate("dropout_rate", self.dropout_rate)
    }

    pub fn try_init<B: Backend>(&self, device: &B::Device) -> error::Result<Forward<B>> {
        self.validate()?;
        let d_input = self.input_width();

        log::debug!(
            "building feed-forward sublayer: {} -> {} -> {}, dropout {}",
            d_input,
            self.units,
            self.units,
            self.dropout_rate
        );

        Ok(Forward {
            dense1: dense(d_input, self.units, device),
            dense2: dense(self.units, self.units, device),
            activation: Gelu::new(),
            dropout: DropoutConfig::new(self.dropout_rate).try_init()?,
            units: self.units,
            d_input,
        })
    }

    /// Initializes the sublayer on the given device, panicking on invalid values
    pub fn init<B: Backend>(&self, device: &B::Device) -> Forward<B> {
        self.try_init(device).unwrap_or_else(|err| panic!("{err}"))
    }

    /// Counts trainable parameters (weights and biases of both dense transforms)
    pub fn count_parameters(&self) -> usize {
        let d_input = self.input_width();
        d_input * self.units + self.units + self.units * self.units + self.units
    }
}

// Glorot-uniform weights and zero biases
fn dense<B: Backend>(d_input: usize, d_output: usize, device: &B::Device) -> Linear<B> {
    let mut linear = LinearConfig::new(d_input, d_output)
        .with_initializer(Initializer::XavierUniform { gain: 1.0 })
        .init(device);
    linear.bias = Some(Initializer::Zeros.init([d_output], device));
    linear
}

/// Position-wise feed-forward sublayer:
/// Dense -> GELU -> Dropout -> Dense -> Dropout
#[derive(Module, Debug)]
pub struct Forward<B: Backend> {
    pub(crate) dense1: Linear<B>,
    pub(crate) dense2: Linear<B>,
    activation: Gelu,
    dropout: Dropout,
    units: usize,
    d_input: usize,
}

impl<B: Backend> Forward<B> {
    /// Forward: [..., d_input] -> [..., units]
    pub fn forward<const D: usize>(&self, x: Tensor<B, D>, training: bool) -> Tensor<B, D> {
        let x = self.dense1.forward(x);
        let x = self.activation.forward(x);
        let x = self.dropout.forward(x, training);
        let x = self.dense2.forward(x); // linear, no activation
        self.dropout.forward(x, training)
    }

    pub fn units(&self) -> usize {
        self.units
    }

    pub fn dropout_rate(&self) -> f64 {
        self.dropout.prob
    }

    /// Reports the configuration needed to rebuild an identically shaped sublayer
    pub fn config(&self) -> ForwardConfig {
        ForwardConfig::new(self.units, self.dropout.prob).with_d_input(Some(self.d_input))
    }
}
