//! FNet encoder layers for burn.
//!
//! [`FNetBlock`] replaces self-attention with a fixed 2D Fourier transform over the
//! token and feature axes, followed by the [`Forward`] feed-forward sublayer. Each
//! stage is wrapped with a residual connection and batch normalization.
//!
//! ```rust,ignore
//! use burn::backend::NdArray;
//! use fnet_layers::FNetBlockConfig;
//!
//! let device = Default::default();
//! let block = FNetBlockConfig::new(64).init::<NdArray<f32>>(&device);
//! let output = block.forward(input, false); // [batch, seq, 64]
//! ```

pub mod checkpoint;
pub mod error;
pub mod model;

pub use checkpoint::{load_block, save_block};
pub use error::{FNetError, Result};
pub use model::{FNetBlock, FNetBlockConfig, FourierMixing, Forward, ForwardConfig};
