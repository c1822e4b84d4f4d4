pub mod batch_norm;
pub mod dropout;
pub mod feedforward;
pub mod fnet_block;
pub mod fourier;

// Re-export the layer types consumers build models from
pub use batch_norm::{BatchNorm, BatchNormConfig};
pub use dropout::{Dropout, DropoutConfig};
pub use feedforward::{Forward, ForwardConfig};
pub use fnet_block::{FNetBlock, FNetBlockConfig};
pub use fourier::FourierMixing;
