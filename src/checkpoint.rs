use std::fs;
use std::path::Path;

use burn::{
    config::Config,
    module::Module,
    record::{CompactRecorder, Recorder},
    tensor::backend::Backend,
};

use crate::{
    error::Result,
    model::{FNetBlock, FNetBlockConfig},
};

const CONFIG_FILE: &str = "config.json";
const WEIGHTS_FILE: &str = "weights";

/// Writes a block's configuration and weights (running statistics included) to `dir`.
///
/// The layout is `dir/config.json` plus `dir/weights.mpk`.
pub fn save_block<B: Backend>(block: &FNetBlock<B>, dir: impl AsRef<Path>) -> Result<()> {
    let dir = dir.as_ref();
    fs::create_dir_all(dir)?;

    block.config().save(dir.join(CONFIG_FILE))?;
    CompactRecorder::new().record(block.clone().into_record(), dir.join(WEIGHTS_FILE))?;

    log::info!("saved FNet block to {}", dir.display());
    Ok(())
}

/// Rebuilds a block from the configuration stored in `dir` and loads its weights.
pub fn load_block<B: Backend>(dir: impl AsRef<Path>, device: &B::Device) -> Result<FNetBlock<B>> {
    let dir = dir.as_ref();

    let config = FNetBlockConfig::load(dir.join(CONFIG_FILE))?;
    let record = CompactRecorder::new().load(dir.join(WEIGHTS_FILE), device)?;
    let block = config.try_init::<B>(device)?.load_record(record);

    log::info!(
        "loaded FNet block (hidden_dim {}) from {}",
        config.hidden_dim,
        dir.display()
    );
    Ok(block)
}
