use anyhow::Result;
use eventcal_core::config::HarvestConfig;
use eventcal_core::pipeline::Pipeline;
use tracing::info;

use crate::render;

pub fn run(config: HarvestConfig) -> Result<()> {
    let calendar_path = config.calendar_path.clone();
    info!(store = %config.store_path.display(), "Exporting stored events");
    let count = Pipeline::new(config).export()?;
    println!("{}", render::calendar_written(&calendar_path, count));
    Ok(())
}
