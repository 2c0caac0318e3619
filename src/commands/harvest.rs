use anyhow::Result;
use eventcal_core::config::HarvestConfig;
use eventcal_core::pipeline::Pipeline;

use crate::render;

pub async fn run(config: HarvestConfig) -> Result<()> {
    let summary = Pipeline::new(config).harvest().await?;
    println!("{}", render::summary(&summary));
    Ok(())
}
