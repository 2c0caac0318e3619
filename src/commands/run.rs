use anyhow::Result;
use eventcal_core::config::HarvestConfig;
use eventcal_core::pipeline::Pipeline;

use crate::render;

pub async fn run(config: HarvestConfig) -> Result<()> {
    let calendar_path = config.calendar_path.clone();
    let new_events_path = config.new_events_calendar_path.clone();

    let summary = Pipeline::new(config).run().await?;

    println!("{}", render::summary(&summary));
    if let Some(count) = summary.calendar_events {
        println!("{}", render::calendar_written(&calendar_path, count));
    }
    if let (Some(path), Some(count)) = (new_events_path, summary.new_calendar_events) {
        println!("{}", render::calendar_written(&path, count));
    }

    Ok(())
}
