use anyhow::Result;
use pixelbench::{Config, PixelBench, Scenario};

use crate::output::OutputFormatter;

pub async fn run(config: Config, formatter: &OutputFormatter, scenario: Scenario) -> Result<()> {
    let bench = PixelBench::new(config).await?;
    let samples = bench.size_samples(scenario).await;
    formatter.print_sizes(scenario, &samples)
}
