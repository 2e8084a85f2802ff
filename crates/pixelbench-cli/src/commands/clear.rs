use anyhow::{Context, Result};
use pixelbench::{Config, PixelBench, Scenario};

use crate::cli::OutputFormat;
use crate::output::OutputFormatter;

pub async fn run(
    config: Config,
    formatter: &OutputFormatter,
    format: OutputFormat,
    quiet: bool,
    scenario: Scenario,
) -> Result<()> {
    let bench = PixelBench::new(config).await?;
    bench
        .clear(scenario)
        .await
        .with_context(|| format!("Failed to clear {} history", scenario))?;

    match format {
        OutputFormat::Json => formatter.print_json(&serde_json::json!({
            "scenario": scenario,
            "cleared": true,
        })),
        OutputFormat::Table => {
            if !quiet {
                formatter.print_success(&format!("Cleared {} history", scenario));
            }
            Ok(())
        }
    }
}
