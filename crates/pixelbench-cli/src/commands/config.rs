use anyhow::Result;
use pixelbench::Config;

use crate::output::OutputFormatter;

/// The effective configuration is always printed as JSON so it can be saved and
/// passed back with `--config`
pub fn run(config: &Config, formatter: &OutputFormatter) -> Result<()> {
    formatter.print_json(config)
}
