//! Command-line argument parsing for pixelbench

use clap::{Parser, Subcommand, ValueEnum};
use pixelbench::Scenario;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "pixelbench")]
#[command(author, version, about = "Benchmark interpreted vs compiled image routines")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Home directory for pixelbench data
    #[arg(long, global = true, env = "PIXELBENCH_HOME")]
    pub home: Option<PathBuf>,

    /// Configuration file (JSON); overrides --home
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(short = 'f', long, global = true, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Enable verbose output
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Compare both implementations on a synthesized image
    Run {
        /// Scenario (invert, edge-detect, quantize)
        scenario: Scenario,

        /// Image width in pixels
        #[arg(long, default_value = "1024")]
        width: u32,

        /// Image height in pixels
        #[arg(long, default_value = "768")]
        height: u32,

        /// Fill pattern of the input image
        #[arg(long, value_enum, default_value = "gradient")]
        pattern: Pattern,

        /// Base color as R,G,B,A
        #[arg(long, value_parser = parse_color, default_value = "255,0,0,255")]
        color: [u8; 4],

        /// Trials per implementation (default: scenario run policy)
        #[arg(short = 'n', long)]
        trials: Option<usize>,

        /// Palette size for quantize
        #[arg(long)]
        colors: Option<usize>,
    },

    /// List recorded runs for a scenario
    History {
        scenario: Scenario,
    },

    /// Clear recorded runs for a scenario
    Clear {
        scenario: Scenario,
    },

    /// List image-size correlation samples for a scenario
    Sizes {
        scenario: Scenario,
    },

    /// Print the effective configuration
    Config,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// Human-readable tables (default)
    Table,
    /// JSON
    Json,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pattern {
    /// Single color
    Solid,
    /// Color fading to its inverse left to right
    Gradient,
    /// 8x8 squares of color and black
    Checker,
}

/// Parse `R,G,B,A` with each channel in 0..=255
pub fn parse_color(s: &str) -> Result<[u8; 4], String> {
    let parts: Vec<&str> = s.split(',').map(str::trim).collect();
    if parts.len() != 4 {
        return Err(format!("expected R,G,B,A, got '{}'", s));
    }
    let mut rgba = [0u8; 4];
    for (slot, part) in rgba.iter_mut().zip(&parts) {
        *slot = part
            .parse()
            .map_err(|_| format!("channel '{}' is not in 0..=255", part))?;
    }
    Ok(rgba)
}

impl Cli {
    /// Initialize logging based on verbosity level
    pub fn init_logging(&self) {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        let level = if self.quiet {
            "error"
        } else {
            match self.verbose {
                0 => "warn",
                1 => "info",
                2 => "debug",
                _ => "trace",
            }
        };

        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

        // Logs go to stderr so JSON on stdout stays machine-readable
        tracing_subscriber::registry()
            .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
            .with(filter)
            .init();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing_basic() {
        let cli = Cli::parse_from(["pixelbench", "run", "invert"]);
        assert_eq!(cli.format, OutputFormat::Table);
        match cli.command {
            Commands::Run {
                scenario,
                width,
                height,
                pattern,
                color,
                trials,
                colors,
            } => {
                assert_eq!(scenario, Scenario::Invert);
                assert_eq!((width, height), (1024, 768));
                assert_eq!(pattern, Pattern::Gradient);
                assert_eq!(color, [255, 0, 0, 255]);
                assert_eq!(trials, None);
                assert_eq!(colors, None);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_cli_parsing_with_options() {
        let cli = Cli::parse_from([
            "pixelbench",
            "run",
            "edge",
            "--width",
            "64",
            "--height",
            "32",
            "--pattern",
            "checker",
            "--color",
            "0,128,255,255",
            "-n",
            "5",
            "--format",
            "json",
            "-vv",
        ]);

        assert_eq!(cli.format, OutputFormat::Json);
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Commands::Run {
                scenario,
                pattern,
                color,
                trials,
                ..
            } => {
                assert_eq!(scenario, Scenario::EdgeDetect);
                assert_eq!(pattern, Pattern::Checker);
                assert_eq!(color, [0, 128, 255, 255]);
                assert_eq!(trials, Some(5));
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_color() {
        assert_eq!(parse_color("1, 2, 3, 4"), Ok([1, 2, 3, 4]));
        assert!(parse_color("1,2,3").is_err());
        assert!(parse_color("1,2,3,256").is_err());
    }
}
