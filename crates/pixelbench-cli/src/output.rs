//! Output formatting for comparison results

use anyhow::{Context, Result};
use colored::Colorize;
use pixelbench::{
    ComparisonOutcome, ImageSizeSample, Implementation, PersistedRun, PersistedStatistics,
    Scenario, ScenarioRun, Verification,
};
use serde::Serialize;
use std::io::{self, Write};

use crate::cli::OutputFormat;

/// Output formatter for benchmark results
pub struct OutputFormatter {
    /// Output format
    format: OutputFormat,

    /// Colorize output
    colorize: bool,
}

impl OutputFormatter {
    /// Create a new output formatter
    pub fn new(format: OutputFormat, colorize: bool) -> Self {
        Self { format, colorize }
    }

    /// Print the result of one comparison
    pub fn print_outcome(&self, outcome: &ComparisonOutcome) -> Result<()> {
        if self.format == OutputFormat::Json {
            return self.print_json(outcome);
        }

        let mut stdout = io::stdout();
        let title = format!(
            "{} on {}x{} ({:.2} MP), {} trials each",
            outcome.scenario,
            outcome.image.width,
            outcome.image.height,
            outcome.image.megapixels,
            outcome.trial_count
        );
        writeln!(stdout, "{}", self.heading(&title))?;

        let winner = match outcome.winner {
            Some(winner) => format!("{} ({:.2}x faster)", winner, outcome.speedup_ratio),
            None => "tie".to_string(),
        };
        writeln!(stdout, "  Winner:        {}", winner)?;
        writeln!(
            stdout,
            "  Verification:  {}",
            self.verification(&outcome.verification, outcome.tolerance)
        )?;
        writeln!(stdout)?;

        self.write_stats_header(&mut stdout)?;
        for implementation in Implementation::all() {
            self.write_stats_row(&mut stdout, implementation.name(), outcome.stats(implementation))?;
        }
        stdout.flush()?;
        Ok(())
    }

    /// Print the recorded runs of a scenario
    pub fn print_history(&self, scenario: Scenario, runs: &[ScenarioRun]) -> Result<()> {
        if self.format == OutputFormat::Json {
            let persisted: Vec<PersistedRun> = runs.iter().map(ScenarioRun::sanitize).collect();
            return self.print_json(&persisted);
        }

        if runs.is_empty() {
            self.print_info(&format!("No runs recorded for {}.", scenario));
            return Ok(());
        }

        let mut stdout = io::stdout();
        writeln!(
            stdout,
            "{}",
            self.heading(&format!("{} history ({} runs)", scenario, runs.len()))
        )?;
        self.write_stats_header(&mut stdout)?;
        for (index, run) in runs.iter().enumerate() {
            for implementation in Implementation::all() {
                let label = format!("#{} {}", index + 1, implementation);
                match run.get(implementation) {
                    Some(stats) => self.write_stats_row(&mut stdout, &label, &stats.sanitize())?,
                    None => writeln!(stdout, "{:<16} {}", label, "(not run)")?,
                }
            }
        }
        stdout.flush()?;
        Ok(())
    }

    /// Print image-size correlation samples
    pub fn print_sizes(&self, scenario: Scenario, samples: &[ImageSizeSample]) -> Result<()> {
        if self.format == OutputFormat::Json {
            return self.print_json(&samples);
        }

        if samples.is_empty() {
            self.print_info(&format!("No size samples recorded for {}.", scenario));
            return Ok(());
        }

        let mut stdout = io::stdout();
        writeln!(
            stdout,
            "{:>10} {:>14} {:>14} {:>9}  {}",
            self.heading("MP"),
            self.heading("INTERPRETED"),
            self.heading("COMPILED"),
            self.heading("RATIO"),
            self.heading("RECORDED")
        )?;
        for sample in samples {
            writeln!(
                stdout,
                "{:>10.3} {:>11.3} ms {:>11.3} ms {:>8.2}x  {}",
                sample.megapixels,
                sample.interpreted_ms,
                sample.compiled_ms,
                sample.speedup_ratio,
                sample.timestamp.format("%Y-%m-%d %H:%M:%S")
            )?;
        }
        stdout.flush()?;
        Ok(())
    }

    /// Print any serializable value as pretty JSON
    pub fn print_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        let json = serde_json::to_string_pretty(value).context("Failed to serialize to JSON")?;
        println!("{}", json);
        Ok(())
    }

    /// Print success message
    pub fn print_success(&self, message: &str) {
        if self.colorize {
            println!("{} {}", "✓".green().bold(), message);
        } else {
            println!("✓ {}", message);
        }
    }

    fn print_info(&self, message: &str) {
        if self.colorize {
            println!("{} {}", "ℹ".blue(), message);
        } else {
            println!("{}", message);
        }
    }

    fn heading(&self, text: &str) -> String {
        if self.colorize {
            text.bold().to_string()
        } else {
            text.to_string()
        }
    }

    fn verification(&self, verification: &Verification, tolerance: u8) -> String {
        let text = match verification {
            Verification::Match => format!("outputs match (tolerance {})", tolerance),
            Verification::LengthMismatch { left, right } => {
                format!("length mismatch: {} vs {} bytes", left, right)
            }
            Verification::ValueMismatch { index, left, right } => {
                format!("byte {} differs: {} vs {}", index, left, right)
            }
        };
        match (self.colorize, verification.is_match()) {
            (false, _) => text,
            (true, true) => text.green().to_string(),
            (true, false) => text.red().bold().to_string(),
        }
    }

    fn write_stats_header(&self, out: &mut impl Write) -> Result<()> {
        writeln!(
            out,
            "{:<16} {:>10} {:>10} {:>9} {:>7} {:>10} {:>10} {:>10} {:>9} {:>6}",
            self.heading("IMPL"),
            self.heading("MEDIAN"),
            self.heading("MEAN"),
            self.heading("STDDEV"),
            self.heading("CV"),
            self.heading("MIN"),
            self.heading("MAX"),
            self.heading("FIRST"),
            self.heading("MP/S"),
            self.heading("N")
        )?;
        Ok(())
    }

    fn write_stats_row(
        &self,
        out: &mut impl Write,
        label: &str,
        stats: &PersistedStatistics,
    ) -> Result<()> {
        let cv = stats
            .coefficient_of_variation_pct
            .map(|cv| format!("{:.1}%", cv))
            .unwrap_or_else(|| "n/a".to_string());
        let first = stats
            .first_run
            .as_ref()
            .map(|t| format_ms(t.execution_time_ms))
            .unwrap_or_else(|| "-".to_string());
        writeln!(
            out,
            "{:<16} {:>10} {:>10} {:>9} {:>7} {:>10} {:>10} {:>10} {:>9.2} {:>6}",
            label,
            format_ms(stats.median.execution_time_ms),
            format_ms(stats.mean.execution_time_ms),
            format_ms(stats.std_dev),
            cv,
            format_ms(stats.min.execution_time_ms),
            format_ms(stats.max.execution_time_ms),
            first,
            stats.median.throughput_mpx_per_sec,
            stats.count
        )?;
        Ok(())
    }
}

fn format_ms(ms: f64) -> String {
    if ms >= 1000.0 {
        format!("{:.2}s", ms / 1000.0)
    } else {
        format!("{:.3}ms", ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_ms() {
        assert_eq!(format_ms(1.5), "1.500ms");
        assert_eq!(format_ms(2500.0), "2.50s");
    }

    #[test]
    fn test_verification_text_uncolored() {
        let formatter = OutputFormatter::new(OutputFormat::Table, false);
        assert_eq!(
            formatter.verification(&Verification::Match, 1),
            "outputs match (tolerance 1)"
        );
        assert_eq!(
            formatter.verification(
                &Verification::ValueMismatch {
                    index: 7,
                    left: 3,
                    right: 9
                },
                1
            ),
            "byte 7 differs: 3 vs 9"
        );
    }
}
