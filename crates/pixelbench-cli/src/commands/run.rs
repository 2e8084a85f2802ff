use anyhow::{Context, Result};
use pixelbench::{Config, ImageBuffer, PixelBench, ProcessParams, Scenario};

use crate::cli::Pattern;
use crate::output::OutputFormatter;

/// Image and trial settings for one `run`
pub struct RunArgs {
    pub scenario: Scenario,
    pub width: u32,
    pub height: u32,
    pub pattern: Pattern,
    pub color: [u8; 4],
    pub trials: Option<usize>,
    pub colors: Option<usize>,
}

pub async fn run(config: Config, formatter: &OutputFormatter, args: RunArgs) -> Result<()> {
    if args.width == 0 || args.height == 0 {
        anyhow::bail!("Image must be at least 1x1, got {}x{}", args.width, args.height);
    }

    let params = ProcessParams {
        quantize_colors: args.colors.unwrap_or(config.params.quantize_colors),
    };
    let input = synthesize(args.pattern, args.width, args.height, args.color);

    let bench = PixelBench::new(config).await?;
    let outcome = bench
        .compare(args.scenario, &input, args.trials, Some(params))
        .await
        .with_context(|| format!("{} comparison failed", args.scenario))?;

    formatter.print_outcome(&outcome)
}

/// Build the input image for a pattern
pub fn synthesize(pattern: Pattern, width: u32, height: u32, color: [u8; 4]) -> ImageBuffer {
    match pattern {
        Pattern::Solid => ImageBuffer::solid(width, height, color),
        Pattern::Gradient => {
            let span = width.saturating_sub(1).max(1);
            ImageBuffer::from_fn(width, height, |x, _| {
                let t = x as f64 / span as f64;
                let mix = |c: u8| {
                    let from = f64::from(c);
                    let to = 255.0 - from;
                    (from + (to - from) * t).round() as u8
                };
                [mix(color[0]), mix(color[1]), mix(color[2]), color[3]]
            })
        }
        Pattern::Checker => ImageBuffer::from_fn(width, height, |x, y| {
            if (x / 8 + y / 8) % 2 == 0 {
                color
            } else {
                [0, 0, 0, color[3]]
            }
        }),
    }
}
