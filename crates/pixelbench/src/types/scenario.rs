//! Benchmark scenarios and the implementations under test

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// Image-processing workload being benchmarked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Scenario {
    Invert,
    EdgeDetect,
    Quantize,
}

impl Scenario {
    /// Stable key used for storage and the command line
    pub const fn key(&self) -> &'static str {
        match self {
            Self::Invert => "invert",
            Self::EdgeDetect => "edge-detect",
            Self::Quantize => "quantize",
        }
    }

    pub const fn all() -> [Self; 3] {
        [Self::Invert, Self::EdgeDetect, Self::Quantize]
    }
}

impl fmt::Display for Scenario {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for Scenario {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "invert" => Ok(Self::Invert),
            "edge-detect" | "edge" | "sobel" => Ok(Self::EdgeDetect),
            "quantize" | "kmeans" => Ok(Self::Quantize),
            other => Err(Error::InvalidParams(format!("unknown scenario: {}", other))),
        }
    }
}

/// One of the two implementations compared by every scenario
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Implementation {
    /// Reference implementation evaluated directly over f64 values
    Interpreted,
    /// Optimized implementation lowered to integer kernels and lookup tables
    Compiled,
}

impl Implementation {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Interpreted => "interpreted",
            Self::Compiled => "compiled",
        }
    }

    /// Order in which a comparison measures the implementations
    pub const fn all() -> [Self; 2] {
        [Self::Interpreted, Self::Compiled]
    }

    pub const fn other(&self) -> Self {
        match self {
            Self::Interpreted => Self::Compiled,
            Self::Compiled => Self::Interpreted,
        }
    }
}

impl fmt::Display for Implementation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Parameters forwarded to every processing routine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessParams {
    /// Palette size for color quantization
    pub quantize_colors: usize,
}

impl Default for ProcessParams {
    fn default() -> Self {
        Self { quantize_colors: 8 }
    }
}
