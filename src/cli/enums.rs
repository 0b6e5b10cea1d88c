//! CLI enum types for aspect ratio and resolution options.

use clap::ValueEnum;

use crate::generation::{AspectRatio, Resolution};

/// Output aspect ratio.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum AspectRatioArg {
    #[default]
    #[value(name = "16:9")]
    Landscape,
    #[value(name = "9:16")]
    Portrait,
}

impl From<AspectRatioArg> for AspectRatio {
    fn from(a: AspectRatioArg) -> Self {
        match a {
            AspectRatioArg::Landscape => AspectRatio::Landscape,
            AspectRatioArg::Portrait => AspectRatio::Portrait,
        }
    }
}

/// Output resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ResolutionArg {
    #[default]
    #[value(name = "720p")]
    Hd720p,
    #[value(name = "1080p")]
    FullHd1080p,
}

impl From<ResolutionArg> for Resolution {
    fn from(r: ResolutionArg) -> Self {
        match r {
            ResolutionArg::Hd720p => Resolution::Hd720p,
            ResolutionArg::FullHd1080p => Resolution::FullHd1080p,
        }
    }
}
