//! View command implementation.
//!
//! Renders a bounded view of a map around a world coordinate.

use std::path::PathBuf;

use clap::{Args, ValueEnum};

use crate::error::{GridwayError, Result};
use crate::render::{RangeMode, ViewOptions};
use crate::types::WorldCoord;

/// Render a bounded view around a world coordinate
#[derive(Args, Debug)]
pub struct ViewArgs {
    /// Map file to render
    pub file: PathBuf,

    /// Center world coordinate (X,Y)
    pub center: WorldCoord,

    /// Range in grid steps (scan) or node hops (nodes)
    #[arg(long, short, default_value_t = 2)]
    pub distance: u32,

    /// Distance semantics
    #[arg(long, value_enum, default_value = "scan")]
    pub mode: ModeArg,

    /// Character marking the center
    #[arg(long, default_value_t = '@')]
    pub marker: char,

    /// Overlay the shortest path toward this coordinate (X,Y)
    #[arg(long)]
    pub target: Option<WorldCoord>,

    /// Crop the output to WxH characters centered on the view center
    #[arg(long)]
    pub max_size: Option<String>,

    /// Map name, when the file contains more than one
    #[arg(long)]
    pub map: Option<String>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeArg {
    Scan,
    Nodes,
}

impl From<ModeArg> for RangeMode {
    fn from(mode: ModeArg) -> RangeMode {
        match mode {
            ModeArg::Scan => RangeMode::Scan,
            ModeArg::Nodes => RangeMode::Nodes,
        }
    }
}

pub fn run(args: ViewArgs) -> Result<()> {
    let registry = super::load_registry(&args.file)?;
    let map = super::select_map(&registry, args.map.as_deref(), &args.file)?;

    let options = ViewOptions {
        distance: args.distance,
        mode: args.mode.into(),
        marker: Some(args.marker),
        target: args.target,
        target_style: None,
        max_size: args.max_size.as_deref().map(parse_size).transpose()?,
    };

    println!("{}", map.get_visual_range_string(args.center, &options));
    Ok(())
}

/// Parse a `WxH` size argument.
fn parse_size(s: &str) -> Result<(usize, usize)> {
    let parsed = s.split_once('x').and_then(|(w, h)| {
        let w = w.trim().parse::<usize>().ok()?;
        let h = h.trim().parse::<usize>().ok()?;
        Some((w, h))
    });
    parsed.ok_or_else(|| GridwayError::Build {
        message: format!("Invalid --max-size '{}'", s),
        help: Some("use WxH, e.g. 21x11".to_string()),
    })
}
