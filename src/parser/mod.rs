//! Parser modules for gridway map definition files.
//!
//! This module provides infrastructure for parsing markdown-style map
//! definition files. Each file can contain one or more map documents.
//!
//! # Document Structure
//!
//! Each document has:
//! - YAML frontmatter between `---` markers (must include `name:`)
//! - The ASCII map text inside a ```map code fence
//! - Optional legend section with glyph -> behavior mappings
//!
//! # Usage
//!
//! ```ignore
//! use gridway::parser::parse_map_file;
//!
//! let source = std::fs::read_to_string("maps/overworld.map.md")?;
//! let configs = parse_map_file(&source)?;
//! ```

mod body;
mod document;
mod frontmatter;
pub mod grid;
pub mod legend;
pub mod map;
pub mod span;
pub mod types;

// Re-export main entry points
pub use document::parse_documents;
pub use grid::{parse_grid, ParsedGrid, CORNER_MARKER};
pub use legend::{apply_overrides, behavior_for, KindRef};
pub use map::parse_map_file;
pub use span::{Location, Span, Spanned};
pub use types::RawDocument;
