//! Legend section parsing.
//!
//! The trailing legend section maps map glyphs to behavior names, extending
//! or overriding the standard legend per document:
//!
//! ```text
//! ---
//! R: room
//! %: blocked
//! T: transition underdark
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{GridwayError, Result};
use crate::types::coord::Compass;
use crate::types::link::{LinkKind, SmartLink, StaticLink, TeleporterLink, TransitionLink};
use crate::types::node::{BasicNode, InterruptNode, NodeKind};
use crate::types::Legend;

use super::span::Span;

/// Result of extracting a legend section.
#[derive(Debug)]
pub struct LegendResult {
    /// Parsed legend mappings (glyph -> behavior spec)
    pub entries: HashMap<char, String>,
    /// Span of the legend section
    pub span: Span,
}

/// Extract the legend section following the map block.
///
/// The legend starts with `---` and contains glyph mappings. It ends at EOF
/// or the next `---` that starts a new document (has `name:`).
pub fn extract_legend(source: &str, base_offset: usize) -> Result<Option<LegendResult>> {
    let trimmed = source.trim_start();
    let leading_whitespace = source.len() - trimmed.len();

    // Legend must start with ---
    if !trimmed.starts_with("---") {
        return Ok(None);
    }

    // Skip the --- line
    let after_delimiter = &trimmed[3..];
    let first_newline = after_delimiter.find('\n').unwrap_or(after_delimiter.len());
    let legend_start = 3 + first_newline + 1;

    if legend_start > trimmed.len() {
        return Ok(None);
    }

    // Find where legend ends (next --- with name: or EOF)
    let legend_section = &trimmed[legend_start..];
    let legend_end = find_legend_end(legend_section);
    let legend_content = &legend_section[..legend_end];

    if legend_content.trim().is_empty() {
        return Ok(None);
    }

    let mut entries = HashMap::new();
    for line in legend_content.lines() {
        let line_trimmed = line.trim();
        if !line_trimmed.is_empty() && line_trimmed.contains(':') {
            let (glyph, value) = parse_legend_line(line_trimmed)?;
            entries.insert(glyph, value);
        }
    }

    let span = Span::from_local_offsets(
        source,
        leading_whitespace,
        leading_whitespace + legend_start + legend_end,
        base_offset,
    );

    Ok(Some(LegendResult { entries, span }))
}

/// Find where the legend section ends.
///
/// Legend ends at:
/// - A line starting with `---` followed by a line containing `name:`
/// - End of string
fn find_legend_end(s: &str) -> usize {
    let lines: Vec<&str> = s.lines().collect();

    for (i, line) in lines.iter().enumerate() {
        if line.trim() == "---" {
            // Check if next line has name: (new document)
            if let Some(next_line) = lines.get(i + 1) {
                if next_line.trim().starts_with("name:") {
                    return lines[..i].iter().map(|l| l.len() + 1).sum();
                }
            }
        }
    }

    s.len()
}

/// Parse a single legend line into (glyph, behavior spec).
fn parse_legend_line(line: &str) -> Result<(char, String)> {
    // Handle quoted glyphs: "x": value or 'x': value
    let (glyph, rest) = if line.starts_with('"') || line.starts_with('\'') {
        let quote = line.chars().next().unwrap_or('"');
        let end_quote = line[1..].find(quote).ok_or_else(|| GridwayError::Parse {
            message: format!("Unclosed quote in legend: {}", line),
            help: None,
        })?;
        let glyph_str = &line[1..=end_quote];
        let mut chars = glyph_str.chars();
        let (Some(glyph), None) = (chars.next(), chars.next()) else {
            return Err(GridwayError::Parse {
                message: format!("Legend glyph must be a single character: {}", glyph_str),
                help: None,
            });
        };
        let rest = line[end_quote + 2..].trim_start();
        let rest = rest.strip_prefix(':').unwrap_or(rest).trim();
        (glyph, rest)
    } else {
        // Unquoted: x: value
        let colon_pos = line.find(':').ok_or_else(|| GridwayError::Parse {
            message: format!("Legend line must contain ':': {}", line),
            help: None,
        })?;
        let glyph_str = line[..colon_pos].trim();
        let mut chars = glyph_str.chars();
        let (Some(glyph), None) = (chars.next(), chars.next()) else {
            return Err(GridwayError::Parse {
                message: format!("Legend glyph must be a single character: {}", glyph_str),
                help: Some("Use quotes for special characters: \":\": crossing".to_string()),
            });
        };
        let rest = line[colon_pos + 1..].trim();
        (glyph, rest)
    };

    if rest.is_empty() || rest.starts_with('{') {
        return Err(GridwayError::Parse {
            message: format!("Legend entry '{}' must name a behavior", glyph),
            help: Some("Use `G: behavior` format, e.g. `T: transition underdark`".to_string()),
        });
    }

    Ok((glyph, rest.to_string()))
}

/// A behavior looked up by name, ready to register in a [`Legend`].
#[derive(Debug, Clone)]
pub enum KindRef {
    Node(Arc<dyn NodeKind>),
    Link(Arc<dyn LinkKind>),
}

/// Resolve a behavior spec (`"room"`, `"one-way-e"`, `"transition foo"`)
/// for a glyph.
pub fn behavior_for(glyph: char, spec: &str) -> Result<KindRef> {
    let mut parts = spec.split_whitespace();
    let name = parts.next().unwrap_or("");
    let arg = parts.next();

    if parts.next().is_some() {
        return Err(GridwayError::Parse {
            message: format!("Legend entry '{}': too many arguments in '{}'", glyph, spec),
            help: None,
        });
    }

    let node = |kind: Arc<dyn NodeKind>| Ok(KindRef::Node(kind));
    let link = |kind: Arc<dyn LinkKind>| Ok(KindRef::Link(kind));

    match (name, arg) {
        ("room", None) => node(Arc::new(BasicNode::new(glyph))),
        ("interrupt-room", None) => node(Arc::new(InterruptNode::new(glyph))),
        ("ew", None) => link(Arc::new(StaticLink::two_way(glyph, Compass::East))),
        ("ns", None) => link(Arc::new(StaticLink::two_way(glyph, Compass::North))),
        ("nesw", None) => link(Arc::new(StaticLink::two_way(glyph, Compass::Northeast))),
        ("senw", None) => link(Arc::new(StaticLink::two_way(glyph, Compass::Southeast))),
        ("crossing", None) => link(Arc::new(StaticLink::crossing(
            glyph,
            &[Compass::North, Compass::East],
        ))),
        ("diagonal-crossing", None) => link(Arc::new(StaticLink::crossing(
            glyph,
            &[Compass::Northeast, Compass::Southeast],
        ))),
        ("one-way-n", None) => link(Arc::new(StaticLink::one_way(glyph, Compass::North))),
        ("one-way-s", None) => link(Arc::new(StaticLink::one_way(glyph, Compass::South))),
        ("one-way-e", None) => link(Arc::new(StaticLink::one_way(glyph, Compass::East))),
        ("one-way-w", None) => link(Arc::new(StaticLink::one_way(glyph, Compass::West))),
        ("router", None) => link(Arc::new(SmartLink::router(glyph))),
        ("up", None) => link(Arc::new(SmartLink::vertical(glyph, "u"))),
        ("down", None) => link(Arc::new(SmartLink::vertical(glyph, "d"))),
        ("blocked", None) => link(Arc::new(SmartLink::blocked(glyph))),
        ("interrupt", None) => link(Arc::new(SmartLink::interrupt(glyph))),
        ("teleporter", None) => link(Arc::new(TeleporterLink::new(glyph))),
        ("transition", Some(map)) => link(Arc::new(TransitionLink::new(glyph, map))),
        ("transition", None) => Err(GridwayError::Parse {
            message: format!("Legend entry '{}': transition needs a target map", glyph),
            help: Some("Use `T: transition <map-name>`".to_string()),
        }),
        _ => Err(GridwayError::Parse {
            message: format!("Legend entry '{}': unknown behavior '{}'", glyph, spec),
            help: Some(
                "Known behaviors: room, interrupt-room, ew, ns, nesw, senw, crossing, \
                 diagonal-crossing, one-way-n/s/e/w, router, up, down, blocked, interrupt, \
                 teleporter, transition <map>"
                    .to_string(),
            ),
        }),
    }
}

/// Apply legend-section overrides on top of a base legend.
pub fn apply_overrides(base: Legend, entries: &HashMap<char, String>) -> Result<Legend> {
    let mut legend = base;
    for (&glyph, spec) in entries {
        legend = match behavior_for(glyph, spec)? {
            KindRef::Node(kind) => legend.with_node(kind),
            KindRef::Link(kind) => legend.with_link(kind),
        };
    }
    Ok(legend)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_simple_legend() {
        let source = "---\nR: room\n%: blocked\n";

        let result = extract_legend(source, 0).unwrap().unwrap();

        assert_eq!(result.entries.len(), 2);
        assert_eq!(result.entries.get(&'R').map(String::as_str), Some("room"));
        assert_eq!(
            result.entries.get(&'%').map(String::as_str),
            Some("blocked")
        );
    }

    #[test]
    fn test_extract_legend_with_quoted_glyph() {
        let source = "---\n\"=\": ew\n";

        let result = extract_legend(source, 0).unwrap().unwrap();

        assert_eq!(result.entries.get(&'=').map(String::as_str), Some("ew"));
    }

    #[test]
    fn test_legend_ends_at_new_document() {
        let source = "---\nR: room\n\n---\nname: next-map\n";

        let result = extract_legend(source, 0).unwrap().unwrap();

        assert_eq!(result.entries.len(), 1);
    }

    #[test]
    fn test_no_legend() {
        let source = "just some text without delimiter";

        let result = extract_legend(source, 0).unwrap();

        assert!(result.is_none());
    }

    #[test]
    fn test_legend_rejects_complex_entries() {
        let result = parse_legend_line("~: { fill: checker }");
        assert!(result.is_err());
    }

    #[test]
    fn test_behavior_lookup() {
        assert!(matches!(
            behavior_for('R', "room").unwrap(),
            KindRef::Node(_)
        ));
        assert!(matches!(
            behavior_for('=', "ew").unwrap(),
            KindRef::Link(_)
        ));
        assert!(matches!(
            behavior_for('T', "transition underdark").unwrap(),
            KindRef::Link(_)
        ));
    }

    #[test]
    fn test_behavior_unknown_name() {
        let err = behavior_for('Z', "warp-gate");
        assert!(err.is_err());
    }

    #[test]
    fn test_transition_requires_target() {
        let err = behavior_for('T', "transition");
        assert!(err.is_err());
    }

    #[test]
    fn test_apply_overrides_extends_standard() {
        let mut entries = HashMap::new();
        entries.insert('R', "interrupt-room".to_string());
        let legend = apply_overrides(Legend::standard(), &entries).unwrap();

        assert!(legend.node_kind('R').is_some());
        assert!(legend.node_kind('#').is_some());
    }
}
