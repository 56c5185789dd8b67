//! Common types for parsed documents.

use std::collections::HashMap;

use crate::error::{GridwayError, Result};
use crate::types::WorldCoord;

use super::span::{Span, Spanned};

/// A raw parsed document before map construction.
///
/// This is the common structure of a map definition file:
/// - YAML frontmatter with metadata (`name:` required, `rooms:` optional)
/// - The map text inside a ```map block
/// - Optional legend section (glyph -> behavior mappings)
#[derive(Debug, Clone)]
pub struct RawDocument {
    /// The document name (required, from frontmatter)
    pub name: Spanned<String>,

    /// All frontmatter key-value pairs
    pub frontmatter: HashMap<String, serde_yaml::Value>,

    /// Map text (inside ```map block), if present
    pub body: Option<Spanned<String>>,

    /// Legend mappings (glyph -> behavior spec), if present
    pub legend: Option<HashMap<char, String>>,

    /// Span covering the entire document
    pub span: Span,
}

impl RawDocument {
    /// Get a frontmatter value by key.
    pub fn get_frontmatter(&self, key: &str) -> Option<&serde_yaml::Value> {
        self.frontmatter.get(key)
    }

    /// Get a frontmatter string value by key.
    pub fn get_frontmatter_str(&self, key: &str) -> Option<&str> {
        self.frontmatter.get(key).and_then(|v| v.as_str())
    }

    /// Parse the optional `rooms:` table (world coordinate -> prototype
    /// name) used for the prototype/grid bijection check.
    ///
    /// ```yaml
    /// rooms:
    ///   0,0: town-square
    ///   1,0: market
    /// ```
    pub fn get_rooms(&self) -> Result<Option<HashMap<WorldCoord, String>>> {
        let Some(value) = self.frontmatter.get("rooms") else {
            return Ok(None);
        };
        let serde_yaml::Value::Mapping(mapping) = value else {
            return Err(GridwayError::Parse {
                message: format!("Map '{}': rooms must be a mapping", self.name.value),
                help: Some("Use `X,Y: prototype-name` entries".to_string()),
            });
        };

        let mut rooms = HashMap::new();
        for (key, val) in mapping {
            let key_str = yaml_key_string(key).ok_or_else(|| GridwayError::Parse {
                message: format!("Map '{}': invalid rooms key", self.name.value),
                help: None,
            })?;
            let coord: WorldCoord = key_str.parse().map_err(|e| GridwayError::Parse {
                message: format!("Map '{}': bad rooms coordinate: {}", self.name.value, e),
                help: None,
            })?;
            let proto = val.as_str().ok_or_else(|| GridwayError::Parse {
                message: format!(
                    "Map '{}': rooms entry {} must name a prototype",
                    self.name.value, key_str
                ),
                help: None,
            })?;
            rooms.insert(coord, proto.to_string());
        }
        Ok(Some(rooms))
    }
}

/// Render a YAML mapping key as a string ("0,0" parses as a string, but a
/// bare `0` parses as a number).
fn yaml_key_string(key: &serde_yaml::Value) -> Option<String> {
    match key {
        serde_yaml::Value::String(s) => Some(s.clone()),
        serde_yaml::Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::span::Location;

    fn dummy_span() -> Span {
        Span::new(Location::new(0, 1, 1), Location::new(0, 1, 1))
    }

    fn doc_with_frontmatter(yaml: &str) -> RawDocument {
        let value: serde_yaml::Value = serde_yaml::from_str(yaml).unwrap();
        let serde_yaml::Value::Mapping(map) = value else {
            panic!("test frontmatter must be a mapping");
        };
        let frontmatter = map
            .into_iter()
            .filter_map(|(k, v)| k.as_str().map(|s| (s.to_string(), v)))
            .collect();
        RawDocument {
            name: Spanned::new("test".to_string(), dummy_span()),
            frontmatter,
            body: None,
            legend: None,
            span: dummy_span(),
        }
    }

    #[test]
    fn test_get_rooms_parses_coordinates() {
        let doc = doc_with_frontmatter("rooms:\n  0,0: town-square\n  1,2: market\n");

        let rooms = doc.get_rooms().unwrap().unwrap();
        assert_eq!(
            rooms.get(&WorldCoord::new(0, 0)).map(String::as_str),
            Some("town-square")
        );
        assert_eq!(
            rooms.get(&WorldCoord::new(1, 2)).map(String::as_str),
            Some("market")
        );
    }

    #[test]
    fn test_get_rooms_absent() {
        let doc = doc_with_frontmatter("name: test\n");
        assert!(doc.get_rooms().unwrap().is_none());
    }

    #[test]
    fn test_get_rooms_rejects_bad_coordinate() {
        let doc = doc_with_frontmatter("rooms:\n  nowhere: town-square\n");
        assert!(doc.get_rooms().is_err());
    }
}
