//! Map file parser.
//!
//! Parses `.map.md` files into [`MapConfig`] instances ready for
//! construction. Each document in a file becomes a separate map.

use crate::error::{GridwayError, Result};
use crate::map::MapConfig;
use crate::types::Legend;

use super::legend::apply_overrides;
use super::parse_documents;
use super::types::RawDocument;

/// Parse a map file into one or more map configurations.
pub fn parse_map_file(source: &str) -> Result<Vec<MapConfig>> {
    let documents = parse_documents(source)?;

    documents.into_iter().map(config_from_document).collect()
}

/// Convert a parsed document into a map configuration.
fn config_from_document(doc: RawDocument) -> Result<MapConfig> {
    let name = doc.name.value.clone();

    let Some(body) = &doc.body else {
        return Err(GridwayError::Parse {
            message: format!("Map '{}' has no map block", name),
            help: Some("Add the map text inside a ```map code fence".to_string()),
        });
    };

    let legend = match &doc.legend {
        Some(entries) => apply_overrides(Legend::standard(), entries)?,
        None => Legend::standard(),
    };

    let rooms = doc.get_rooms()?;

    let mut config = MapConfig::new(name, body.value.clone()).with_legend(legend);
    if let Some(rooms) = rooms {
        config = config.with_rooms(rooms);
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_simple_map_file() {
        let source = r#"---
name: courtyard
---

```map
+ 0 1

0 #-#
+ 0 1
```
"#;

        let configs = parse_map_file(source).unwrap();
        assert_eq!(configs.len(), 1);
        assert_eq!(configs[0].name, "courtyard");
        assert!(configs[0].text.contains("#-#"));
    }

    #[test]
    fn test_parse_map_file_with_legend_overrides() {
        let source = r#"---
name: gated
---

```map
+ 0 1

0 #=#
+ 0 1
```

---
=: blocked
"#;

        let configs = parse_map_file(source).unwrap();
        assert!(configs[0].legend.link_kind('=').is_some());
    }

    #[test]
    fn test_parse_map_file_requires_body() {
        let source = "---\nname: empty\n---\n";

        let result = parse_map_file(source);
        assert!(result.is_err());
    }

    #[test]
    fn test_parse_map_file_with_rooms() {
        let source = r#"---
name: town
rooms:
  0,0: town-square
---

```map
+ 0

0 #
+ 0
```
"#;

        let configs = parse_map_file(source).unwrap();
        let rooms = configs[0].rooms.as_ref().unwrap();
        assert_eq!(rooms.len(), 1);
    }
}
