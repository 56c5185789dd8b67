//! Validation system for map registries.
//!
//! Runs a suite of non-fatal checks against loaded maps and reports
//! warnings. Everything fatal (markers, symbols, topology) already aborted
//! parsing; these checks catch authoring oversights that still produce a
//! working map. Used by `gridway validate`.

mod warning;

pub use warning::{Diagnostic, Severity, ValidationResult};

use std::collections::HashSet;

use crate::map::WorldMap;
use crate::registry::MapRegistry;
use crate::types::node::ExitTarget;

/// Run all validation checks against a registry.
pub fn validate_registry(registry: &MapRegistry) -> ValidationResult {
    let mut result = ValidationResult::new();

    for map in registry.maps() {
        result.merge(check_empty_map(map));
        result.merge(check_isolated_nodes(map));
        result.merge(check_dead_ends(map));
        result.merge(check_unused_glyphs(map));
    }

    result
}

/// Print diagnostics to stderr.
pub fn print_diagnostics(result: &ValidationResult) {
    for d in result.iter() {
        eprintln!("  {}[{}]: {}", d.severity, d.code, d.message);
        if let Some(help) = &d.help {
            eprintln!("    help: {}", help);
        }
    }

    let errors = result.error_count();
    let warnings = result.warning_count();

    if errors > 0 {
        eprintln!(
            "Validation failed: {} error(s), {} warning(s)",
            errors, warnings
        );
    } else if warnings > 0 {
        eprintln!("Validation passed ({} warning(s))", warnings);
    } else {
        eprintln!("Validation passed.");
    }
}

fn check_empty_map(map: &WorldMap) -> ValidationResult {
    let mut result = ValidationResult::new();
    if map.node_count() == 0 {
        result.push(
            Diagnostic::warning(
                "gridway::validate::empty-map",
                format!("Map '{}' has no nodes", map.name()),
            )
            .with_help("add at least one room to the map text"),
        );
    }
    result
}

/// Local node indices that some exit on the map leads into.
fn inbound_targets(map: &WorldMap) -> HashSet<usize> {
    map.nodes()
        .iter()
        .flat_map(|node| node.exits())
        .filter_map(|exit| match exit.target {
            ExitTarget::Local(index) => Some(index),
            ExitTarget::Remote { .. } => None,
        })
        .collect()
}

fn check_isolated_nodes(map: &WorldMap) -> ValidationResult {
    let mut result = ValidationResult::new();
    let inbound = inbound_targets(map);

    for node in map.nodes() {
        if node.exits().count() == 0 && !inbound.contains(&node.index()) {
            result.push(
                Diagnostic::warning(
                    "gridway::validate::isolated-node",
                    format!(
                        "Map '{}': node at {} has no connections",
                        map.name(),
                        node.world()
                    ),
                )
                .with_help("link the room into the map or remove it"),
            );
        }
    }
    result
}

fn check_dead_ends(map: &WorldMap) -> ValidationResult {
    let mut result = ValidationResult::new();
    let inbound = inbound_targets(map);

    for node in map.nodes() {
        let has_outbound = node.exits().any(|exit| exit.is_passable());
        if !has_outbound && inbound.contains(&node.index()) {
            result.push(Diagnostic::warning(
                "gridway::validate::one-way-dead-end",
                format!(
                    "Map '{}': node at {} can be entered but never left",
                    map.name(),
                    node.world()
                ),
            ));
        }
    }
    result
}

fn check_unused_glyphs(map: &WorldMap) -> ValidationResult {
    let mut result = ValidationResult::new();

    let used: HashSet<char> = map
        .nodes()
        .iter()
        .map(|node| node.symbol())
        .chain(map.links().map(|link| link.symbol()))
        .collect();

    for glyph in map.legend().custom_symbols() {
        if !used.contains(&glyph) {
            result.push(Diagnostic::warning(
                "gridway::validate::unused-glyph",
                format!(
                    "Map '{}': legend glyph '{}' is never used by the map text",
                    map.name(),
                    glyph
                ),
            ));
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::map::MapConfig;
    use crate::registry::MapRegistry;
    use crate::types::Legend;
    use crate::types::StaticLink;
    use std::sync::Arc;

    fn registry_of(configs: Vec<MapConfig>) -> MapRegistry {
        MapRegistry::load(configs).unwrap()
    }

    #[test]
    fn test_clean_map_has_no_diagnostics() {
        let registry = registry_of(vec![MapConfig::new("town", "+ 0 1\n\n0 #-#\n+ 0 1")]);
        let result = validate_registry(&registry);
        assert!(result.is_ok());
    }

    #[test]
    fn test_empty_map_warns() {
        let registry = registry_of(vec![MapConfig::new("void", "+ 0\n\n+ 0")]);
        let result = validate_registry(&registry);
        assert!(result.has_warnings());
    }

    #[test]
    fn test_isolated_node_warns() {
        let registry = registry_of(vec![MapConfig::new("gap", "+ 0 1 2\n\n0 #-# #\n+ 0 1 2")]);
        let result = validate_registry(&registry);

        assert_eq!(result.warning_count(), 1);
        let diagnostic = result.iter().next().unwrap();
        assert_eq!(diagnostic.code, "gridway::validate::isolated-node");
    }

    #[test]
    fn test_one_way_dead_end_warns() {
        let registry = registry_of(vec![MapConfig::new("trap", "+ 0 1\n\n0 #>#\n+ 0 1")]);
        let result = validate_registry(&registry);

        assert!(result
            .iter()
            .any(|d| d.code == "gridway::validate::one-way-dead-end"));
    }

    #[test]
    fn test_unused_custom_glyph_warns() {
        let legend = Legend::standard()
            .with_link(Arc::new(StaticLink::two_way('=', crate::types::Compass::East)));
        let registry = registry_of(vec![
            MapConfig::new("town", "+ 0 1\n\n0 #-#\n+ 0 1").with_legend(legend)
        ]);
        let result = validate_registry(&registry);

        assert!(result
            .iter()
            .any(|d| d.code == "gridway::validate::unused-glyph"));
    }
}
