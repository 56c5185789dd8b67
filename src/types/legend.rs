//! The legend: symbol -> node/link behavior registry.
//!
//! Every map carries a legend. [`Legend::standard`] covers the built-in
//! glyphs; map files and library callers extend or override it per map.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use crate::types::coord::Compass;
use crate::types::link::{
    LinkKind, SmartLink, StaticLink, TeleporterLink,
};
use crate::types::node::{BasicNode, InterruptNode, NodeKind};

/// Symbol -> behavior registry for one map.
#[derive(Debug, Clone, Default)]
pub struct Legend {
    nodes: HashMap<char, Arc<dyn NodeKind>>,
    links: HashMap<char, Arc<dyn LinkKind>>,
    /// Symbols added on top of the standard set (tracked for validation).
    custom: HashSet<char>,
}

impl Legend {
    /// An empty legend; every symbol must be registered explicitly.
    pub fn empty() -> Self {
        Self::default()
    }

    /// The built-in legend:
    ///
    /// ```text
    /// #  room                 I  interrupt room
    /// -  east-west            |  north-south
    /// /  northeast-southwest  \  southeast-northwest
    /// +  crossing             x  diagonal crossing
    /// ^ v > <  one-ways       o  router (knee)
    /// u d  up/down links      b  blocked link
    /// i  interrupt link       t  teleporter
    /// ```
    pub fn standard() -> Self {
        let mut legend = Self::empty();
        legend.insert_node(Arc::new(BasicNode::new('#')));
        legend.insert_node(Arc::new(InterruptNode::new('I')));

        legend.insert_link(Arc::new(StaticLink::two_way('-', Compass::East)));
        legend.insert_link(Arc::new(StaticLink::two_way('|', Compass::North)));
        legend.insert_link(Arc::new(StaticLink::two_way('/', Compass::Northeast)));
        legend.insert_link(Arc::new(StaticLink::two_way('\\', Compass::Southeast)));
        legend.insert_link(Arc::new(StaticLink::crossing(
            '+',
            &[Compass::North, Compass::East],
        )));
        legend.insert_link(Arc::new(StaticLink::crossing(
            'x',
            &[Compass::Northeast, Compass::Southeast],
        )));
        legend.insert_link(Arc::new(StaticLink::one_way('^', Compass::North)));
        legend.insert_link(Arc::new(StaticLink::one_way('v', Compass::South)));
        legend.insert_link(Arc::new(StaticLink::one_way('>', Compass::East)));
        legend.insert_link(Arc::new(StaticLink::one_way('<', Compass::West)));
        legend.insert_link(Arc::new(SmartLink::router('o')));
        legend.insert_link(Arc::new(SmartLink::vertical('u', "u")));
        legend.insert_link(Arc::new(SmartLink::vertical('d', "d")));
        legend.insert_link(Arc::new(SmartLink::blocked('b')));
        legend.insert_link(Arc::new(SmartLink::interrupt('i')));
        legend.insert_link(Arc::new(TeleporterLink::new('t')));
        legend.custom.clear();
        legend
    }

    fn insert_node(&mut self, kind: Arc<dyn NodeKind>) {
        let symbol = kind.symbol();
        self.links.remove(&symbol);
        self.nodes.insert(symbol, kind);
        self.custom.insert(symbol);
    }

    fn insert_link(&mut self, kind: Arc<dyn LinkKind>) {
        let symbol = kind.symbol();
        self.nodes.remove(&symbol);
        self.links.insert(symbol, kind);
        self.custom.insert(symbol);
    }

    /// Register a node behavior, replacing anything under its symbol.
    pub fn with_node(mut self, kind: Arc<dyn NodeKind>) -> Self {
        self.insert_node(kind);
        self
    }

    /// Register a link behavior, replacing anything under its symbol.
    pub fn with_link(mut self, kind: Arc<dyn LinkKind>) -> Self {
        self.insert_link(kind);
        self
    }

    pub fn node_kind(&self, symbol: char) -> Option<&Arc<dyn NodeKind>> {
        self.nodes.get(&symbol)
    }

    pub fn link_kind(&self, symbol: char) -> Option<&Arc<dyn LinkKind>> {
        self.links.get(&symbol)
    }

    pub fn contains(&self, symbol: char) -> bool {
        self.nodes.contains_key(&symbol) || self.links.contains_key(&symbol)
    }

    /// Symbols registered on top of the standard set.
    pub fn custom_symbols(&self) -> impl Iterator<Item = char> + '_ {
        self.custom.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::link::EmptyTarget;

    #[test]
    fn test_standard_legend_covers_builtin_glyphs() {
        let legend = Legend::standard();
        for glyph in ['#', 'I'] {
            assert!(legend.node_kind(glyph).is_some(), "missing node {}", glyph);
        }
        for glyph in [
            '-', '|', '/', '\\', '+', 'x', '^', 'v', '>', '<', 'o', 'u', 'd', 'b', 'i', 't',
        ] {
            assert!(legend.link_kind(glyph).is_some(), "missing link {}", glyph);
        }
        assert_eq!(legend.custom_symbols().count(), 0);
    }

    #[test]
    fn test_override_replaces_across_families() {
        // Re-registering '#' as a link removes the node entry.
        let legend =
            Legend::standard().with_link(Arc::new(StaticLink::two_way('#', Compass::East)));
        assert!(legend.node_kind('#').is_none());
        assert!(legend.link_kind('#').is_some());
        assert!(legend.custom_symbols().any(|c| c == '#'));
    }

    #[test]
    fn test_teleporter_pairs_by_symbol() {
        let legend = Legend::standard();
        let kind = legend.link_kind('t').unwrap();
        assert_eq!(kind.empty_target(), EmptyTarget::Pair);
    }
}
