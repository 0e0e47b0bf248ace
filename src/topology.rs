//! Connectivity graph of a barrier configuration.

use std::collections::HashMap;

use petgraph::algo::connected_components;
use petgraph::graph::{NodeIndex, UnGraph};

use crate::barrier::BarrierConfig;

/// Kind of structural element at a graph node.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ElementKind {
    /// A support post.
    Support,
    /// A ground anchor.
    Anchor,
}

/// Node weight: an element identifier and its kind.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Element {
    /// Support or anchor identifier.
    pub id: String,
    /// Whether the element is a support or an anchor.
    pub kind: ElementKind,
}

/// Undirected graph with one node per support and anchor and one edge per
/// cable whose endpoints both exist.
#[derive(Debug)]
pub struct Topology {
    /// Underlying graph storage; edge weights are cable identifiers.
    graph: UnGraph<Element, String>,
    /// Lookup from element identifier to node.
    index: HashMap<String, NodeIndex>,
    /// Cables referencing an element that is not part of the configuration.
    dangling: Vec<String>,
}

impl Topology {
    /// Build the graph of `config`.
    ///
    /// # Examples
    /// ```
    /// use rockfall_barrier::{build, BarrierParameters, Topology};
    ///
    /// let config = build(&BarrierParameters::default()).expect("default parameters build");
    /// let topology = Topology::of(&config);
    /// assert_eq!(topology.element_count(), 15);
    /// assert_eq!(topology.cable_count(), 15);
    /// assert!(topology.is_connected());
    /// ```
    #[must_use]
    pub fn of(config: &BarrierConfig) -> Self {
        let mut graph = UnGraph::new_undirected();
        let mut index = HashMap::new();
        let elements = config
            .supports
            .keys()
            .map(|id| (id, ElementKind::Support))
            .chain(config.anchors.keys().map(|id| (id, ElementKind::Anchor)));
        for (id, kind) in elements {
            let node = graph.add_node(Element {
                id: id.clone(),
                kind,
            });
            index.insert(id.clone(), node);
        }

        let mut dangling = Vec::new();
        for (id, cable) in &config.cables {
            match (index.get(&cable.start), index.get(&cable.end)) {
                (Some(start), Some(end)) => {
                    graph.add_edge(*start, *end, id.clone());
                }
                _ => {
                    log::warn!("cable {id} has an unresolved endpoint");
                    dangling.push(id.clone());
                }
            }
        }

        Self {
            graph,
            index,
            dangling,
        }
    }

    /// Number of supports and anchors.
    #[must_use]
    pub fn element_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Number of cables with both endpoints resolved.
    #[must_use]
    pub fn cable_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Cables referencing a missing support or anchor.
    #[must_use]
    pub fn dangling_cables(&self) -> &[String] {
        &self.dangling
    }

    /// Kind of the element `id`, if present.
    #[must_use]
    pub fn element_kind(&self, id: &str) -> Option<ElementKind> {
        self.index.get(id).map(|node| self.graph[*node].kind)
    }

    /// Identifiers of the cables attached to element `id`, sorted.
    #[must_use]
    pub fn cables_at(&self, id: &str) -> Vec<&str> {
        let Some(node) = self.index.get(id) else {
            return Vec::new();
        };
        let mut cables: Vec<&str> = self
            .graph
            .edges(*node)
            .map(|edge| edge.weight().as_str())
            .collect();
        cables.sort_unstable();
        cables
    }

    /// Return `true` when every element is reachable from every other.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        connected_components(&self.graph) <= 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::build;
    use crate::params::BarrierParameters;

    #[test]
    fn end_support_carries_retention_and_end_cables() {
        let config = build(&BarrierParameters::default()).expect("valid parameters");
        let topology = Topology::of(&config);
        assert_eq!(
            topology.cables_at("s1"),
            vec!["fa1", "rhs1", "rhs5", "sa_s1", "tso_s1", "tsu_s1"]
        );
        assert_eq!(topology.cables_at("s2"), vec!["fa1", "fa2", "rhs2", "rhs6"]);
        assert_eq!(topology.cables_at("v2"), vec!["rhs2", "rhs5"]);
        assert_eq!(topology.element_kind("tso1"), Some(ElementKind::Anchor));
        assert_eq!(topology.element_kind("s3"), Some(ElementKind::Support));
        assert!(topology.cables_at("missing").is_empty());
    }

    #[test]
    fn missing_elements_leave_dangling_cables() {
        let mut config = build(&BarrierParameters::default()).expect("valid parameters");
        config.anchors.remove("sa2");
        let topology = Topology::of(&config);
        assert_eq!(topology.dangling_cables(), ["sa_s4".to_owned()]);
        assert_eq!(topology.cable_count(), 14);
        assert!(topology.is_connected());

        config.cables.clear();
        assert!(!Topology::of(&config).is_connected());
    }
}
