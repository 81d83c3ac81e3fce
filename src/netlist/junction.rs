//! Breadboard junction semantics.
//!
//! A junction (splitter) component declares every net on its pins to be the
//! same electrical point. Groups are merged across all junctions before any
//! device is emitted, and the allocator resolves each touched net through the
//! resulting alias table. A device wired to a secondary net therefore gets
//! the group's node no matter where it sits relative to the junction.

use std::collections::HashMap;

use tracing::debug;

use super::allocator::NodeAllocator;
use crate::circuit::{net, normalize_net, Circuit, Component, ComponentKind, NodeId};

/// Union-find over net ordinals; the smaller ordinal (seen earlier) is root.
struct DisjointSet {
    parent: Vec<usize>,
}

impl DisjointSet {
    fn new() -> Self {
        Self { parent: Vec::new() }
    }

    fn push(&mut self) -> usize {
        let i = self.parent.len();
        self.parent.push(i);
        i
    }

    fn find(&mut self, i: usize) -> usize {
        let mut root = i;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut cur = i;
        while self.parent[cur] != root {
            let next = self.parent[cur];
            self.parent[cur] = root;
            cur = next;
        }
        root
    }

    fn union(&mut self, i: usize, j: usize) {
        let root_i = self.find(i);
        let root_j = self.find(j);
        if root_i != root_j {
            let (keep, merge) = if root_i < root_j {
                (root_i, root_j)
            } else {
                (root_j, root_i)
            };
            self.parent[merge] = keep;
        }
    }
}

/// Net groups formed by all junction components of a circuit.
#[derive(Debug, Clone, Default)]
pub struct JunctionResolver {
    aliases: HashMap<String, String>,
}

impl JunctionResolver {
    /// Build the merged groups from every junction in component order.
    pub fn from_circuit(circuit: &Circuit) -> Self {
        let mut ordinals: HashMap<String, usize> = HashMap::new();
        let mut names: Vec<String> = Vec::new();
        let mut sets = DisjointSet::new();

        for component in circuit
            .components
            .iter()
            .filter(|c| c.kind == ComponentKind::Junction)
        {
            let nets = junction_nets(component);
            if nets.len() < 2 {
                continue;
            }
            let ids: Vec<usize> = nets
                .into_iter()
                .map(|name| {
                    *ordinals.entry(name.clone()).or_insert_with(|| {
                        names.push(name);
                        sets.push()
                    })
                })
                .collect();
            for &other in &ids[1..] {
                sets.union(ids[0], other);
            }
        }

        let mut aliases = HashMap::new();
        for (i, name) in names.iter().enumerate() {
            let root = sets.find(i);
            if root != i {
                aliases.insert(name.clone(), names[root].clone());
            }
        }
        debug!(aliases = aliases.len(), "junction groups merged");

        Self { aliases }
    }

    /// Member → group primary, for [`NodeAllocator::with_aliases`].
    pub fn aliases(&self) -> HashMap<String, String> {
        self.aliases.clone()
    }

    /// Apply one junction during emission.
    ///
    /// Fewer than two non-ground nets is a no-op. Otherwise the first net is
    /// touched and every other net is recorded at its node.
    pub fn resolve(&self, component: &Component, allocator: &mut NodeAllocator) -> Option<NodeId> {
        let nets = junction_nets(component);
        if nets.len() < 2 {
            return None;
        }
        let node = allocator.touch(&nets[0]);
        for other in &nets[1..] {
            allocator.assign(other, node);
        }
        Some(node)
    }
}

/// Normalized non-ground nets on a junction's pins, first occurrence only.
fn junction_nets(component: &Component) -> Vec<String> {
    let mut nets: Vec<String> = Vec::new();
    for pin in &component.pins {
        let name = normalize_net(&pin.net);
        if name.is_empty() || name == net::GROUND || nets.contains(&name) {
            continue;
        }
        nets.push(name);
    }
    nets
}

#[cfg(test)]
mod tests {
    use super::*;

    fn junction(id: &str, nets: &[&str]) -> Component {
        nets.iter()
            .enumerate()
            .fold(Component::new(id, id, ComponentKind::Junction), |c, (i, n)| {
                c.with_pin((i + 1).to_string(), *n)
            })
    }

    #[test]
    fn test_transitive_groups() {
        let circuit = Circuit::new(vec![junction("J1", &["A", "B"]), junction("J2", &["C", "B"])]);
        let resolver = JunctionResolver::from_circuit(&circuit);
        let aliases = resolver.aliases();
        assert_eq!(aliases.len(), 2);
        assert_eq!(aliases["B"], "A");
        assert_eq!(aliases["C"], "A");
        assert!(!aliases.contains_key("A"));
    }

    #[test]
    fn test_ground_and_single_net_junctions_are_ignored() {
        let circuit = Circuit::new(vec![junction("J1", &["A", "GND"]), junction("J2", &["B", "B", ""])]);
        let resolver = JunctionResolver::from_circuit(&circuit);
        assert!(resolver.aliases().is_empty());

        let mut alloc = NodeAllocator::with_aliases(resolver.aliases());
        assert_eq!(resolver.resolve(&circuit.components[0], &mut alloc), None);
        assert_eq!(resolver.resolve(&circuit.components[1], &mut alloc), None);
        assert!(alloc.finish().is_empty());
    }

    #[test]
    fn test_resolve_records_every_member() {
        let circuit = Circuit::new(vec![junction("J1", &["A", "B", "C"])]);
        let resolver = JunctionResolver::from_circuit(&circuit);
        let mut alloc = NodeAllocator::with_aliases(resolver.aliases());

        let node = resolver.resolve(&circuit.components[0], &mut alloc).unwrap();
        let map = alloc.finish();
        assert_eq!(node, NodeId(1));
        assert_eq!(map.get("A"), Some(node));
        assert_eq!(map.get("B"), Some(node));
        assert_eq!(map.get("C"), Some(node));
        assert_eq!(map.node_ids(), vec![node]);
    }
}
