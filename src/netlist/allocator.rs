//! Lazy node allocation.
//!
//! Node indices are handed out only when an emitted device touches a net, in
//! touch order. The numbering is therefore a function of which devices were
//! emitted and in which order their pins were visited, and nothing else.

use std::collections::{BTreeMap, HashMap};

use serde::{Serialize, Serializer};

use crate::circuit::{net, normalize_net, NodeId};

/// Canonical net name → node index, produced by one compilation.
///
/// `"0"` always maps to [`NodeId::GROUND`]. Several names may share an index
/// when a junction merges them; the first name allocated at an index is its
/// primary name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeMap {
    entries: BTreeMap<String, NodeId>,
    primary: BTreeMap<NodeId, String>,
}

impl NodeMap {
    /// A map holding only ground.
    pub fn new() -> Self {
        let mut entries = BTreeMap::new();
        let mut primary = BTreeMap::new();
        entries.insert(net::GROUND.to_string(), NodeId::GROUND);
        primary.insert(NodeId::GROUND, net::GROUND.to_string());
        Self { entries, primary }
    }

    /// Look up a net by any spelling.
    pub fn get(&self, raw_net: &str) -> Option<NodeId> {
        self.entries.get(&normalize_net(raw_net)).copied()
    }

    /// Number of net names, ground included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when only ground is present.
    pub fn is_empty(&self) -> bool {
        self.entries.len() <= 1
    }

    /// All (net name, node) entries, ordered by name.
    pub fn iter(&self) -> impl Iterator<Item = (&str, NodeId)> + '_ {
        self.entries.iter().map(|(name, id)| (name.as_str(), *id))
    }

    /// Non-ground node indices in ascending order, each once.
    pub fn node_ids(&self) -> Vec<NodeId> {
        self.primary
            .keys()
            .copied()
            .filter(|id| !id.is_ground())
            .collect()
    }

    /// Every net name at `node`, ordered by name.
    pub fn nets_at(&self, node: NodeId) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(_, id)| **id == node)
            .map(|(name, _)| name.as_str())
            .collect()
    }

    fn max_node(&self) -> Option<NodeId> {
        self.entries.values().copied().filter(|id| !id.is_ground()).max()
    }

    /// Set `name` to `node`, keeping the primary name table consistent.
    fn insert(&mut self, name: String, node: NodeId) {
        if let Some(old) = self.entries.insert(name.clone(), node) {
            if old != node && self.primary.get(&old) == Some(&name) {
                // The old index loses its primary; promote another name if one is left.
                let next = self
                    .entries
                    .iter()
                    .find(|(_, id)| **id == old)
                    .map(|(n, _)| n.clone());
                match next {
                    Some(n) => {
                        self.primary.insert(old, n);
                    }
                    None => {
                        self.primary.remove(&old);
                    }
                }
            }
        }
        self.primary.entry(node).or_insert(name);
    }
}

impl Default for NodeMap {
    fn default() -> Self {
        Self::new()
    }
}

impl Serialize for NodeMap {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.entries.serialize(serializer)
    }
}

/// Assigns node indices to nets as devices touch them.
///
/// One allocator belongs to one compilation. Nets merged by junctions are
/// resolved through the alias table before allocation, so every member of a
/// merged group receives the group's index.
#[derive(Debug, Clone, Default)]
pub struct NodeAllocator {
    map: NodeMap,
    aliases: HashMap<String, String>,
}

impl NodeAllocator {
    /// An allocator with no junction aliases.
    pub fn new() -> Self {
        Self::default()
    }

    /// An allocator resolving nets through `aliases` (member → group primary).
    pub fn with_aliases(aliases: HashMap<String, String>) -> Self {
        Self {
            map: NodeMap::new(),
            aliases,
        }
    }

    /// Resolve `raw_net` to a node, allocating on first touch.
    ///
    /// Blank and ground nets return ground without allocating.
    pub fn touch(&mut self, raw_net: &str) -> NodeId {
        let name = normalize_net(raw_net);
        if name.is_empty() || name == net::GROUND {
            return NodeId::GROUND;
        }
        if let Some(id) = self.map.entries.get(&name) {
            return *id;
        }

        let canonical = self.aliases.get(&name).cloned().unwrap_or_else(|| name.clone());
        let node = match self.map.entries.get(&canonical).copied() {
            Some(id) => id,
            None => {
                let id = self.next_node();
                self.map.insert(canonical.clone(), id);
                id
            }
        };
        if canonical != name {
            self.map.insert(name, node);
        }
        node
    }

    /// Record `raw_net` at an existing `node`, replacing any earlier entry.
    pub fn assign(&mut self, raw_net: &str, node: NodeId) {
        let name = normalize_net(raw_net);
        if name.is_empty() || name == net::GROUND {
            return;
        }
        self.map.insert(name, node);
    }

    /// Finish allocation and hand out the immutable map.
    pub fn finish(self) -> NodeMap {
        self.map
    }

    fn next_node(&self) -> NodeId {
        match self.map.max_node() {
            Some(NodeId(n)) => NodeId(n + 1),
            None => NodeId(1),
        }
    }
}
