//! Structural adjacency between parts.
//!
//! Parts that touch by construction (a link and its parent, two children of
//! the same link, a link and a close ancestor) are exempt from
//! self-collision reporting.

use rigcheck_core::config::ValidatorConfig;
use rigcheck_core::types::PartId;

/// Parent lookup over a part hierarchy.
pub trait Hierarchy {
    fn parent(&self, part: PartId) -> Option<PartId>;
}

/// How two parts are related in the hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Relation {
    Same,
    /// One is the direct parent of the other.
    Parent,
    /// Both share the same direct parent.
    Sibling,
    /// One is an ancestor of the other within the adjacency depth.
    Ancestor { distance: usize },
    Unrelated,
}

impl Relation {
    pub const fn is_adjacent(self) -> bool {
        !matches!(self, Self::Unrelated)
    }
}

/// Decides whether two parts are structurally adjacent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdjacencyClassifier {
    depth: usize,
    walk_limit: usize,
}

impl Default for AdjacencyClassifier {
    fn default() -> Self {
        Self::new(2, 10)
    }
}

impl AdjacencyClassifier {
    /// `depth` is the largest ancestor distance still adjacent; `walk_limit`
    /// bounds how far up the chain an ancestor is searched for.
    pub const fn new(depth: usize, walk_limit: usize) -> Self {
        Self { depth, walk_limit }
    }

    pub const fn from_config(config: &ValidatorConfig) -> Self {
        Self::new(config.adjacency_depth, config.ancestor_walk_limit)
    }

    pub fn classify(&self, hierarchy: &impl Hierarchy, a: PartId, b: PartId) -> Relation {
        if a == b {
            return Relation::Same;
        }
        let parent_a = hierarchy.parent(a);
        let parent_b = hierarchy.parent(b);
        if parent_a == Some(b) || parent_b == Some(a) {
            return Relation::Parent;
        }
        if parent_a.is_some() && parent_a == parent_b {
            return Relation::Sibling;
        }
        let distance = self
            .ancestor_distance(hierarchy, a, b)
            .or_else(|| self.ancestor_distance(hierarchy, b, a));
        match distance {
            Some(distance) if distance <= self.depth => Relation::Ancestor { distance },
            _ => Relation::Unrelated,
        }
    }

    pub fn are_adjacent(&self, hierarchy: &impl Hierarchy, a: PartId, b: PartId) -> bool {
        self.classify(hierarchy, a, b).is_adjacent()
    }

    /// Steps from `descendant` up to `ancestor`, searching at most
    /// `walk_limit` levels.
    pub fn ancestor_distance(
        &self,
        hierarchy: &impl Hierarchy,
        descendant: PartId,
        ancestor: PartId,
    ) -> Option<usize> {
        let mut current = descendant;
        for distance in 1..=self.walk_limit {
            current = hierarchy.parent(current)?;
            if current == ancestor {
                return Some(distance);
            }
        }
        None
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
