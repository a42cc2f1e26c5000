//! Tree structures backing tables and secondary indexes.
//!
//! Two multiway search trees share the same fill parameters:
//!
//! - [`BalancedTree`] is a classic B-tree; it realizes secondary indexes.
//! - [`OrderedTree`] is a B+tree whose leaves form a doubly linked chain in
//!   ascending key order; it stores table rows and drives sequential scans.
//!
//! Nodes live in a per-tree `Vec` arena and refer to each other by index.
//! Parent and sibling links are plain handles, never owning references; the
//! tree's root index is the only entry point.

mod balanced;
mod ordered;

pub use balanced::BalancedTree;
pub use ordered::{LeafChainIter, OrderedTree};

/// Default minimum degree of both tree kinds.
pub const MIN_DEGREE: usize = 3;

/// A payload bound to its extracted integer key.
///
/// Ordering and equality delegate to the key alone, so tree code compares
/// entries without inspecting the payload.
#[derive(Debug, Clone)]
pub struct Keyed<T> {
    pub key: u32,
    pub data: T,
}

impl<T> Keyed<T> {
    /// Wraps a payload under the given key.
    pub fn new(key: u32, data: T) -> Self {
        Self { key, data }
    }
}

impl<T> PartialEq for Keyed<T> {
    fn eq(&self, other: &Self) -> bool {
        self.key == other.key
    }
}

impl<T> Eq for Keyed<T> {}

impl<T> PartialOrd for Keyed<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for Keyed<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.key.cmp(&other.key)
    }
}
