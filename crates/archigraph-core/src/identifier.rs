//! Identifier types for diagram elements.
//!
//! This module provides:
//! - [`NodeId`] and [`ClusterId`]: Generated, monotonic identifiers scoped to one diagram
//! - [`DiagramId`]: Process-unique identifier distinguishing diagrams from each other
//! - [`IdGenerator`]: The monotonic counter handing out node and cluster ids
//! - [`TypeTag`]: Interned category key of a node (e.g. `"k8s.compute.Pod"`)
//!
//! Generated identifiers are never derived from display labels, so two elements with
//! the same label always receive distinct identities.

use std::{
    fmt,
    sync::{
        Mutex, OnceLock,
        atomic::{AtomicU64, Ordering},
    },
};

use string_interner::{DefaultStringInterner, DefaultSymbol};

/// Global string interner for type tags.
///
/// # Thread Safety
///
/// This uses `Mutex` for thread-safe access to the string interner.
static INTERNER: OnceLock<Mutex<DefaultStringInterner>> = OnceLock::new();

/// Source of [`DiagramId`] values for the whole process.
static NEXT_DIAGRAM_ID: AtomicU64 = AtomicU64::new(1);

/// Identifier of a node within a diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NodeId(u64);

impl NodeId {
    /// Returns the raw numeric value of this id.
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "node_{}", self.0)
    }
}

/// Identifier of a cluster within a diagram.
///
/// The root cluster of a diagram also has a `ClusterId`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ClusterId(u64);

impl ClusterId {
    /// Returns the raw numeric value of this id.
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ClusterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "cluster_{}", self.0)
    }
}

/// Process-unique identifier of a diagram.
///
/// Handles carry the id of the diagram that created them so that a handle
/// from one diagram cannot be wired into another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DiagramId(u64);

impl DiagramId {
    /// Allocates a fresh diagram id.
    pub fn next() -> Self {
        Self(NEXT_DIAGRAM_ID.fetch_add(1, Ordering::Relaxed))
    }
}

impl fmt::Display for DiagramId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "diagram_{}", self.0)
    }
}

/// Monotonic id counter.
///
/// Each diagram owns one generator shared by its nodes and clusters. Ids start at 0
/// and are never reused for the lifetime of the generator.
#[derive(Debug, Default)]
pub struct IdGenerator {
    next: u64,
}

impl IdGenerator {
    /// Creates a generator starting at zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next node id.
    pub fn next_node(&mut self) -> NodeId {
        NodeId(self.bump())
    }

    /// Returns the next cluster id.
    pub fn next_cluster(&mut self) -> ClusterId {
        ClusterId(self.bump())
    }

    /// Returns how many ids have been handed out.
    pub fn issued(&self) -> u64 {
        self.next
    }

    fn bump(&mut self) -> u64 {
        let value = self.next;
        self.next += 1;
        value
    }
}

/// Category key of a node, interned for cheap copies and comparisons.
///
/// Type tags key into an external icon catalog. Diagrams usually repeat the same
/// handful of tags many times, which is what the interning is for.
///
/// # Examples
///
/// ```
/// use archigraph_core::identifier::TypeTag;
///
/// let pod = TypeTag::new("k8s.compute.Pod");
/// assert_eq!(pod, TypeTag::new("k8s.compute.Pod"));
/// assert_eq!(pod.to_string(), "k8s.compute.Pod");
/// assert_eq!(pod.short_name(), "Pod");
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TypeTag(DefaultSymbol);

impl TypeTag {
    /// Creates (or looks up) the tag for `name`.
    pub fn new(name: &str) -> Self {
        let mut interner = INTERNER
            .get_or_init(|| Mutex::new(DefaultStringInterner::new()))
            .lock()
            .expect("Failed to acquire interner lock");
        Self(interner.get_or_intern(name))
    }

    /// Returns the last dot-separated segment of the tag.
    ///
    /// `"onprem.vcs.Github"` becomes `"Github"`; tags without dots are returned whole.
    pub fn short_name(&self) -> String {
        let full = self.to_string();
        match full.rsplit_once('.') {
            Some((_, last)) => last.to_string(),
            None => full,
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let interner = INTERNER
            .get_or_init(|| Mutex::new(DefaultStringInterner::new()))
            .lock()
            .expect("Failed to acquire interner lock");
        let str_value = interner
            .resolve(self.0)
            .expect("Symbol should exist in interner");
        write!(f, "{str_value}")
    }
}

impl From<&str> for TypeTag {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

impl PartialEq<str> for TypeTag {
    fn eq(&self, other: &str) -> bool {
        self.to_string() == other
    }
}

impl PartialEq<&str> for TypeTag {
    fn eq(&self, other: &&str) -> bool {
        self.to_string() == *other
    }
}
