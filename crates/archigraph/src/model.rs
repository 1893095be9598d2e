//! Graph model: nodes, clusters and edges of a diagram.
//!
//! The model is owned by a [`Diagram`](crate::Diagram) and only grows: elements are
//! added while the diagram is open and never removed. Callers refer to elements
//! through copyable handles ([`NodeRef`], [`ClusterRef`]) that remember which
//! diagram created them.
//!
//! # Ownership
//!
//! Clusters form a tree rooted at the diagram's root cluster. Each cluster keeps an
//! ordered list of [`Member`]s (its nodes and child clusters in declaration order);
//! each node and non-root cluster keeps a back-reference to its owner. Edges are not
//! owned by clusters: they live in the diagram-wide registry.

use std::path::{Path, PathBuf};

use indexmap::IndexMap;

use archigraph_core::{
    identifier::{ClusterId, DiagramId, NodeId, TypeTag},
    style::EdgeStyle,
};

use crate::config::Attributes;

/// Handle to a node of a specific diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeRef {
    diagram: DiagramId,
    id: NodeId,
}

impl NodeRef {
    pub(crate) fn new(diagram: DiagramId, id: NodeId) -> Self {
        Self { diagram, id }
    }

    /// Returns the id of the referenced node.
    pub fn id(self) -> NodeId {
        self.id
    }

    /// Returns the id of the diagram that created the node.
    pub fn diagram(self) -> DiagramId {
        self.diagram
    }
}

/// Handle to a cluster of a specific diagram.
///
/// Returned by [`Diagram::open_cluster`](crate::Diagram::open_cluster) and required
/// to close that cluster again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClusterRef {
    diagram: DiagramId,
    id: ClusterId,
}

impl ClusterRef {
    pub(crate) fn new(diagram: DiagramId, id: ClusterId) -> Self {
        Self { diagram, id }
    }

    pub fn id(self) -> ClusterId {
        self.id
    }

    pub fn diagram(self) -> DiagramId {
        self.diagram
    }
}

/// A diagram element representing one modeled system component.
#[derive(Debug, Clone)]
pub struct Node {
    id: NodeId,
    label: String,
    type_tag: TypeTag,
    owner: ClusterId,
    icon: Option<PathBuf>,
}

impl Node {
    pub(crate) fn new(
        id: NodeId,
        label: String,
        type_tag: TypeTag,
        owner: ClusterId,
        icon: Option<PathBuf>,
    ) -> Self {
        Self {
            id,
            label,
            type_tag,
            owner,
            icon,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn type_tag(&self) -> TypeTag {
        self.type_tag
    }

    /// Returns the cluster the node was created in.
    pub fn owner(&self) -> ClusterId {
        self.owner
    }

    /// Returns the icon given explicitly at creation (custom nodes only).
    pub fn icon(&self) -> Option<&Path> {
        self.icon.as_deref()
    }
}

/// An entry in a cluster's ordered member list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Member {
    Node(NodeId),
    Cluster(ClusterId),
}

/// A named subgraph grouping nodes and nested clusters.
#[derive(Debug, Clone)]
pub struct Cluster {
    id: ClusterId,
    label: String,
    attributes: Attributes,
    parent: Option<ClusterId>,
    depth: usize,
    members: Vec<Member>,
}

impl Cluster {
    pub(crate) fn root(id: ClusterId, label: String) -> Self {
        Self {
            id,
            label,
            attributes: Attributes::new(),
            parent: None,
            depth: 0,
            members: Vec::new(),
        }
    }

    pub(crate) fn nested(
        id: ClusterId,
        label: String,
        attributes: Attributes,
        parent: &Cluster,
    ) -> Self {
        Self {
            id,
            label,
            attributes,
            parent: Some(parent.id),
            depth: parent.depth + 1,
            members: Vec::new(),
        }
    }

    pub(crate) fn push_member(&mut self, member: Member) {
        self.members.push(member);
    }

    pub fn id(&self) -> ClusterId {
        self.id
    }

    pub fn label(&self) -> &str {
        &self.label
    }

    /// Returns the caller-supplied DOT attributes of this cluster.
    pub fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Returns the parent cluster, or `None` for the root cluster.
    pub fn parent(&self) -> Option<ClusterId> {
        self.parent
    }

    /// Returns the nesting depth: 0 for the root cluster, 1 for its children, ...
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    /// Returns nodes and child clusters in declaration order.
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// Returns the ids of the nodes owned directly by this cluster.
    pub fn nodes(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.members.iter().filter_map(|member| match member {
            Member::Node(id) => Some(*id),
            Member::Cluster(_) => None,
        })
    }

    /// Returns the ids of the direct child clusters.
    pub fn children(&self) -> impl Iterator<Item = ClusterId> + '_ {
        self.members.iter().filter_map(|member| match member {
            Member::Cluster(id) => Some(*id),
            Member::Node(_) => None,
        })
    }
}

/// Arrowhead placement of an edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeDirection {
    /// Arrow from the left operand to the right operand.
    Forward,
    /// Arrow from the right operand to the left operand.
    Backward,
    /// Arrowheads at both ends.
    Both,
    /// No arrowheads.
    None,
}

impl EdgeDirection {
    /// Returns the DOT `dir` value.
    pub fn to_dot_value(self) -> &'static str {
        match self {
            Self::Forward => "forward",
            Self::Backward => "back",
            Self::Both => "both",
            Self::None => "none",
        }
    }

    pub fn is_directed(self) -> bool {
        matches!(self, Self::Forward | Self::Backward)
    }
}

/// A connection between two nodes.
///
/// `left` and `right` are the operands in the order they were written. For a
/// backward edge the arrow points at `left`; [`Edge::source`] and [`Edge::target`]
/// resolve that into the direction of the arrow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Edge {
    left: NodeId,
    right: NodeId,
    direction: EdgeDirection,
    style: EdgeStyle,
}

impl Edge {
    pub(crate) fn new(
        left: NodeId,
        right: NodeId,
        direction: EdgeDirection,
        style: EdgeStyle,
    ) -> Self {
        Self {
            left,
            right,
            direction,
            style,
        }
    }

    /// Returns the left operand of the connection that created this edge.
    pub fn left(&self) -> NodeId {
        self.left
    }

    /// Returns the right operand of the connection that created this edge.
    pub fn right(&self) -> NodeId {
        self.right
    }

    /// Returns the node the arrow starts from.
    ///
    /// For undirected and bidirectional edges this is the left operand.
    pub fn source(&self) -> NodeId {
        match self.direction {
            EdgeDirection::Backward => self.right,
            _ => self.left,
        }
    }

    /// Returns the node the arrow points at.
    pub fn target(&self) -> NodeId {
        match self.direction {
            EdgeDirection::Backward => self.left,
            _ => self.right,
        }
    }

    pub fn direction(&self) -> EdgeDirection {
        self.direction
    }

    pub fn style(&self) -> &EdgeStyle {
        &self.style
    }

    pub fn is_self_loop(&self) -> bool {
        self.left == self.right
    }
}

/// Flat registry of every element of a diagram.
#[derive(Debug)]
pub(crate) struct Registry {
    clusters: IndexMap<ClusterId, Cluster>,
    nodes: IndexMap<NodeId, Node>,
    edges: Vec<Edge>,
}

impl Registry {
    pub(crate) fn new(root: Cluster) -> Self {
        let mut clusters = IndexMap::new();
        clusters.insert(root.id(), root);
        Self {
            clusters,
            nodes: IndexMap::new(),
            edges: Vec::new(),
        }
    }

    /// Registers `node` and records it as a member of its owner.
    ///
    /// # Panics
    ///
    /// Panics if the owner cluster is not registered.
    pub(crate) fn add_node(&mut self, node: Node) {
        let owner = self
            .clusters
            .get_mut(&node.owner())
            .expect("node owner must be a registered cluster");
        owner.push_member(Member::Node(node.id()));
        self.nodes.insert(node.id(), node);
    }

    /// Registers `cluster` and records it as a child of its parent.
    ///
    /// # Panics
    ///
    /// Panics if `cluster` is a root or its parent is not registered.
    pub(crate) fn add_cluster(&mut self, cluster: Cluster) {
        let parent_id = cluster.parent().expect("nested cluster must have a parent");
        let parent = self
            .clusters
            .get_mut(&parent_id)
            .expect("cluster parent must be a registered cluster");
        parent.push_member(Member::Cluster(cluster.id()));
        self.clusters.insert(cluster.id(), cluster);
    }

    pub(crate) fn add_edge(&mut self, edge: Edge) {
        self.edges.push(edge);
    }

    pub(crate) fn cluster(&self, id: ClusterId) -> Option<&Cluster> {
        self.clusters.get(&id)
    }

    pub(crate) fn node(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    pub(crate) fn contains_node(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub(crate) fn clusters(&self) -> impl Iterator<Item = &Cluster> {
        self.clusters.values()
    }

    pub(crate) fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub(crate) fn edges(&self) -> &[Edge] {
        &self.edges
    }
}
