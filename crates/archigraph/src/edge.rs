//! Edge algebra: connection operators, broadcast and chaining.
//!
//! # Operators
//!
//! | Method                                   | Edge(s) created       | Value          |
//! |------------------------------------------|-----------------------|----------------|
//! | [`Chain::forward`] / `connect_forward`   | `A -> B`              | `B`            |
//! | [`Chain::backward`] / `connect_backward` | `B -> A`              | `B`            |
//! | [`Chain::plain`] / `connect_plain`       | `A -- B`              | `B`            |
//! | [`Chain::both`] / `connect_both`         | `A <-> B`             | `B`            |
//!
//! Every operator evaluates to its right-hand operand, which becomes the left-hand
//! operand of the next operator in a chain. `A -> B -> C` therefore creates exactly
//! the edges of the two statements `A -> B` and `B -> C`.
//!
//! # Broadcast
//!
//! Either operand may be a sequence of nodes ([`Operand::Many`]):
//!
//! - one-to-many `A -> [B1, B2]` pairs `A` with every `Bi`;
//! - many-to-one `[A1, A2] -> B` pairs every `Ai` with `B`;
//! - many-to-many `[A1, A2] -> [B1, B2]` pairs index-wise and requires equal lengths.
//!
//! # Style carrier
//!
//! An [`EdgeStyle`] given to [`Chain::styled`] applies to the edges of the next
//! operator only.

use log::trace;

use archigraph_core::style::EdgeStyle;

use crate::{
    Diagram,
    error::{ConstructionError, Error},
    model::{EdgeDirection, NodeRef},
};

/// A connection operand: one node or a sequence of nodes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Operand {
    One(NodeRef),
    Many(Vec<NodeRef>),
}

impl Operand {
    /// Returns the nodes of this operand in order.
    pub fn nodes(&self) -> &[NodeRef] {
        match self {
            Self::One(node) => std::slice::from_ref(node),
            Self::Many(nodes) => nodes,
        }
    }

    /// Returns the single node, or `None` for a sequence.
    pub fn as_one(&self) -> Option<NodeRef> {
        match self {
            Self::One(node) => Some(*node),
            Self::Many(_) => None,
        }
    }

    pub fn is_many(&self) -> bool {
        matches!(self, Self::Many(_))
    }
}

impl From<NodeRef> for Operand {
    fn from(node: NodeRef) -> Self {
        Self::One(node)
    }
}

impl From<Vec<NodeRef>> for Operand {
    fn from(nodes: Vec<NodeRef>) -> Self {
        Self::Many(nodes)
    }
}

impl From<&[NodeRef]> for Operand {
    fn from(nodes: &[NodeRef]) -> Self {
        Self::Many(nodes.to_vec())
    }
}

impl<const N: usize> From<[NodeRef; N]> for Operand {
    fn from(nodes: [NodeRef; N]) -> Self {
        Self::Many(nodes.to_vec())
    }
}

impl From<&Operand> for Operand {
    fn from(operand: &Operand) -> Self {
        operand.clone()
    }
}

/// Connection operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Connector {
    Forward,
    Backward,
    Plain,
    Both,
}

impl Connector {
    /// Returns the direction of the edges this connector creates.
    pub fn direction(self) -> EdgeDirection {
        match self {
            Self::Forward => EdgeDirection::Forward,
            Self::Backward => EdgeDirection::Backward,
            Self::Plain => EdgeDirection::None,
            Self::Both => EdgeDirection::Both,
        }
    }
}

/// Expands two operands into the `(left, right)` node pairs to connect.
///
/// # Errors
///
/// Returns [`ConstructionError::LengthMismatch`] when both operands are sequences of
/// different lengths.
pub fn broadcast(
    left: &Operand,
    right: &Operand,
) -> Result<Vec<(NodeRef, NodeRef)>, ConstructionError> {
    match (left, right) {
        (Operand::One(l), Operand::One(r)) => Ok(vec![(*l, *r)]),
        (Operand::One(l), Operand::Many(rs)) => Ok(rs.iter().map(|r| (*l, *r)).collect()),
        (Operand::Many(ls), Operand::One(r)) => Ok(ls.iter().map(|l| (*l, *r)).collect()),
        (Operand::Many(ls), Operand::Many(rs)) => {
            if ls.len() != rs.len() {
                return Err(ConstructionError::LengthMismatch {
                    left: ls.len(),
                    right: rs.len(),
                });
            }
            Ok(ls.iter().copied().zip(rs.iter().copied()).collect())
        }
    }
}

/// A chained connection expression over a diagram.
///
/// Created by [`Diagram::chain`]. Each operator creates its edges immediately and
/// returns the chain with the right-hand operand as the new head.
///
/// # Examples
///
/// ```rust,no_run
/// use archigraph::{Diagram, DiagramConfig, style::EdgeStyle};
///
/// # fn main() -> Result<(), archigraph::Error> {
/// let mut diagram = Diagram::open(DiagramConfig::new("Pipeline"))?;
/// let source = diagram.add_node("onprem.client.User", "Developer")?;
/// let github = diagram.add_node("onprem.vcs.Github", "GitHub")?;
/// let ci = diagram.add_node("onprem.ci.GithubActions", "CI")?;
///
/// diagram
///     .chain(source)
///     .forward(github)?
///     .styled(EdgeStyle::new().with_label("CI"))
///     .forward(ci)?;
///
/// diagram.close()?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Chain<'d> {
    diagram: &'d mut Diagram,
    head: Operand,
    pending: Option<EdgeStyle>,
}

impl<'d> Chain<'d> {
    pub(crate) fn new(diagram: &'d mut Diagram, head: Operand) -> Self {
        Self {
            diagram,
            head,
            pending: None,
        }
    }

    /// Interposes a style carrier: `style` applies to the next operator's edges.
    pub fn styled(mut self, style: EdgeStyle) -> Self {
        self.pending = Some(style);
        self
    }

    /// Connects the head to `right` with forward edges.
    pub fn forward(self, right: impl Into<Operand>) -> Result<Self, Error> {
        self.step(Connector::Forward, right.into())
    }

    /// Connects the head to `right` with backward edges (arrows point at the head).
    pub fn backward(self, right: impl Into<Operand>) -> Result<Self, Error> {
        self.step(Connector::Backward, right.into())
    }

    /// Connects the head to `right` with undirected edges.
    pub fn plain(self, right: impl Into<Operand>) -> Result<Self, Error> {
        self.step(Connector::Plain, right.into())
    }

    /// Connects the head to `right` with bidirectional edges.
    pub fn both(self, right: impl Into<Operand>) -> Result<Self, Error> {
        self.step(Connector::Both, right.into())
    }

    /// Returns the current value of the expression.
    pub fn head(&self) -> &Operand {
        &self.head
    }

    /// Ends the chain, returning its value.
    pub fn end(self) -> Operand {
        self.head
    }

    fn step(self, connector: Connector, right: Operand) -> Result<Self, Error> {
        let Self {
            diagram,
            head,
            pending,
        } = self;
        let style = pending.unwrap_or_default();
        let value = diagram.connect(&head, connector, right, style)?;
        trace!(connector:? = connector; "Chain advanced");
        Ok(Self {
            diagram,
            head: value,
            pending: None,
        })
    }
}
