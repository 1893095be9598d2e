//! # Archigraph
//!
//! Archigraph describes infrastructure diagrams as code: a program opens a
//! [`Diagram`], declares typed nodes, groups them in nested clusters, connects them
//! with a small edge algebra, and renders the result through an external layout
//! engine (Graphviz by default) when the diagram is closed.
//!
//! # Overview
//!
//! - [`Diagram`] owns the scope stack, the element registry and the render trigger.
//! - Clusters nest through [`Diagram::open_cluster`] / [`Diagram::close_cluster`]
//!   or the scoped [`Diagram::cluster`] helper.
//! - Edges are created by [`Diagram::connect`] and its shorthands, or fluently
//!   with a [`Chain`]. Operands may be single nodes or sequences; see
//!   [`broadcast`] for the pairing rules.
//! - Closing a diagram serializes it to DOT and hands it to a [`LayoutBackend`]
//!   exactly once.
//!
//! # Example
//!
//! ```rust,no_run
//! use archigraph::{Diagram, DiagramConfig};
//!
//! # fn main() -> Result<(), archigraph::Error> {
//! let mut diagram = Diagram::open(DiagramConfig::new("Event Processing").with_show(false))?;
//!
//! let source = diagram.add_node("aws.compute.EKS", "k8s source")?;
//! let workers = diagram.cluster("Event Workers", |d| {
//!     (1..=3)
//!         .map(|i| d.add_node("aws.compute.ECS", format!("worker{i}")))
//!         .collect::<Result<Vec<_>, _>>()
//! })?;
//! let queue = diagram.add_node("aws.integration.SQS", "event queue")?;
//!
//! diagram.chain(source).forward(workers)?.forward(queue)?;
//! diagram.close()?;
//! # Ok(())
//! # }
//! ```
//!
//! # Configuration
//!
//! Defaults for the backend executable, output directory, output format, layout
//! direction and theme come from an [`AppConfig`](config::AppConfig), usually
//! obtained from [`config::load_config`] and passed to [`Diagram::open_with`].

pub mod catalog;
pub mod config;
mod diagram;
pub mod edge;
mod error;
pub mod model;
pub mod render;
pub mod scope;

pub use archigraph_core::{color, format, identifier, style};

pub use catalog::{IconCatalog, NoIcons};
pub use diagram::{CUSTOM_TYPE_TAG, Diagram, DiagramConfig, DiagramState};
pub use edge::{Chain, Connector, Operand, broadcast};
pub use error::{ConfigurationError, ConstructionError, Error, RenderError};
pub use model::{Cluster, ClusterRef, Edge, EdgeDirection, Member, Node, NodeRef};
pub use render::{GraphvizBackend, LayoutBackend, RenderOutput, RenderRequest};
