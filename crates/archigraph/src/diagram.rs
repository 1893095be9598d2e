//! The diagram: root scope, element registry and render trigger.
//!
//! A [`Diagram`] is opened from a [`DiagramConfig`], collects nodes, clusters and
//! edges while it is open, and renders exactly once when it is closed.
//!
//! # Scopes
//!
//! Opening a diagram pushes its root cluster onto the diagram's own scope stack.
//! Clusters are opened either explicitly ([`Diagram::open_cluster`] /
//! [`Diagram::close_cluster`]) or through the scoped helpers ([`Diagram::cluster`]),
//! which release the cluster on every exit path of the body. Nodes are owned by the
//! innermost open scope at the time they are created.
//!
//! # Threading
//!
//! A diagram is single-threaded. Separate diagrams are independent of each other,
//! but one diagram must not be shared across threads without external
//! synchronization.

use std::path::PathBuf;

use log::{debug, info, trace, warn};
use serde::Deserialize;

use archigraph_core::{
    color::Color,
    format::{CurveStyle, Direction, OutputFormat},
    identifier::{ClusterId, DiagramId, IdGenerator, NodeId, TypeTag},
    style::EdgeStyle,
};

use crate::{
    catalog::{IconCatalog, NoIcons},
    config::{AppConfig, Attributes},
    edge::{Chain, Connector, Operand, broadcast},
    error::{ConfigurationError, ConstructionError, Error},
    model::{Cluster, ClusterRef, Edge, Node, NodeRef, Registry},
    render::{self, GraphvizBackend, LayoutBackend, RenderOutput},
    scope::ScopeStack,
};

/// Type tag given to nodes created with [`Diagram::add_custom_node`].
pub const CUSTOM_TYPE_TAG: &str = "custom";

/// Configuration of a single diagram.
///
/// Format, direction and curve style are kept as written and validated when the
/// diagram is opened; unset values fall back to the
/// [`RenderConfig`](crate::config::RenderConfig) defaults.
///
/// # Examples
///
/// ```
/// use archigraph::{DiagramConfig, format::OutputFormat};
///
/// let config = DiagramConfig::new("Kubernetes Architecture")
///     .with_output_format(OutputFormat::Svg)
///     .with_direction("TB")
///     .with_show(false);
/// assert_eq!(config.name(), "Kubernetes Architecture");
/// ```
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DiagramConfig {
    name: String,
    output_format: Option<String>,
    direction: Option<String>,
    curve_style: Option<String>,
    show: bool,
    filename: Option<String>,
    autolabel: bool,
}

impl Default for DiagramConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            output_format: None,
            direction: None,
            curve_style: None,
            show: true,
            filename: None,
            autolabel: false,
        }
    }
}

impl DiagramConfig {
    /// Creates a configuration for a diagram titled `name`.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Sets the output format (`png`, `jpg`, `svg`, `pdf` or `dot`).
    pub fn with_output_format(mut self, format: impl Into<String>) -> Self {
        self.output_format = Some(format.into());
        self
    }

    /// Sets the layout direction (`TB`, `BT`, `LR` or `RL`).
    pub fn with_direction(mut self, direction: impl Into<String>) -> Self {
        self.direction = Some(direction.into());
        self
    }

    /// Sets the edge curve style (`ortho`, `curved`, `spline` or `polyline`).
    pub fn with_curve_style(mut self, curve_style: impl Into<String>) -> Self {
        self.curve_style = Some(curve_style.into());
        self
    }

    /// Sets whether the caller intends to open the result. Advisory only.
    pub fn with_show(mut self, show: bool) -> Self {
        self.show = show;
        self
    }

    /// Overrides the output file name (the extension is added when missing).
    pub fn with_filename(mut self, filename: impl Into<String>) -> Self {
        self.filename = Some(filename.into());
        self
    }

    /// Prefixes every node label with the short name of its type tag.
    pub fn with_autolabel(mut self, autolabel: bool) -> Self {
        self.autolabel = autolabel;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }
}

/// Lifecycle state of a diagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiagramState {
    /// Accepting nodes, clusters and edges.
    Open,
    /// Closed; the model is read-only.
    Closed,
}

/// A diagram under construction.
///
/// # Examples
///
/// ```rust,no_run
/// use archigraph::{Diagram, DiagramConfig};
///
/// # fn main() -> Result<(), archigraph::Error> {
/// let mut diagram = Diagram::open(DiagramConfig::new("Web Service"))?;
///
/// let lb = diagram.add_node("aws.network.ELB", "lb")?;
/// let workers = diagram.cluster("Workers", |d| {
///     Ok(vec![
///         d.add_node("aws.compute.EC2", "worker1")?,
///         d.add_node("aws.compute.EC2", "worker2")?,
///     ])
/// })?;
/// diagram.connect_forward(lb, workers)?;
///
/// let output = diagram.close()?;
/// println!("written to {}", output.path().display());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Diagram {
    id: DiagramId,
    name: String,
    output_format: OutputFormat,
    direction: Direction,
    curve_style: CurveStyle,
    show: bool,
    filename: Option<String>,
    autolabel: bool,
    state: DiagramState,
    ids: IdGenerator,
    stack: ScopeStack,
    root: ClusterId,
    registry: Registry,
    app_config: AppConfig,
    palette: Vec<Color>,
    backend: Box<dyn LayoutBackend>,
    catalog: Box<dyn IconCatalog>,
    render_attempts: usize,
}

impl Diagram {
    /// Opens a diagram with the default application configuration.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] for an unsupported output format, direction
    /// or curve style.
    pub fn open(config: DiagramConfig) -> Result<Self, Error> {
        Self::open_with(config, AppConfig::default())
    }

    /// Opens a diagram with an explicit application configuration.
    ///
    /// The layout backend is a [`GraphvizBackend`] running the configured
    /// executable; use [`Diagram::with_backend`] to replace it.
    ///
    /// # Errors
    ///
    /// Returns a [`ConfigurationError`] for an unsupported output format, direction
    /// or curve style, or an invalid theme palette.
    pub fn open_with(config: DiagramConfig, app_config: AppConfig) -> Result<Self, Error> {
        let defaults = app_config.render();
        let output_format = parse_or(config.output_format.as_deref(), defaults.format())?;
        let direction = parse_or(config.direction.as_deref(), defaults.direction())?;
        let curve_style = parse_or(config.curve_style.as_deref(), defaults.curve_style())?;
        let palette = app_config.theme().cluster_palette()?;
        let backend = GraphvizBackend::new(defaults.executable());

        let id = DiagramId::next();
        let mut ids = IdGenerator::new();
        let root = ids.next_cluster();
        let registry = Registry::new(Cluster::root(root, config.name.clone()));
        let mut stack = ScopeStack::new();
        stack.push(root);

        info!(
            diagram:% = id,
            name = config.name.as_str(),
            format = output_format.extension(),
            direction = direction.to_dot_value();
            "Diagram opened"
        );

        Ok(Self {
            id,
            name: config.name,
            output_format,
            direction,
            curve_style,
            show: config.show,
            filename: config.filename,
            autolabel: config.autolabel,
            state: DiagramState::Open,
            ids,
            stack,
            root,
            registry,
            app_config,
            palette,
            backend: Box::new(backend),
            catalog: Box::new(NoIcons),
            render_attempts: 0,
        })
    }

    /// Replaces the layout backend.
    pub fn with_backend(mut self, backend: impl LayoutBackend + 'static) -> Self {
        self.backend = Box::new(backend);
        self
    }

    /// Sets the icon catalog consulted when rendering nodes.
    pub fn with_catalog(mut self, catalog: impl IconCatalog + 'static) -> Self {
        self.catalog = Box::new(catalog);
        self
    }

    /// Runs `body` against this diagram, then closes it.
    ///
    /// If `body` fails, every open scope is released, the diagram is closed without
    /// rendering and the body's error is returned.
    pub fn draw<F>(mut self, body: F) -> Result<RenderOutput, Error>
    where
        F: FnOnce(&mut Diagram) -> Result<(), Error>,
    {
        if let Err(err) = body(&mut self) {
            let released = self.stack.unwind_to(self.root);
            self.state = DiagramState::Closed;
            warn!(
                diagram:% = self.id,
                released = released.len();
                "Diagram body failed, skipping render"
            );
            return Err(err);
        }
        self.close()
    }

    // =========================================================================
    // Nodes
    // =========================================================================

    /// Creates a node owned by the innermost open scope.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructionError::DiagramClosed`] if the diagram is closed.
    pub fn add_node(
        &mut self,
        type_tag: impl Into<TypeTag>,
        label: impl Into<String>,
    ) -> Result<NodeRef, Error> {
        self.insert_node(type_tag.into(), label.into(), None)
    }

    /// Creates a node drawn with the icon at `icon` instead of a catalog icon.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructionError::DiagramClosed`] if the diagram is closed.
    pub fn add_custom_node(
        &mut self,
        label: impl Into<String>,
        icon: impl Into<PathBuf>,
    ) -> Result<NodeRef, Error> {
        self.insert_node(TypeTag::new(CUSTOM_TYPE_TAG), label.into(), Some(icon.into()))
    }

    fn insert_node(
        &mut self,
        type_tag: TypeTag,
        label: String,
        icon: Option<PathBuf>,
    ) -> Result<NodeRef, Error> {
        let owner = self.current_owner()?;
        let id = self.ids.next_node();
        trace!(node:% = id, owner:% = owner, label = label.as_str(); "Node created");
        self.registry
            .add_node(Node::new(id, label, type_tag, owner, icon));
        Ok(NodeRef::new(self.id, id))
    }

    // =========================================================================
    // Clusters
    // =========================================================================

    /// Opens a cluster as a child of the innermost open scope.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructionError::DiagramClosed`] if the diagram is closed.
    pub fn open_cluster(&mut self, label: impl Into<String>) -> Result<ClusterRef, Error> {
        self.open_cluster_with(label, Attributes::new())
    }

    /// Opens a cluster with caller-supplied DOT attributes.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructionError::DiagramClosed`] if the diagram is closed.
    pub fn open_cluster_with(
        &mut self,
        label: impl Into<String>,
        attributes: Attributes,
    ) -> Result<ClusterRef, Error> {
        let parent_id = self.current_owner()?;
        let parent = self
            .registry
            .cluster(parent_id)
            .expect("open scopes are registered clusters");
        let id = self.ids.next_cluster();
        let cluster = Cluster::nested(id, label.into(), attributes, parent);
        debug!(cluster:% = id, parent:% = parent_id, label = cluster.label(); "Cluster opened");

        self.registry.add_cluster(cluster);
        self.stack.push(id);
        Ok(ClusterRef::new(self.id, id))
    }

    /// Closes `cluster`, which must be the innermost open scope.
    ///
    /// # Errors
    ///
    /// Returns [`ConstructionError::MismatchedScope`] if another cluster is still
    /// open inside it, [`ConstructionError::ForeignCluster`] for a handle of another
    /// diagram, and [`ConstructionError::DiagramClosed`] if the diagram is closed.
    pub fn close_cluster(&mut self, cluster: ClusterRef) -> Result<(), Error> {
        self.ensure_open()?;
        if cluster.diagram() != self.id {
            return Err(ConstructionError::ForeignCluster {
                cluster: cluster.id(),
                owner: cluster.diagram(),
                diagram: self.id,
            }
            .into());
        }
        self.stack.pop(cluster.id())?;
        Ok(())
    }

    /// Runs `body` inside a new cluster labeled `label`.
    ///
    /// The cluster is closed when `body` returns. If `body` fails, or returns with a
    /// nested cluster still open, the cluster and everything above it are released
    /// before the error is returned.
    pub fn cluster<T, F>(&mut self, label: impl Into<String>, body: F) -> Result<T, Error>
    where
        F: FnOnce(&mut Diagram) -> Result<T, Error>,
    {
        self.cluster_with(label, Attributes::new(), body)
    }

    /// Like [`Diagram::cluster`], with caller-supplied DOT attributes.
    pub fn cluster_with<T, F>(
        &mut self,
        label: impl Into<String>,
        attributes: Attributes,
        body: F,
    ) -> Result<T, Error>
    where
        F: FnOnce(&mut Diagram) -> Result<T, Error>,
    {
        let handle = self.open_cluster_with(label, attributes)?;
        let result = body(self).and_then(|value| {
            self.close_cluster(handle)?;
            Ok(value)
        });
        if result.is_err() {
            let released = self.stack.unwind_to(handle.id());
            debug!(
                cluster:% = handle.id(),
                released = released.len();
                "Cluster released after failure"
            );
        }
        result
    }

    // =========================================================================
    // Edges
    // =========================================================================

    /// Connects `left` to `right` with `connector`, applying `style` to every edge.
    ///
    /// Operands are broadcast (see [`broadcast`]); the expression evaluates to
    /// `right`. Either all edges are created or none.
    ///
    /// # Errors
    ///
    /// Returns a [`ConstructionError`] if the diagram is closed, an operand node
    /// belongs to another diagram, or two sequences differ in length.
    pub fn connect(
        &mut self,
        left: impl Into<Operand>,
        connector: Connector,
        right: impl Into<Operand>,
        style: EdgeStyle,
    ) -> Result<Operand, Error> {
        self.ensure_open()?;
        let left = left.into();
        let right = right.into();

        for node in left.nodes().iter().chain(right.nodes()) {
            self.resolve(*node)?;
        }
        let pairs = broadcast(&left, &right)?;

        let direction = connector.direction();
        for (l, r) in pairs {
            trace!(left:% = l.id(), right:% = r.id(), direction:? = direction; "Edge created");
            self.registry
                .add_edge(Edge::new(l.id(), r.id(), direction, style.clone()));
        }
        Ok(right)
    }

    /// `left -> right`; evaluates to `right`.
    pub fn connect_forward(
        &mut self,
        left: impl Into<Operand>,
        right: impl Into<Operand>,
    ) -> Result<Operand, Error> {
        self.connect(left, Connector::Forward, right, EdgeStyle::new())
    }

    /// `left <- right` (arrows point at `left`); evaluates to `right`.
    pub fn connect_backward(
        &mut self,
        left: impl Into<Operand>,
        right: impl Into<Operand>,
    ) -> Result<Operand, Error> {
        self.connect(left, Connector::Backward, right, EdgeStyle::new())
    }

    /// `left -- right`; evaluates to `right`.
    pub fn connect_plain(
        &mut self,
        left: impl Into<Operand>,
        right: impl Into<Operand>,
    ) -> Result<Operand, Error> {
        self.connect(left, Connector::Plain, right, EdgeStyle::new())
    }

    /// `left <-> right`; evaluates to `right`.
    pub fn connect_both(
        &mut self,
        left: impl Into<Operand>,
        right: impl Into<Operand>,
    ) -> Result<Operand, Error> {
        self.connect(left, Connector::Both, right, EdgeStyle::new())
    }

    /// Starts a chained connection expression at `start`.
    pub fn chain(&mut self, start: impl Into<Operand>) -> Chain<'_> {
        Chain::new(self, start.into())
    }

    // =========================================================================
    // Closing
    // =========================================================================

    /// Closes the diagram and renders it.
    ///
    /// # Errors
    ///
    /// - [`ConstructionError::UnclosedClusters`] if clusters are still open. Nothing
    ///   is rendered and the diagram stays open.
    /// - [`ConstructionError::DiagramClosed`] if the diagram was already closed.
    /// - [`crate::RenderError`] if the backend fails. The diagram is closed and its
    ///   model stays inspectable.
    pub fn close(&mut self) -> Result<RenderOutput, Error> {
        self.ensure_open()?;

        if self.stack.depth() > 1 {
            let open = self
                .stack
                .iter()
                .skip(1)
                .filter_map(|id| self.registry.cluster(id))
                .map(|cluster| cluster.label().to_string())
                .collect();
            return Err(ConstructionError::UnclosedClusters {
                diagram: self.name.clone(),
                open,
            }
            .into());
        }

        self.stack.pop(self.root)?;
        self.state = DiagramState::Closed;
        info!(
            diagram:% = self.id,
            nodes = self.node_count(),
            edges = self.edges().len();
            "Diagram closed, rendering"
        );

        self.render_attempts += 1;
        Ok(render::render(self)?)
    }

    // =========================================================================
    // Inspection
    // =========================================================================

    pub fn id(&self) -> DiagramId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn output_format(&self) -> OutputFormat {
        self.output_format
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn curve_style(&self) -> CurveStyle {
        self.curve_style
    }

    pub fn show(&self) -> bool {
        self.show
    }

    pub fn filename(&self) -> Option<&str> {
        self.filename.as_deref()
    }

    pub fn autolabel(&self) -> bool {
        self.autolabel
    }

    pub fn state(&self) -> DiagramState {
        self.state
    }

    pub fn is_open(&self) -> bool {
        self.state == DiagramState::Open
    }

    /// Returns the innermost open scope, or `None` once the diagram is closed.
    pub fn current_scope(&self) -> Option<ClusterId> {
        self.stack.current()
    }

    /// Returns the number of open scopes, the root included.
    pub fn scope_depth(&self) -> usize {
        self.stack.depth()
    }

    /// Returns how many times rendering has been attempted (0 or 1).
    pub fn render_attempts(&self) -> usize {
        self.render_attempts
    }

    pub fn root_cluster(&self) -> &Cluster {
        self.registry
            .cluster(self.root)
            .expect("root cluster is registered at open")
    }

    pub fn find_cluster(&self, id: ClusterId) -> Option<&Cluster> {
        self.registry.cluster(id)
    }

    pub fn find_node(&self, id: NodeId) -> Option<&Node> {
        self.registry.node(id)
    }

    /// Returns the node behind `node`, if it belongs to this diagram.
    pub fn node(&self, node: NodeRef) -> Option<&Node> {
        if node.diagram() != self.id {
            return None;
        }
        self.registry.node(node.id())
    }

    /// Returns every cluster, root first, in creation order.
    pub fn clusters(&self) -> impl Iterator<Item = &Cluster> {
        self.registry.clusters()
    }

    /// Returns every node in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.registry.nodes()
    }

    pub fn node_count(&self) -> usize {
        self.registry.nodes().count()
    }

    /// Returns every edge in creation order.
    pub fn edges(&self) -> &[Edge] {
        self.registry.edges()
    }

    /// Returns the DOT description the renderer would hand to the backend.
    pub fn to_dot(&self) -> String {
        render::to_dot(self)
    }

    // =========================================================================
    // Crate-internal accessors
    // =========================================================================

    pub(crate) fn registry(&self) -> &Registry {
        &self.registry
    }

    pub(crate) fn app_config(&self) -> &AppConfig {
        &self.app_config
    }

    pub(crate) fn palette(&self) -> &[Color] {
        &self.palette
    }

    pub(crate) fn backend(&self) -> &dyn LayoutBackend {
        self.backend.as_ref()
    }

    pub(crate) fn catalog(&self) -> &dyn IconCatalog {
        self.catalog.as_ref()
    }

    fn ensure_open(&self) -> Result<(), ConstructionError> {
        match self.state {
            DiagramState::Open => Ok(()),
            DiagramState::Closed => Err(ConstructionError::DiagramClosed {
                diagram: self.name.clone(),
            }),
        }
    }

    fn current_owner(&self) -> Result<ClusterId, ConstructionError> {
        self.ensure_open()?;
        self.stack.current().ok_or_else(|| ConstructionError::DiagramClosed {
            diagram: self.name.clone(),
        })
    }

    fn resolve(&self, node: NodeRef) -> Result<NodeId, ConstructionError> {
        if node.diagram() != self.id {
            return Err(ConstructionError::ForeignNode {
                node: node.id(),
                owner: node.diagram(),
                diagram: self.id,
            });
        }
        if !self.registry.contains_node(node.id()) {
            return Err(ConstructionError::UnknownNode {
                node: node.id(),
                diagram: self.id,
            });
        }
        Ok(node.id())
    }
}

/// Parses `value`, or returns `default` when it is unset.
fn parse_or<T>(value: Option<&str>, default: T) -> Result<T, ConfigurationError>
where
    T: std::str::FromStr<Err = archigraph_core::error::ValueError>,
{
    match value {
        Some(value) => value.parse().map_err(ConfigurationError::from),
        None => Ok(default),
    }
}


#[cfg(test)]
mod proptest_tests {
    use std::collections::HashSet;

    use proptest::prelude::*;

    use super::*;

    #[derive(Debug, Clone, Copy)]
    enum Step {
        Open,
        Close,
        Node,
    }

    fn step() -> impl Strategy<Value = Step> {
        prop_oneof![Just(Step::Open), Just(Step::Close), Just(Step::Node)]
    }

    proptest! {
        #[test]
        fn cluster_tree_mirrors_declaration_nesting(steps in prop::collection::vec(step(), 0..60)) {
            let mut diagram = Diagram::open(DiagramConfig::new("P")).unwrap();
            let root = diagram.root_cluster().id();
            let mut open: Vec<ClusterRef> = Vec::new();
            let mut expected_parent = Vec::new();
            let mut expected_owner = Vec::new();

            for step in steps {
                match step {
                    Step::Open => {
                        let parent = open.last().map_or(root, |c| c.id());
                        let handle = diagram.open_cluster("c").unwrap();
                        expected_parent.push((handle.id(), parent, open.len() + 1));
                        open.push(handle);
                    }
                    Step::Close => {
                        if let Some(handle) = open.pop() {
                            diagram.close_cluster(handle).unwrap();
                        }
                    }
                    Step::Node => {
                        let owner = open.last().map_or(root, |c| c.id());
                        let node = diagram.add_node("t", "same label").unwrap();
                        expected_owner.push((node, owner));
                    }
                }
            }

            for (id, parent, depth) in expected_parent {
                let cluster = diagram.find_cluster(id).unwrap();
                prop_assert_eq!(cluster.parent(), Some(parent));
                prop_assert_eq!(cluster.depth(), depth);
                prop_assert!(diagram.find_cluster(parent).unwrap().children().any(|c| c == id));
            }

            let mut seen = HashSet::new();
            for (node, owner) in expected_owner {
                prop_assert!(seen.insert(node.id()));
                prop_assert_eq!(diagram.node(node).unwrap().owner(), owner);
            }
            prop_assert_eq!(diagram.scope_depth(), open.len() + 1);
        }
    }
}
