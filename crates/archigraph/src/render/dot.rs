//! DOT description of a diagram.
//!
//! Builds a Graphviz graph from the cluster tree and the edge registry:
//!
//! - the root cluster's members become top-level statements;
//! - every nested cluster becomes a `subgraph cluster_<n>` inside its parent's
//!   subgraph, so cluster nesting maps to subgraph nesting;
//! - nodes are declared as `node_<n>` with their label as an attribute, so duplicate
//!   labels never collide;
//! - all edges are emitted at the top level after the cluster tree.

use dot_structures::{
    Attribute, Edge as DotEdge, EdgeTy, Graph, GraphAttributes, Id, Node as DotNode,
    NodeId as DotNodeId, Stmt, Subgraph, Vertex,
};
use graphviz_rust::printer::{DotPrinter, PrinterContext};

use archigraph_core::{color::Color, identifier::NodeId};

use crate::{
    Diagram,
    config::Attributes,
    model::{Cluster, Edge, Member, Node},
};

/// Base height of a node drawn with an icon.
const ICON_NODE_HEIGHT: f32 = 1.9;

/// Extra height per additional label line of a node drawn with an icon.
const ICON_LINE_PADDING: f32 = 0.4;

/// Builds the DOT graph of `diagram`.
pub(crate) fn describe(diagram: &Diagram) -> Graph {
    let theme = diagram.app_config().theme();
    let registry = diagram.registry();

    let mut graph_attributes = to_attributes(theme.graph());
    graph_attributes.push(attribute("label", diagram.name()));
    graph_attributes.push(attribute("rankdir", diagram.direction().to_dot_value()));
    graph_attributes.push(attribute("splines", diagram.curve_style().to_dot_value()));

    let mut stmts = vec![
        Stmt::GAttribute(GraphAttributes::Graph(graph_attributes)),
        Stmt::GAttribute(GraphAttributes::Node(to_attributes(theme.node()))),
        Stmt::GAttribute(GraphAttributes::Edge(to_attributes(theme.edge()))),
    ];

    let root = diagram.root_cluster();
    stmts.extend(member_stmts(diagram, root));
    stmts.extend(registry.edges().iter().map(|edge| Stmt::Edge(edge_stmt(edge))));

    Graph::DiGraph {
        id: Id::Plain(diagram.id().to_string()),
        strict: false,
        stmts,
    }
}

/// Serializes a DOT graph to text.
pub(crate) fn print(graph: &Graph) -> String {
    graph.print(&mut PrinterContext::default())
}

fn member_stmts(diagram: &Diagram, cluster: &Cluster) -> Vec<Stmt> {
    cluster
        .members()
        .iter()
        .filter_map(|member| match member {
            Member::Node(id) => diagram
                .find_node(*id)
                .map(|node| Stmt::Node(node_stmt(diagram, node))),
            Member::Cluster(id) => diagram
                .find_cluster(*id)
                .map(|child| Stmt::Subgraph(cluster_subgraph(diagram, child))),
        })
        .collect()
}

fn cluster_subgraph(diagram: &Diagram, cluster: &Cluster) -> Subgraph {
    let theme = diagram.app_config().theme();

    let mut attributes = theme.cluster().clone();
    attributes.insert("label".to_string(), cluster.label().to_string());
    if let Some(color) = palette_color(diagram.palette(), cluster.depth()) {
        attributes.insert("bgcolor".to_string(), color.to_string());
    }
    for (key, value) in cluster.attributes() {
        attributes.insert(key.clone(), value.clone());
    }

    let mut stmts: Vec<Stmt> = attributes
        .iter()
        .map(|(key, value)| Stmt::Attribute(attribute(key, value)))
        .collect();
    stmts.extend(member_stmts(diagram, cluster));

    Subgraph {
        id: Id::Plain(cluster.id().to_string()),
        stmts,
    }
}

/// Picks the background color of a cluster at `depth` (1 for top-level clusters).
fn palette_color(palette: &[Color], depth: usize) -> Option<&Color> {
    if palette.is_empty() || depth == 0 {
        return None;
    }
    palette.get((depth - 1) % palette.len())
}

fn node_stmt(diagram: &Diagram, node: &Node) -> DotNode {
    let label = if diagram.autolabel() {
        format!("{}\n{}", node.type_tag().short_name(), node.label())
    } else {
        node.label().to_string()
    };

    let mut attributes = vec![attribute("label", &label)];

    let icon = node
        .icon()
        .map(|path| path.to_path_buf())
        .or_else(|| diagram.catalog().icon(node.type_tag()));
    if let Some(icon) = icon {
        let extra_lines = label.matches('\n').count() as f32;
        let height = ICON_NODE_HEIGHT + ICON_LINE_PADDING * extra_lines;
        attributes.push(attribute("shape", "none"));
        attributes.push(attribute("labelloc", "b"));
        attributes.push(attribute("height", &format!("{height:.1}")));
        attributes.push(attribute("image", &icon.display().to_string()));
    }

    attributes.push(attribute("comment", &node.type_tag().to_string()));

    DotNode {
        id: node_id(node.id()),
        attributes,
    }
}

fn edge_stmt(edge: &Edge) -> DotEdge {
    let style = edge.style();
    let mut attributes = vec![attribute("dir", edge.direction().to_dot_value())];
    if let Some(label) = style.label() {
        attributes.push(attribute("label", label));
    }
    if let Some(color) = style.color() {
        attributes.push(attribute("color", color.as_str()));
    }
    if let Some(line_style) = style.line_style() {
        attributes.push(attribute("style", line_style.to_dot_value()));
    }

    DotEdge {
        ty: EdgeTy::Pair(
            Vertex::N(node_id(edge.left())),
            Vertex::N(node_id(edge.right())),
        ),
        attributes,
    }
}

fn node_id(id: NodeId) -> DotNodeId {
    DotNodeId(Id::Plain(id.to_string()), None)
}

fn to_attributes(attributes: &Attributes) -> Vec<Attribute> {
    attributes
        .iter()
        .map(|(key, value)| attribute(key, value))
        .collect()
}

fn attribute(key: &str, value: &str) -> Attribute {
    Attribute(Id::Plain(key.to_string()), quoted(value))
}

/// Quotes `value` as a DOT string.
fn quoted(value: &str) -> Id {
    let escaped = value
        .replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n");
    Id::Escaped(format!("\"{escaped}\""))
}
