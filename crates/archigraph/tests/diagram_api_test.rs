//! Integration tests for the Diagram API
//!
//! These tests drive diagrams end to end through a recording backend, so no
//! Graphviz installation is needed.

use std::{
    cell::RefCell,
    fs,
    path::{Path, PathBuf},
    rc::Rc,
};

use tempfile::tempdir;

use archigraph::{
    ConstructionError, Diagram, DiagramConfig, EdgeDirection, Error, LayoutBackend, Operand,
    RenderError, RenderRequest,
    config::AppConfig,
    format::OutputFormat,
    identifier::NodeId,
    style::{EdgeStyle, LineStyle},
};

/// One captured backend invocation.
#[derive(Debug, Clone)]
struct Recorded {
    description: String,
    description_path: PathBuf,
    format: OutputFormat,
    output: PathBuf,
}

/// Backend that records every request and writes the description as the artifact.
#[derive(Debug, Clone, Default)]
struct RecordingBackend {
    calls: Rc<RefCell<Vec<Recorded>>>,
    fail: bool,
}

impl RecordingBackend {
    fn failing() -> Self {
        Self {
            fail: true,
            ..Self::default()
        }
    }

    fn calls(&self) -> Vec<Recorded> {
        self.calls.borrow().clone()
    }
}

impl LayoutBackend for RecordingBackend {
    fn render(&self, request: &RenderRequest<'_>) -> Result<(), RenderError> {
        let description = fs::read_to_string(request.description_path()).map_err(|source| {
            RenderError::Io {
                path: request.description_path().to_path_buf(),
                source,
            }
        })?;
        self.calls.borrow_mut().push(Recorded {
            description,
            description_path: request.description_path().to_path_buf(),
            format: request.format(),
            output: request.output().to_path_buf(),
        });

        if self.fail {
            return Err(RenderError::Io {
                path: request.output().to_path_buf(),
                source: std::io::Error::other("simulated backend failure"),
            });
        }
        fs::write(request.output(), request.description()).map_err(|source| RenderError::Io {
            path: request.output().to_path_buf(),
            source,
        })
    }
}

fn app_config(output_dir: &Path) -> AppConfig {
    let mut config = AppConfig::default();
    config.render_mut().set_output_dir(output_dir);
    config
}

fn open_recorded(name: &str, output_dir: &Path) -> (Diagram, RecordingBackend) {
    let backend = RecordingBackend::default();
    let diagram = Diagram::open_with(
        DiagramConfig::new(name).with_show(false),
        app_config(output_dir),
    )
    .expect("Failed to open diagram")
    .with_backend(backend.clone());
    (diagram, backend)
}

fn edge_set(diagram: &Diagram) -> Vec<(NodeId, NodeId, EdgeDirection)> {
    diagram
        .edges()
        .iter()
        .map(|edge| (edge.left(), edge.right(), edge.direction()))
        .collect()
}

#[test]
fn test_worked_example() {
    let dir = tempdir().expect("Failed to create temp directory");
    let (mut diagram, backend) = open_recorded("D", dir.path());

    let x = diagram.open_cluster("X").unwrap();
    let n1 = diagram.add_node("T", "a").unwrap();
    diagram.close_cluster(x).unwrap();
    let n2 = diagram.add_node("T", "b").unwrap();
    diagram.connect_forward(n1, n2).unwrap();

    let output = diagram.close().expect("Failed to close diagram");

    assert_eq!(diagram.node_count(), 2);
    assert_eq!(
        edge_set(&diagram),
        vec![(n1.id(), n2.id(), EdgeDirection::Forward)]
    );
    assert_eq!(diagram.node(n1).unwrap().owner(), x.id());
    assert_eq!(diagram.node(n2).unwrap().owner(), diagram.root_cluster().id());

    let calls = backend.calls();
    assert_eq!(calls.len(), 1, "Exactly one render invocation expected");
    assert_eq!(diagram.render_attempts(), 1);
    assert_eq!(calls[0].format, OutputFormat::Png);
    assert_eq!(output.path(), dir.path().join("d.png"));
    assert_eq!(calls[0].output, output.path());
    assert!(output.path().exists());
    assert!(!output.show());
    assert!(
        !calls[0].description_path.exists(),
        "Temporary description must be removed after rendering"
    );
}

#[test]
fn test_chain_equals_separate_statements() {
    let dir = tempdir().unwrap();

    let (mut chained, _) = open_recorded("chained", dir.path());
    let a = chained.add_node("T", "A").unwrap();
    let b = chained.add_node("T", "B").unwrap();
    let c = chained.add_node("T", "C").unwrap();
    let value = chained.chain(a).forward(b).unwrap().forward(c).unwrap().end();
    assert_eq!(value, Operand::One(c));

    let (mut separate, _) = open_recorded("separate", dir.path());
    let sa = separate.add_node("T", "A").unwrap();
    let sb = separate.add_node("T", "B").unwrap();
    let sc = separate.add_node("T", "C").unwrap();
    separate.connect_forward(sa, sb).unwrap();
    separate.connect_forward(sb, sc).unwrap();

    let expected = |d: &Diagram| -> Vec<(u64, u64, EdgeDirection)> {
        edge_set(d)
            .into_iter()
            .map(|(l, r, dir)| (l.value(), r.value(), dir))
            .collect()
    };
    assert_eq!(expected(&chained), expected(&separate));
    assert_eq!(chained.edges().len(), 2);
}

#[test]
fn test_backward_chain_yields_right_operand() {
    let dir = tempdir().unwrap();
    let (mut diagram, _) = open_recorded("backward", dir.path());
    let a = diagram.add_node("T", "A").unwrap();
    let b = diagram.add_node("T", "B").unwrap();
    let c = diagram.add_node("T", "C").unwrap();

    let value = diagram.chain(a).backward(b).unwrap().backward(c).unwrap().end();
    assert_eq!(value, Operand::One(c));

    let arrows: Vec<_> = diagram
        .edges()
        .iter()
        .map(|edge| (edge.source(), edge.target()))
        .collect();
    assert_eq!(arrows, vec![(b.id(), a.id()), (c.id(), b.id())]);
}

#[test]
fn test_one_to_many_broadcast() {
    let dir = tempdir().unwrap();
    let (mut diagram, _) = open_recorded("D", dir.path());
    let a = diagram.add_node("T", "A").unwrap();
    let b1 = diagram.add_node("T", "B1").unwrap();
    let b2 = diagram.add_node("T", "B2").unwrap();

    let value = diagram.connect_forward(a, vec![b1, b2]).unwrap();

    assert_eq!(value, Operand::Many(vec![b1, b2]));
    assert_eq!(
        edge_set(&diagram),
        vec![
            (a.id(), b1.id(), EdgeDirection::Forward),
            (a.id(), b2.id(), EdgeDirection::Forward),
        ]
    );
}

#[test]
fn test_many_to_one_then_chain() {
    let dir = tempdir().unwrap();
    let (mut diagram, _) = open_recorded("D", dir.path());
    let workers: Vec<_> = (0..3)
        .map(|i| diagram.add_node("T", format!("w{i}")).unwrap())
        .collect();
    let queue = diagram.add_node("T", "queue").unwrap();
    let handlers: Vec<_> = (0..2)
        .map(|i| diagram.add_node("T", format!("h{i}")).unwrap())
        .collect();

    diagram
        .chain(workers.clone())
        .forward(queue)
        .unwrap()
        .forward(handlers.clone())
        .unwrap();

    assert_eq!(diagram.edges().len(), 5);
    assert!(
        diagram.edges()[..3]
            .iter()
            .all(|edge| edge.target() == queue.id())
    );
}

#[test]
fn test_many_to_many_zip_and_mismatch() {
    let dir = tempdir().unwrap();
    let (mut diagram, _) = open_recorded("D", dir.path());
    let a1 = diagram.add_node("T", "A1").unwrap();
    let a2 = diagram.add_node("T", "A2").unwrap();
    let b1 = diagram.add_node("T", "B1").unwrap();
    let b2 = diagram.add_node("T", "B2").unwrap();
    let b3 = diagram.add_node("T", "B3").unwrap();

    diagram.connect_forward([a1, a2], [b1, b2]).unwrap();
    assert_eq!(
        edge_set(&diagram),
        vec![
            (a1.id(), b1.id(), EdgeDirection::Forward),
            (a2.id(), b2.id(), EdgeDirection::Forward),
        ]
    );

    let err = diagram.connect_forward([a1, a2], [b1, b2, b3]).unwrap_err();
    assert!(matches!(
        err,
        Error::Construction(ConstructionError::LengthMismatch { left: 2, right: 3 })
    ));
    assert_eq!(diagram.edges().len(), 2);
}

#[test]
fn test_close_with_open_cluster_does_not_render() {
    let dir = tempdir().unwrap();
    let (mut diagram, backend) = open_recorded("D", dir.path());
    let _x = diagram.open_cluster("X").unwrap();
    diagram.add_node("T", "a").unwrap();

    let err = diagram.close().unwrap_err();
    assert!(err.is_construction());
    assert!(backend.calls().is_empty());
    assert_eq!(diagram.render_attempts(), 0);
}

#[test]
fn test_self_loop_permitted() {
    let dir = tempdir().unwrap();
    let (mut diagram, _) = open_recorded("D", dir.path());
    let a = diagram.add_node("T", "A").unwrap();

    diagram.connect_forward(a, a).unwrap();
    assert!(diagram.edges()[0].is_self_loop());
    diagram.close().unwrap();
}

#[test]
fn test_duplicate_labels_get_distinct_ids() {
    let dir = tempdir().unwrap();
    let (mut diagram, backend) = open_recorded("D", dir.path());
    let first = diagram.add_node("k8s.compute.Pod", "pod").unwrap();
    let second = diagram.add_node("k8s.compute.Pod", "pod").unwrap();
    assert_ne!(first.id(), second.id());

    diagram.close().unwrap();
    let description = &backend.calls()[0].description;
    assert!(description.contains(&first.id().to_string()));
    assert!(description.contains(&second.id().to_string()));
}

#[test]
fn test_use_after_close() {
    let dir = tempdir().unwrap();
    let (mut diagram, _) = open_recorded("D", dir.path());
    let a = diagram.add_node("T", "A").unwrap();
    diagram.close().unwrap();

    assert!(matches!(
        diagram.add_node("T", "late"),
        Err(Error::Construction(ConstructionError::DiagramClosed { .. }))
    ));
    assert!(diagram.connect_forward(a, a).unwrap_err().is_construction());
    assert!(diagram.close().unwrap_err().is_construction());
}

#[test]
fn test_render_failure_keeps_model() {
    let dir = tempdir().unwrap();
    let backend = RecordingBackend::failing();
    let mut diagram = Diagram::open_with(DiagramConfig::new("Broken"), app_config(dir.path()))
        .unwrap()
        .with_backend(backend.clone());
    let a = diagram.add_node("T", "A").unwrap();
    let b = diagram.add_node("T", "B").unwrap();
    diagram.connect_backward(a, b).unwrap();

    let err = diagram.close().unwrap_err();
    assert!(err.is_render());
    assert!(!diagram.is_open());
    let calls = backend.calls();
    assert_eq!(calls.len(), 1);
    assert!(!calls[0].description_path.exists());
    assert_eq!(diagram.node_count(), 2);
    assert_eq!(diagram.edges()[0].source(), b.id());
}

#[test]
fn test_bad_configuration_fails_at_open() {
    assert!(
        Diagram::open(DiagramConfig::new("D").with_output_format("bmp"))
            .unwrap_err()
            .is_configuration()
    );
    assert!(
        Diagram::open(DiagramConfig::new("D").with_direction("diagonal"))
            .unwrap_err()
            .is_configuration()
    );
    assert!(
        Diagram::open(DiagramConfig::new("D").with_curve_style("wobbly"))
            .unwrap_err()
            .is_configuration()
    );
}

#[test]
fn test_draw_renders_once_and_skips_on_failure() {
    let dir = tempdir().unwrap();

    let backend = RecordingBackend::default();
    let output = Diagram::open_with(
        DiagramConfig::new("Drawn").with_output_format("svg").with_filename("custom"),
        app_config(dir.path()),
    )
    .unwrap()
    .with_backend(backend.clone())
    .draw(|d| {
        let lb = d.add_node("aws.network.ELB", "lb")?;
        let web = d.cluster("Web", |d| d.add_node("aws.compute.EC2", "web"))?;
        d.connect_forward(lb, web)?;
        Ok(())
    })
    .unwrap();
    assert_eq!(output.path(), dir.path().join("custom.svg"));
    assert_eq!(backend.calls().len(), 1);

    let skipped = RecordingBackend::default();
    let err = Diagram::open_with(DiagramConfig::new("Failed"), app_config(dir.path()))
        .unwrap()
        .with_backend(skipped.clone())
        .draw(|d| {
            let a = d.add_node("T", "a")?;
            d.cluster("Inner", |d| {
                let b = d.add_node("T", "b")?;
                d.connect_forward([a, b], [b])?;
                Ok(())
            })
        })
        .unwrap_err();
    assert!(err.is_construction());
    assert!(skipped.calls().is_empty());
}

#[test]
fn test_description_structure() {
    let dir = tempdir().unwrap();
    let (mut diagram, backend) = open_recorded("Kubernetes Architecture", dir.path());
    let outer = diagram.open_cluster("Cluster").unwrap();
    let inner = diagram.open_cluster("Namespace").unwrap();
    let pod = diagram.add_node("k8s.compute.Pod", "api").unwrap();
    diagram.close_cluster(inner).unwrap();
    diagram.close_cluster(outer).unwrap();
    let db = diagram.add_node("k8s.storage.PV", "db").unwrap();
    diagram
        .connect(
            pod,
            archigraph::Connector::Plain,
            db,
            EdgeStyle::new()
                .with_label("reads")
                .with_line_style(LineStyle::Dotted),
        )
        .unwrap();

    diagram.close().unwrap();
    let description = &backend.calls()[0].description;

    let outer_at = description.find(&format!("subgraph {}", outer.id())).unwrap();
    let inner_at = description.find(&format!("subgraph {}", inner.id())).unwrap();
    assert!(outer_at < inner_at);
    assert!(description.contains("\"Kubernetes Architecture\""));
    assert!(description.contains("\"reads\""));
    assert!(description.contains("\"dotted\""));
    assert!(description.contains("\"none\""));
}

#[test]
fn test_diagrams_are_independent() {
    let dir = tempdir().unwrap();
    let (mut first, _) = open_recorded("first", dir.path());
    let (mut second, _) = open_recorded("second", dir.path());

    let _scope = first.open_cluster("only in first").unwrap();
    let node = second.add_node("T", "root owned").unwrap();

    assert_eq!(second.node(node).unwrap().owner(), second.root_cluster().id());
    assert_eq!(first.scope_depth(), 2);
    assert_eq!(second.scope_depth(), 1);
    assert!(first.node(node).is_none());
}

#[test]
fn test_style_carrier_applies_once() {
    let dir = tempdir().unwrap();
    let (mut diagram, _) = open_recorded("D", dir.path());
    let a = diagram.add_node("T", "A").unwrap();
    let b = diagram.add_node("T", "B").unwrap();
    let c = diagram.add_node("T", "C").unwrap();
    let dashed = EdgeStyle::new().with_line_style(LineStyle::Dashed);

    diagram
        .chain(a)
        .styled(dashed.clone())
        .forward(b)
        .unwrap()
        .both(c)
        .unwrap();

    let edges = diagram.edges();
    assert_eq!(edges[0].style(), &dashed);
    assert!(edges[1].style().is_empty());
    assert_eq!(edges[1].direction(), EdgeDirection::Both);
}

#[test]
fn test_same_label_clusters_get_distinct_subgraphs() {
    let dir = tempdir().unwrap();
    let (mut diagram, backend) = open_recorded("D", dir.path());
    let first = diagram
        .cluster("Workers", |d| d.cluster("Pool", |d| d.add_node("T", "a")))
        .unwrap();
    let second = diagram
        .cluster("Workers", |d| d.add_node("T", "b"))
        .unwrap();
    diagram.close().unwrap();

    let owners: Vec<_> = [first, second]
        .iter()
        .map(|node| diagram.node(*node).unwrap().owner())
        .collect();
    let second_workers = diagram.find_cluster(owners[1]).unwrap();
    let pool = diagram.find_cluster(owners[0]).unwrap();
    let first_workers = pool.parent().unwrap();
    assert_ne!(first_workers, second_workers.id());

    let description = &backend.calls()[0].description;
    for id in [first_workers, pool.id(), second_workers.id()] {
        assert_eq!(
            description.matches(&format!("subgraph {id} ")).count(),
            1,
            "{id} must be emitted exactly once"
        );
    }
    assert_eq!(description.matches("\"Workers\"").count(), 2);
}
