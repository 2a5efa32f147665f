//! End-to-end scenarios driving the topology view state.

// Integration tests link every crate dependency, silence noisy lint.
#![allow(unused_crate_dependencies)]

use zigzag_graph::components::topology_graph::persistence::LayoutEntry;
use zigzag_graph::components::topology_graph::source::parse_topology;
use zigzag_graph::{
	DisplayConfig, Relation, TopologyData, UnrecognizedRelationPolicy, Zag, Zig, ZigzagGraph,
};

fn nodes(ids: &[&str]) -> Vec<Zig> {
	ids.iter().map(|id| Zig::new(*id)).collect()
}

fn abc() -> TopologyData {
	TopologyData {
		nodes: nodes(&["A", "B", "C"]),
		links: vec![
			Zag::new("A", "B", Relation::parse("parent")),
			Zag::new("B", "A", Relation::parse("child")),
			Zag::new("B", "C", Relation::parse("parent")),
		],
	}
}

fn settle(graph: &mut ZigzagGraph) {
	let mut frames = 0;
	while graph.step(0.016) {
		frames += 1;
		assert!(frames < 10_000, "view never settled");
	}
}

fn position(graph: &ZigzagGraph, id: &str) -> (f64, f64) {
	let node = graph.simulation().node(id).expect("device present");
	(node.x, node.y)
}

#[test]
fn reverse_links_become_one_lens_and_one_line() {
	let mut graph = ZigzagGraph::new(DisplayConfig::default(), 800.0, 600.0);
	graph.set_data(abc());

	let edges = graph.edges();
	assert_eq!(edges.len(), 2);
	assert_eq!(edges[0].zags.len(), 2);
	assert_eq!(edges[1].zags.len(), 1);

	settle(&mut graph);
	let scene = graph.scene();
	let paths = scene.edge_paths();
	assert_eq!(paths[0].matches('Q').count(), 2);
	assert!(paths[1].contains('L'));
	assert_eq!(scene.edges()[0].labels.len(), 2);
	assert_eq!(scene.edges()[1].labels.len(), 1);
}

#[test]
fn unchanged_resize_does_not_restart() {
	let mut graph = ZigzagGraph::new(DisplayConfig::default(), 800.0, 600.0);
	graph.set_data(abc());
	settle(&mut graph);

	assert!(!graph.resize(800.0, 600.0));
	assert!(!graph.simulation().is_running());
	assert!(!graph.step(0.016));

	assert!(graph.resize(640.0, 480.0));
	settle(&mut graph);
	for node in graph.simulation().nodes() {
		assert!(node.x <= 640.0 - 48.0 && node.y <= 480.0 - 48.0);
	}
}

#[test]
fn layout_for_an_absent_device_changes_nothing() {
	let mut graph = ZigzagGraph::new(DisplayConfig::default(), 800.0, 600.0);
	graph.set_data(abc());
	settle(&mut graph);
	let before: Vec<(f64, f64)> = ["A", "B", "C"].iter().map(|id| position(&graph, id)).collect();

	graph.inject_layout(vec![LayoutEntry { id: "Z".into(), x: 10.0, y: 10.0 }]);
	assert!(graph.extract_layout().is_empty());
	assert!(graph.simulation().nodes().iter().all(|n| !n.is_pinned()));
	assert!(graph.scene().nodes().iter().all(|n| !n.lock_visible));
	let after: Vec<(f64, f64)> = ["A", "B", "C"].iter().map(|id| position(&graph, id)).collect();
	assert_eq!(before, after);
}

#[test]
fn drag_pins_and_double_click_releases() {
	let mut graph = ZigzagGraph::new(DisplayConfig::default(), 800.0, 600.0);
	graph.set_data(abc());
	settle(&mut graph);

	let (x, y) = position(&graph, "C");
	assert!(graph.pointer_down(x, y));
	assert!(graph.is_dragging());
	graph.pointer_move(200.0, 150.0);
	graph.pointer_up();
	assert!(!graph.is_dragging());

	let layout = graph.extract_layout();
	assert_eq!(layout, vec![LayoutEntry { id: "C".into(), x: 200.0, y: 150.0 }]);
	assert!(graph.scene().node("C").unwrap().lock_visible);

	settle(&mut graph);
	assert_eq!(position(&graph, "C"), (200.0, 150.0));

	graph.double_click(200.0, 150.0);
	assert!(graph.extract_layout().is_empty());
	assert!(!graph.scene().node("C").unwrap().lock_visible);
}

#[test]
fn repeated_device_ids_keep_drag_and_lock_on_one_node() {
	let mut first = Zig::new("A");
	first.name = "first".into();
	let mut second = Zig::new("A");
	second.name = "second".into();
	let mut graph = ZigzagGraph::new(DisplayConfig::default(), 800.0, 600.0);
	graph.set_data(TopologyData {
		nodes: vec![first, second, Zig::new(""), Zig::new("B")],
		links: vec![Zag::new("A", "B", Relation::Parent)],
	});
	assert_eq!(graph.simulation().nodes().len(), 2);
	assert_eq!(graph.scene().nodes().len(), 2);
	settle(&mut graph);

	let (x, y) = position(&graph, "A");
	assert!(graph.pointer_down(x, y));
	graph.pointer_move(200.0, 150.0);
	graph.pointer_up();

	assert_eq!(graph.extract_layout(), vec![LayoutEntry { id: "A".into(), x: 200.0, y: 150.0 }]);
	let scene = graph.scene();
	let locked: Vec<&str> = scene
		.nodes()
		.iter()
		.filter(|n| n.lock_visible)
		.map(|n| n.label.as_str())
		.collect();
	assert_eq!(locked, vec!["first"]);
}

#[test]
fn pressing_empty_canvas_starts_no_drag() {
	let mut graph = ZigzagGraph::new(DisplayConfig::default(), 800.0, 600.0);
	graph.set_data(abc());
	settle(&mut graph);
	assert!(!graph.pointer_down(1.0, 1.0));
	assert!(!graph.is_dragging());
}

#[test]
fn hovering_dims_everything_but_the_neighborhood() {
	let mut graph = ZigzagGraph::new(DisplayConfig::default(), 800.0, 600.0);
	graph.set_data(abc());
	settle(&mut graph);

	let (x, y) = position(&graph, "C");
	graph.pointer_move(x, y);
	{
		let scene = graph.scene();
		assert!(scene.is_dimmed());
		let lit: Vec<bool> = scene.nodes().iter().map(|n| n.highlighted).collect();
		assert_eq!(lit, vec![false, true, true]);
	}
	assert!(graph.step(0.016));
	assert!(graph.dim_level() > 0.0);

	graph.pointer_leave();
	assert!(!graph.scene().is_dimmed());
	settle(&mut graph);
	assert_eq!(graph.dim_level(), 0.0);
}

#[test]
fn refresh_keeps_pins_and_drops_vanished_devices() {
	let mut graph = ZigzagGraph::new(DisplayConfig::default(), 800.0, 600.0);
	graph.set_data(abc());
	graph.inject_layout(vec![LayoutEntry { id: "B".into(), x: 300.0, y: 200.0 }]);
	settle(&mut graph);

	graph.set_data(TopologyData {
		nodes: nodes(&["B", "D"]),
		links: vec![Zag::new("D", "B", Relation::Parent), Zag::new("B", "A", Relation::Child)],
	});
	assert_eq!(graph.edges().len(), 1);
	assert_eq!(graph.extract_layout(), vec![LayoutEntry { id: "B".into(), x: 300.0, y: 200.0 }]);
	let scene = graph.scene();
	assert!(scene.node("A").is_none());
	assert!(scene.node("B").unwrap().lock_visible);
	assert!(!scene.node("D").unwrap().lock_visible);
}

#[test]
fn empty_topology_idles_without_fault() {
	let mut graph = ZigzagGraph::new(DisplayConfig::default(), 800.0, 600.0);
	graph.set_data(TopologyData::default());
	settle(&mut graph);
	assert!(graph.edges().is_empty());
	assert!(graph.extract_layout().is_empty());
	assert!(!graph.pointer_down(400.0, 300.0));
}

#[test]
fn raw_snapshot_feeds_the_view_with_link_quality_colors() {
	let json = r#"{
		"devices": [
			{"ieee": "00:0d", "name": "zigpy", "device_type": "Coordinator", "lqi": 255},
			{"ieee": "84:ba", "name": "plug", "user_given_name": "Kitchen plug", "device_type": "Router"},
			{"ieee": "d0:cf", "name": "lumi.weather", "device_type": "EndDevice"}
		],
		"map": {"devices": [
			{"ieee": "00:0d", "lqi": 255, "neighbours": [
				{"ieee": "84:ba", "relation": "Child", "lqi": 230},
				{"ieee": "d0:cf", "relation": "None_of_the_above", "lqi": 10}
			]},
			{"ieee": "84:ba", "lqi": 230, "neighbours": [
				{"ieee": "d0:cf", "relation": "None_of_the_above", "lqi": 10},
				{"ieee": "d0:cf", "relation": "Child", "lqi": 150}
			]}
		]}
	}"#;
	let config = DisplayConfig::from_json(r#"{"colorLQIModerate": "gold"}"#).unwrap();

	let skipping = parse_topology(json, UnrecognizedRelationPolicy::SkipLink).unwrap();
	let mut graph = ZigzagGraph::new(config, 800.0, 600.0);
	graph.set_data(skipping);
	assert_eq!(graph.edges().len(), 2);
	let scene = graph.scene();
	assert_eq!(scene.node("84:ba").unwrap().label, "Kitchen plug");
	let strokes: Vec<&str> = scene.edges().iter().map(|e| e.stroke.as_str()).collect();
	assert_eq!(strokes, vec!["forestgreen", "gold"]);
	drop(scene);

	let stopping = parse_topology(json, UnrecognizedRelationPolicy::StopDeviceScan).unwrap();
	graph.set_data(stopping);
	assert_eq!(graph.edges().len(), 1);
}
