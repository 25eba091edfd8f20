#![allow(clippy::clone_on_copy, clippy::float_cmp)]

use super::*;

fn fill(color: &str) -> Node {
    Node::new(Layer::Content, NodeKind::Fill { color: color.to_owned() })
}

// --- Node defaults ---

#[test]
fn new_node_defaults() {
    let node = Node::new(Layer::Content, NodeKind::Overlay);
    assert_eq!(node.x, 0.0);
    assert_eq!(node.y, 0.0);
    assert_eq!(node.width, 0.0);
    assert_eq!(node.height, 0.0);
    assert_eq!(node.z_index, 0);
    assert_eq!(node.opacity, 1.0);
    assert!(node.visible);
    assert!(!node.interactive);
}

#[test]
fn layer_order_is_background_content_ui() {
    assert_eq!(Layer::ORDER, [Layer::Background, Layer::Content, Layer::Ui]);
}

// --- Insert / ids ---

#[test]
fn insert_assigns_id() {
    let mut scene = Scene::new();
    let id = scene.insert(fill("#fff"));
    assert_eq!(scene.get(id).unwrap().id, id);
}

#[test]
fn ids_are_unique_and_increasing() {
    let mut scene = Scene::new();
    let a = scene.insert(fill("#fff"));
    let b = scene.insert(fill("#000"));
    let c = scene.insert(fill("#abc"));
    assert!(a < b);
    assert!(b < c);
}

#[test]
fn ids_survive_removal() {
    let mut scene = Scene::new();
    let a = scene.insert(fill("#fff"));
    scene.remove(a);
    let b = scene.insert(fill("#000"));
    assert_ne!(a, b);
}

#[test]
fn ids_are_not_reused_after_clear() {
    let mut scene = Scene::new();
    let a = scene.insert(fill("#fff"));
    scene.clear();
    let b = scene.insert(fill("#000"));
    assert_ne!(a, b);
    assert_eq!(scene.len(), 1);
}

// --- Remove / lookup ---

#[test]
fn remove_returns_the_node() {
    let mut scene = Scene::new();
    let id = scene.insert(fill("#123456"));
    let node = scene.remove(id).unwrap();
    assert_eq!(node.kind, NodeKind::Fill { color: "#123456".to_owned() });
    assert!(scene.is_empty());
}

#[test]
fn remove_unknown_is_none() {
    let mut scene = Scene::new();
    let id = scene.insert(fill("#fff"));
    scene.remove(id);
    assert!(scene.remove(id).is_none());
}

#[test]
fn get_mut_edits_in_place() {
    let mut scene = Scene::new();
    let id = scene.insert(fill("#fff"));
    scene.get_mut(id).unwrap().x = 25.0;
    assert_eq!(scene.get(id).unwrap().x, 25.0);
}

#[test]
fn get_unknown_is_none() {
    let mut scene = Scene::new();
    let id = scene.insert(fill("#fff"));
    scene.remove(id);
    assert!(scene.get(id).is_none());
}

// --- layer_nodes ordering ---

#[test]
fn layer_nodes_filters_by_layer() {
    let mut scene = Scene::new();
    scene.insert(Node::new(Layer::Background, NodeKind::Overlay));
    scene.insert(Node::new(Layer::Content, NodeKind::Overlay));
    scene.insert(Node::new(Layer::Ui, NodeKind::Overlay));

    assert_eq!(scene.layer_nodes(Layer::Background).len(), 1);
    assert_eq!(scene.layer_nodes(Layer::Content).len(), 1);
    assert_eq!(scene.layer_nodes(Layer::Ui).len(), 1);
}

#[test]
fn layer_nodes_sorts_by_z_index() {
    let mut scene = Scene::new();
    let mut top = fill("#fff");
    top.z_index = 10;
    let top = scene.insert(top);
    let mut bottom = fill("#000");
    bottom.z_index = -10;
    let bottom = scene.insert(bottom);

    let order: Vec<NodeId> = scene.layer_nodes(Layer::Content).iter().map(|n| n.id).collect();
    assert_eq!(order, vec![bottom, top]);
}

#[test]
fn equal_z_breaks_ties_by_id() {
    let mut scene = Scene::new();
    let first = scene.insert(fill("#fff"));
    let second = scene.insert(fill("#000"));

    let order: Vec<NodeId> = scene.layer_nodes(Layer::Content).iter().map(|n| n.id).collect();
    assert_eq!(order, vec![first, second]);
}

#[test]
fn empty_layer_is_empty_vec() {
    let scene = Scene::new();
    assert!(scene.layer_nodes(Layer::Ui).is_empty());
}
