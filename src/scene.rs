//! Retained scene: three fixed layers of z-sorted display nodes.
//!
//! The scene is pure data — no browser types. Nodes are keyed by a
//! monotonically increasing [`NodeId`] that is never reused within one scene
//! lifetime; the renderer reads layers in fixed order (background, content,
//! ui) and nodes within a layer sorted by `(z_index, id)`.

#[cfg(test)]
#[path = "scene_test.rs"]
mod scene_test;

use std::collections::HashMap;

/// Unique identifier for a scene node. Opaque and monotonically increasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u64);

/// The three scene layers, in draw order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Layer {
    /// Page fill and anything under the document content.
    Background,
    /// Layout blocks and user-added objects.
    #[default]
    Content,
    /// Non-document chrome; hosts the interaction-lock overlay.
    Ui,
}

impl Layer {
    /// All layers in draw order.
    pub const ORDER: [Self; 3] = [Self::Background, Self::Content, Self::Ui];
}

/// Media kind for placeholder tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Audio,
    Video,
}

/// Role of a layout block node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockRole {
    Header,
    Body,
    Footer,
}

/// What a node draws.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Solid rectangle.
    Fill { color: String },
    /// A run of text.
    Text { content: String, color: String, font_size: f64 },
    /// A decoded image; the element itself lives in the browser shell,
    /// keyed by this node's id. `natural_width`/`natural_height` are the
    /// decoded pixel dimensions.
    Image { natural_width: f64, natural_height: f64 },
    /// Audio/video placeholder tile.
    Placeholder { media: MediaKind, label: String },
    /// Header/body/footer layout block.
    Block { role: BlockRole },
    /// The interaction-lock overlay.
    Overlay,
}

/// One display node.
#[derive(Debug, Clone)]
pub struct Node {
    pub id: NodeId,
    pub layer: Layer,
    pub kind: NodeKind,
    /// Left edge in world coordinates.
    pub x: f64,
    /// Top edge in world coordinates.
    pub y: f64,
    pub width: f64,
    pub height: f64,
    /// Stacking order within the layer; lower draws beneath higher.
    pub z_index: i64,
    pub opacity: f64,
    pub visible: bool,
    /// Whether the node participates in pointer interception.
    pub interactive: bool,
}

impl Node {
    /// A node with neutral defaults at the origin.
    #[must_use]
    pub fn new(layer: Layer, kind: NodeKind) -> Self {
        Self {
            id: NodeId(0),
            layer,
            kind,
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            z_index: 0,
            opacity: 1.0,
            visible: true,
            interactive: false,
        }
    }
}

/// The retained scene.
pub struct Scene {
    nodes: HashMap<NodeId, Node>,
    next_id: u64,
}

impl Scene {
    /// Create an empty scene.
    #[must_use]
    pub fn new() -> Self {
        Self { nodes: HashMap::new(), next_id: 1 }
    }

    /// Insert a node, assigning it the next id. Returns the assigned id.
    pub fn insert(&mut self, mut node: Node) -> NodeId {
        let id = NodeId(self.next_id);
        self.next_id += 1;
        node.id = id;
        self.nodes.insert(id, node);
        id
    }

    /// Remove a node, returning it if present.
    pub fn remove(&mut self, id: NodeId) -> Option<Node> {
        self.nodes.remove(&id)
    }

    /// Borrow a node by id.
    #[must_use]
    pub fn get(&self, id: NodeId) -> Option<&Node> {
        self.nodes.get(&id)
    }

    /// Mutably borrow a node by id.
    pub fn get_mut(&mut self, id: NodeId) -> Option<&mut Node> {
        self.nodes.get_mut(&id)
    }

    /// Nodes of one layer sorted by `(z_index, id)` for draw order.
    #[must_use]
    pub fn layer_nodes(&self, layer: Layer) -> Vec<&Node> {
        let mut nodes: Vec<&Node> = self.nodes.values().filter(|n| n.layer == layer).collect();
        nodes.sort_by(|a, b| a.z_index.cmp(&b.z_index).then_with(|| a.id.cmp(&b.id)));
        nodes
    }

    /// Number of nodes across all layers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the scene holds no nodes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Drop all nodes. Ids are not reused afterwards.
    pub fn clear(&mut self) {
        self.nodes.clear();
    }
}

impl Default for Scene {
    fn default() -> Self {
        Self::new()
    }
}
