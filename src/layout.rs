//! Layout-block rendering contract and the in-crate band renderer.
//!
//! The engine does not draw header/body/footer itself; it owns a
//! [`LayoutRenderer`] that materializes the three blocks as scene nodes and
//! keeps them positioned as page dimensions and margins change. The engine
//! pins the returned nodes at a fixed low z-index and marks them
//! non-interactive so tools never hit them.

#[cfg(test)]
#[path = "layout_test.rs"]
mod layout_test;

use crate::consts::LAYOUT_Z;
use crate::margins::MarginState;
use crate::scene::{BlockRole, Layer, Node, NodeId, NodeKind, Scene};

/// Initial configuration for a layout renderer.
#[derive(Debug, Clone, Copy)]
pub struct LayoutConfig {
    /// Page width in world units.
    pub width: f64,
    /// Page height in world units.
    pub height: f64,
    /// Current margins in px.
    pub margins: MarginState,
}

/// The three layout block nodes, as inserted into the content layer.
#[derive(Debug, Clone, Copy)]
pub struct LayoutBlocks {
    pub header: NodeId,
    pub body: NodeId,
    pub footer: NodeId,
}

impl LayoutBlocks {
    fn ids(self) -> [NodeId; 3] {
        [self.header, self.body, self.footer]
    }
}

/// Contract for the external layout-block renderer.
pub trait LayoutRenderer {
    /// Materialize the header/body/footer nodes into `scene` and return
    /// their handles. Called once per engine mount.
    fn create_layout(&mut self, scene: &mut Scene) -> LayoutBlocks;

    /// React to a page dimension change.
    fn update_config(&mut self, scene: &mut Scene, width: f64, height: f64);

    /// React to a margin change.
    fn update_margins(&mut self, scene: &mut Scene, margins: &MarginState);

    /// Remove the block nodes and drop internal state.
    fn destroy(&mut self, scene: &mut Scene);
}

/// Default renderer: header above the top margin line, footer below the
/// bottom margin line, body in between, all inset by the side margins.
pub struct BandLayoutRenderer {
    width: f64,
    height: f64,
    margins: MarginState,
    blocks: Option<LayoutBlocks>,
}

impl BandLayoutRenderer {
    #[must_use]
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            width: config.width,
            height: config.height,
            margins: config.margins,
            blocks: None,
        }
    }

    fn reposition(&self, scene: &mut Scene) {
        let Some(blocks) = self.blocks else {
            return;
        };
        let m = self.margins;
        let inner_width = (self.width - m.left - m.right).max(0.0);
        let body_height = (self.height - m.top - m.bottom).max(0.0);

        let frames = [
            (blocks.header, 0.0, m.top),
            (blocks.body, m.top, body_height),
            (blocks.footer, self.height - m.bottom, m.bottom),
        ];
        for (id, y, height) in frames {
            if let Some(node) = scene.get_mut(id) {
                node.x = m.left;
                node.y = y;
                node.width = inner_width;
                node.height = height;
            }
        }
    }

    fn insert_block(scene: &mut Scene, role: BlockRole) -> NodeId {
        let mut node = Node::new(Layer::Content, NodeKind::Block { role });
        node.z_index = LAYOUT_Z;
        node.interactive = false;
        scene.insert(node)
    }
}

impl LayoutRenderer for BandLayoutRenderer {
    fn create_layout(&mut self, scene: &mut Scene) -> LayoutBlocks {
        if let Some(blocks) = self.blocks {
            return blocks;
        }
        let blocks = LayoutBlocks {
            header: Self::insert_block(scene, BlockRole::Header),
            body: Self::insert_block(scene, BlockRole::Body),
            footer: Self::insert_block(scene, BlockRole::Footer),
        };
        self.blocks = Some(blocks);
        self.reposition(scene);
        blocks
    }

    fn update_config(&mut self, scene: &mut Scene, width: f64, height: f64) {
        self.width = width;
        self.height = height;
        self.reposition(scene);
    }

    fn update_margins(&mut self, scene: &mut Scene, margins: &MarginState) {
        self.margins = *margins;
        self.reposition(scene);
    }

    fn destroy(&mut self, scene: &mut Scene) {
        if let Some(blocks) = self.blocks.take() {
            for id in blocks.ids() {
                scene.remove(id);
            }
        }
    }
}
