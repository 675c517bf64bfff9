//! The boundary to the rendering host.
//!
//! The engine builds complete style state and pushes it through this sink in
//! one pass; hosts replace whole renderers/style lists, never edit them
//! incrementally.

use crate::renderer::{LabelStyle, OrderBy, Renderer, TileStyle};

pub trait RenderHost {
    /// Replace the layer's renderer (single-renderer mode).
    fn set_renderer(&mut self, renderer: Renderer);

    /// Replace the layer's rule list (rule-list mode).
    fn set_styles(&mut self, styles: Vec<TileStyle>);

    /// Configure text labeling.
    fn set_labeling(&mut self, labeling: LabelStyle);

    /// Set the feature draw order.
    fn set_feature_order(&mut self, order: OrderBy);

    /// Hide symbol-based rendering entirely (label-only layers).
    fn clear_symbology(&mut self);
}

/// In-memory host that records what the engine pushed. Backs the test suite
/// and the CLI's JSON dump.
#[derive(Debug, Default, serde::Serialize)]
pub struct RecordedHost {
    pub renderer: Option<Renderer>,
    pub styles: Option<Vec<TileStyle>>,
    pub labeling: Option<LabelStyle>,
    pub order: Option<OrderBy>,
    pub symbology_cleared: bool,
}

impl RenderHost for RecordedHost {
    fn set_renderer(&mut self, renderer: Renderer) {
        self.renderer = Some(renderer);
    }

    fn set_styles(&mut self, styles: Vec<TileStyle>) {
        self.styles = Some(styles);
    }

    fn set_labeling(&mut self, labeling: LabelStyle) {
        self.labeling = Some(labeling);
    }

    fn set_feature_order(&mut self, order: OrderBy) {
        self.order = Some(order);
    }

    fn clear_symbology(&mut self) {
        self.renderer = Some(Renderer::Null);
        if let Some(styles) = &mut self.styles {
            for style in styles {
                style.enabled = false;
            }
        }
        self.symbology_cleared = true;
    }
}
