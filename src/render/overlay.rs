//! Text overlay drawn over the scene.

use crate::telemetry::OrientationSample;

/// What the overlay reports for one frame.
#[derive(Debug, Clone, Copy)]
pub struct OverlayState<'a> {
    pub sample: &'a OrientationSample,
    /// Samples published by the ingestion loop so far
    pub published: u64,
    pub link_up: bool,
    /// Measured presentation rate
    pub fps: f32,
}

/// Status text in the top-left corner and a key hint at the bottom.
#[derive(Debug, Clone)]
pub struct Overlay {
    /// Whether the overlay is drawn
    pub visible: bool,
}

impl Default for Overlay {
    fn default() -> Self {
        Self::new()
    }
}

impl Overlay {
    pub fn new() -> Self {
        Self { visible: true }
    }

    pub fn with_visibility(visible: bool) -> Self {
        Self { visible }
    }

    /// Lines shown in the top-left corner.
    pub fn lines(&self, state: &OverlayState<'_>) -> Vec<String> {
        let mut lines = vec![
            format!(" {} ", state.sample.grammar()),
            format!(" {} ", state.sample),
        ];
        if let Some(norm) = state.sample.quaternion_norm() {
            lines.push(format!(" |q| = {:.4} ", norm));
        }
        lines.push(format!(
            " samples: {} | link: {} | {:.0} fps ",
            state.published,
            if state.link_up { "up" } else { "down" },
            state.fps,
        ));
        lines
    }

    /// Key hint for the bottom row.
    pub fn footer(&self) -> &'static str {
        " q: quit "
    }
}
