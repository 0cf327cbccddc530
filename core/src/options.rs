use serde::{Deserialize, Serialize};

use crate::{render::Colormap, stats::Levels};

/// How a viewer window presents its array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerOptions {
    pub title: String,
    /// Block the caller until the window is closed.
    pub modal: bool,
    pub colormap: Colormap,
    pub levels: Levels,
    pub initial_window_size: (f32, f32),
    /// Distance between slider tick marks, in index steps.
    pub tick_interval: usize,
}

impl Default for ViewerOptions {
    fn default() -> Self {
        Self {
            title: "Image Viewer".to_string(),
            modal: true,
            colormap: Colormap::default(),
            levels: Levels::default(),
            initial_window_size: (640.0, 720.0),
            tick_interval: 10,
        }
    }
}

impl ViewerOptions {
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = title.into();
        self
    }

    pub fn modal(mut self, modal: bool) -> Self {
        self.modal = modal;
        self
    }

    pub fn colormap(mut self, colormap: Colormap) -> Self {
        self.colormap = colormap;
        self
    }

    pub fn levels(mut self, levels: Levels) -> Self {
        self.levels = levels;
        self
    }

    pub fn initial_window_size(mut self, width: f32, height: f32) -> Self {
        self.initial_window_size = (width, height);
        self
    }

    pub fn tick_interval(mut self, tick_interval: usize) -> Self {
        self.tick_interval = tick_interval;
        self
    }
}

#[cfg(test)]
mod tests {
    use crate::stats::RangeIncl;

    use super::*;

    #[test]
    fn defaults() {
        let options = ViewerOptions::default();
        assert_eq!(options.title, "Image Viewer");
        assert!(options.modal);
        assert_eq!(options.colormap, Colormap::Gray);
        assert_eq!(options.levels, Levels::Auto);
        assert_eq!(options.tick_interval, 10);
    }

    #[test]
    fn builder_overrides() {
        let options = ViewerOptions::default()
            .title("slices")
            .modal(false)
            .colormap(Colormap::Heat)
            .levels(Levels::Fixed(RangeIncl::new(0.0, 1.0)))
            .initial_window_size(300.0, 200.0)
            .tick_interval(4);

        assert_eq!(options.title, "slices");
        assert!(!options.modal);
        assert_eq!(options.colormap, Colormap::Heat);
        assert_eq!(options.levels, Levels::Fixed(RangeIncl::new(0.0, 1.0)));
        assert_eq!(options.initial_window_size, (300.0, 200.0));
        assert_eq!(options.tick_interval, 4);
    }
}
