pub trait PresentationSurface {
    fn show_busy(&mut self, visible: bool);
    fn show_start_affordance(&mut self, visible: bool);
    fn show_refresh_affordance(&mut self, visible: bool);
    fn render_items(&mut self, items: &[String]);
    /// Switch the surface to its generic error indicator until the next
    /// `render_items`.
    fn render_error(&mut self);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LaneView {
    pub busy: bool,
    pub start: bool,
    pub refresh: bool,
    pub items: Vec<String>,
    pub error: bool,
}

impl Default for LaneView {
    fn default() -> Self {
        Self {
            busy: false,
            start: true,
            refresh: false,
            items: Vec::new(),
            error: false,
        }
    }
}

impl PresentationSurface for LaneView {
    fn show_busy(&mut self, visible: bool) {
        self.busy = visible;
    }

    fn show_start_affordance(&mut self, visible: bool) {
        self.start = visible;
    }

    fn show_refresh_affordance(&mut self, visible: bool) {
        self.refresh = visible;
    }

    fn render_items(&mut self, items: &[String]) {
        self.items = items.to_vec();
        self.error = false;
    }

    fn render_error(&mut self) {
        self.error = true;
    }
}
