//! Host renderer interface.
//!
//! The engine never draws anything itself. Every visible consequence of a
//! protocol update is narrowed down to one call on [`MenuView`], so a host
//! wires the trait to its real widget set while tests and the standalone
//! binary run against [`TraceView`].

/// Outcome of handing an icon query to the view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IconStatus {
    /// The icon resolved, or there is nothing to show.
    Ready,
    /// The icon is still being fetched; ask again once, later.
    Retry,
}

/// The renderer-side surface the reconciler drives.
///
/// Implementations must apply `set_prompt` to the visible prompt right away;
/// a plain reload is not expected to refresh it.
pub trait MenuView {
    fn set_prompt(&mut self, prompt: &str);
    /// `None` hides the overlay.
    fn set_overlay(&mut self, overlay: Option<&str>);
    /// `None` hides the placeholder.
    fn set_placeholder(&mut self, placeholder: Option<&str>);
    fn set_case_sensitive(&mut self, case_sensitive: bool);
    /// Display the page-level icon, `None` to clear it.
    fn show_icon(&mut self, icon: Option<&str>) -> IconStatus;
    /// Move the selection to the given entry index.
    fn set_selected(&mut self, index: usize);
    /// The text currently sitting in the input box.
    fn current_input(&self) -> String;
    fn clear_input(&mut self);
    fn push_input(&mut self, text: &str);
    /// Re-run filtering and redraw the entry list.
    fn reload(&mut self);
}

/// Asynchronous per-line icon loading, keyed by fetch uid.
pub trait IconCache {
    /// Start fetching `query` at the given pixel height and return the uid
    /// the host later redeems for the finished image.
    fn request(&mut self, query: &str, height: u32) -> u32;
}

/// Headless view that records nothing but the input box and logs every call.
#[derive(Default)]
pub struct TraceView {
    input: String,
}

impl MenuView for TraceView {
    fn set_prompt(&mut self, prompt: &str) {
        tracing::debug!(prompt, "view: prompt");
    }

    fn set_overlay(&mut self, overlay: Option<&str>) {
        tracing::debug!(?overlay, "view: overlay");
    }

    fn set_placeholder(&mut self, placeholder: Option<&str>) {
        tracing::debug!(?placeholder, "view: placeholder");
    }

    fn set_case_sensitive(&mut self, case_sensitive: bool) {
        tracing::debug!(case_sensitive, "view: case sensitivity");
    }

    fn show_icon(&mut self, icon: Option<&str>) -> IconStatus {
        tracing::debug!(?icon, "view: icon");
        IconStatus::Ready
    }

    fn set_selected(&mut self, index: usize) {
        tracing::debug!(index, "view: selection");
    }

    fn current_input(&self) -> String {
        self.input.clone()
    }

    fn clear_input(&mut self) {
        self.input.clear();
    }

    fn push_input(&mut self, text: &str) {
        self.input.push_str(text);
    }

    fn reload(&mut self) {
        tracing::debug!("view: reload");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trace_view_tracks_its_input_box() {
        let mut view = TraceView::default();
        assert_eq!(view.current_input(), "");
        view.push_input("hello");
        assert_eq!(view.current_input(), "hello");
        view.clear_input();
        view.push_input("again");
        assert_eq!(view.current_input(), "again");
    }

    #[test]
    fn trace_view_icons_are_always_ready() {
        let mut view = TraceView::default();
        assert_eq!(view.show_icon(Some("folder")), IconStatus::Ready);
        assert_eq!(view.show_icon(None), IconStatus::Ready);
    }
}
