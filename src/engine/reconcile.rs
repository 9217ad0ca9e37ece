//! Turning a decoded line into the minimum set of renderer calls.
//!
//! The page is snapshotted before the update is applied and diffed after, so
//! a field that did not change never reaches the view. Only the reload at
//! the end is unconditional: for every decoded object the host refilters and
//! redraws, matching the protocol's observable contract.

use crate::engine::Engine;
use crate::page::TextValue;
use crate::view::{IconStatus, MenuView};

/// The renderer-relevant slice of the page, cloned cheaply before a decode.
struct Snapshot {
    icon: TextValue,
    filter: TextValue,
    overlay: TextValue,
    placeholder: TextValue,
    prompt: TextValue,
    input: String,
    case_sensitive: bool,
}

impl Snapshot {
    fn take(engine: &Engine) -> Self {
        let page = engine.page();
        Snapshot {
            icon: page.icon.clone(),
            filter: page.filter.clone(),
            overlay: page.overlay.clone(),
            placeholder: page.placeholder.clone(),
            prompt: page.prompt.clone(),
            input: page.input.clone(),
            case_sensitive: page.case_sensitive,
        }
    }
}

/// Apply one protocol line and reflect whatever changed onto the view.
///
/// Returns false when the line failed to decode; state and renderer are left
/// exactly as they were.
pub fn process_line(engine: &mut Engine, view: &mut dyn MenuView, line: &str) -> bool {
    tracing::debug!(line, "update received");
    let before = Snapshot::take(engine);
    if !engine.apply_update(line) {
        return false;
    }
    let after = Snapshot::take(engine);

    if before.icon != after.icon && view.show_icon(after.icon.as_deref()) == IconStatus::Retry {
        engine.schedule_icon_retry();
    }
    if before.filter != after.filter || before.case_sensitive != after.case_sensitive {
        engine.rebuild_tokens();
        view.set_case_sensitive(after.case_sensitive);
    }
    if before.overlay != after.overlay {
        view.set_overlay(after.overlay.visible());
    }
    if before.placeholder != after.placeholder {
        view.set_placeholder(after.placeholder.visible());
    }
    if before.input != after.input {
        view.clear_input();
        view.push_input(&after.input);
    }
    if before.prompt != after.prompt {
        view.set_prompt(after.prompt.or_empty());
    }
    if let Some(index) = engine.take_focus() {
        view.set_selected(index);
    }
    view.reload();
    engine.schedule_input_check();
    true
}
