//! Partial page updates decoded from one protocol line.
//!
//! A received line is expected to parse as one JSON object. Every recognized
//! top-level key is applied independently: absent keys leave their field
//! untouched, and wrong-typed values fall back to the current value. No
//! message can disturb fields it does not name. Malformed JSON is a
//! recoverable, logged condition that leaves the page exactly as it was.

use serde_json::Value;

use crate::page::{Line, MarkupDefault, Page, TextValue};

/// Mutable borrow of everything a protocol line may touch: the page itself
/// plus the engine-level controls that live outside it.
pub struct UpdateTarget<'a> {
    pub page: &'a mut Page,
    pub event_template: &'a mut String,
    pub close_on_exit: &'a mut bool,
    pub entry_to_focus: &'a mut Option<usize>,
}

/// Whether a JSON null clears the field back to unset, or collapses to the
/// explicitly-empty state.
#[derive(Clone, Copy, PartialEq, Eq)]
enum NullRule {
    Clears,
    Empties,
}

/// Apply one decoded line to the target. Returns false (and changes nothing)
/// when the line is not a JSON object.
pub fn apply(target: &mut UpdateTarget<'_>, line: &str) -> bool {
    let root: Value = match serde_json::from_str(line) {
        Ok(value) => value,
        Err(err) => {
            tracing::warn!("unable to parse line: {err}");
            return false;
        }
    };
    let Some(root) = root.as_object() else {
        tracing::warn!("protocol message is not a JSON object, skipping");
        return false;
    };

    let page = &mut *target.page;
    update_text(&mut page.icon, root.get("icon"), NullRule::Clears);
    page.case_sensitive = bool_or(root.get("case_sensitive"), page.case_sensitive);
    update_text(&mut page.placeholder, root.get("placeholder"), NullRule::Empties);
    update_text(&mut page.filter, root.get("filter"), NullRule::Clears);
    update_text(&mut page.message, root.get("message"), NullRule::Clears);
    update_text(&mut page.overlay, root.get("overlay"), NullRule::Clears);
    update_input(&mut page.input, root.get("input"));
    update_text(&mut page.prompt, root.get("prompt"), NullRule::Clears);
    *target.close_on_exit = bool_or(root.get("close_on_exit"), *target.close_on_exit);
    if let Some(template) = root.get("event_format").and_then(Value::as_str) {
        *target.event_template = template.to_string();
    }
    if let Some(elements) = root.get("lines").and_then(Value::as_array) {
        let markup_default = page.markup_default;
        page.lines = elements
            .iter()
            .filter_map(|node| line_from_value(node, markup_default))
            .collect();
    }
    *target.entry_to_focus = root
        .get("active_line")
        .and_then(Value::as_i64)
        .and_then(|index| usize::try_from(index).ok());
    true
}

fn update_text(field: &mut TextValue, node: Option<&Value>, on_null: NullRule) {
    match node {
        None => {}
        Some(Value::Null) => {
            *field = match on_null {
                NullRule::Clears => TextValue::Unset,
                NullRule::Empties => TextValue::set(""),
            };
        }
        Some(Value::String(text)) => *field = TextValue::set(text.clone()),
        Some(_) => {}
    }
}

fn update_input(input: &mut String, node: Option<&Value>) {
    match node {
        None => {}
        Some(Value::Null) => input.clear(),
        Some(Value::String(text)) => *input = text.clone(),
        Some(_) => {}
    }
}

fn bool_or(node: Option<&Value>, current: bool) -> bool {
    node.and_then(Value::as_bool).unwrap_or(current)
}

fn str_or<'v>(node: &'v serde_json::Map<String, Value>, key: &str, default: &'v str) -> &'v str {
    node.get(key).and_then(Value::as_str).unwrap_or(default)
}

fn line_bool(node: &serde_json::Map<String, Value>, key: &str, default: bool) -> bool {
    node.get(key).and_then(Value::as_bool).unwrap_or(default)
}

/// Build a line from one `lines` array element. Bare strings become plain
/// labels; objects pick from the recognized keys; anything else is skipped.
fn line_from_value(node: &Value, markup_default: MarkupDefault) -> Option<Line> {
    match node {
        Value::String(text) => Some(Line::from_text(text.clone(), markup_default)),
        Value::Object(fields) => {
            let mut line = Line::from_text(str_or(fields, "text", ""), markup_default);
            line.metatext = fields
                .get("metatext")
                .and_then(Value::as_str)
                .map(str::to_string);
            line.icon = str_or(fields, "icon", "").to_string();
            line.data = str_or(fields, "data", "").to_string();
            line.urgent = line_bool(fields, "urgent", false);
            line.highlight = line_bool(fields, "highlight", false);
            line.markup = line_bool(fields, "markup", markup_default.enabled());
            line.nonselectable = line_bool(fields, "nonselectable", false);
            line.filter = line_bool(fields, "filter", true);
            Some(line)
        }
        _ => None,
    }
}
