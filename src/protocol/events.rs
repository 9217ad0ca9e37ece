//! Outbound protocol events.
//!
//! Every qualifying user interaction becomes exactly one message on the
//! outbound channel, rendered through a user-configurable template. The
//! default template is a JSON object literal; scripts that want a different
//! framing can replace it per message batch via the `event_format` page key
//! or up front on the command line.

/// Version number of the wire protocol, sent in the INIT handshake.
pub const PROTOCOL_VERSION: u32 = 1;

/// Default outbound message template.
pub const DEFAULT_EVENT_FORMAT: &str =
    "{\"event\":\"{{event}}\", \"value\":\"{{value_escaped}}\", \"data\":\"{{data_escaped}}\"}";

/// The user-interaction (and lifecycle) events the engine reports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuEvent {
    /// Engine ready; value carries the crate version, data the protocol
    /// version number.
    Init,
    InputChange,
    /// Selection moved to another row (or away from any row).
    ActiveEntry,
    AcceptEntry,
    AcceptEntryAlt,
    AcceptInput,
    AcceptInputAlt,
    Complete,
    DeleteEntry,
    /// A numbered custom key; data flags whether a row was selected.
    CustomKey,
    Cancel,
    Exit,
}

impl MenuEvent {
    /// Symbolic name substituted for `{{event}}`.
    pub fn label(self) -> &'static str {
        match self {
            MenuEvent::Init => "INIT",
            MenuEvent::InputChange => "INPUT_CHANGE",
            MenuEvent::ActiveEntry => "ACTIVE_ENTRY",
            MenuEvent::AcceptEntry => "ACCEPT_ENTRY",
            MenuEvent::AcceptEntryAlt => "ACCEPT_ENTRY_ALT",
            MenuEvent::AcceptInput => "ACCEPT_INPUT",
            MenuEvent::AcceptInputAlt => "ACCEPT_INPUT_ALT",
            MenuEvent::Complete => "COMPLETE",
            MenuEvent::DeleteEntry => "DELETE_ENTRY",
            MenuEvent::CustomKey => "CUSTOM_KEY",
            MenuEvent::Cancel => "CANCEL",
            MenuEvent::Exit => "EXIT",
        }
    }
}

/// Render one outbound message from the template.
///
/// Placeholders are substituted in a fixed order: `{{event}}`, `{{value}}`,
/// `{{data}}`, then the escaped pair. The caller appends the line terminator.
pub fn format_event(template: &str, event: MenuEvent, value: &str, data: &str) -> String {
    let result = template.replace("{{event}}", event.label());
    let result = result.replace("{{value}}", value);
    let result = result.replace("{{data}}", data);
    let result = result.replace("{{value_escaped}}", &escape_json_string(value));
    result.replace("{{data_escaped}}", &escape_json_string(data))
}

/// JSON-string-escape `text` (no surrounding quotes).
pub fn escape_json_string(text: &str) -> String {
    // serde_json renders a quoted JSON string; strip the quotes it adds.
    match serde_json::to_string(text) {
        Ok(quoted) => quoted[1..quoted.len() - 1].to_string(),
        Err(_) => String::new(),
    }
}
