//! In-memory page state: the authoritative description of what the menu
//! currently shows.
//!
//! There is exactly one live [`Page`] per engine. Protocol updates mutate it
//! in place; they never build a second instance. Optional text fields are
//! tri-state ([`TextValue`]): never set, explicitly empty, or holding text.
//! The distinction is observable: an update that clears a field is not the
//! same as one that sets it to `""`.

/// Tri-state optional text field.
///
/// `Unset` means the field was never set (or was explicitly cleared with a
/// JSON null). `Set("")` is the distinct explicitly-empty state. Derived
/// equality gives the comparison rule the reconciler needs: two unset fields
/// are equal, unset vs. set-but-empty is not.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TextValue {
    #[default]
    Unset,
    Set(String),
}

impl TextValue {
    pub fn set(text: impl Into<String>) -> Self {
        TextValue::Set(text.into())
    }

    pub fn is_unset(&self) -> bool {
        matches!(self, TextValue::Unset)
    }

    pub fn as_deref(&self) -> Option<&str> {
        match self {
            TextValue::Unset => None,
            TextValue::Set(text) => Some(text),
        }
    }

    /// The text when set and non-empty; unset and explicitly-empty both
    /// collapse to `None`. Used where the renderer treats empty as "hide".
    pub fn visible(&self) -> Option<&str> {
        match self {
            TextValue::Set(text) if !text.is_empty() => Some(text),
            _ => None,
        }
    }

    pub fn or_empty(&self) -> &str {
        self.as_deref().unwrap_or("")
    }
}

/// Page-wide default for per-line markup, fixed at startup.
///
/// Only consulted when a line does not carry its own `markup` flag. Protocol
/// messages never change it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MarkupDefault {
    #[default]
    Unspecified,
    Enabled,
    Disabled,
}

impl MarkupDefault {
    pub fn enabled(self) -> bool {
        self == MarkupDefault::Enabled
    }
}

/// One menu row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Line {
    /// Display label.
    pub text: String,
    /// Alternate text used for filtering only; `text` is matched when absent.
    pub metatext: Option<String>,
    /// Icon reference; empty means no icon.
    pub icon: String,
    /// Opaque payload echoed back verbatim in outbound events.
    pub data: String,
    pub urgent: bool,
    pub highlight: bool,
    /// Rich-text markup enabled for this line.
    pub markup: bool,
    /// Cannot be accepted or deleted.
    pub nonselectable: bool,
    /// Participates in text filtering at all.
    pub filter: bool,
    /// Lazily-assigned icon fetch handle; 0 until first requested.
    pub icon_fetch_uid: u32,
}

impl Line {
    /// A line holding only a label, with the page's markup default applied.
    pub fn from_text(text: impl Into<String>, markup_default: MarkupDefault) -> Self {
        Line {
            text: text.into(),
            metatext: None,
            icon: String::new(),
            data: String::new(),
            urgent: false,
            highlight: false,
            markup: markup_default.enabled(),
            nonselectable: false,
            filter: true,
            icon_fetch_uid: 0,
        }
    }
}

/// The current page: overlay/prompt/input/filter/message state plus the
/// ordered line list.
#[derive(Debug, Clone, Default)]
pub struct Page {
    pub markup_default: MarkupDefault,
    pub message: TextValue,
    pub overlay: TextValue,
    pub prompt: TextValue,
    pub placeholder: TextValue,
    pub filter: TextValue,
    pub icon: TextValue,
    /// Text of the input box. Always defined; the protocol collapses null
    /// to empty rather than clearing it.
    pub input: String,
    pub case_sensitive: bool,
    pub lines: Vec<Line>,
}

impl Page {
    pub fn new(markup_default: MarkupDefault) -> Self {
        Page {
            markup_default,
            ..Page::default()
        }
    }

    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    pub fn line(&self, index: usize) -> Option<&Line> {
        self.lines.get(index)
    }

    /// The message when set and non-empty.
    pub fn message_text(&self) -> Option<&str> {
        self.message.visible()
    }
}
