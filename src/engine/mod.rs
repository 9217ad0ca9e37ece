//! The protocol-facing state machine.
//!
//! [`Engine`] owns the page, the outbound event template and the compiled
//! filter tokens. Inbound lines mutate it through [`reconcile::process_line`];
//! the host renderer talks to it through the interaction methods, each of
//! which emits at most one event.

pub mod reconcile;

use crate::filter::{self, FilterTokens, TokenSet, Tokenizer};
use crate::page::{Line, MarkupDefault, Page};
use crate::protocol::events::{format_event, MenuEvent, PROTOCOL_VERSION};
use crate::protocol::update::{self, UpdateTarget};
use crate::source::OutboundChannel;
use crate::view::{IconCache, IconStatus, MenuView};

/// Per-entry render hints handed to the host.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct EntryFlags {
    pub urgent: bool,
    pub highlight: bool,
    pub markup: bool,
}

/// A qualifying user interaction, as classified by the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InteractionKind {
    Accept { alt: bool },
    Delete,
    AcceptInput { alt: bool },
    Complete,
    /// Custom key number, already folded into 1..=20 by the host.
    CustomKey(u8),
    Cancel,
}

/// What the host should do after an interaction was handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Reload,
    Exit,
}

/// One-shot tasks scheduled during a reconcile pass and run after the
/// current burst of lines has been drained.
#[derive(Default)]
struct Deferred {
    icon_retry: bool,
    input_check: bool,
}

pub struct Engine {
    page: Page,
    event_template: String,
    close_on_exit: bool,
    entry_to_focus: Option<usize>,
    tokens: FilterTokens,
    tokenizer: Box<dyn Tokenizer>,
    outbound: Option<OutboundChannel>,
    deferred: Deferred,
}

impl Engine {
    pub fn new(
        markup_default: MarkupDefault,
        event_template: String,
        tokenizer: Box<dyn Tokenizer>,
    ) -> Self {
        Self {
            page: Page::new(markup_default),
            event_template,
            close_on_exit: true,
            entry_to_focus: None,
            tokens: FilterTokens::default(),
            tokenizer,
            outbound: None,
            deferred: Deferred::default(),
        }
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn close_on_exit(&self) -> bool {
        self.close_on_exit
    }

    pub fn event_template(&self) -> &str {
        &self.event_template
    }

    // ========================================================================
    // outbound events
    // ========================================================================

    pub fn attach_outbound(&mut self, channel: OutboundChannel) {
        self.outbound = Some(channel);
    }

    /// Drop the outbound side. Every later emit becomes a silent no-op.
    pub fn close_outbound(&mut self) {
        if let Some(outbound) = self.outbound.take() {
            outbound.close();
        }
    }

    /// Render the event through the current template and hand it to the
    /// writer. Never fails; an absent or dead channel swallows the event.
    pub fn emit(&self, event: MenuEvent, value: &str, data: &str) {
        let Some(outbound) = &self.outbound else {
            return;
        };
        let mut message = format_event(&self.event_template, event, value, data);
        message.push('\n');
        if outbound.send(message) {
            tracing::debug!(event = event.label(), "event emitted");
        }
    }

    /// The handshake sent once the channels are up.
    pub fn emit_init(&self) {
        self.emit(
            MenuEvent::Init,
            env!("CARGO_PKG_VERSION"),
            &PROTOCOL_VERSION.to_string(),
        );
    }

    /// Final event plus channel teardown.
    pub fn shutdown(&mut self) {
        self.emit(MenuEvent::Exit, "", "");
        self.close_outbound();
    }

    // ========================================================================
    // reconcile support
    // ========================================================================

    fn apply_update(&mut self, line: &str) -> bool {
        let mut target = UpdateTarget {
            page: &mut self.page,
            event_template: &mut self.event_template,
            close_on_exit: &mut self.close_on_exit,
            entry_to_focus: &mut self.entry_to_focus,
        };
        update::apply(&mut target, line)
    }

    fn rebuild_tokens(&mut self) {
        self.tokens
            .rebuild(self.tokenizer.as_ref(), &self.page.filter, self.page.case_sensitive);
    }

    /// The pending focus instruction, consumed on read.
    fn take_focus(&mut self) -> Option<usize> {
        self.entry_to_focus.take()
    }

    fn schedule_icon_retry(&mut self) {
        self.deferred.icon_retry = true;
    }

    fn schedule_input_check(&mut self) {
        self.deferred.input_check = true;
    }

    /// Run whatever one-shot tasks the last reconcile pass left behind.
    /// An icon that is still loading re-arms itself for the next cycle.
    pub fn drain_deferred(&mut self, view: &mut dyn MenuView) {
        if std::mem::take(&mut self.deferred.icon_retry)
            && view.show_icon(self.page.icon.as_deref()) == IconStatus::Retry
        {
            self.deferred.icon_retry = true;
        }
        if std::mem::take(&mut self.deferred.input_check) {
            self.verify_input(view);
        }
    }

    /// Catch input edits the host applied without telling us.
    fn verify_input(&mut self, view: &mut dyn MenuView) {
        let current = view.current_input();
        if current != self.page.input {
            self.emit(MenuEvent::InputChange, &current, "");
            self.page.input = current;
        }
    }

    // ========================================================================
    // interaction API (called by the host renderer)
    // ========================================================================

    pub fn entry_count(&self) -> usize {
        self.page.line_count()
    }

    pub fn entry_text(&self, index: usize) -> Option<&str> {
        self.page.line(index).map(|line| line.text.as_str())
    }

    pub fn entry_flags(&self, index: usize) -> EntryFlags {
        match self.page.line(index) {
            Some(line) => EntryFlags {
                urgent: line.urgent,
                highlight: line.highlight,
                markup: line.markup,
            },
            None => EntryFlags::default(),
        }
    }

    /// The message row, `None` when unset or empty.
    pub fn message(&self) -> Option<&str> {
        self.page.message_text()
    }

    /// Lazily assign the line's icon fetch uid through the cache. `None`
    /// when the line has no icon.
    pub fn entry_icon_uid(
        &mut self,
        index: usize,
        height: u32,
        cache: &mut dyn IconCache,
    ) -> Option<u32> {
        let line = self.page.lines.get_mut(index)?;
        if line.icon.is_empty() {
            return None;
        }
        if line.icon_fetch_uid == 0 {
            line.icon_fetch_uid = cache.request(&line.icon, height);
        }
        Some(line.icon_fetch_uid)
    }

    /// Whether the entry passes filtering. `host` carries the host's own
    /// compiled query; the page filter overrides it while defined.
    pub fn entry_matches(&self, index: usize, host: Option<&dyn TokenSet>) -> bool {
        match self.page.line(index) {
            Some(line) => filter::entry_matches(line, &self.tokens, host),
            None => false,
        }
    }

    /// Record a new input box value and return the text the host should
    /// actually match entries against.
    pub fn input_changed(&mut self, new_input: &str) -> String {
        if new_input != self.page.input {
            self.page.input = new_input.to_string();
            self.emit(MenuEvent::InputChange, new_input, "");
        }
        match self.page.filter.as_deref() {
            Some(override_text) => override_text.to_string(),
            None => self.page.input.clone(),
        }
    }

    /// The highlighted entry moved. Out-of-range and `None` report empty
    /// value and data.
    pub fn selection_changed(&self, index: Option<usize>) {
        match index.and_then(|i| self.page.line(i)) {
            Some(line) => self.emit(MenuEvent::ActiveEntry, &line.text, &line.data),
            None => self.emit(MenuEvent::ActiveEntry, "", ""),
        }
    }

    /// Handle one classified interaction, emitting its event.
    pub fn interaction(
        &self,
        kind: InteractionKind,
        selected: Option<usize>,
        input: &str,
    ) -> Disposition {
        match kind {
            InteractionKind::Accept { alt } => {
                if let Some(line) = selectable_line(&self.page, selected) {
                    let event = if alt {
                        MenuEvent::AcceptEntryAlt
                    } else {
                        MenuEvent::AcceptEntry
                    };
                    self.emit(event, &line.text, &line.data);
                }
                Disposition::Reload
            }
            InteractionKind::Delete => {
                if let Some(line) = selectable_line(&self.page, selected) {
                    self.emit(MenuEvent::DeleteEntry, &line.text, &line.data);
                }
                Disposition::Reload
            }
            InteractionKind::AcceptInput { alt } => {
                let event = if alt {
                    MenuEvent::AcceptInputAlt
                } else {
                    MenuEvent::AcceptInput
                };
                self.emit(event, input, selected_flag(&self.page, selected));
                Disposition::Reload
            }
            InteractionKind::Complete => {
                self.emit(MenuEvent::Complete, "", "");
                Disposition::Reload
            }
            InteractionKind::CustomKey(number) => {
                self.emit(
                    MenuEvent::CustomKey,
                    &number.to_string(),
                    selected_flag(&self.page, selected),
                );
                Disposition::Reload
            }
            InteractionKind::Cancel => {
                self.emit(MenuEvent::Cancel, "", "");
                Disposition::Exit
            }
        }
    }
}

/// The line behind a selection, unless it is missing or opted out.
fn selectable_line(page: &Page, selected: Option<usize>) -> Option<&Line> {
    let line = selected.and_then(|index| page.line(index))?;
    if line.nonselectable {
        return None;
    }
    Some(line)
}

/// "1" while a real row is highlighted. A stale index pointing past the
/// current line list counts as no selection.
fn selected_flag(page: &Page, selected: Option<usize>) -> &'static str {
    if selected.is_some_and(|index| index < page.line_count()) {
        "1"
    } else {
        ""
    }
}
