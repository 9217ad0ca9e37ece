//! Shared test utilities.

#![allow(dead_code, unused_imports)]

use pipemenu::engine::Engine;
use pipemenu::filter::SubstringTokenizer;
use pipemenu::page::MarkupDefault;
use pipemenu::protocol::events::DEFAULT_EVENT_FORMAT;
use pipemenu::source::OutboundChannel;
use pipemenu::view::{IconStatus, MenuView};
use tokio::sync::mpsc::UnboundedReceiver;

/// Engine with the stock template and the substring matcher.
pub fn make_engine() -> Engine {
    Engine::new(
        MarkupDefault::Unspecified,
        DEFAULT_EVENT_FORMAT.to_string(),
        Box::new(SubstringTokenizer),
    )
}

/// Engine with an attached outbound channel plus the receiving end.
pub fn wired_engine() -> (Engine, UnboundedReceiver<String>) {
    let mut engine = make_engine();
    let (channel, rx) = OutboundChannel::pair();
    engine.attach_outbound(channel);
    (engine, rx)
}

/// Next emitted line, raw, terminator included.
pub fn next_raw(rx: &mut UnboundedReceiver<String>) -> String {
    rx.try_recv().expect("an event should have been emitted")
}

/// Next emitted line parsed as JSON.
pub fn next_event(rx: &mut UnboundedReceiver<String>) -> serde_json::Value {
    let line = next_raw(rx);
    assert!(line.ends_with('\n'), "event lines are newline terminated");
    serde_json::from_str(line.trim_end()).expect("event must be valid JSON")
}

pub fn assert_no_event(rx: &mut UnboundedReceiver<String>) {
    assert!(rx.try_recv().is_err(), "no event expected");
}

/// View that records every renderer call in order.
#[derive(Default)]
pub struct RecordingView {
    pub calls: Vec<String>,
    pub input: String,
    pub icon_still_loading: bool,
}

impl RecordingView {
    pub fn count(&self, prefix: &str) -> usize {
        self.calls
            .iter()
            .filter(|call| call.starts_with(prefix))
            .count()
    }
}

impl MenuView for RecordingView {
    fn set_prompt(&mut self, prompt: &str) {
        self.calls.push(format!("prompt={prompt}"));
    }
    fn set_overlay(&mut self, overlay: Option<&str>) {
        self.calls.push(format!("overlay={overlay:?}"));
    }
    fn set_placeholder(&mut self, placeholder: Option<&str>) {
        self.calls.push(format!("placeholder={placeholder:?}"));
    }
    fn set_case_sensitive(&mut self, case_sensitive: bool) {
        self.calls.push(format!("case={case_sensitive}"));
    }
    fn show_icon(&mut self, icon: Option<&str>) -> IconStatus {
        self.calls.push(format!("icon={icon:?}"));
        if self.icon_still_loading {
            IconStatus::Retry
        } else {
            IconStatus::Ready
        }
    }
    fn set_selected(&mut self, index: usize) {
        self.calls.push(format!("selected={index}"));
    }
    fn current_input(&self) -> String {
        self.input.clone()
    }
    fn clear_input(&mut self) {
        self.input.clear();
        self.calls.push("clear_input".to_string());
    }
    fn push_input(&mut self, text: &str) {
        self.input.push_str(text);
        self.calls.push(format!("push={text}"));
    }
    fn reload(&mut self) {
        self.calls.push("reload".to_string());
    }
}
