//! Engine for pipe-driven interactive menus.
//!
//! An external process writes newline-delimited JSON objects that describe
//! the menu page; qualifying user interactions flow back to it as templated
//! JSON event lines. The crate keeps the protocol, the page state and the
//! reconciliation logic host-agnostic: a renderer plugs in behind the
//! [`view::MenuView`] trait and its matching algorithm behind
//! [`filter::Tokenizer`], while the bundled binary runs the same engine
//! headless over stdio or a wrapped command.

pub mod cli;
pub mod config;
pub mod engine;
pub mod filter;
pub mod page;
pub mod protocol;
pub mod runtime;
pub mod source;
pub mod view;

pub use engine::{Disposition, Engine, EntryFlags, InteractionKind};
pub use page::{Line, MarkupDefault, Page, TextValue};
pub use runtime::{RunOutcome, Runtime};
pub use view::{IconCache, IconStatus, MenuView, TraceView};
