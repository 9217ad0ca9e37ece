//! Wire protocol: newline-delimited JSON in, templated event lines out.

pub mod events;
pub mod framing;
pub mod update;

pub use events::{format_event, MenuEvent, DEFAULT_EVENT_FORMAT, PROTOCOL_VERSION};
pub use framing::LineFramer;
pub use update::{apply, UpdateTarget};
