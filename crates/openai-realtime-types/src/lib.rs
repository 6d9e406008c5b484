//! Wire types for the realtime conversation protocol.
pub mod audio;
pub mod events;
pub mod session;
pub mod tools;
mod content;

// re-export types for easier access
pub use content::items::{FunctionCallItem, FunctionCallOutputItem, Item, ItemStatus};
pub use content::message::*;
pub use events::{ClientEvent, ServerEvent};
pub use session::Session;
