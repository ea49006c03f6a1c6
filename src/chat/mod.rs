//! Chat window for SheetChat
//!
//! - `transcript`: append-only, id-ordered message list
//! - `window`: upload gating, question dispatch and answer handling
//! - `render`: terminal rendering and chart export

pub mod render;
pub mod transcript;
pub mod window;

pub use render::{ChartExporter, MessageList};
pub use transcript::{ChatEntry, EntryKind, Transcript};
pub use window::{ChatPhase, ChatWindow, SubmitOutcome};
