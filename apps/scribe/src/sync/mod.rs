// Dual-surface synchronization: a rich editor and a raw markdown view over one
// canonical document. Authority decides who may write; the bridge debounces
// propagation; sessions tie both to export.
// Single-threaded by construction: deadlines are values, fired by the caller.

pub mod bridge;
pub mod controller;
pub mod document;
pub mod handlers;
pub mod session;
pub mod store;

pub use bridge::SyncConfig;
pub use session::EditorSession;
pub use store::{spawn_sync_pump, SessionStore};
