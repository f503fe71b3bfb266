//! Playlist persistence: a string key-value store and the typed slots kept in it.

mod kv;
mod model;
mod track_store;

pub use kv::{AnyStore, FileStore, KeyValueStore, MemoryStore};
pub use model::{DEFAULT_VOLUME, ExportBundle, PlaylistSettings, PlaylistState, RepeatMode};
pub use track_store::TrackStore;

#[cfg(test)]
mod tests;
