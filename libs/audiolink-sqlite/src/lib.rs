//! # AudioLink SQLite Adapter
//!
//! Implements the domain `AudioRepository` port with `sqlx` on SQLite.
//! Records live in a single `audio_files` table keyed by an
//! auto-incremented id.

mod pool;
mod repository;
mod schema;

pub use pool::{connect, connect_in_memory};
pub use repository::{insert_audio, SqliteAudioRepository};
pub use schema::init_schema;
