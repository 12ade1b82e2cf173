//! # Previously, on esgz...
//!
//! 🎬 The lines were trapped in a `Vec`. The payloads had nowhere to go but
//! another `Vec`. This module is both of those `Vec`s.
//!
//! [`InMemorySource`] replays a fixed list of lines; [`InMemorySink`] hoards every
//! payload it's handed behind an `Arc<Mutex<..>>` so tests can peek afterwards.
//!
//! ⚠️ This is for tests and dry runs. No network. No disk. Just heap and vibes. 🦆

mod in_mem_sink;
mod in_mem_source;

pub(crate) use in_mem_sink::InMemorySink;
pub(crate) use in_mem_source::InMemorySource;
pub use in_mem_source::InMemorySourceConfig;
