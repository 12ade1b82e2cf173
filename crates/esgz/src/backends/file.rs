//! 📂 Previously, on "Things That Could Go Wrong With A File"...
//!
//! The pipe was quiet. Too quiet. Then `cat app.log |` happened and a million
//! lines showed up at once. This module reads them one at a time, whether
//! they come from stdin or from a file on disk, and hands each non-empty line
//! to whoever asks next.
//!
//! 💀 Invalid UTF-8 → `PipelineError::Input`. We read text. Text is UTF-8. Mostly.
//! 🦆 (mandatory, no notes)

mod file_source;

pub(crate) use file_source::FileSource;
pub use file_source::FileSourceConfig;
