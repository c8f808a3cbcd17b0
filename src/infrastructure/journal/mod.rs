//! Step journal backends

pub mod file_journal;
pub mod memory_journal;

pub use file_journal::FileStepJournal;
pub use memory_journal::InMemoryStepJournal;
