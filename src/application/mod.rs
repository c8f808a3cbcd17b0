//! Application layer: the correction loop and the batch driver built on it.

pub mod batch_driver;
pub mod chunk_io;
pub mod correction_loop;

pub use batch_driver::{discover_chunks, BatchDriver, BatchReport, ChunkJob, ChunkReport, ChunkStatus};
pub use chunk_io::{read_document, write_document};
pub use correction_loop::{
    replay, CorrectionEngine, CorrectionOutcome, CorrectionSettings, Recovered,
};
