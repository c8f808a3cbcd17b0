//! Service layer
//!
//! Stateless business logic used by the correction loop.

pub mod merge;

pub use merge::merge;
