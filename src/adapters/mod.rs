//! Adapters implementing the domain ports against external systems.

pub mod oracle;
