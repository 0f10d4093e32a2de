//! Library facade for the `trainer` demo so integration tests can reuse the
//! models and command wiring.

pub mod cli;
pub mod error;
pub mod models;
pub mod report;
