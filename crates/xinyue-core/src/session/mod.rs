//! Per-identity search sessions and their page state.

pub mod model;

pub use model::{PageDirection, PageStep, Session};
