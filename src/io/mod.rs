//! File I/O for view factor cases and results.

pub mod case;

pub use case::{Case, read_case, write_result};
