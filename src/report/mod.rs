//! Result serialization and end-of-run reporting.

mod writer;

pub use writer::{print_summary, write_results, RunReport};
