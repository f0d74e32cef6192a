//! Output formatting module

pub mod formatter;

pub use formatter::{formatter_for, save_report_to_file, suggest_filename, OutputFormatter};
