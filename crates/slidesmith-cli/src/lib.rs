//! slidesmith CLI library
//!
//! Command implementations behind the `slidesmith` binary, exposed for
//! integration tests.
//!
//! # Commands
//!
//! - `generate`: outline file (and optional theme) to `.pptx`
//! - `request`: JSON generation request to JSON response
//! - `inspect-theme`: list what a theme package provides

pub mod app;

pub use app::{
    answer_request, format_theme, generate_command, inspect_theme_command, load_style,
    request_command, run_cli, split_outline, OutputFormat,
};
