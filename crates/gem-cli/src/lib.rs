//! CLI argument model and command text utilities for Gem binaries.
//!
//! Exposes the clap-backed flag surface plus the slash-command tokenizer and
//! help rendering shared by the interactive loop and one-shot dispatch.

pub mod cli_args;
pub mod command_text;

pub use cli_args::Cli;
pub use command_text::*;
