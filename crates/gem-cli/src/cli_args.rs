use std::path::PathBuf;

use clap::{ArgAction, Parser};

#[derive(Debug, Parser)]
#[command(
    name = "gem-rs",
    about = "Rust agent CLI with Gemini-compatible extension management",
    version
)]
/// Public struct `Cli` used across Gem components.
pub struct Cli {
    #[arg(
        long = "workspace-root",
        env = "GEM_WORKSPACE_ROOT",
        default_value = ".",
        help = "Workspace root scanned for .gemini/extensions"
    )]
    pub workspace_root: PathBuf,

    #[arg(
        long = "home-override",
        env = "GEM_HOME_OVERRIDE",
        help = "Override for the user home directory scanned for .gemini/extensions"
    )]
    pub home_override: Option<PathBuf>,

    #[arg(
        long = "extensions",
        env = "GEM_EXTENSIONS",
        value_delimiter = ',',
        help = "Activate only the named extensions. Pass 'none' to disable all extensions."
    )]
    pub extensions: Vec<String>,

    #[arg(
        long = "additional-extensions",
        env = "GEM_ADDITIONAL_EXTENSIONS",
        value_delimiter = ',',
        help = "Enable the named extensions on top of their manifest defaults"
    )]
    pub additional_extensions: Vec<String>,

    #[arg(
        long = "list-extensions",
        action = ArgAction::SetTrue,
        help = "List discovered extensions with their session status and exit"
    )]
    pub list_extensions: bool,

    #[arg(
        long = "command",
        help = "Dispatch one slash command (for example '/extensions list') and exit"
    )]
    pub command: Option<String>,
}
