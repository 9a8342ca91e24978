use anyhow::Result;
use gem_cli::{
    canonical_command_name, parse_command, render_help_overview, unknown_command_message,
    CommandSpec,
};
use gem_extensions::{
    execute_extensions_command, ExtensionSessionRuntime, ExtensionsCommandStatus,
};

pub(crate) const COMMAND_SPECS: &[CommandSpec] = &[
    CommandSpec {
        name: "/extensions",
        usage: "/extensions <list|enable|disable> [name]",
        description: "Manage extensions for the current session",
    },
    CommandSpec {
        name: "/help",
        usage: "/help",
        description: "Show command list",
    },
    CommandSpec {
        name: "/quit",
        usage: "/quit",
        description: "Exit the session",
    },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum CommandAction {
    Continue,
    Exit,
}

pub(crate) fn handle_command(
    input: &str,
    runtime: &mut ExtensionSessionRuntime,
) -> Result<CommandAction> {
    let Some(parsed) = parse_command(input) else {
        println!("prompts are not handled by this build; run /help for commands");
        return Ok(CommandAction::Continue);
    };
    let command_name = canonical_command_name(parsed.name);

    if command_name == "/quit" {
        return Ok(CommandAction::Exit);
    }

    if command_name == "/help" {
        println!("{}", render_help_overview(COMMAND_SPECS));
        return Ok(CommandAction::Continue);
    }

    if command_name == "/extensions" {
        let outcome = execute_extensions_command(runtime, parsed.args);
        match outcome.status {
            ExtensionsCommandStatus::Info => println!("{}", outcome.message),
            ExtensionsCommandStatus::Error => println!("extensions error: {}", outcome.message),
        }
        return Ok(CommandAction::Continue);
    }

    let command_names = COMMAND_SPECS
        .iter()
        .map(|spec| spec.name)
        .collect::<Vec<_>>();
    println!("{}", unknown_command_message(command_name, &command_names));
    Ok(CommandAction::Continue)
}
