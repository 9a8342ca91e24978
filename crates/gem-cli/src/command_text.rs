#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Public struct `ParsedCommand` used across Gem components.
pub struct ParsedCommand<'a> {
    pub name: &'a str,
    pub args: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Public struct `CommandSpec` used across Gem components.
pub struct CommandSpec {
    pub name: &'static str,
    pub usage: &'static str,
    pub description: &'static str,
}

pub fn parse_command(input: &str) -> Option<ParsedCommand<'_>> {
    let trimmed = input.trim();
    if !trimmed.starts_with('/') {
        return None;
    }

    let mut parts = trimmed.splitn(2, char::is_whitespace);
    let name = parts.next().unwrap_or_default();
    let args = parts.next().map(str::trim).unwrap_or_default();
    Some(ParsedCommand { name, args })
}

pub fn canonical_command_name(name: &str) -> &str {
    if name == "/exit" {
        "/quit"
    } else {
        name
    }
}

pub fn render_help_overview(command_specs: &[CommandSpec]) -> String {
    let mut lines = vec!["commands:".to_string()];
    for spec in command_specs {
        lines.push(format!("  {:<34} {}", spec.usage, spec.description));
    }
    lines.join("\n")
}

pub fn unknown_command_message(command: &str, command_names: &[&str]) -> String {
    match suggest_command(command, command_names) {
        Some(suggestion) => {
            format!("unknown command: {command}\ndid you mean {suggestion}?\nrun /help for command list")
        }
        None => format!("unknown command: {command}\nrun /help for command list"),
    }
}

fn suggest_command<'a>(command: &str, command_names: &'a [&str]) -> Option<&'a str> {
    let command = canonical_command_name(command);
    if command.is_empty() {
        return None;
    }

    if let Some(prefix_match) = command_names
        .iter()
        .copied()
        .find(|candidate| candidate.starts_with(command))
    {
        return Some(prefix_match);
    }

    let mut best: Option<(&str, usize)> = None;
    for candidate in command_names.iter().copied() {
        let distance = levenshtein_distance(command, candidate);
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((candidate, distance)),
        }
    }

    let (candidate, distance) = best?;
    let threshold = match command.len() {
        0..=4 => 1,
        5..=8 => 2,
        _ => 3,
    };
    if distance <= threshold {
        Some(candidate)
    } else {
        None
    }
}

fn levenshtein_distance(a: &str, b: &str) -> usize {
    if a == b {
        return 0;
    }
    if a.is_empty() {
        return b.chars().count();
    }
    if b.is_empty() {
        return a.chars().count();
    }

    let b_chars = b.chars().collect::<Vec<_>>();
    let mut previous = (0..=b_chars.len()).collect::<Vec<_>>();
    let mut current = vec![0; b_chars.len() + 1];

    for (i, left) in a.chars().enumerate() {
        current[0] = i + 1;
        for (j, right) in b_chars.iter().enumerate() {
            let substitution_cost = if left == *right { 0 } else { 1 };
            let deletion = previous[j + 1] + 1;
            let insertion = current[j] + 1;
            let substitution = previous[j] + substitution_cost;
            current[j + 1] = deletion.min(insertion).min(substitution);
        }
        previous.clone_from_slice(&current);
    }

    previous[b_chars.len()]
}
