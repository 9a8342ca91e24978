//! Extension discovery, activation filtering, and session toggle support for Gem.
//!
//! Loads `gemini-extension.json` manifests from workspace and user-home
//! extension directories, merges them with workspace precedence, computes the
//! active subset for the current invocation, and executes the `/extensions`
//! command surface used to toggle extensions within a running session.

use std::{
    collections::{BTreeMap, HashSet},
    fs,
    path::{Path, PathBuf},
};

use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const GEMINI_DIRECTORY_NAME: &str = ".gemini";
pub const EXTENSIONS_DIRECTORY_NAME: &str = "extensions";
pub const EXTENSIONS_MANIFEST_FILENAME: &str = "gemini-extension.json";
pub const DEFAULT_CONTEXT_FILENAME: &str = "GEMINI.md";
pub const DISABLE_ALL_EXTENSIONS_SENTINEL: &str = "none";
pub const EXTENSIONS_COMMAND_USAGE: &str = "usage: /extensions <list|enable|disable> [name]";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Enumerates supported `ExtensionDiagnosticLevel` values.
pub enum ExtensionDiagnosticLevel {
    Info,
    Warning,
}

impl ExtensionDiagnosticLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Public struct `ExtensionDiagnostic` used across Gem components.
pub struct ExtensionDiagnostic {
    pub level: ExtensionDiagnosticLevel,
    pub message: String,
}

impl ExtensionDiagnostic {
    pub fn info(message: impl Into<String>) -> Self {
        Self {
            level: ExtensionDiagnosticLevel::Info,
            message: message.into(),
        }
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            level: ExtensionDiagnosticLevel::Warning,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(untagged)]
/// Enumerates supported `ContextFileNameField` values.
pub enum ContextFileNameField {
    Single(String),
    Multiple(Vec<String>),
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
/// Public struct `ExtensionManifest` used across Gem components.
pub struct ExtensionManifest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub enabled: Option<bool>,
    #[serde(default, rename = "mcpServers")]
    pub mcp_servers: BTreeMap<String, Value>,
    #[serde(default, rename = "contextFileName")]
    pub context_file_name: Option<ContextFileNameField>,
    #[serde(default, rename = "excludeTools")]
    pub exclude_tools: Vec<String>,
}

impl ExtensionManifest {
    /// Canonical ordered list of context file names, normalizing the
    /// absent/scalar/list manifest shapes once at load time.
    pub fn context_file_names(&self) -> Vec<String> {
        match &self.context_file_name {
            None => vec![DEFAULT_CONTEXT_FILENAME.to_string()],
            Some(ContextFileNameField::Single(name)) => vec![name.clone()],
            Some(ContextFileNameField::Multiple(names)) => names.clone(),
        }
    }

    pub fn default_enabled(&self) -> bool {
        self.enabled.unwrap_or(true)
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Public struct `Extension` used across Gem components.
pub struct Extension {
    pub manifest: ExtensionManifest,
    pub context_file_paths: Vec<PathBuf>,
}

impl Extension {
    pub fn name(&self) -> &str {
        &self.manifest.name
    }

    pub fn version(&self) -> &str {
        &self.manifest.version
    }

    pub fn default_enabled(&self) -> bool {
        self.manifest.default_enabled()
    }

    /// Name used for all case-insensitive lookups. Display keeps the
    /// manifest casing.
    pub fn matching_name(&self) -> String {
        normalize_extension_name(self.name())
    }
}

pub fn normalize_extension_name(name: &str) -> String {
    name.trim().to_lowercase()
}

pub fn extensions_root_dir(root: &Path) -> PathBuf {
    root.join(GEMINI_DIRECTORY_NAME).join(EXTENSIONS_DIRECTORY_NAME)
}

/// Loads one candidate extension directory. Malformed input is never fatal:
/// every skip case yields `None` plus one warning diagnostic.
pub fn load_extension(
    extension_dir: &Path,
    diagnostics: &mut Vec<ExtensionDiagnostic>,
) -> Option<Extension> {
    if !extension_dir.is_dir() {
        diagnostics.push(ExtensionDiagnostic::warning(format!(
            "unexpected file {} in extensions directory",
            extension_dir.display()
        )));
        return None;
    }

    let manifest_path = extension_dir.join(EXTENSIONS_MANIFEST_FILENAME);
    if !manifest_path.is_file() {
        diagnostics.push(ExtensionDiagnostic::warning(format!(
            "extension directory {} does not contain a manifest file {}",
            extension_dir.display(),
            EXTENSIONS_MANIFEST_FILENAME
        )));
        return None;
    }

    let manifest = match read_extension_manifest(&manifest_path) {
        Ok(manifest) => manifest,
        Err(error) => {
            diagnostics.push(ExtensionDiagnostic::warning(format!("{error:#}")));
            return None;
        }
    };

    let context_file_paths = manifest
        .context_file_names()
        .iter()
        .map(|name| extension_dir.join(name))
        .filter(|path| path.exists())
        .collect();

    Some(Extension {
        manifest,
        context_file_paths,
    })
}

fn read_extension_manifest(manifest_path: &Path) -> Result<ExtensionManifest> {
    let manifest_text = fs::read_to_string(manifest_path)
        .with_context(|| format!("failed to read extension manifest {}", manifest_path.display()))?;
    let manifest = serde_json::from_str::<ExtensionManifest>(&manifest_text).with_context(|| {
        format!(
            "failed to parse extension manifest {}",
            manifest_path.display()
        )
    })?;
    if manifest.name.trim().is_empty() || manifest.version.trim().is_empty() {
        bail!(
            "invalid extension manifest {}: missing name or version",
            manifest_path.display()
        );
    }
    Ok(manifest)
}

#[derive(Debug, Clone, PartialEq, Default)]
/// Public struct `ExtensionDiscoveryReport` used across Gem components.
pub struct ExtensionDiscoveryReport {
    pub extensions: Vec<Extension>,
    pub diagnostics: Vec<ExtensionDiagnostic>,
}

/// Scans both extension roots and merges the results. Workspace entries are
/// scanned first, so a workspace extension always shadows a user-home
/// extension with the same (case-insensitive) name.
pub fn discover_extensions(workspace_dir: &Path, home_dir: &Path) -> ExtensionDiscoveryReport {
    let mut diagnostics = Vec::new();
    let mut candidates = load_extensions_from_dir(workspace_dir, &mut diagnostics);
    candidates.extend(load_extensions_from_dir(home_dir, &mut diagnostics));

    let mut seen_names = HashSet::new();
    let mut extensions = Vec::new();
    for extension in candidates {
        if !seen_names.insert(extension.matching_name()) {
            continue;
        }
        diagnostics.push(ExtensionDiagnostic::info(format!(
            "Loading extension: {} (version: {}, enabled: {})",
            extension.name(),
            extension.version(),
            if extension.default_enabled() {
                "yes"
            } else {
                "no"
            }
        )));
        extensions.push(extension);
    }

    ExtensionDiscoveryReport {
        extensions,
        diagnostics,
    }
}

fn load_extensions_from_dir(
    root: &Path,
    diagnostics: &mut Vec<ExtensionDiagnostic>,
) -> Vec<Extension> {
    let extensions_dir = extensions_root_dir(root);
    if !extensions_dir.is_dir() {
        return Vec::new();
    }

    let entries = match fs::read_dir(&extensions_dir) {
        Ok(entries) => entries,
        Err(error) => {
            diagnostics.push(ExtensionDiagnostic::warning(format!(
                "failed to read extensions directory {}: {error}",
                extensions_dir.display()
            )));
            return Vec::new();
        }
    };

    let mut extensions = Vec::new();
    for entry in entries {
        let entry = match entry {
            Ok(entry) => entry,
            Err(error) => {
                diagnostics.push(ExtensionDiagnostic::warning(format!(
                    "failed to inspect extensions directory {}: {error}",
                    extensions_dir.display()
                )));
                continue;
            }
        };
        if let Some(extension) = load_extension(&entry.path(), diagnostics) {
            extensions.push(extension);
        }
    }
    extensions
}

/// Resolves the manifest path of a named extension by probing the workspace
/// root first and the user home second.
pub fn find_extension_manifest_path(
    extension_name: &str,
    workspace_dir: &Path,
    home_dir: &Path,
) -> Option<PathBuf> {
    for root in [workspace_dir, home_dir] {
        let manifest_path = extensions_root_dir(root)
            .join(extension_name)
            .join(EXTENSIONS_MANIFEST_FILENAME);
        if manifest_path.is_file() {
            return Some(manifest_path);
        }
    }
    None
}

#[derive(Debug, Clone, PartialEq, Default)]
/// Public struct `ExtensionActivationReport` used across Gem components.
pub struct ExtensionActivationReport {
    pub active: Vec<Extension>,
    pub diagnostics: Vec<ExtensionDiagnostic>,
}

impl ExtensionActivationReport {
    pub fn active_names(&self) -> HashSet<String> {
        self.active.iter().map(Extension::matching_name).collect()
    }
}

/// Computes the active subset of `discovered`. Pure and re-invocable: session
/// toggles feed back in through `session_additional_enabled` and the caller.
///
/// Precedence: a non-empty `explicit_names` switches to allow-list mode,
/// where the single sentinel `none` suppresses everything and names that
/// match no discovered extension are reported (sorted) as not found.
/// Otherwise each extension is active when its manifest default is enabled or
/// its name appears in `session_additional_enabled`. Output preserves the
/// order of `discovered`.
pub fn filter_active_extensions(
    discovered: &[Extension],
    explicit_names: &[String],
    session_additional_enabled: &[String],
) -> ExtensionActivationReport {
    let mut diagnostics = Vec::new();

    if !explicit_names.is_empty() {
        let requested = explicit_names
            .iter()
            .map(|name| normalize_extension_name(name))
            .collect::<HashSet<_>>();

        if requested.len() == 1 && requested.contains(DISABLE_ALL_EXTENSIONS_SENTINEL) {
            if !discovered.is_empty() {
                diagnostics.push(ExtensionDiagnostic::info("All extensions are disabled."));
            }
            return ExtensionActivationReport {
                active: Vec::new(),
                diagnostics,
            };
        }

        let mut not_found = requested.clone();
        let mut active = Vec::new();
        for extension in discovered {
            let matching_name = extension.matching_name();
            if requested.contains(&matching_name) {
                diagnostics.push(ExtensionDiagnostic::info(format!(
                    "Activated extension: {} (version: {})",
                    extension.name(),
                    extension.version()
                )));
                not_found.remove(&matching_name);
                active.push(extension.clone());
            } else {
                diagnostics.push(ExtensionDiagnostic::info(format!(
                    "Disabled extension: {}",
                    extension.name()
                )));
            }
        }

        let mut not_found = not_found.into_iter().collect::<Vec<_>>();
        not_found.sort();
        for requested_name in not_found {
            diagnostics.push(ExtensionDiagnostic::warning(format!(
                "Extension not found: {requested_name}"
            )));
        }

        return ExtensionActivationReport {
            active,
            diagnostics,
        };
    }

    let additional_enabled = session_additional_enabled
        .iter()
        .map(|name| normalize_extension_name(name))
        .collect::<HashSet<_>>();

    let mut active = Vec::new();
    for extension in discovered {
        let enabled =
            extension.default_enabled() || additional_enabled.contains(&extension.matching_name());
        if enabled {
            diagnostics.push(ExtensionDiagnostic::info(format!(
                "Activated extension: {} (version: {})",
                extension.name(),
                extension.version()
            )));
            active.push(extension.clone());
        } else {
            diagnostics.push(ExtensionDiagnostic::info(format!(
                "Disabled extension: {}",
                extension.name()
            )));
        }
    }

    ExtensionActivationReport {
        active,
        diagnostics,
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
/// Public struct `ExtensionSessionOverrides` used across Gem components.
pub struct ExtensionSessionOverrides {
    session_enabled: HashSet<String>,
    session_disabled: HashSet<String>,
}

impl ExtensionSessionOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks the extension force-enabled for the rest of the session and
    /// clears any force-disable for the same name.
    pub fn enable(&mut self, extension_name: &str) {
        let normalized = normalize_extension_name(extension_name);
        self.session_disabled.remove(&normalized);
        self.session_enabled.insert(normalized);
    }

    pub fn disable(&mut self, extension_name: &str) {
        let normalized = normalize_extension_name(extension_name);
        self.session_enabled.remove(&normalized);
        self.session_disabled.insert(normalized);
    }

    pub fn is_enabled(&self, extension_name: &str) -> bool {
        self.session_enabled
            .contains(&normalize_extension_name(extension_name))
    }

    pub fn is_disabled(&self, extension_name: &str) -> bool {
        self.session_disabled
            .contains(&normalize_extension_name(extension_name))
    }

    pub fn enabled_names(&self) -> Vec<String> {
        let mut names = self.session_enabled.iter().cloned().collect::<Vec<_>>();
        names.sort();
        names
    }
}

#[derive(Debug, Clone, PartialEq)]
/// Public struct `ExtensionSessionRuntime` used across Gem components.
///
/// Owns the discovered set, the invocation-level enable lists, and the
/// session override flags. Created once at session start and threaded by
/// reference through the command dispatch path; discarded at process exit.
pub struct ExtensionSessionRuntime {
    discovered: Vec<Extension>,
    explicit_names: Vec<String>,
    additional_enabled: Vec<String>,
    overrides: ExtensionSessionOverrides,
}

impl ExtensionSessionRuntime {
    pub fn new(
        discovered: Vec<Extension>,
        explicit_names: Vec<String>,
        additional_enabled: Vec<String>,
    ) -> Self {
        Self {
            discovered,
            explicit_names,
            additional_enabled,
            overrides: ExtensionSessionOverrides::new(),
        }
    }

    pub fn discovered(&self) -> &[Extension] {
        &self.discovered
    }

    pub fn overrides(&self) -> &ExtensionSessionOverrides {
        &self.overrides
    }

    pub fn enable_extension(&mut self, extension_name: &str) {
        self.overrides.enable(extension_name);
    }

    pub fn disable_extension(&mut self, extension_name: &str) {
        self.overrides.disable(extension_name);
    }

    /// Recomputes the active set from current override state. Session
    /// force-enables are appended to the additional-enable list before
    /// filtering; force-disables are applied to the filter result, since the
    /// filter itself only models enablement.
    pub fn active_extensions(&self) -> ExtensionActivationReport {
        let mut additional_enabled = self.additional_enabled.clone();
        additional_enabled.extend(self.overrides.enabled_names());
        let report =
            filter_active_extensions(&self.discovered, &self.explicit_names, &additional_enabled);

        let mut diagnostics = report.diagnostics;
        let mut active = Vec::new();
        for extension in report.active {
            if self.overrides.is_disabled(extension.name()) {
                diagnostics.push(ExtensionDiagnostic::info(format!(
                    "Disabled extension: {}",
                    extension.name()
                )));
                continue;
            }
            active.push(extension);
        }

        ExtensionActivationReport {
            active,
            diagnostics,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
/// Enumerates supported `ExtensionsCommandStatus` values.
pub enum ExtensionsCommandStatus {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
/// Public struct `ExtensionsCommandOutcome` used across Gem components.
pub struct ExtensionsCommandOutcome {
    pub status: ExtensionsCommandStatus,
    pub message: String,
}

impl ExtensionsCommandOutcome {
    fn info(message: impl Into<String>) -> Self {
        Self {
            status: ExtensionsCommandStatus::Info,
            message: message.into(),
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            status: ExtensionsCommandStatus::Error,
            message: message.into(),
        }
    }
}

/// Executes one `/extensions` command. Invalid input yields an error-typed
/// outcome and leaves session state untouched.
pub fn execute_extensions_command(
    runtime: &mut ExtensionSessionRuntime,
    command_args: &str,
) -> ExtensionsCommandOutcome {
    let mut tokens = command_args.split_whitespace();
    let Some(subcommand) = tokens.next() else {
        return ExtensionsCommandOutcome::error(EXTENSIONS_COMMAND_USAGE);
    };
    let extension_name = tokens.next();

    match subcommand {
        "list" => ExtensionsCommandOutcome::info(render_extensions_list(runtime)),
        "enable" => {
            let Some(extension_name) = extension_name else {
                return ExtensionsCommandOutcome::error("usage: /extensions enable <name>");
            };
            runtime.enable_extension(extension_name);
            ExtensionsCommandOutcome::info(format!(
                "Enabled extension \"{extension_name}\" for this session."
            ))
        }
        "disable" => {
            let Some(extension_name) = extension_name else {
                return ExtensionsCommandOutcome::error("usage: /extensions disable <name>");
            };
            runtime.disable_extension(extension_name);
            ExtensionsCommandOutcome::info(format!(
                "Disabled extension \"{extension_name}\" for this session."
            ))
        }
        other => ExtensionsCommandOutcome::error(format!(
            "unknown subcommand: {other}\n{EXTENSIONS_COMMAND_USAGE}"
        )),
    }
}

/// Renders the `/extensions list` body. Status reflects the currently active
/// set, including session toggles, not the manifest default.
pub fn render_extensions_list(runtime: &ExtensionSessionRuntime) -> String {
    if runtime.discovered().is_empty() {
        return "No extensions installed.".to_string();
    }

    let active_names = runtime.active_extensions().active_names();
    let mut lines = vec!["Available extensions:".to_string()];
    for extension in runtime.discovered() {
        let status = if active_names.contains(&extension.matching_name()) {
            "enabled"
        } else {
            "disabled"
        };
        lines.push(format!(
            "{} (v{}) ({})",
            extension.name(),
            extension.version(),
            status
        ));
    }
    lines.join("\n")
}
