//! End-to-end pipeline tests: discover extensions from on-disk roots, compute
//! the active set, toggle extensions through the session command surface, and
//! recompute.

use std::{fs, path::Path};

use gem_extensions::{
    discover_extensions, execute_extensions_command, extensions_root_dir,
    filter_active_extensions, render_extensions_list, ExtensionSessionRuntime,
    ExtensionsCommandStatus, EXTENSIONS_MANIFEST_FILENAME,
};
use tempfile::tempdir;

fn write_extension(root: &Path, dir_name: &str, manifest_json: &str) {
    let extension_dir = extensions_root_dir(root).join(dir_name);
    fs::create_dir_all(&extension_dir).expect("create extension dir");
    fs::write(
        extension_dir.join(EXTENSIONS_MANIFEST_FILENAME),
        manifest_json,
    )
    .expect("write manifest");
}

fn active_names(runtime: &ExtensionSessionRuntime) -> Vec<String> {
    runtime
        .active_extensions()
        .active
        .iter()
        .map(|extension| extension.name().to_string())
        .collect()
}

#[test]
fn functional_discover_filter_and_toggle_pipeline() {
    let workspace = tempdir().expect("tempdir");
    let home = tempdir().expect("tempdir");
    write_extension(
        workspace.path(),
        "ext1",
        r#"{"name": "ext1", "version": "2.0.0"}"#,
    );
    write_extension(
        workspace.path(),
        "ext2",
        r#"{"name": "ext2", "version": "1.0.0", "enabled": false}"#,
    );
    write_extension(
        home.path(),
        "ext1",
        r#"{"name": "ext1", "version": "1.0.0"}"#,
    );
    write_extension(
        home.path(),
        "ext3",
        r#"{"name": "ext3", "version": "1.0.0"}"#,
    );

    let discovery = discover_extensions(workspace.path(), home.path());
    assert_eq!(discovery.extensions.len(), 3);
    let ext1 = discovery
        .extensions
        .iter()
        .find(|extension| extension.name() == "ext1")
        .expect("ext1 discovered");
    assert_eq!(ext1.version(), "2.0.0");

    let mut runtime =
        ExtensionSessionRuntime::new(discovery.extensions, Vec::new(), Vec::new());
    let mut names = active_names(&runtime);
    names.sort();
    assert_eq!(names, vec!["ext1".to_string(), "ext3".to_string()]);

    let listing = render_extensions_list(&runtime);
    assert!(listing.starts_with("Available extensions:"));
    assert!(listing.contains("ext1 (v2.0.0) (enabled)"));
    assert!(listing.contains("ext2 (v1.0.0) (disabled)"));

    let outcome = execute_extensions_command(&mut runtime, "enable ext2");
    assert_eq!(outcome.status, ExtensionsCommandStatus::Info);
    assert!(active_names(&runtime).contains(&"ext2".to_string()));
    assert!(render_extensions_list(&runtime).contains("ext2 (v1.0.0) (enabled)"));

    let outcome = execute_extensions_command(&mut runtime, "disable ext1");
    assert_eq!(outcome.status, ExtensionsCommandStatus::Info);
    assert!(!active_names(&runtime).contains(&"ext1".to_string()));
    assert!(render_extensions_list(&runtime).contains("ext1 (v2.0.0) (disabled)"));
}

#[test]
fn functional_allow_list_invocation_reports_missing_names() {
    let workspace = tempdir().expect("tempdir");
    let home = tempdir().expect("tempdir");
    write_extension(
        workspace.path(),
        "ext1",
        r#"{"name": "ext1", "version": "1.0.0"}"#,
    );

    let discovery = discover_extensions(workspace.path(), home.path());
    let report = filter_active_extensions(
        &discovery.extensions,
        &["ext1".to_string(), "ext3".to_string()],
        &[],
    );
    assert_eq!(report.active.len(), 1);
    assert_eq!(report.active[0].name(), "ext1");
    assert!(report
        .diagnostics
        .iter()
        .any(|diagnostic| diagnostic.message == "Extension not found: ext3"));
}

#[test]
fn functional_none_sentinel_disables_all_discovered() {
    let workspace = tempdir().expect("tempdir");
    let home = tempdir().expect("tempdir");
    write_extension(
        workspace.path(),
        "ext1",
        r#"{"name": "ext1", "version": "1.0.0"}"#,
    );

    let discovery = discover_extensions(workspace.path(), home.path());
    let mut runtime =
        ExtensionSessionRuntime::new(discovery.extensions, vec!["none".to_string()], Vec::new());
    assert!(runtime.active_extensions().active.is_empty());

    // Session enables cannot bring anything back while the sentinel is set.
    runtime.enable_extension("ext1");
    assert!(runtime.active_extensions().active.is_empty());
}

#[test]
fn functional_malformed_neighbors_do_not_block_discovery() {
    let workspace = tempdir().expect("tempdir");
    let home = tempdir().expect("tempdir");
    write_extension(
        workspace.path(),
        "good",
        r#"{"name": "good", "version": "1.0.0"}"#,
    );
    write_extension(workspace.path(), "broken", "{not json");
    let no_manifest_dir = extensions_root_dir(workspace.path()).join("hollow");
    fs::create_dir_all(no_manifest_dir).expect("create hollow dir");

    let discovery = discover_extensions(workspace.path(), home.path());
    assert_eq!(discovery.extensions.len(), 1);
    assert_eq!(discovery.extensions[0].name(), "good");
}
