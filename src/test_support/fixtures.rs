//! Test fixtures for common test scenarios.
//!
//! Builders for `package.json` and `angular.json` documents and a helper
//! that writes both into a temporary directory.

use std::path::Path;

use serde_json::{json, Map, Value};
use tempfile::TempDir;

use crate::util::ProjectFiles;

/// Karma builder generated by the Angular CLI.
pub const KARMA_BUILDER: &str = "@angular-devkit/build-angular:karma";

/// A test target as generated by the Angular CLI for a Karma setup.
pub fn karma_test_target(project: &str) -> Value {
    json!({
        "builder": KARMA_BUILDER,
        "options": {
            "main": format!("projects/{project}/src/test.ts"),
            "polyfills": format!("projects/{project}/src/polyfills.ts"),
            "tsConfig": format!("projects/{project}/tsconfig.spec.json"),
            "karmaConfig": format!("projects/{project}/karma.conf.js"),
            "styles": [],
            "scripts": []
        }
    })
}

/// A workspace document with one project per entry.
///
/// Projects flagged `true` get a Karma test target; the rest only have a
/// build target.
pub fn angular_workspace(projects: &[(&str, bool)]) -> Value {
    let mut map = Map::new();
    for (name, with_test) in projects {
        let mut architect = Map::new();
        architect.insert(
            "build".to_string(),
            json!({
                "builder": "@angular-devkit/build-angular:browser",
                "options": { "outputPath": format!("dist/{name}") }
            }),
        );
        if *with_test {
            architect.insert("test".to_string(), karma_test_target(name));
        }
        map.insert(
            name.to_string(),
            json!({
                "root": format!("projects/{name}"),
                "projectType": "application",
                "architect": architect
            }),
        );
    }

    json!({
        "$schema": "./node_modules/@angular/cli/lib/config/schema.json",
        "version": 1,
        "newProjectRoot": "projects",
        "projects": map
    })
}

/// Write `value` as pretty JSON.
pub fn write_json(path: &Path, value: &Value) {
    let mut text = serde_json::to_string_pretty(value).expect("fixture is serializable");
    text.push('\n');
    std::fs::write(path, text).expect("failed to write fixture");
}

/// Helper to create a temporary workspace with `package.json` and
/// `angular.json`.
///
/// Returns the TempDir handle - dropping it will clean up the directory.
pub fn create_test_workspace(manifest: &Value, workspace: &Value) -> (TempDir, ProjectFiles) {
    let tmp = TempDir::new().expect("failed to create temp dir");
    write_json(&tmp.path().join("package.json"), manifest);
    write_json(&tmp.path().join("angular.json"), workspace);

    let files = ProjectFiles::in_dir(tmp.path()).expect("fixture workspace is locatable");
    (tmp, files)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_angular_workspace_shape() {
        let ws = angular_workspace(&[("app", true), ("app-e2e", false)]);

        assert_eq!(ws["projects"]["app"]["architect"]["test"]["builder"], KARMA_BUILDER);
        assert!(ws["projects"]["app-e2e"]["architect"].get("test").is_none());
    }

    #[test]
    fn test_create_test_workspace() {
        let (tmp, files) = create_test_workspace(&json!({"name": "app"}), &angular_workspace(&[]));

        assert_eq!(files.root, tmp.path());
        assert!(files.manifest_path.is_file());
        assert!(files.workspace_path.ends_with("angular.json"));
    }
}
