//! Shared fixtures for integration tests.

#![allow(dead_code)]

use cargo_bump_release::error::Result;
use cargo_bump_release::{CommandOutput, CommandRunner};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tempfile::TempDir;

/// Temporary multi-package workspace on disk
pub struct TestWorkspace {
    dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            dir: tempfile::tempdir().expect("create temp workspace"),
        }
    }

    pub fn root(&self) -> &Path {
        self.dir.path()
    }

    /// Write `<directory>/Cargo.toml`
    pub fn manifest(self, directory: &str, content: &str) -> Self {
        let package_dir = self.root().join(directory);
        fs::create_dir_all(&package_dir).expect("create package dir");
        fs::write(package_dir.join("Cargo.toml"), content).expect("write manifest");
        self
    }

    /// Write `release-plan.toml` at the root
    pub fn plan(self, content: &str) -> Self {
        fs::write(self.root().join("release-plan.toml"), content).expect("write plan");
        self
    }

    pub fn read_manifest(&self, directory: &str) -> String {
        fs::read_to_string(self.root().join(directory).join("Cargo.toml")).expect("read manifest")
    }

    pub fn package_dir(&self, directory: &str) -> PathBuf {
        self.root().join(directory)
    }
}

/// Two packages where `y` depends on `x`
pub fn x_and_y() -> TestWorkspace {
    TestWorkspace::new()
        .manifest(
            "x",
            r#"[package]
name = "x"
version = "0.1.0"
edition = "2021"

[dependencies]
serde = "1"
"#,
        )
        .manifest(
            "y",
            r#"[package]
name = "y"
version = "0.3.7"
edition = "2021"

[dependencies]
# pinned to the workspace copy
x = { version = "0.1.0", path = "../x" }
serde = "1"
"#,
        )
        .plan(
            r#"[[package]]
directory = "x"
name = "x"

[[package]]
directory = "y"
name = "y"
"#,
        )
}

/// Records every invocation and answers from a prefix table
#[derive(Default)]
pub struct RecordingRunner {
    responses: Vec<(String, CommandOutput)>,
    calls: Mutex<Vec<(String, PathBuf)>>,
}

impl RecordingRunner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer commands starting with `prefix` (first match wins)
    pub fn respond(mut self, prefix: &str, output: CommandOutput) -> Self {
        self.responses.push((prefix.to_string(), output));
        self
    }

    pub fn calls(&self) -> Vec<(String, PathBuf)> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn commands(&self) -> Vec<String> {
        self.calls().into_iter().map(|(command, _)| command).collect()
    }
}

impl CommandRunner for RecordingRunner {
    async fn execute(&self, program: &str, args: &[String], cwd: &Path) -> Result<CommandOutput> {
        let mut command = program.to_string();
        for arg in args {
            command.push(' ');
            command.push_str(arg);
        }

        self.calls
            .lock()
            .expect("calls lock")
            .push((command.clone(), cwd.to_path_buf()));

        Ok(self
            .responses
            .iter()
            .find(|(prefix, _)| command.starts_with(prefix.as_str()))
            .map(|(_, output)| output.clone())
            .unwrap_or_else(CommandOutput::succeeded))
    }
}
