//! Format-preserving edits of a single package manifest.
//!
//! Edits go through `toml_edit` so comments, key order and whitespace in the
//! manifest survive a version bump.

use crate::error::{ManifestError, Result};
use crate::version::SemanticVersion;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use toml_edit::{DocumentMut, Item, TableLike, Value};

/// Dependency table kinds that carry version pins
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DependencyKind {
    /// `[dependencies]`
    Normal,
    /// `[build-dependencies]`
    Build,
    /// `[dev-dependencies]`
    Dev,
}

impl DependencyKind {
    /// All kinds, in manifest order
    pub const ALL: [DependencyKind; 3] = [
        DependencyKind::Normal,
        DependencyKind::Build,
        DependencyKind::Dev,
    ];

    /// Table name in the manifest
    pub fn table_name(self) -> &'static str {
        match self {
            DependencyKind::Normal => "dependencies",
            DependencyKind::Build => "build-dependencies",
            DependencyKind::Dev => "dev-dependencies",
        }
    }
}

/// A dependency declaration as read from a manifest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeclaredDependency {
    /// Dependency table it was declared in
    pub kind: DependencyKind,
    /// `target.<cfg>` key for platform-specific tables
    pub target: Option<String>,
    /// Package name (honours `package = "..."` renames)
    pub package: String,
    /// Version requirement, if any
    pub requirement: Option<String>,
}

/// One rewritten dependency pin
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PinUpdate {
    /// Dependency table the pin lives in
    pub kind: DependencyKind,
    /// `target.<cfg>` key for platform-specific tables
    pub target: Option<String>,
    /// Package name of the dependency
    pub dependency: String,
    /// Requirement before the rewrite (`None` if the entry had no version)
    pub previous: Option<String>,
    /// Version now pinned
    pub pinned: SemanticVersion,
}

/// In-memory manifest bound to the file it came from
#[derive(Debug, Clone)]
pub struct ManifestEditor {
    path: PathBuf,
    document: DocumentMut,
}

impl ManifestEditor {
    /// Read and parse the manifest at `path`
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ManifestError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(path, &content)
    }

    /// Parse manifest text; `path` is used for error messages and [`save`](Self::save)
    pub fn parse<P: AsRef<Path>>(path: P, content: &str) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let document = content
            .parse::<DocumentMut>()
            .map_err(|source| ManifestError::Parse {
                path: path.clone(),
                source,
            })?;
        Ok(Self { path, document })
    }

    /// Path the manifest is bound to
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `package.name`
    pub fn package_name(&self) -> Result<&str> {
        self.package_str("name")
    }

    /// Raw `package.version` text
    pub fn package_version(&self) -> Result<&str> {
        self.package_str("version")
    }

    fn package_str(&self, key: &str) -> Result<&str> {
        let field = format!("package.{key}");
        let item = self
            .document
            .get("package")
            .and_then(Item::as_table_like)
            .and_then(|package| package.get(key))
            .ok_or_else(|| ManifestError::MissingField {
                path: self.path.clone(),
                field: field.clone(),
            })?;

        item.as_str().ok_or_else(|| {
            ManifestError::InvalidField {
                path: self.path.clone(),
                field,
                reason: "expected a string (workspace-inherited values are not supported)"
                    .to_string(),
            }
            .into()
        })
    }

    /// Overwrite `package.version`
    pub fn set_package_version(&mut self, version: &SemanticVersion) -> Result<()> {
        let path = self.path.clone();
        let slot = self
            .document
            .get_mut("package")
            .and_then(Item::as_table_like_mut)
            .and_then(|package| package.get_mut("version"))
            .ok_or_else(|| ManifestError::MissingField {
                path: path.clone(),
                field: "package.version".to_string(),
            })?;

        match slot.as_value_mut() {
            Some(value) if value.is_str() => {
                replace_string(value, &version.to_string());
                Ok(())
            }
            _ => Err(ManifestError::InvalidField {
                path,
                field: "package.version".to_string(),
                reason: "expected a string (workspace-inherited values are not supported)"
                    .to_string(),
            }
            .into()),
        }
    }

    /// Every dependency declared in the manifest, including `target.<cfg>` tables
    pub fn dependencies(&self) -> Vec<DeclaredDependency> {
        let mut declared = Vec::new();
        let root = self.document.as_table();

        let mut collect = |target: Option<&str>, kind: DependencyKind, table: &dyn TableLike| {
            for (key, item) in table.iter() {
                declared.push(DeclaredDependency {
                    kind,
                    target: target.map(str::to_string),
                    package: dependency_package(key, item).to_string(),
                    requirement: dependency_requirement(item).map(str::to_string),
                });
            }
        };

        for kind in DependencyKind::ALL {
            if let Some(table) = root.get(kind.table_name()).and_then(Item::as_table_like) {
                collect(None, kind, table);
            }
        }
        if let Some(targets) = root.get("target").and_then(Item::as_table_like) {
            for (cfg, target) in targets.iter() {
                let Some(target) = target.as_table_like() else {
                    continue;
                };
                for kind in DependencyKind::ALL {
                    if let Some(table) = target.get(kind.table_name()).and_then(Item::as_table_like)
                    {
                        collect(Some(cfg), kind, table);
                    }
                }
            }
        }

        declared
    }

    /// Rewrite the `version` of every dependency for which `resolve` returns a
    /// version. Bare string pins are replaced, tables without a `version` key
    /// get one. Entries using `workspace = true` are left alone.
    pub fn update_dependency_pins<F>(&mut self, mut resolve: F) -> Vec<PinUpdate>
    where
        F: FnMut(&str) -> Option<SemanticVersion>,
    {
        let mut updates = Vec::new();

        visit_dependency_tables_mut(self.document.as_table_mut(), |target, kind, table| {
            for (key, item) in table.iter_mut() {
                let package = dependency_package(key.get(), item).to_string();
                let Some(pinned) = resolve(&package) else {
                    continue;
                };
                if inherits_from_workspace(item) {
                    log::debug!(
                        "Leaving {} pin on '{}' to the workspace",
                        kind.table_name(),
                        package
                    );
                    continue;
                }

                let previous = dependency_requirement(item).map(str::to_string);
                if set_requirement(item, &pinned.to_string()) {
                    updates.push(PinUpdate {
                        kind,
                        target: target.map(str::to_string),
                        dependency: package,
                        previous,
                        pinned,
                    });
                }
            }
        });

        updates
    }

    /// Render the document as it would be written
    pub fn render(&self) -> String {
        self.document.to_string()
    }

    /// Overwrite the manifest file with the edited document
    pub fn save(&self) -> Result<()> {
        std::fs::write(&self.path, self.render()).map_err(|source| {
            ManifestError::Write {
                path: self.path.clone(),
                source,
            }
            .into()
        })
    }
}

fn visit_dependency_tables_mut(
    root: &mut toml_edit::Table,
    mut visit: impl FnMut(Option<&str>, DependencyKind, &mut dyn TableLike),
) {
    for kind in DependencyKind::ALL {
        if let Some(table) = root
            .get_mut(kind.table_name())
            .and_then(Item::as_table_like_mut)
        {
            visit(None, kind, table);
        }
    }

    let Some(targets) = root.get_mut("target").and_then(Item::as_table_like_mut) else {
        return;
    };
    for (cfg, target) in targets.iter_mut() {
        let Some(target) = target.as_table_like_mut() else {
            continue;
        };
        for kind in DependencyKind::ALL {
            if let Some(table) = target
                .get_mut(kind.table_name())
                .and_then(Item::as_table_like_mut)
            {
                visit(Some(cfg.get()), kind, table);
            }
        }
    }
}

fn dependency_package<'a>(key: &'a str, item: &'a Item) -> &'a str {
    item.as_table_like()
        .and_then(|table| table.get("package"))
        .and_then(Item::as_str)
        .unwrap_or(key)
}

fn dependency_requirement(item: &Item) -> Option<&str> {
    match item.as_str() {
        Some(requirement) => Some(requirement),
        None => item
            .as_table_like()
            .and_then(|table| table.get("version"))
            .and_then(Item::as_str),
    }
}

fn inherits_from_workspace(item: &Item) -> bool {
    item.as_table_like()
        .and_then(|table| table.get("workspace"))
        .and_then(Item::as_bool)
        .unwrap_or(false)
}

fn set_requirement(item: &mut Item, requirement: &str) -> bool {
    if let Some(value) = item.as_value_mut()
        && value.is_str()
    {
        replace_string(value, requirement);
        return true;
    }

    let Some(table) = item.as_table_like_mut() else {
        return false;
    };
    match table.get_mut("version").and_then(Item::as_value_mut) {
        Some(value) => replace_string(value, requirement),
        None => {
            table.insert("version", toml_edit::value(requirement));
        }
    }
    true
}

/// Swap a value for a string while keeping its surrounding whitespace and comments
fn replace_string(slot: &mut Value, text: &str) {
    let decor = slot.decor().clone();
    *slot = Value::from(text);
    *slot.decor_mut() = decor;
}

#[cfg(test)]
mod tests {
    use super::*;

    const MANIFEST: &str = r#"# libbfio bindings
[package]
name = "libbfio-rs"
version = "1.2.3" # bumped by release tooling
edition = "2021"

[dependencies]
libbfio-sys = { version = "1.2.3", path = "../libbfio-sys" }
libyal-rs-common = { path = "../common" }
log = "0.4"

[build-dependencies.libyal-rs-common-build]
version = "1.2.3"
path = "../common-build"

[dev-dependencies]
common = { package = "libyal-rs-common", version = "1.0.0", path = "../common" }
libcerror-sys = "1.2.3"

[target.'cfg(windows)'.dependencies]
libcerror-sys = { version = "1.2.3" }
"#;

    fn editor() -> ManifestEditor {
        ManifestEditor::parse("libbfio/Cargo.toml", MANIFEST).unwrap()
    }

    fn known(name: &str) -> Option<SemanticVersion> {
        let known = [
            "libbfio-sys",
            "libyal-rs-common",
            "libyal-rs-common-build",
            "libcerror-sys",
        ];
        known
            .contains(&name)
            .then_some(SemanticVersion::new(1, 2, 4))
    }

    fn reparse(editor: &ManifestEditor) -> toml::Value {
        toml::from_str(&editor.render()).unwrap()
    }

    #[test]
    fn reads_package_fields() {
        let editor = editor();
        assert_eq!(editor.package_name().unwrap(), "libbfio-rs");
        assert_eq!(editor.package_version().unwrap(), "1.2.3");
    }

    #[test]
    fn sets_version_and_keeps_comment() {
        let mut editor = editor();
        editor
            .set_package_version(&SemanticVersion::new(1, 2, 4))
            .unwrap();

        let rendered = editor.render();
        assert!(rendered.contains(r#"version = "1.2.4" # bumped by release tooling"#));
        assert!(rendered.starts_with("# libbfio bindings\n"));
    }

    #[test]
    fn rewrites_known_pins_in_every_table() {
        let mut editor = editor();
        let updates = editor.update_dependency_pins(known);

        let doc = reparse(&editor);
        assert_eq!(doc["dependencies"]["libbfio-sys"]["version"].as_str(), Some("1.2.4"));
        assert_eq!(
            doc["dependencies"]["libyal-rs-common"]["version"].as_str(),
            Some("1.2.4")
        );
        assert_eq!(
            doc["build-dependencies"]["libyal-rs-common-build"]["version"].as_str(),
            Some("1.2.4")
        );
        assert_eq!(doc["dev-dependencies"]["common"]["version"].as_str(), Some("1.2.4"));
        assert_eq!(doc["dev-dependencies"]["libcerror-sys"].as_str(), Some("1.2.4"));
        assert_eq!(
            doc["target"]["cfg(windows)"]["dependencies"]["libcerror-sys"]["version"].as_str(),
            Some("1.2.4")
        );
        assert_eq!(updates.len(), 6);
    }

    #[test]
    fn leaves_unknown_pins_untouched() {
        let mut editor = editor();
        editor.update_dependency_pins(known);

        let doc = reparse(&editor);
        assert_eq!(doc["dependencies"]["log"].as_str(), Some("0.4"));
    }

    #[test]
    fn records_previous_requirement() {
        let mut editor = editor();
        let updates = editor.update_dependency_pins(known);

        let inserted = updates
            .iter()
            .find(|u| u.dependency == "libyal-rs-common" && u.kind == DependencyKind::Normal)
            .unwrap();
        assert_eq!(inserted.previous, None);

        let renamed = updates
            .iter()
            .find(|u| u.kind == DependencyKind::Dev && u.dependency == "libyal-rs-common")
            .unwrap();
        assert_eq!(renamed.previous.as_deref(), Some("1.0.0"));

        let windows = updates
            .iter()
            .find(|u| u.target.is_some())
            .unwrap();
        assert_eq!(windows.target.as_deref(), Some("cfg(windows)"));
    }

    #[test]
    fn skips_workspace_inherited_dependencies() {
        let mut editor = ManifestEditor::parse(
            "a/Cargo.toml",
            "[package]\nname = \"a\"\nversion = \"0.1.0\"\n\n[dependencies]\nb = { workspace = true }\n",
        )
        .unwrap();

        let updates = editor.update_dependency_pins(|_| Some(SemanticVersion::new(0, 1, 1)));
        assert!(updates.is_empty());
        assert!(!editor.render().contains("0.1.1"));
    }

    #[test]
    fn inherited_package_version_is_rejected() {
        let mut editor = ManifestEditor::parse(
            "a/Cargo.toml",
            "[package]\nname = \"a\"\nversion.workspace = true\n",
        )
        .unwrap();

        assert!(editor.package_version().is_err());
        assert!(
            editor
                .set_package_version(&SemanticVersion::new(1, 0, 0))
                .is_err()
        );
    }

    #[test]
    fn missing_package_table_is_reported() {
        let editor = ManifestEditor::parse("a/Cargo.toml", "[workspace]\n").unwrap();
        let err = editor.package_name().unwrap_err();
        assert!(err.to_string().contains("package.name"));
    }

    #[test]
    fn lists_declared_dependencies() {
        let declared = editor().dependencies();
        assert_eq!(declared.len(), 7);
        assert!(declared.iter().any(|d| d.package == "log"
            && d.kind == DependencyKind::Normal
            && d.requirement.as_deref() == Some("0.4")));
        assert!(declared.iter().any(|d| d.package == "libyal-rs-common"
            && d.kind == DependencyKind::Dev));
    }

    #[test]
    fn invalid_toml_is_a_parse_error() {
        let err = ManifestEditor::parse("bad/Cargo.toml", "[package\nname = ").unwrap_err();
        assert!(matches!(
            err,
            crate::error::ReleaseError::Manifest(ManifestError::Parse { .. })
        ));
    }
}
