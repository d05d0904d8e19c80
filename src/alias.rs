//! Legacy Alias Generation
//!
//! Regenerates the legacy packages that forward well-known schema types to
//! their canonical packages. For each target a synthetic schema file is
//! built that publicly imports the canonical file under the legacy package
//! path; the emitter then renders it as a Rust module of re-exports.
//!
//! Outputs are either written in place or previewed as unified diffs
//! against what is on disk.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use similar::TextDiff;

use crate::descriptorpb::FileDescriptorProto;
use crate::error::Result;
use crate::reflect::{FileBuilder, FileDescriptor};
use crate::wellknown;

/// One legacy package to forward
#[derive(Debug, Clone)]
pub struct AliasTarget {
    /// Legacy package as `<path>;<name>`, e.g. "protobuf/ptypes/any;any"
    pub legacy_package: String,
    /// Canonical package path, e.g. "protobuf/types/known/anypb"
    pub canonical_package: String,
    /// Schema file whose declarations are forwarded
    pub file: FileDescriptor,
}

impl AliasTarget {
    pub fn new(
        legacy_package: impl Into<String>,
        canonical_package: impl Into<String>,
        file: FileDescriptor,
    ) -> Self {
        Self {
            legacy_package: legacy_package.into(),
            canonical_package: canonical_package.into(),
            file,
        }
    }

    /// Import path of the legacy package (before the `;`)
    pub fn legacy_path(&self) -> &str {
        match self.legacy_package.split_once(';') {
            Some((path, _)) => path,
            None => &self.legacy_package,
        }
    }

    /// Module name of the legacy package (after the `;`, else the last path segment)
    pub fn legacy_name(&self) -> &str {
        match self.legacy_package.split_once(';') {
            Some((_, name)) => name,
            None => base_name(&self.legacy_package),
        }
    }

    /// Module name of the canonical package
    pub fn canonical_name(&self) -> &str {
        base_name(&self.canonical_package)
    }
}

fn base_name(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or(path)
}

/// The legacy packages forwarded to the well-known files
pub fn well_known_targets() -> Vec<AliasTarget> {
    vec![
        AliasTarget::new(
            "protobuf/protoc-gen-go/descriptor;descriptor",
            "protobuf/types/descriptorpb",
            wellknown::descriptor().clone(),
        ),
        AliasTarget::new(
            "protobuf/protoc-gen-go/plugin;plugin_go",
            "protobuf/types/pluginpb",
            wellknown::plugin().clone(),
        ),
        AliasTarget::new("protobuf/ptypes/any;any", "protobuf/types/known/anypb", wellknown::any().clone()),
        AliasTarget::new(
            "protobuf/ptypes/duration;duration",
            "protobuf/types/known/durationpb",
            wellknown::duration().clone(),
        ),
        AliasTarget::new(
            "protobuf/ptypes/timestamp;timestamp",
            "protobuf/types/known/timestamppb",
            wellknown::timestamp().clone(),
        ),
        AliasTarget::new(
            "protobuf/ptypes/wrappers;wrappers",
            "protobuf/types/known/wrapperspb",
            wellknown::wrappers().clone(),
        ),
        AliasTarget::new(
            "protobuf/ptypes/struct;structpb",
            "protobuf/types/known/structpb",
            wellknown::structpb().clone(),
        ),
        AliasTarget::new("protobuf/ptypes/empty;empty", "protobuf/types/known/emptypb", wellknown::empty().clone()),
    ]
}

/// Synthetic schema file publicly importing the target under its legacy path
pub fn alias_file(target: &AliasTarget) -> FileDescriptorProto {
    let path = target.legacy_path();
    FileBuilder::new(format!("{path}/{}.proto", base_name(path)), "")
        .syntax(target.file.syntax())
        .public_dependency(target.file.path())
        .package_path(target.legacy_package.clone())
        .build()
        .to_proto()
}

/// A rendered output file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// Path relative to the generation root
    pub name: String,
    pub content: String,
}

/// Render one forwarding module per target
pub fn emit(targets: &[AliasTarget]) -> Vec<GeneratedFile> {
    targets.iter().map(emit_target).collect()
}

fn emit_target(target: &AliasTarget) -> GeneratedFile {
    let alias = alias_file(target);
    let canonical = target.canonical_name();
    let mut out = String::new();

    out.push_str("// Code generated by generate-alias. DO NOT EDIT.\n");
    out.push_str(&format!("// source: {}\n\n", alias.name()));
    out.push_str(&format!(
        "//! Package `{}` forwards `{}` to `{}`.\n\n",
        target.legacy_name(),
        target.file.path(),
        target.canonical_package,
    ));
    out.push_str(&format!("use {};\n", target.canonical_package.replace('/', "::")));

    for public in &alias.public_dependency {
        let Some(dep) = alias.dependency.get(*public as usize) else {
            continue;
        };
        out.push_str(&format!("\n// Symbols defined in public import of {dep}.\n\n"));
        for decl in target.file.enums() {
            out.push_str(&format!("pub type {0} = {canonical}::{0};\n", decl.name()));
            for value in decl.values() {
                out.push_str(&format!(
                    "pub const {1}: {0} = {canonical}::{0}::{1};\n",
                    decl.name(),
                    value.name(),
                ));
            }
        }
        for decl in target.file.messages() {
            out.push_str(&format!("pub type {0} = {canonical}::{0};\n", decl.name()));
        }
    }

    let name = alias.name().trim_end_matches(".proto");
    GeneratedFile {
        name: format!("{name}.pb.rs"),
        content: out,
    }
}

/// Whether outputs are written or only diffed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Preview,
    Apply,
}

/// State of an output relative to its destination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileStatus {
    Unchanged,
    Changed,
    Created,
}

/// Outcome for one output file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportEntry {
    /// Destination relative to the root
    pub path: PathBuf,
    pub status: FileStatus,
    /// Unified diff against the destination (preview mode, changed files only)
    pub diff: Option<String>,
}

/// Outcome of one generation run
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AliasReport {
    pub mode: Mode,
    pub files: Vec<ReportEntry>,
}

impl AliasReport {
    /// Whether any destination differs from its generated content
    pub fn has_changes(&self) -> bool {
        self.files.iter().any(|f| f.status != FileStatus::Unchanged)
    }

    /// Pretty-printed JSON form of the report
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// Destination of `name` under `root`, with the leading `strip_prefix`
/// path components removed
pub fn destination(root: &Path, strip_prefix: &str, name: &str) -> PathBuf {
    let name = Path::new(name);
    root.join(name.strip_prefix(strip_prefix).unwrap_or(name))
}

/// Write (`Apply`) or diff (`Preview`) every generated file against `root`
pub fn write_outputs(
    root: &Path,
    strip_prefix: &str,
    files: &[GeneratedFile],
    mode: Mode,
) -> Result<AliasReport> {
    let mut entries = Vec::with_capacity(files.len());
    for file in files {
        let dest = destination(root, strip_prefix, &file.name);
        let rel = dest.strip_prefix(root).unwrap_or(&dest).to_path_buf();

        let existing = match fs::read_to_string(&dest) {
            Ok(text) => Some(text),
            Err(e) if e.kind() == io::ErrorKind::NotFound => None,
            Err(e) => return Err(e.into()),
        };
        let status = match &existing {
            None => FileStatus::Created,
            Some(old) if *old == file.content => FileStatus::Unchanged,
            Some(_) => FileStatus::Changed,
        };

        let diff = match mode {
            Mode::Apply => {
                if status != FileStatus::Unchanged {
                    replace_file(&dest, &file.content)?;
                }
                None
            }
            Mode::Preview if status == FileStatus::Unchanged => None,
            Mode::Preview => {
                let old = existing.as_deref().unwrap_or_default();
                let label = rel.display().to_string();
                let text = TextDiff::from_lines(old, file.content.as_str())
                    .unified_diff()
                    .context_radius(3)
                    .header(&label, &format!("{label}.new"))
                    .to_string();
                Some(text)
            }
        };
        tracing::debug!(path = %rel.display(), ?status, ?mode, "processed alias output");
        entries.push(ReportEntry {
            path: rel,
            status,
            diff,
        });
    }
    Ok(AliasReport { mode, files: entries })
}

/// Write through a sibling `.bak` file and rename over the destination
fn replace_file(dest: &Path, content: &str) -> Result<()> {
    if let Some(parent) = dest.parent() {
        fs::create_dir_all(parent)?;
    }
    let mut staged = dest.as_os_str().to_owned();
    staged.push(".bak");
    let staged = PathBuf::from(staged);
    fs::write(&staged, content)?;
    fs::rename(&staged, dest)?;
    Ok(())
}
