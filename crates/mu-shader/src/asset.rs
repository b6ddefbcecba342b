//! Shader asset loading: program manifests, single-stage modules, and the
//! directory scan used by tooling.
//!
//! A shader program is described by a `<name>.shader.json` manifest whose
//! `vertex`/`fragment` entries are paths relative to the manifest itself:
//!
//! ```json
//! { "vertex": "sprite_default.vert", "fragment": "sprite_default.frag" }
//! ```

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::Deserialize;

use crate::error::ShaderError;
use crate::link;
use crate::reflect::ShaderInterface;
use crate::stage::ShaderStage;
use crate::validate::{self, Diagnostic, Severity};

/// Base directory all asset paths resolve against.
#[derive(Debug, Clone)]
pub struct AssetRoot {
    root: PathBuf,
}

impl AssetRoot {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    #[inline]
    pub fn path(&self) -> &Path {
        &self.root
    }

    pub fn resolve(&self, rel: impl AsRef<Path>) -> PathBuf {
        self.root.join(rel)
    }
}

/// The JSON program manifest.
#[derive(Debug, Clone, Deserialize)]
pub struct ShaderProgramConfig {
    pub vertex: String,
    pub fragment: String,
}

impl ShaderProgramConfig {
    pub fn read(path: &Path) -> Result<Self, ShaderError> {
        let text = fs::read_to_string(path)
            .map_err(|source| ShaderError::Io { path: path.to_path_buf(), source })?;
        serde_json::from_str(&text)
            .map_err(|source| ShaderError::Manifest { path: path.to_path_buf(), source })
    }
}

/// One loaded, parsed, and reflected shader stage.
#[derive(Debug, Clone)]
pub struct ShaderModule {
    pub path: PathBuf,
    pub stage: ShaderStage,
    pub source: String,
    pub unit: mu_glsl::TranslationUnit,
    pub interface: ShaderInterface,
}

impl ShaderModule {
    pub fn load(path: &Path) -> Result<Self, ShaderError> {
        let stage = ShaderStage::from_path(path)
            .ok_or_else(|| ShaderError::Stage { path: path.to_path_buf() })?;
        let source = fs::read_to_string(path)
            .map_err(|source| ShaderError::Io { path: path.to_path_buf(), source })?;
        let unit = mu_glsl::parse_str(&source)
            .map_err(|source| ShaderError::Parse { path: path.to_path_buf(), source })?;
        let interface = ShaderInterface::reflect(&unit, stage);
        debug!("loaded {} shader {}", stage, path.display());
        Ok(Self { path: path.to_path_buf(), stage, source, unit, interface })
    }

    pub fn validate(&self) -> Vec<Diagnostic> {
        validate::validate_unit(&self.unit, self.stage)
    }
}

/// A [`Diagnostic`] attributed to the file it was found in.
#[derive(Debug, Clone, PartialEq)]
pub struct FileDiagnostic {
    pub path: PathBuf,
    pub diagnostic: Diagnostic,
}

impl FileDiagnostic {
    pub fn is_error(&self) -> bool {
        self.diagnostic.severity == Severity::Error
    }
}

impl fmt::Display for FileDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.path.display(), self.diagnostic)
    }
}

/// A vertex/fragment pair loaded from one manifest.
#[derive(Debug, Clone)]
pub struct ShaderProgram {
    pub name: String,
    pub vertex: ShaderModule,
    pub fragment: ShaderModule,
}

impl ShaderProgram {
    /// Load a program from `manifest`, resolved against `root`. An absolute
    /// manifest path passes through `root` unchanged.
    pub fn load(root: &AssetRoot, manifest: impl AsRef<Path>) -> Result<Self, ShaderError> {
        let manifest = root.resolve(manifest.as_ref());
        let manifest = manifest.as_path();
        let config = ShaderProgramConfig::read(manifest)?;
        // Source paths are manifest-relative, like every other asset config.
        let dir = manifest.parent().unwrap_or_else(|| Path::new(""));
        let vertex = ShaderModule::load(&dir.join(&config.vertex))?;
        let fragment = ShaderModule::load(&dir.join(&config.fragment))?;
        let name = program_name(manifest);
        info!("loaded shader program `{}`", name);
        Ok(Self { name, vertex, fragment })
    }

    /// Validate both stages and their pairing. Returns every finding.
    pub fn check(&self) -> Vec<FileDiagnostic> {
        let mut out = Vec::new();
        let attribute = |path: &Path, diags: Vec<Diagnostic>, out: &mut Vec<FileDiagnostic>| {
            out.extend(
                diags
                    .into_iter()
                    .map(|diagnostic| FileDiagnostic { path: path.to_path_buf(), diagnostic }),
            );
        };

        attribute(&self.vertex.path, self.vertex.validate(), &mut out);
        attribute(&self.fragment.path, self.fragment.validate(), &mut out);

        let report = link::link_interfaces(&self.vertex.interface, &self.fragment.interface);
        attribute(&self.vertex.path, report.vertex, &mut out);
        attribute(&self.fragment.path, report.fragment, &mut out);
        out
    }
}

/// Program name from its manifest path: `shaders/quad.shader.json` → `quad`.
pub fn program_name(manifest: &Path) -> String {
    manifest
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("")
        .trim_end_matches(".shader.json")
        .to_string()
}

/// Recursively collect every `*.shader.json` under `dir`, sorted.
pub fn find_manifests(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    walk(dir, &mut |path| {
        path.file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.ends_with(".shader.json"))
    }, &mut found)?;
    found.sort();
    Ok(found)
}

/// Recursively collect every `.vert`/`.frag` source under `dir`, sorted.
pub fn find_sources(dir: &Path) -> io::Result<Vec<PathBuf>> {
    let mut found = Vec::new();
    walk(dir, &mut |path| ShaderStage::from_path(path).is_some(), &mut found)?;
    found.sort();
    Ok(found)
}

fn walk(
    dir: &Path,
    keep: &mut impl FnMut(&Path) -> bool,
    out: &mut Vec<PathBuf>,
) -> io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            walk(&path, keep, out)?;
        } else if keep(&path) {
            out.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn program_name_strips_suffix() {
        assert_eq!(program_name(Path::new("assets/shaders/quad.shader.json")), "quad");
        assert_eq!(program_name(Path::new("sprite_default.vk.shader.json")), "sprite_default.vk");
    }

    #[test]
    fn manifest_format() {
        let config: ShaderProgramConfig =
            serde_json::from_str(r#"{ "vertex": "quad.vert", "fragment": "quad.frag" }"#).unwrap();
        assert_eq!(config.vertex, "quad.vert");
        assert_eq!(config.fragment, "quad.frag");
    }

    #[test]
    fn asset_root_resolves() {
        let root = AssetRoot::new("assets");
        assert_eq!(root.resolve("shaders/quad.vert"), PathBuf::from("assets/shaders/quad.vert"));
    }
}
