//! Per-module validation: checks one parsed shader against the rules of its
//! dialect (GL 330 named uniforms vs. Vulkan-style 450 explicit bindings).

use std::collections::{HashMap, HashSet};
use std::fmt;

use mu_glsl::ast::{Decl, TranslationUnit, TypeName};

use crate::reflect::{ShaderInterface, Varying};
use crate::stage::{Dialect, ShaderStage};

// ── Diagnostics ───────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
        })
    }
}

/// Everything validation and linking can complain about.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum DiagKind {
    #[error("unknown GLSL version {version}; validating as {dialect}")]
    UnknownVersion { version: u32, dialect: Dialect },
    #[error("duplicate {kind} name `{name}`")]
    DuplicateName { kind: &'static str, name: String },
    #[error("{storage} `{name}` overlaps location {location} already used by `{prev}`")]
    LocationOverlap { storage: &'static str, name: String, location: u32, prev: String },
    #[error("sampler `{name}` cannot be declared as a stage {storage}")]
    SamplerVarying { storage: &'static str, name: String },
    #[error("fragment shader declares no color output")]
    NoFragmentOutput,
    #[error("`{name}` uses the Vulkan-style `{key}` qualifier in a GL 330 shader")]
    VulkanQualifierInGl { name: String, key: &'static str },
    #[error("{storage} `{name}` is missing an explicit location (required by {dialect})")]
    MissingLocation { storage: &'static str, name: String, dialect: Dialect },
    #[error("loose uniform `{name}` is not allowed in Vulkan-style GLSL; move it into a uniform block")]
    LooseUniform { name: String },
    #[error("`{name}` is missing set/binding qualifiers (required by {dialect})")]
    MissingBinding { name: String, dialect: Dialect },
    #[error("(set = {set}, binding = {binding}) is used by both `{prev}` and `{name}`")]
    DuplicateBinding { set: u32, binding: u32, prev: String, name: String },
    #[error("matrix vertex input `{name}` does not port to the SPIR-V path; pass four column vectors and reconstruct the matrix")]
    MatrixAttribute { name: String },

    // Program-level kinds, reported by `link`.
    #[error("manifest {slot} entry points at a {found} shader")]
    WrongStage { slot: ShaderStage, found: ShaderStage },
    #[error("stage version mismatch: vertex is {vertex}, fragment is {fragment}")]
    VersionMismatch { vertex: u32, fragment: u32 },
    #[error("fragment input `{name}` ({ty}) has no matching vertex output")]
    UnmatchedInput { name: String, ty: TypeName },
    #[error("varying `{name}`: vertex outputs {vertex_ty} but fragment expects {fragment_ty}")]
    VaryingTypeMismatch { name: String, vertex_ty: TypeName, fragment_ty: TypeName },
    #[error("vertex output `{name}` is never read by the fragment shader")]
    UnusedOutput { name: String },
}

/// One finding, positioned in the source it was found in.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,
    pub kind: DiagKind,
    pub line: usize,
    pub col: usize,
}

impl Diagnostic {
    pub fn error(kind: DiagKind, line: usize, col: usize) -> Self {
        Self { severity: Severity::Error, kind, line, col }
    }

    pub fn warning(kind: DiagKind, line: usize, col: usize) -> Self {
        Self { severity: Severity::Warning, kind, line, col }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}: {}", self.line, self.col, self.severity, self.kind)
    }
}

// ── Validation ────────────────────────────────────────────────────────────

/// Validate a parsed shader for the given stage.
///
/// Returns every finding rather than failing fast; linting wants the full
/// list.
pub fn validate_unit(unit: &TranslationUnit, stage: ShaderStage) -> Vec<Diagnostic> {
    let iface = ShaderInterface::reflect(unit, stage);
    let mut diags = Vec::new();

    if iface.version.number != 330 && iface.version.number != 450 {
        diags.push(Diagnostic::warning(
            DiagKind::UnknownVersion { version: iface.version.number, dialect: iface.dialect },
            1,
            1,
        ));
    }

    check_duplicate_names(&iface, &mut diags);
    check_location_overlap("input", &iface.inputs, &mut diags);
    check_location_overlap("output", &iface.outputs, &mut diags);
    check_opaque_varyings(&iface, &mut diags);

    if stage == ShaderStage::Fragment && iface.outputs.is_empty() {
        diags.push(Diagnostic::error(DiagKind::NoFragmentOutput, 1, 1));
    }

    match iface.dialect {
        Dialect::Gl330 => check_gl(unit, &mut diags),
        Dialect::Vulkan450 => check_vulkan(&iface, &mut diags),
    }

    diags
}

fn check_duplicate_names(iface: &ShaderInterface, diags: &mut Vec<Diagnostic>) {
    for (kind, names) in [
        ("input", collect_names(iface.inputs.iter().map(|v| (&v.name, v.line, v.col)))),
        ("output", collect_names(iface.outputs.iter().map(|v| (&v.name, v.line, v.col)))),
        (
            "uniform",
            collect_names(
                iface
                    .uniforms
                    .iter()
                    .map(|u| (&u.name, u.line, u.col))
                    .chain(iface.samplers.iter().map(|s| (&s.name, s.line, s.col)))
                    .chain(iface.blocks.iter().map(|b| (&b.name, b.line, b.col))),
            ),
        ),
    ] {
        for (name, line, col) in names {
            diags.push(Diagnostic::error(DiagKind::DuplicateName { kind, name }, line, col));
        }
    }
}

/// Returns the second-and-later occurrences of each name.
fn collect_names<'a>(
    it: impl Iterator<Item = (&'a String, usize, usize)>,
) -> Vec<(String, usize, usize)> {
    let mut seen = HashSet::new();
    let mut dups = Vec::new();
    for (name, line, col) in it {
        if !seen.insert(name.clone()) {
            dups.push((name.clone(), line, col));
        }
    }
    dups
}

fn check_location_overlap(storage: &'static str, varyings: &[Varying], diags: &mut Vec<Diagnostic>) {
    // A matrix attribute occupies one location per column.
    let mut used: HashMap<u32, String> = HashMap::new();
    for v in varyings {
        let Some(base) = v.location else { continue };
        let mut clash = None;
        for slot in base..base + v.ty.location_slots() {
            if let Some(prev) = used.get(&slot) {
                clash = Some((slot, prev.clone()));
                break;
            }
        }
        if let Some((location, prev)) = clash {
            diags.push(Diagnostic::error(
                DiagKind::LocationOverlap { storage, name: v.name.clone(), location, prev },
                v.line,
                v.col,
            ));
        } else {
            for slot in base..base + v.ty.location_slots() {
                used.insert(slot, v.name.clone());
            }
        }
    }
}

fn check_opaque_varyings(iface: &ShaderInterface, diags: &mut Vec<Diagnostic>) {
    for (storage, varyings) in [("input", &iface.inputs), ("output", &iface.outputs)] {
        for v in varyings.iter().filter(|v| v.ty.is_opaque()) {
            diags.push(Diagnostic::error(
                DiagKind::SamplerVarying { storage, name: v.name.clone() },
                v.line,
                v.col,
            ));
        }
    }
}

fn check_gl(unit: &TranslationUnit, diags: &mut Vec<Diagnostic>) {
    // `set`/`binding` only exist on the SPIR-V path; GLSL 330 rejects both.
    for decl in &unit.decls {
        let (layout, name, line, col) = match decl {
            Decl::Variable(v) => (&v.layout, &v.name, v.line, v.col),
            Decl::Block(b) => (&b.layout, &b.name, b.line, b.col),
        };
        for (opt, key) in [(layout.set, "set"), (layout.binding, "binding")] {
            if opt.is_some() {
                diags.push(Diagnostic::error(
                    DiagKind::VulkanQualifierInGl { name: name.clone(), key },
                    line,
                    col,
                ));
            }
        }
    }
}

fn check_vulkan(iface: &ShaderInterface, diags: &mut Vec<Diagnostic>) {
    let dialect = iface.dialect;

    for (storage, varyings) in [("input", &iface.inputs), ("output", &iface.outputs)] {
        for v in varyings.iter().filter(|v| v.location.is_none()) {
            diags.push(Diagnostic::error(
                DiagKind::MissingLocation { storage, name: v.name.clone(), dialect },
                v.line,
                v.col,
            ));
        }
    }

    for u in &iface.uniforms {
        diags.push(Diagnostic::error(
            DiagKind::LooseUniform { name: u.name.clone() },
            u.line,
            u.col,
        ));
    }

    // Samplers and blocks both live in descriptor sets.
    let mut used: HashMap<(u32, u32), String> = HashMap::new();
    let bindings = iface
        .samplers
        .iter()
        .map(|s| (&s.name, s.set, s.binding, s.line, s.col))
        .chain(iface.blocks.iter().map(|b| (&b.name, b.set, b.binding, b.line, b.col)));
    for (name, set, binding, line, col) in bindings {
        match (set, binding) {
            (Some(set), Some(binding)) => {
                if let Some(prev) = used.insert((set, binding), name.clone()) {
                    diags.push(Diagnostic::error(
                        DiagKind::DuplicateBinding { set, binding, prev, name: name.clone() },
                        line,
                        col,
                    ));
                }
            }
            _ => {
                diags.push(Diagnostic::error(
                    DiagKind::MissingBinding { name: name.clone(), dialect },
                    line,
                    col,
                ));
            }
        }
    }

    if iface.stage == ShaderStage::Vertex {
        for v in iface.inputs.iter().filter(|v| v.ty.is_matrix()) {
            diags.push(Diagnostic::error(
                DiagKind::MatrixAttribute { name: v.name.clone() },
                v.line,
                v.col,
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mu_glsl::parse_str;

    fn diags(src: &str, stage: ShaderStage) -> Vec<Diagnostic> {
        validate_unit(&parse_str(src).unwrap(), stage)
    }

    fn errors(src: &str, stage: ShaderStage) -> Vec<DiagKind> {
        diags(src, stage)
            .into_iter()
            .filter(|d| d.severity == Severity::Error)
            .map(|d| d.kind)
            .collect()
    }

    #[test]
    fn clean_gl_vertex() {
        let src = r#"
            #version 330 core
            in vec2 v_pos;
            in vec2 v_uv;
            uniform mat4 u_proj;
            out vec2 frag_uv;
            void main() {}
        "#;
        assert!(diags(src, ShaderStage::Vertex).is_empty());
    }

    #[test]
    fn gl_rejects_set_binding() {
        let errs = errors(
            "#version 330 core\nlayout(binding = 0) uniform sampler2D u_texture;\nout vec4 c;",
            ShaderStage::Fragment,
        );
        assert!(matches!(&errs[0], DiagKind::VulkanQualifierInGl { key: "binding", .. }));
    }

    #[test]
    fn vulkan_requires_locations() {
        let errs = errors("#version 450\nin vec2 v_pos;", ShaderStage::Vertex);
        assert!(matches!(&errs[0], DiagKind::MissingLocation { .. }));
    }

    #[test]
    fn vulkan_rejects_loose_uniform() {
        let errs = errors(
            "#version 450\nlayout(location=0) out vec4 c;\nuniform mat4 u_proj;",
            ShaderStage::Fragment,
        );
        assert!(errs.iter().any(|k| matches!(k, DiagKind::LooseUniform { .. })));
    }

    #[test]
    fn vulkan_sampler_needs_set_and_binding() {
        let errs = errors(
            "#version 450\nlayout(location=0) out vec4 c;\nlayout(binding = 0) uniform sampler2D u_texture;",
            ShaderStage::Fragment,
        );
        assert!(errs.iter().any(|k| matches!(k, DiagKind::MissingBinding { .. })));
    }

    #[test]
    fn duplicate_descriptor_binding() {
        let errs = errors(
            r#"
            #version 450
            layout(location = 0) out vec4 c;
            layout(set = 0, binding = 0) uniform sampler2D u_a;
            layout(set = 0, binding = 0) uniform Camera { mat4 u_proj; };
            "#,
            ShaderStage::Fragment,
        );
        assert!(errs.iter().any(|k| matches!(k, DiagKind::DuplicateBinding { .. })));
    }

    #[test]
    fn matrix_attribute_spans_locations() {
        // i_world_view at 2 occupies 2..6, so location 4 overlaps.
        let errs = errors(
            r#"
            #version 330 core
            layout(location = 2) in mat4 i_world_view;
            layout(location = 4) in vec2 i_uv_min;
            "#,
            ShaderStage::Vertex,
        );
        assert!(matches!(&errs[0], DiagKind::LocationOverlap { location: 4, .. }));
    }

    #[test]
    fn vulkan_rejects_matrix_attribute() {
        let errs = errors(
            "#version 450\nlayout(location = 0) in mat4 i_world_view;",
            ShaderStage::Vertex,
        );
        assert!(errs.iter().any(|k| matches!(k, DiagKind::MatrixAttribute { .. })));
    }

    #[test]
    fn fragment_needs_an_output() {
        let errs = errors("#version 330 core\nin vec2 frag_uv;", ShaderStage::Fragment);
        assert!(errs.iter().any(|k| matches!(k, DiagKind::NoFragmentOutput)));
    }

    #[test]
    fn duplicate_input_name() {
        let errs = errors(
            "#version 330 core\nin vec2 v_pos;\nin vec4 v_pos;",
            ShaderStage::Vertex,
        );
        assert!(matches!(&errs[0], DiagKind::DuplicateName { kind: "input", .. }));
    }

    #[test]
    fn odd_version_warns() {
        let ds = diags("#version 410 core\nin vec2 v_pos;", ShaderStage::Vertex);
        assert!(ds.iter().any(|d| d.severity == Severity::Warning
            && matches!(d.kind, DiagKind::UnknownVersion { version: 410, .. })));
    }
}
