//! Program-level checks: does a fragment shader's input interface line up
//! with the vertex shader feeding it?

use std::collections::HashSet;

use crate::reflect::ShaderInterface;
use crate::stage::ShaderStage;
use crate::validate::{DiagKind, Diagnostic};

/// Link findings, split by which stage's source they belong to.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LinkReport {
    pub vertex: Vec<Diagnostic>,
    pub fragment: Vec<Diagnostic>,
}

impl LinkReport {
    pub fn is_empty(&self) -> bool {
        self.vertex.is_empty() && self.fragment.is_empty()
    }
}

/// Check that `fragment`'s inputs are fed by `vertex`'s outputs.
///
/// Varyings match by location when both sides declare one, by name
/// otherwise (that is how GL links non-located varyings). Types must match
/// exactly; an output nothing reads is only a warning.
pub fn link_interfaces(vertex: &ShaderInterface, fragment: &ShaderInterface) -> LinkReport {
    let mut report = LinkReport::default();

    if vertex.stage != ShaderStage::Vertex {
        report.vertex.push(Diagnostic::error(
            DiagKind::WrongStage { slot: ShaderStage::Vertex, found: vertex.stage },
            1,
            1,
        ));
    }
    if fragment.stage != ShaderStage::Fragment {
        report.fragment.push(Diagnostic::error(
            DiagKind::WrongStage { slot: ShaderStage::Fragment, found: fragment.stage },
            1,
            1,
        ));
    }
    if !report.is_empty() {
        // Varying matching is meaningless with the stages confused.
        return report;
    }

    if vertex.version.number != fragment.version.number {
        report.fragment.push(Diagnostic::error(
            DiagKind::VersionMismatch {
                vertex: vertex.version.number,
                fragment: fragment.version.number,
            },
            1,
            1,
        ));
        return report;
    }

    let mut consumed: HashSet<&str> = HashSet::new();

    for input in &fragment.inputs {
        // Located inputs match by location alone; hardware does not fall back
        // to names, so neither do we. Name matching only applies when the
        // location channel is unused on one side or the other.
        let matched = match input.location {
            Some(loc) if vertex.outputs.iter().any(|o| o.location.is_some()) => {
                vertex.outputs.iter().find(|o| o.location == Some(loc))
            }
            _ => vertex.outputs.iter().find(|o| o.name == input.name),
        };

        match matched {
            Some(output) => {
                consumed.insert(output.name.as_str());
                if output.ty != input.ty {
                    report.fragment.push(Diagnostic::error(
                        DiagKind::VaryingTypeMismatch {
                            name: input.name.clone(),
                            vertex_ty: output.ty.clone(),
                            fragment_ty: input.ty.clone(),
                        },
                        input.line,
                        input.col,
                    ));
                }
            }
            None => {
                report.fragment.push(Diagnostic::error(
                    DiagKind::UnmatchedInput { name: input.name.clone(), ty: input.ty.clone() },
                    input.line,
                    input.col,
                ));
            }
        }
    }

    for output in &vertex.outputs {
        if !consumed.contains(output.name.as_str()) {
            report.vertex.push(Diagnostic::warning(
                DiagKind::UnusedOutput { name: output.name.clone() },
                output.line,
                output.col,
            ));
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reflect::ShaderInterface;
    use mu_glsl::parse_str;

    fn iface(src: &str, stage: ShaderStage) -> ShaderInterface {
        ShaderInterface::reflect(&parse_str(src).unwrap(), stage)
    }

    #[test]
    fn matching_pair_links_clean() {
        let v = iface(
            "#version 330 core\nin vec2 v_pos;\nin vec2 v_uv;\nout vec2 frag_uv;\nuniform mat4 u_proj;",
            ShaderStage::Vertex,
        );
        let f = iface(
            "#version 330 core\nin vec2 frag_uv;\nout vec4 frag_color;\nuniform sampler2D u_texture;",
            ShaderStage::Fragment,
        );
        assert!(link_interfaces(&v, &f).is_empty());
    }

    #[test]
    fn unmatched_fragment_input() {
        let v = iface("#version 330 core\nin vec2 v_pos;", ShaderStage::Vertex);
        let f = iface(
            "#version 330 core\nin vec2 frag_uv;\nout vec4 frag_color;",
            ShaderStage::Fragment,
        );
        let report = link_interfaces(&v, &f);
        assert!(matches!(&report.fragment[0].kind, DiagKind::UnmatchedInput { .. }));
    }

    #[test]
    fn varying_type_mismatch() {
        let v = iface("#version 330 core\nout vec3 frag_uv;", ShaderStage::Vertex);
        let f = iface(
            "#version 330 core\nin vec2 frag_uv;\nout vec4 frag_color;",
            ShaderStage::Fragment,
        );
        let report = link_interfaces(&v, &f);
        assert!(matches!(&report.fragment[0].kind, DiagKind::VaryingTypeMismatch { .. }));
    }

    #[test]
    fn matches_by_location_in_vulkan() {
        // Names differ across the stage boundary; location carries the match.
        let v = iface(
            "#version 450\nlayout(location = 0) out vec2 out_uv;",
            ShaderStage::Vertex,
        );
        let f = iface(
            "#version 450\nlayout(location = 0) in vec2 in_uv;\nlayout(location = 0) out vec4 c;",
            ShaderStage::Fragment,
        );
        assert!(link_interfaces(&v, &f).is_empty());
    }

    #[test]
    fn location_mismatch_does_not_fall_back_to_names() {
        // Same varying name on both sides, but the locations disagree; the
        // input is unfed on real hardware, so the name must not rescue it.
        let v = iface(
            "#version 450\nlayout(location = 0) out vec2 frag_uv;",
            ShaderStage::Vertex,
        );
        let f = iface(
            "#version 450\nlayout(location = 2) in vec2 frag_uv;\nlayout(location = 0) out vec4 c;",
            ShaderStage::Fragment,
        );
        let report = link_interfaces(&v, &f);
        assert!(matches!(&report.fragment[0].kind, DiagKind::UnmatchedInput { .. }));
        assert!(matches!(&report.vertex[0].kind, DiagKind::UnusedOutput { .. }));
    }

    #[test]
    fn unused_vertex_output_warns() {
        let v = iface(
            "#version 330 core\nout vec2 frag_uv;\nout vec4 frag_tint;",
            ShaderStage::Vertex,
        );
        let f = iface(
            "#version 330 core\nin vec2 frag_uv;\nout vec4 frag_color;",
            ShaderStage::Fragment,
        );
        let report = link_interfaces(&v, &f);
        assert_eq!(report.fragment.len(), 0);
        assert!(matches!(&report.vertex[0].kind, DiagKind::UnusedOutput { .. }));
    }

    #[test]
    fn version_mismatch_is_an_error() {
        let v = iface("#version 330 core\nout vec2 frag_uv;", ShaderStage::Vertex);
        let f = iface(
            "#version 450\nlayout(location=0) in vec2 frag_uv;\nlayout(location=0) out vec4 c;",
            ShaderStage::Fragment,
        );
        let report = link_interfaces(&v, &f);
        assert!(matches!(&report.fragment[0].kind, DiagKind::VersionMismatch { .. }));
    }

    #[test]
    fn swapped_stages_refuse_to_link() {
        let v = iface("#version 330 core\nout vec2 frag_uv;", ShaderStage::Vertex);
        let report = link_interfaces(&v, &v.clone());
        assert!(matches!(&report.fragment[0].kind, DiagKind::WrongStage { .. }));
    }
}
