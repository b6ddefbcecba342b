use std::fmt;
use std::path::Path;

use mu_glsl::ast::Version;

/// Pipeline stage of a shader module.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShaderStage {
    Vertex,
    Fragment,
}

impl ShaderStage {
    /// Sniff the stage from a source file extension (`.vert`/`.vs` or
    /// `.frag`/`.fs`).
    pub fn from_path(path: &Path) -> Option<ShaderStage> {
        match path.extension().and_then(|e| e.to_str()) {
            Some("vert") | Some("vs") => Some(ShaderStage::Vertex),
            Some("frag") | Some("fs") => Some(ShaderStage::Fragment),
            _ => None,
        }
    }
}

impl fmt::Display for ShaderStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ShaderStage::Vertex => "vertex",
            ShaderStage::Fragment => "fragment",
        })
    }
}

/// Resource-binding dialect implied by the `#version` directive.
///
/// The engine's shader history carries each program in two flavors: GLSL
/// `330 core` with named uniforms (the glium path) and GLSL `450` with
/// explicit `location`/`set`/`binding` qualifiers (the SPIR-V path).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    Gl330,
    Vulkan450,
}

impl Dialect {
    pub fn of(version: Version) -> Dialect {
        // 440 is where explicit descriptor-style layouts became the norm;
        // anything at or past it validates under the Vulkan-style rules.
        if version.number >= 440 {
            Dialect::Vulkan450
        } else {
            Dialect::Gl330
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Dialect::Gl330 => "GL 330",
            Dialect::Vulkan450 => "Vulkan-style 450",
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stage_from_extension() {
        assert_eq!(ShaderStage::from_path(Path::new("a/sprite.vert")), Some(ShaderStage::Vertex));
        assert_eq!(ShaderStage::from_path(Path::new("quad.fs")), Some(ShaderStage::Fragment));
        assert_eq!(ShaderStage::from_path(Path::new("quad.glsl")), None);
    }

    #[test]
    fn dialect_thresholds() {
        assert_eq!(Dialect::of(Version { number: 330, core: true }), Dialect::Gl330);
        assert_eq!(Dialect::of(Version { number: 450, core: false }), Dialect::Vulkan450);
        assert_eq!(Dialect::of(Version { number: 440, core: false }), Dialect::Vulkan450);
        assert_eq!(Dialect::of(Version { number: 150, core: true }), Dialect::Gl330);
    }
}
