//! Lowers a parsed shader into its external ABI: the attribute, varying,
//! uniform, block, and sampler declarations the host pipeline must match.

use mu_glsl::ast::{BlockField, Decl, Storage, TranslationUnit, TypeName, Version};

use crate::stage::{Dialect, ShaderStage};

/// An `in` or `out` interface variable.
#[derive(Debug, Clone, PartialEq)]
pub struct Varying {
    pub name: String,
    pub ty: TypeName,
    pub location: Option<u32>,
    pub line: usize,
    pub col: usize,
}

/// A loose (non-block, non-opaque) uniform. GL-style only.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformVar {
    pub name: String,
    pub ty: TypeName,
    pub array: Option<u32>,
    pub line: usize,
    pub col: usize,
}

/// A named uniform block.
#[derive(Debug, Clone, PartialEq)]
pub struct UniformBlock {
    pub name: String,
    pub instance: Option<String>,
    pub set: Option<u32>,
    pub binding: Option<u32>,
    pub fields: Vec<BlockField>,
    pub line: usize,
    pub col: usize,
}

/// An opaque sampler uniform.
#[derive(Debug, Clone, PartialEq)]
pub struct SamplerBinding {
    pub name: String,
    pub ty: TypeName,
    pub set: Option<u32>,
    pub binding: Option<u32>,
    pub line: usize,
    pub col: usize,
}

/// The complete external interface of one shader stage.
#[derive(Debug, Clone, PartialEq)]
pub struct ShaderInterface {
    pub stage: ShaderStage,
    pub version: Version,
    pub dialect: Dialect,
    pub inputs: Vec<Varying>,
    pub outputs: Vec<Varying>,
    pub uniforms: Vec<UniformVar>,
    pub blocks: Vec<UniformBlock>,
    pub samplers: Vec<SamplerBinding>,
}

impl ShaderInterface {
    /// Reflection is total: a well-parsed unit always yields an interface.
    /// Anything questionable is left for [`crate::validate`] to report.
    pub fn reflect(unit: &TranslationUnit, stage: ShaderStage) -> ShaderInterface {
        let mut iface = ShaderInterface {
            stage,
            version: unit.version,
            dialect: Dialect::of(unit.version),
            inputs: Vec::new(),
            outputs: Vec::new(),
            uniforms: Vec::new(),
            blocks: Vec::new(),
            samplers: Vec::new(),
        };

        for decl in &unit.decls {
            match decl {
                Decl::Variable(v) => {
                    let varying = Varying {
                        name: v.name.clone(),
                        ty: v.ty.clone(),
                        location: v.layout.location,
                        line: v.line,
                        col: v.col,
                    };
                    match v.storage {
                        Storage::In => iface.inputs.push(varying),
                        Storage::Out => iface.outputs.push(varying),
                        Storage::Uniform => {
                            if v.ty.is_opaque() {
                                iface.samplers.push(SamplerBinding {
                                    name: v.name.clone(),
                                    ty: v.ty.clone(),
                                    set: v.layout.set,
                                    binding: v.layout.binding,
                                    line: v.line,
                                    col: v.col,
                                });
                            } else {
                                iface.uniforms.push(UniformVar {
                                    name: v.name.clone(),
                                    ty: v.ty.clone(),
                                    array: v.array,
                                    line: v.line,
                                    col: v.col,
                                });
                            }
                        }
                    }
                }
                Decl::Block(b) => {
                    iface.blocks.push(UniformBlock {
                        name: b.name.clone(),
                        instance: b.instance.clone(),
                        set: b.layout.set,
                        binding: b.layout.binding,
                        fields: b.fields.clone(),
                        line: b.line,
                        col: b.col,
                    });
                }
            }
        }

        iface
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mu_glsl::parse_str;

    #[test]
    fn reflects_sprite_vertex_interface() {
        let unit = parse_str(
            r#"
            #version 330 core
            in vec2 v_pos;
            in vec2 v_uv;
            in mat4 i_world_view;
            uniform mat4 u_proj;
            out vec2 frag_uv;
            void main() {}
            "#,
        )
        .unwrap();
        let iface = ShaderInterface::reflect(&unit, ShaderStage::Vertex);
        assert_eq!(iface.dialect, Dialect::Gl330);
        assert_eq!(iface.inputs.len(), 3);
        assert_eq!(iface.outputs.len(), 1);
        assert_eq!(iface.uniforms.len(), 1);
        assert_eq!(iface.outputs[0].name, "frag_uv");
    }

    #[test]
    fn samplers_split_from_uniforms() {
        let unit = parse_str(
            "#version 330 core\nuniform sampler2D u_texture;\nuniform vec4 u_tint;\n",
        )
        .unwrap();
        let iface = ShaderInterface::reflect(&unit, ShaderStage::Fragment);
        assert_eq!(iface.samplers.len(), 1);
        assert_eq!(iface.uniforms.len(), 1);
        assert_eq!(iface.samplers[0].name, "u_texture");
    }

    #[test]
    fn vulkan_block_carries_set_and_binding() {
        let unit = parse_str(
            "#version 450\nlayout(set = 0, binding = 2) uniform Camera { mat4 u_proj; };\n",
        )
        .unwrap();
        let iface = ShaderInterface::reflect(&unit, ShaderStage::Vertex);
        assert_eq!(iface.blocks[0].set, Some(0));
        assert_eq!(iface.blocks[0].binding, Some(2));
        assert_eq!(iface.dialect, Dialect::Vulkan450);
    }
}
