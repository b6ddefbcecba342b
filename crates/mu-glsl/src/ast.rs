use std::fmt;

/// A parsed shader source: version, extensions, and the global interface
/// declarations. Function bodies and expressions are not represented.
#[derive(Debug, Clone, PartialEq)]
pub struct TranslationUnit {
    pub version: Version,
    pub extensions: Vec<Extension>,
    pub decls: Vec<Decl>,
}

/// `#version NNN [profile]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Version {
    pub number: u32,
    /// True for the `core` profile. `compatibility` and `es` both parse with
    /// `core: false`.
    pub core: bool,
}

/// `#extension <name> : <behavior>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extension {
    pub name: String,
    pub behavior: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Decl {
    Variable(VarDecl),
    Block(BlockDecl),
}

/// Storage qualifier of an interface declaration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Storage {
    In,
    Out,
    Uniform,
}

impl fmt::Display for Storage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Storage::In => "in",
            Storage::Out => "out",
            Storage::Uniform => "uniform",
        })
    }
}

/// Contents of a `layout(...)` qualifier list.
///
/// `location`, `set`, and `binding` are pulled out; everything else
/// (`std140`, `push_constant`, ...) lands in `flags` verbatim.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Layout {
    pub location: Option<u32>,
    pub set: Option<u32>,
    pub binding: Option<u32>,
    pub flags: Vec<String>,
}

/// A global `in`/`out`/`uniform` variable declaration.
#[derive(Debug, Clone, PartialEq)]
pub struct VarDecl {
    pub layout: Layout,
    pub storage: Storage,
    pub ty: TypeName,
    pub name: String,
    /// `Some(n)` for `name[n]` array declarations.
    pub array: Option<u32>,
    pub line: usize,
    pub col: usize,
}

/// One field of a uniform block.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockField {
    pub ty: TypeName,
    pub name: String,
    pub array: Option<u32>,
}

/// A named uniform block: `layout(...) uniform Name { fields } [instance];`.
#[derive(Debug, Clone, PartialEq)]
pub struct BlockDecl {
    pub layout: Layout,
    pub name: String,
    pub fields: Vec<BlockField>,
    pub instance: Option<String>,
    pub line: usize,
    pub col: usize,
}

// ── Types ─────────────────────────────────────────────────────────────────

/// GLSL type keywords relevant to interface declarations.
///
/// Unrecognized keywords parse as [`TypeName::Named`] so shaders using newer
/// types still produce a usable interface instead of a parse failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeName {
    Float,
    Vec2,
    Vec3,
    Vec4,
    Int,
    IVec2,
    IVec3,
    IVec4,
    UInt,
    UVec2,
    UVec3,
    UVec4,
    Bool,
    BVec2,
    BVec3,
    BVec4,
    Mat2,
    Mat3,
    Mat4,
    Sampler2D,
    Sampler2DArray,
    Sampler3D,
    SamplerCube,
    Named(String),
}

impl TypeName {
    pub fn parse(word: &str) -> TypeName {
        use TypeName::*;
        match word {
            "float" => Float,
            "vec2" => Vec2,
            "vec3" => Vec3,
            "vec4" => Vec4,
            "int" => Int,
            "ivec2" => IVec2,
            "ivec3" => IVec3,
            "ivec4" => IVec4,
            "uint" => UInt,
            "uvec2" => UVec2,
            "uvec3" => UVec3,
            "uvec4" => UVec4,
            "bool" => Bool,
            "bvec2" => BVec2,
            "bvec3" => BVec3,
            "bvec4" => BVec4,
            "mat2" => Mat2,
            "mat3" => Mat3,
            "mat4" => Mat4,
            "sampler2D" => Sampler2D,
            "sampler2DArray" => Sampler2DArray,
            "sampler3D" => Sampler3D,
            "samplerCube" => SamplerCube,
            other => Named(other.to_string()),
        }
    }

    /// Number of attribute locations this type occupies. Matrix attributes
    /// span one location per column.
    pub fn location_slots(&self) -> u32 {
        match self {
            TypeName::Mat2 => 2,
            TypeName::Mat3 => 3,
            TypeName::Mat4 => 4,
            _ => 1,
        }
    }

    /// Opaque types (samplers) cannot live in uniform blocks and are bound
    /// through descriptor bindings, not plain uniforms.
    pub fn is_opaque(&self) -> bool {
        matches!(
            self,
            TypeName::Sampler2D
                | TypeName::Sampler2DArray
                | TypeName::Sampler3D
                | TypeName::SamplerCube
        )
    }

    pub fn is_matrix(&self) -> bool {
        matches!(self, TypeName::Mat2 | TypeName::Mat3 | TypeName::Mat4)
    }
}

impl fmt::Display for TypeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use TypeName::*;
        let s = match self {
            Float => "float",
            Vec2 => "vec2",
            Vec3 => "vec3",
            Vec4 => "vec4",
            Int => "int",
            IVec2 => "ivec2",
            IVec3 => "ivec3",
            IVec4 => "ivec4",
            UInt => "uint",
            UVec2 => "uvec2",
            UVec3 => "uvec3",
            UVec4 => "uvec4",
            Bool => "bool",
            BVec2 => "bvec2",
            BVec3 => "bvec3",
            BVec4 => "bvec4",
            Mat2 => "mat2",
            Mat3 => "mat3",
            Mat4 => "mat4",
            Sampler2D => "sampler2D",
            Sampler2DArray => "sampler2DArray",
            Sampler3D => "sampler3D",
            SamplerCube => "samplerCube",
            Named(other) => other.as_str(),
        };
        f.write_str(s)
    }
}
