//! Mu engine shader asset toolkit.
//!
//! Shaders are the one asset class whose external contract the host engine
//! must match bit-exactly: attribute locations, uniform blocks, descriptor
//! set/binding numbers, and the varyings crossing the vertex→fragment
//! boundary. This crate loads shader programs from their JSON manifests,
//! reflects each stage's interface, and checks both the per-file dialect
//! rules and the pairing between stages.
//!
//! Parsing itself lives in the dependency-free [`mu_glsl`] crate.

pub mod asset;
pub mod error;
pub mod link;
pub mod logging;
pub mod reflect;
pub mod stage;
pub mod validate;

pub use asset::{AssetRoot, FileDiagnostic, ShaderModule, ShaderProgram, ShaderProgramConfig};
pub use error::ShaderError;
pub use link::{LinkReport, link_interfaces};
pub use reflect::ShaderInterface;
pub use stage::{Dialect, ShaderStage};
pub use validate::{DiagKind, Diagnostic, Severity, validate_unit};
