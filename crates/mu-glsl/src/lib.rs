//! Lexer, parser, and AST for GLSL shader **interface declarations**.
//!
//! This crate recovers the externally visible contract of a shader — its
//! `#version`, extensions, and global `in`/`out`/`uniform` declarations
//! (including uniform blocks and `layout(...)` qualifiers). Function bodies
//! and expressions are tokenized only far enough to be skipped; this is a
//! reflection front-end, not a compiler.
//!
//! It is intentionally dependency-free so it can be consumed by linters and
//! editor tooling without pulling in any engine or GPU code.
//!
//! # Structure
//!
//! | Module | Contents |
//! |--------|----------|
//! | [`ast`] | `TranslationUnit`, `Decl`, `VarDecl`, `BlockDecl`, `TypeName` |
//! | [`error`] | `ParseError` |
//! | [`lexer`] | `Lexer`, `Token` |
//! | [`parser`] | `parse_str` entry point |
//!
//! # Quick start
//!
//! ```rust
//! use mu_glsl::parse_str;
//!
//! let src = r#"
//!     #version 330 core
//!     in vec2 v_pos;
//!     uniform mat4 u_proj;
//!     void main() { gl_Position = u_proj * vec4(v_pos, 0.0, 1.0); }
//! "#;
//!
//! let unit = parse_str(src).unwrap();
//! assert_eq!(unit.version.number, 330);
//! assert_eq!(unit.decls.len(), 2);
//! ```

pub mod ast;
pub mod error;
pub mod lexer;
pub mod parser;

pub use ast::TranslationUnit;
pub use error::ParseError;
pub use parser::parse_str;
