//! The shipped shader set must load, validate, and link cleanly in both
//! dialects.

use std::path::PathBuf;

use mu_shader::asset::{self, AssetRoot, ShaderProgram};
use mu_shader::stage::{Dialect, ShaderStage};

fn shader_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../assets/shaders")
}

fn shader_root() -> AssetRoot {
    AssetRoot::new(shader_dir())
}

#[test]
fn every_shipped_program_checks_clean() {
    let root = shader_root();
    let manifests = asset::find_manifests(root.path()).unwrap();
    assert_eq!(manifests.len(), 7, "unexpected shader set: {:?}", manifests);

    for manifest in manifests {
        let program = ShaderProgram::load(&root, &manifest).unwrap();
        let findings = program.check();
        assert!(
            findings.is_empty(),
            "program `{}` has findings: {:#?}",
            program.name,
            findings
        );
    }
}

#[test]
fn sprite_gl_variant_uses_a_matrix_attribute() {
    let program =
        ShaderProgram::load(&shader_root(), "sprite_default.shader.json").unwrap();
    assert_eq!(program.vertex.interface.dialect, Dialect::Gl330);

    let world_view = program
        .vertex
        .interface
        .inputs
        .iter()
        .find(|v| v.name == "i_world_view")
        .unwrap();
    assert_eq!(world_view.ty.location_slots(), 4);
}

#[test]
fn sprite_vulkan_variant_uses_column_vectors() {
    let program =
        ShaderProgram::load(&shader_root(), "sprite_default.vk.shader.json").unwrap();
    assert_eq!(program.vertex.interface.dialect, Dialect::Vulkan450);

    let cols: Vec<_> = program
        .vertex
        .interface
        .inputs
        .iter()
        .filter(|v| v.name.starts_with("i_col"))
        .collect();
    assert_eq!(cols.len(), 4);
    assert!(cols.iter().all(|v| v.location.is_some()));
    assert!(!program.vertex.interface.inputs.iter().any(|v| v.ty.is_matrix()));
}

#[test]
fn quad_vulkan_variant_declares_descriptor_bindings() {
    let program = ShaderProgram::load(&shader_root(), "quad.vk.shader.json").unwrap();

    let camera = &program.vertex.interface.blocks[0];
    assert_eq!(camera.name, "CameraData");
    assert_eq!((camera.set, camera.binding), (Some(0), Some(0)));

    let sampler = &program.fragment.interface.samplers[0];
    assert_eq!(sampler.name, "u_texture");
    assert_eq!((sampler.set, sampler.binding), (Some(1), Some(0)));
}

#[test]
fn gl_variants_carry_named_uniforms() {
    let program = ShaderProgram::load(&shader_root(), "ui_image.shader.json").unwrap();
    assert_eq!(program.vertex.stage, ShaderStage::Vertex);
    assert!(program.vertex.interface.uniforms.iter().any(|u| u.name == "u_proj"));
    assert!(program.fragment.interface.uniforms.iter().any(|u| u.name == "u_tint"));
    assert!(program.fragment.interface.samplers.iter().any(|s| s.name == "u_texture"));
}

#[test]
fn stray_source_scan_sees_every_stage_file() {
    let sources = asset::find_sources(&shader_dir()).unwrap();
    // 7 programs, two stages each.
    assert_eq!(sources.len(), 14);
}
