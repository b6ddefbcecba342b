//! `mu-lint [ASSET_DIR]` — validate every shader program under an asset
//! directory.
//!
//! Checks each `*.shader.json` program (both stages plus their pairing) and
//! every `.vert`/`.frag` source no manifest references, so stray shaders
//! keep compiling too. Exit code 0 means no errors, 1 means findings,
//! 2 means the scan itself failed.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::Context;
use log::debug;

use mu_shader::asset::{self, AssetRoot, ShaderModule, ShaderProgram, ShaderProgramConfig};
use mu_shader::logging::{LoggingConfig, init_logging};
use mu_shader::validate::Severity;

fn main() -> ExitCode {
    init_logging(LoggingConfig::default());

    let mut args = std::env::args().skip(1);
    let dir = match args.next() {
        Some(arg) if arg.starts_with('-') => {
            eprintln!("usage: mu-lint [ASSET_DIR]");
            return ExitCode::from(2);
        }
        Some(arg) => PathBuf::from(arg),
        None => PathBuf::from("./assets"),
    };

    match run(&dir) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("mu-lint: {:#}", e);
            ExitCode::from(2)
        }
    }
}

fn run(dir: &Path) -> anyhow::Result<bool> {
    let root = AssetRoot::new(dir);
    let manifests = asset::find_manifests(root.path())
        .with_context(|| format!("scanning {}", dir.display()))?;

    let mut clean = true;
    let mut referenced: HashSet<PathBuf> = HashSet::new();
    let mut programs = 0usize;

    for manifest in &manifests {
        // Resolve the manifest first so its sources count as referenced even
        // when one of them later fails to load.
        let config = match ShaderProgramConfig::read(manifest) {
            Ok(config) => config,
            Err(e) => {
                println!("{}", e);
                clean = false;
                continue;
            }
        };
        let base = manifest.parent().unwrap_or_else(|| Path::new(""));
        referenced.insert(base.join(&config.vertex));
        referenced.insert(base.join(&config.fragment));

        match ShaderProgram::load(&root, manifest) {
            Ok(program) => {
                programs += 1;
                let findings = program.check();
                for finding in &findings {
                    println!("{}", finding);
                }
                if findings.iter().any(|f| f.is_error()) {
                    clean = false;
                } else {
                    debug!("program `{}` ok", program.name);
                }
            }
            Err(e) => {
                println!("{}", e);
                clean = false;
            }
        }
    }

    let mut strays = 0usize;
    for source in
        asset::find_sources(root.path()).with_context(|| format!("scanning {}", dir.display()))?
    {
        if referenced.contains(&source) {
            continue;
        }
        strays += 1;
        match ShaderModule::load(&source) {
            Ok(module) => {
                let findings = module.validate();
                for finding in &findings {
                    println!("{}:{}", source.display(), finding);
                }
                if findings.iter().any(|f| f.severity == Severity::Error) {
                    clean = false;
                }
            }
            Err(e) => {
                println!("{}", e);
                clean = false;
            }
        }
    }

    println!(
        "mu-lint: {} program(s), {} stray source(s): {}",
        programs,
        strays,
        if clean { "ok" } else { "FAILED" }
    );
    Ok(clean)
}
