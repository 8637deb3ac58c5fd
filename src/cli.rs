//! Minimal CLI: read bundles → (python | declarations)
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use rayon::prelude::*;

use fhir_typegen::decl::Declaration;
use fhir_typegen::primitives::PrimitiveMap;
use fhir_typegen::python::PythonEmitter;
use fhir_typegen::reader::load_bundle;
use fhir_typegen::schema::SchemaNode;
use fhir_typegen::synth::{DeclarationBuilder, Diagnostics, SynthConfig};

// ————————————————————————————————————————————————————————————————————————————
// TYPES
// ————————————————————————————————————————————————————————————————————————————

/// generate typed data models from FHIR StructureDefinition bundles
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    /// more log output on stderr (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// emit Python models on a pydantic-style base class
    Python(PythonOut),
    /// print the synthesized declaration list as JSON (debug view)
    Declarations(DeclarationsOut),
}

#[derive(Args, Debug, Clone)]
struct InputSettings {
    /// One or more bundle files. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,

    /// Override a primitive mapping, e.g. `System.Date=datetime.date` (repeatable)
    #[arg(long = "primitive")]
    primitives: Vec<String>,
}

#[derive(clap::Parser, Debug)]
struct PythonOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// qualified name of the base class for generated models
    #[arg(long, default_value = "pydantic.BaseModel")]
    base_model: String,

    /// output .py file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(clap::Parser, Debug)]
struct DeclarationsOut {
    #[command(flatten)]
    input_settings: InputSettings,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

// ————————————————————————————————————————————————————————————————————————————
// IMPLEMENTATION
// ————————————————————————————————————————————————————————————————————————————

impl InputSettings {
    fn primitive_map(&self) -> Result<PrimitiveMap> {
        PrimitiveMap::with_overrides(&self.primitives).context("invalid --primitive")
    }

    /// Bundles are parsed in parallel; the forest keeps input order.
    fn load_forest(&self, primitives: &PrimitiveMap) -> Result<Vec<SchemaNode>> {
        let source_paths = resolve_file_path_patterns(&self.input)
            .context("failed to resolve input file paths")?;
        let per_file = source_paths
            .par_iter()
            .map(|path| load_bundle(path, primitives))
            .collect::<Result<Vec<_>, _>>()?;
        let forest: Vec<SchemaNode> = per_file.into_iter().flatten().collect();
        tracing::info!("read {} definitions from {} file(s)", forest.len(), source_paths.len());
        Ok(forest)
    }

    fn synthesize(&self, primitives: &PrimitiveMap) -> Result<Vec<Declaration>> {
        let forest = self.load_forest(primitives)?;
        let mut diagnostics = Diagnostics::new();
        let decls = DeclarationBuilder::new(SynthConfig::default()).build(&forest, &mut diagnostics);
        log_diagnostics(&diagnostics);
        tracing::info!("synthesized {} declarations", decls.len());
        Ok(decls)
    }
}

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> Result<()> {
        init_tracing(self.verbose);
        match &self.cmd {
            Command::Python(target) => {
                let primitives = target.input_settings.primitive_map()?;
                let decls = target.input_settings.synthesize(&primitives)?;

                let mut emitter = PythonEmitter::new(&target.base_model)?
                    .with_imports(primitives.imports());
                emitter.emit(&decls);
                write_output(target.out.as_deref(), &emitter.into_string())
            }
            Command::Declarations(target) => {
                let primitives = target.input_settings.primitive_map()?;
                let decls = target.input_settings.synthesize(&primitives)?;
                let json = serde_json::to_string_pretty(&decls)?;
                write_output(target.out.as_deref(), &json)
            }
        }
    }
}

// ————————————————————————————————————————————————————————————————————————————
// INTERNAL HELPERS
// ————————————————————————————————————————————————————————————————————————————

fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };
    // stdout may carry the generated source
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_max_level(level)
        .init();
}

fn log_diagnostics(diagnostics: &Diagnostics) {
    for d in diagnostics.iter() {
        tracing::warn!(node = %d.node_id, "{}", d.message);
    }
}

fn write_output(out: Option<&Path>, src: &str) -> Result<()> {
    match out {
        Some(out) => {
            if let Some(parent) = out.parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent)
                    .with_context(|| format!("failed to create {}", parent.display()))?;
            }
            std::fs::write(out, src).with_context(|| format!("failed to write {}", out.display()))?;
            tracing::info!("wrote {}", out.display());
        }
        None => println!("{src}"),
    }
    Ok(())
}

fn resolve_file_path_patterns<I>(patterns: I) -> Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{' ))
    }

    let mut out = Vec::<PathBuf>::new();

    for raw in patterns {
        let pattern = raw.as_ref();

        if has_glob_chars(pattern) {
            let mut matched_any = false;
            for entry in glob::glob(pattern)? {
                out.push(entry?);
                matched_any = true;
            }
            if !matched_any {
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}
