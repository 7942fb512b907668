//! Inspection CLI: flatten → (paths | types), derive, check.
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use serde::de::DeserializeOwned;

use crate::schema::SchemaNode;

// ---------------------------------- Types --------------------------------- //

/// inspect structural schemas: enumerate paths, derive sibling shapes, check values
#[derive(Parser, Debug)]
pub struct CommandLineInterface {
    #[command(subcommand)]
    cmd: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// flatten a concrete value into every addressable path
    Paths(PathsArgs),
    /// enumerate every addressable path of the schema itself
    Types(TypesArgs),
    /// derive the readonly/partial/optional sibling of a schema
    Derive(DeriveArgs),
    /// check value files against a schema
    Check(CheckArgs),
}

#[derive(Args, Debug, Clone)]
struct SchemaInput {
    /// schema definition file (JSON)
    #[arg(long, short)]
    schema: PathBuf,
}

#[derive(Args, Debug)]
struct PathsArgs {
    #[command(flatten)]
    schema: SchemaInput,

    /// concrete value file (JSON)
    value: PathBuf,

    /// path prefix for the root value
    #[arg(long, default_value = "")]
    prefix: String,
}

#[derive(Args, Debug)]
struct TypesArgs {
    #[command(flatten)]
    schema: SchemaInput,

    /// path prefix for the root node
    #[arg(long, default_value = "")]
    prefix: String,

    /// segment standing in for list indices
    #[arg(long, default_value = crate::paths::DEFAULT_WILDCARD)]
    wildcard: String,
}

#[derive(Args, Debug)]
struct DeriveArgs {
    #[command(flatten)]
    schema: SchemaInput,

    /// which sibling shape to derive
    #[arg(value_enum)]
    shape: Shape,

    /// output .json file (stdout if omitted)
    #[arg(short, long)]
    out: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum Shape {
    Readonly,
    Partial,
    Optional,
}

#[derive(Args, Debug)]
struct CheckArgs {
    #[command(flatten)]
    schema: SchemaInput,

    /// One or more value files. May be literal paths or quoted glob patterns
    #[arg(long, short, num_args = 1.., required = true)]
    input: Vec<String>,
}

// ------------------------------ Implementation ---------------------------- //

impl CommandLineInterface {
    pub fn load() -> Self {
        Self::parse()
    }

    pub fn run(&self) -> anyhow::Result<()> {
        match &self.cmd {
            Command::Paths(args) => {
                let schema = args.schema.load()?;
                let value = load_json(&args.value)?;
                let flat = crate::flatten::flatten_values(&schema, &value, &args.prefix);
                for (path, entry) in &flat {
                    let shown = match &entry.value {
                        Some(v) => v.to_string(),
                        None => "(absent)".to_string(),
                    };
                    println!("{}  {}  {}", path.cyan(), entry.type_path.dimmed(), shown);
                }
            }
            Command::Types(args) => {
                let schema = args.schema.load()?;
                let flat =
                    crate::flatten::flatten_types(&schema, &args.prefix, &args.wildcard);
                for (path, node) in &flat {
                    println!("{}  {}", path.cyan(), node.kind_name());
                }
            }
            Command::Derive(args) => {
                let schema = args.schema.load()?;
                let derived = match args.shape {
                    Shape::Readonly => crate::derive::derive_readonly(&schema),
                    Shape::Partial => crate::derive::derive_partial(&schema),
                    Shape::Optional => crate::derive::derive_optional(&schema),
                };
                let src = serde_json::to_string_pretty(&derived)?;
                match args.out.as_ref() {
                    Some(out) => {
                        if let Some(parent) = out.parent() {
                            std::fs::create_dir_all(parent)?;
                        }
                        std::fs::write(out, &src)?;
                    }
                    None => println!("{src}"),
                }
            }
            Command::Check(args) => {
                let schema = args.schema.load()?;
                let mut failures = 0usize;
                for path in resolve_file_path_patterns(&args.input)? {
                    let shown = path.to_string_lossy().to_string();
                    let value = load_json(&path)?;
                    match crate::conform::conform(&schema, &value) {
                        Ok(()) => println!("{} {shown}", "ok".green()),
                        Err(error) => {
                            failures += 1;
                            println!("{} {shown}: {error}", "fail".red());
                        }
                    }
                }
                if failures > 0 {
                    bail!("{failures} file(s) did not conform");
                }
            }
        }
        Ok(())
    }
}

impl SchemaInput {
    fn load(&self) -> anyhow::Result<SchemaNode> {
        let schema: SchemaNode = load_json(&self.schema)?;
        schema
            .validate()
            .with_context(|| format!("invalid schema in {}", self.schema.display()))?;
        Ok(schema)
    }
}

// ------------------------------ Internal helpers -------------------------- //

/// Deserialize a JSON file, reporting the JSON path of any failure.
fn load_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let source = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let de = &mut serde_json::Deserializer::from_str(&source);
    serde_path_to_error::deserialize(de).map_err(|err| {
        let at = err.path().to_string();
        anyhow::anyhow!("{}: at JSON path {at}: {}", path.display(), err.into_inner())
    })
}

fn resolve_file_path_patterns<I>(patterns: I) -> anyhow::Result<Vec<PathBuf>>
where
    I: IntoIterator,
    I::Item: AsRef<str>,
{
    fn has_glob_chars(s: &str) -> bool {
        // Minimal glob detection for the `glob` crate syntax.
        s.bytes().any(|b| matches!(b, b'*' | b'?' | b'[' | b'{'))
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
                // an explicit glob matching nothing is an input error
                bail!("glob pattern matched no files: {pattern}");
            }
        } else {
            out.push(PathBuf::from(pattern));
        }
    }

    Ok(out)
}
