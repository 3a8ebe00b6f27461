//! # meshfold - triangle mesh simplifier
//!
//! Reduces a mesh to a target face count with the quadric error metric and
//! optionally records the vertex splits that grow it back.
//!
//! Usage:
//!   meshfold -n 1000 bunny.obj               # simplify to 1000 faces
//!   meshfold -n 1000 -p bunny.obj            # also record vertex splits
//!   meshfold -n 5000 -r bunny_out.obj        # expand a progressive mesh

use anyhow::{bail, Result};
use clap::Parser;
use meshfold::prelude::*;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::str::FromStr;

/// CLI arguments
#[derive(Parser)]
#[command(name = "meshfold", version)]
#[command(about = "Simplifies triangle meshes with the quadric error metric")]
struct Args {
    /// Input mesh (.obj subset, triangles only)
    input: PathBuf,

    /// Target face count
    #[arg(short = 'n', long)]
    target_faces: usize,

    /// Simplification algorithm
    #[arg(
        short = 'a',
        long,
        default_value = "PairContract",
        value_parser = Algorithm::from_str
    )]
    algorithm: Algorithm,

    /// Distance below which unconnected vertices become contraction candidates
    #[arg(short = 'd', long, default_value_t = 0.0)]
    distance_threshold: f64,

    /// Output path (default: input basename + "_out" + input extension)
    #[arg(short = 'o', long)]
    output: Option<PathBuf>,

    /// Treat degenerate faces as fatal instead of dropping them
    #[arg(short = 's', long)]
    strict: bool,

    /// Record vertex splits so the output can be expanded again
    #[arg(short = 'p', long, conflicts_with = "expand")]
    record_splits: bool,

    /// Replay the input's vertex splits instead of simplifying
    #[arg(short = 'r', long)]
    expand: bool,

    /// Log at debug level
    #[arg(short = 'v', long)]
    verbose: bool,
}

/// the algorithm registry is a tagged variant with a single member
#[derive(Debug, Clone, Copy)]
enum Algorithm {
    PairContract,
}

impl FromStr for Algorithm {
    type Err = String;

    fn from_str(name: &str) -> Result<Self, Self::Err> {
        match name {
            "PairContract" => Ok(Self::PairContract),
            _ => Err(format!("unknown algorithm '{name}'")),
        }
    }
}

fn main() -> ExitCode {
    let args = match Args::try_parse() {
        Ok(args) => args,
        Err(err) => {
            // --help and --version also land here and must exit 0
            let code = u8::from(err.use_stderr());
            let _ = err.print();
            return ExitCode::from(code);
        }
    };

    let filter = if args.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(filter)).init();

    if let Err(err) = run(args) {
        log::error!("{err:#}");
        return ExitCode::from(1);
    }
    ExitCode::SUCCESS
}

fn run(args: Args) -> Result<()> {
    if args.target_faces < 1 {
        bail!("target face count must be at least 1");
    }
    let Algorithm::PairContract = args.algorithm;

    let mesh = read_obj_file(&args.input)?;
    log::info!(
        "read {} vertices, {} faces, {} splits from {}",
        mesh.vertices.len(),
        mesh.faces.len(),
        mesh.splits.len(),
        args.input.display()
    );

    let result = if args.expand {
        if mesh.splits.is_empty() {
            log::warn!("input carries no split records; nothing to expand");
        }
        expand(&mesh, args.target_faces)
    } else {
        let options = SimplifyOptions {
            target_faces: args.target_faces,
            record_splits: args.record_splits,
            strict: args.strict,
            distance_threshold: args.distance_threshold,
        };
        simplify(&mesh, &options)?
    };

    let output = args
        .output
        .unwrap_or_else(|| default_output_path(&args.input));
    write_obj_file(&result, &output)?;
    log::info!(
        "wrote {} vertices and {} faces to {}",
        result.vertices.len(),
        result.faces.len(),
        output.display()
    );
    Ok(())
}

/// input basename + "_out" + input extension, next to the input
fn default_output_path(input: &Path) -> PathBuf {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    let name = match input.extension() {
        Some(ext) => format!("{stem}_out.{}", ext.to_string_lossy()),
        None => format!("{stem}_out"),
    };
    input.with_file_name(name)
}
