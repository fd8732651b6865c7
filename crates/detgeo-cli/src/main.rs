//! detgeo CLI - build and inspect detector geometry configurations.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use detgeo_config::{ConfigSet, NodeKind};
use detgeo_engine::Engine;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "detgeo")]
#[command(about = "Detector geometry assembly engine", long_about = None)]
struct Cli {
    /// Verbosity: 0 warnings, 1 info, 2 debug
    #[arg(short, long, global = true, default_value_t = 0)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the geometry and print a placement summary
    Build {
        /// Root geometry document
        #[arg(long)]
        geometry: PathBuf,
        /// Separate materials document
        #[arg(long)]
        materials: Option<PathBuf>,
    },
    /// Build the geometry and exit non-zero on any fatal error
    Validate {
        /// Root geometry document
        #[arg(long)]
        geometry: PathBuf,
        /// Separate materials document
        #[arg(long)]
        materials: Option<PathBuf>,
    },
    /// Display statistics about a geometry document without building it
    Info {
        /// Geometry document
        file: PathBuf,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Build {
            geometry,
            materials,
        } => build(&geometry, materials.as_ref(), true),
        Commands::Validate {
            geometry,
            materials,
        } => build(&geometry, materials.as_ref(), false),
        Commands::Info { file } => show_info(&file),
    }
}

fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn build(geometry: &PathBuf, materials: Option<&PathBuf>, summarize: bool) -> Result<()> {
    let mut engine = Engine::new();
    match materials {
        Some(mats) => engine
            .load_with_materials(geometry, mats)
            .with_context(|| format!("loading {}", geometry.display()))?,
        None => engine
            .load(geometry)
            .with_context(|| format!("loading {}", geometry.display()))?,
    }
    engine.build().context("building geometry")?;

    let report = engine
        .report()
        .context("engine built but no report available")?;
    if summarize {
        println!(
            "placed {} volumes ({} logical), {} diagnostics",
            report.placed_count,
            report.logical_count,
            report.diagnostics.len()
        );
        if let Some(scene) = engine.scene() {
            for name in scene.volumes.placement_order() {
                println!("  {name}");
            }
        }
        for diagnostic in &report.diagnostics {
            println!(
                "  warning [{}] {}: {}",
                diagnostic.kind.label(),
                diagnostic.node,
                diagnostic.detail
            );
        }
    } else {
        println!(
            "ok: {} placed, {} diagnostics",
            report.placed_count,
            report.diagnostics.len()
        );
    }
    Ok(())
}

fn show_info(file: &PathBuf) -> Result<()> {
    let set = ConfigSet::load(file).with_context(|| format!("loading {}", file.display()))?;
    let doc = set.document();

    let mut primitives = 0usize;
    let mut composites = 0usize;
    let mut assemblies = 0usize;
    let mut externals = 0usize;
    let mut placements = 0usize;
    let mut active = 0usize;
    for node in &doc.volumes {
        match node.kind() {
            NodeKind::Primitive => primitives += 1,
            NodeKind::Csg => composites += 1,
            NodeKind::Assembly => assemblies += 1,
            NodeKind::External => externals += 1,
            NodeKind::Unknown => {}
        }
        placements += node.placements.len();
        if node.is_active == Some(true) {
            active += 1;
        }
    }

    println!("{}", file.display());
    println!("  world: {} ({})", doc.world.name, doc.world.node_type);
    println!("  volumes: {}", doc.volumes.len());
    println!("    primitives: {primitives}");
    println!("    composites: {composites}");
    println!("    assemblies: {assemblies}");
    println!("    external imports: {externals}");
    println!("  placements: {placements}");
    println!("  sensitive volumes: {active}");
    println!("  materials: {}", set.materials().len());
    Ok(())
}
