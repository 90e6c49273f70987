//! terrain2stl: elevation grid to printable solid.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use config::constants::{TerrainConfig, DEFAULT_THICKNESS, DEFAULT_VERTICAL_SCALE};
use serde::Serialize;
use terrain_mesh::{save_stl, BuildCoordinator, Mesh, MeshStats, StlFormat};
use tracing_subscriber::EnvFilter;

mod source;

#[derive(Parser)]
#[command(name = "terrain2stl")]
#[command(version, about = "Convert an elevation grid into a watertight STL solid")]
struct Cli {
    /// Elevation text file: one row per line, samples separated by
    /// whitespace or commas.
    input: PathBuf,

    /// Output file path.
    #[arg(short, long)]
    output: PathBuf,

    /// Depth of the solid below z = 0.
    #[arg(short, long, default_value_t = DEFAULT_THICKNESS)]
    thickness: f64,

    /// Vertical exaggeration applied to every sample.
    #[arg(short, long, default_value_t = DEFAULT_VERTICAL_SCALE)]
    scale: f64,

    /// Reverse row order so the first input row becomes the far edge.
    #[arg(long)]
    flip_rows: bool,

    /// Output format.
    #[arg(short, long, value_enum, default_value_t = OutputFormat::StlBinary)]
    format: OutputFormat,

    /// Skip the watertightness check after assembly.
    #[arg(long)]
    skip_check: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    /// Binary STL.
    StlBinary,
    /// ASCII STL.
    StlAscii,
    /// Flat vertex/index buffers plus statistics as JSON.
    Json,
}

/// JSON payload for viewers.
#[derive(Serialize)]
struct JsonExport<'a> {
    stats: &'a MeshStats,
    vertices: Vec<f32>,
    indices: Vec<u32>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    let config = TerrainConfig::new(cli.thickness, cli.scale)
        .context("invalid build options")?
        .with_flip_rows(cli.flip_rows)
        .with_manifold_check(!cli.skip_check);

    let rows = source::read_elevations(&cli.input)?;
    tracing::info!(rows = rows.len(), input = %cli.input.display(), "elevations loaded");

    let output = BuildCoordinator::new(config)
        .build(rows)
        .context("failed to build terrain solid")?;

    write_output(&output.mesh, &output.stats, &cli)?;
    tracing::info!(
        output = %cli.output.display(),
        triangles = output.stats.triangle_count,
        format = ?cli.format,
        "solid written"
    );
    Ok(())
}

fn write_output(mesh: &Mesh, stats: &MeshStats, cli: &Cli) -> Result<()> {
    let path = cli.output.as_path();
    let format = match cli.format {
        OutputFormat::StlBinary => StlFormat::Binary,
        OutputFormat::StlAscii => StlFormat::Ascii,
        OutputFormat::Json => return write_json(mesh, stats, path),
    };
    save_stl(mesh, path, format).with_context(|| format!("failed to write {}", path.display()))
}

fn write_json(mesh: &Mesh, stats: &MeshStats, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    let export = JsonExport {
        stats,
        vertices: mesh.vertices_f32(),
        indices: mesh.indices_u32(),
    };
    serde_json::to_writer(&mut writer, &export).with_context(|| format!("failed to write {}", path.display()))?;
    writer.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::try_parse_from(["terrain2stl", "heights.txt", "-o", "out.stl"]).unwrap();
        assert_eq!(cli.thickness, DEFAULT_THICKNESS);
        assert_eq!(cli.scale, DEFAULT_VERTICAL_SCALE);
        assert_eq!(cli.format, OutputFormat::StlBinary);
        assert!(!cli.flip_rows);
        assert!(!cli.skip_check);
    }

    #[test]
    fn test_cli_options() {
        let cli = Cli::try_parse_from([
            "terrain2stl",
            "heights.txt",
            "--output",
            "out.json",
            "--thickness",
            "2.5",
            "-s",
            "3",
            "--flip-rows",
            "--format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.thickness, 2.5);
        assert_eq!(cli.scale, 3.0);
        assert!(cli.flip_rows);
        assert_eq!(cli.format, OutputFormat::Json);
    }

    #[test]
    fn test_cli_requires_output() {
        assert!(Cli::try_parse_from(["terrain2stl", "heights.txt"]).is_err());
    }
}
