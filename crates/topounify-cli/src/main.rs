//! topounify: unify the arcs of a topology file and export the result.
//!
//! Reads a topology JSON document (`{"coordinates": [...], "arcs": [...]}`),
//! runs arc unification with configurable parameters, and prints a
//! diagnostics report. Optionally writes the shared-arc JSON document and
//! an SVG preview that highlights shared boundaries.
//!
//! # Usage
//!
//! ```text
//! cargo run --release --bin topounify -- [OPTIONS] <TOPOLOGY_JSON>
//! ```

#![allow(clippy::print_stdout, clippy::print_stderr)]

use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::Parser;
use topounify_core::diagnostics::{Clock, UnifyDiagnostics, unify_with_diagnostics};
use topounify_core::{Topology, Unification, UnifyConfig};
use topounify_export::{SvgMetadata, to_json, to_shared_arcs, to_svg};

/// Detect arcs that coincide exactly, forward or reversed, and store each
/// shared boundary once.
#[derive(Parser)]
#[command(name = "topounify", version)]
struct Cli {
    /// Path to the input topology JSON.
    topology_path: PathBuf,

    /// Write the shared-arc JSON document to this file.
    #[arg(long)]
    output: Option<PathBuf>,

    /// Write an SVG preview to this file.
    #[arg(long)]
    svg: Option<PathBuf>,

    /// Pretty-print the shared-arc JSON document.
    #[arg(long)]
    pretty: bool,

    /// Output diagnostics as JSON instead of human-readable report.
    #[arg(long)]
    json: bool,

    /// Number of runs for averaging.
    #[arg(long, default_value_t = 1, value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..))]
    runs: usize,

    /// Expected number of distinct endpoints (defaults to two per arc).
    #[arg(long)]
    endpoint_capacity: Option<usize>,

    /// Full unify config as a JSON string.
    ///
    /// When provided, all other config flags are ignored.
    /// The JSON must be a valid `UnifyConfig` serialization.
    #[arg(long)]
    config_json: Option<String>,
}

/// Build a [`UnifyConfig`] from CLI arguments.
///
/// If `--config-json` is provided, the JSON is parsed directly and the
/// individual config flags are ignored.
fn config_from_cli(cli: &Cli) -> Result<UnifyConfig, String> {
    if let Some(ref json) = cli.config_json {
        return serde_json::from_str(json).map_err(|e| format!("Error parsing --config-json: {e}"));
    }

    Ok(UnifyConfig {
        endpoint_capacity: cli.endpoint_capacity,
    })
}

/// Read and parse the input topology.
fn read_topology(path: &Path) -> Result<Topology, String> {
    let text = std::fs::read_to_string(path)
        .map_err(|e| format!("Error reading {}: {e}", path.display()))?;
    serde_json::from_str(&text).map_err(|e| format!("Error parsing {}: {e}", path.display()))
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match config_from_cli(&cli) {
        Ok(c) => c,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    let input = match read_topology(&cli.topology_path) {
        Ok(t) => t,
        Err(msg) => {
            eprintln!("{msg}");
            return ExitCode::FAILURE;
        }
    };

    eprintln!(
        "Topology: {} ({} arcs, {} points)",
        cli.topology_path.display(),
        input.arcs.len(),
        input.point_count(),
    );
    eprintln!("Config: {config:?}");
    eprintln!("Runs: {}", cli.runs);
    eprintln!();

    let mut all_diagnostics = Vec::with_capacity(cli.runs);
    let mut first: Option<(Topology, Unification)> = None;

    for run in 0..cli.runs {
        if cli.runs > 1 {
            eprintln!("--- Run {}/{} ---", run + 1, cli.runs);
        }

        let mut topology = input.clone();
        match unify_with_diagnostics(&mut topology, &config, &StdClock) {
            Ok((unification, diagnostics)) => {
                if cli.json {
                    match serde_json::to_string_pretty(&diagnostics) {
                        Ok(json) => println!("{json}"),
                        Err(e) => {
                            eprintln!("Error serializing diagnostics: {e}");
                            return ExitCode::FAILURE;
                        }
                    }
                } else {
                    println!("{}", diagnostics.report());
                }

                if first.is_none() {
                    first = Some((topology, unification));
                }
                all_diagnostics.push(diagnostics);
            }
            Err(e) => {
                eprintln!("Unification error: {e}");
                return ExitCode::FAILURE;
            }
        }

        if cli.runs > 1 {
            eprintln!();
        }
    }

    if cli.runs > 1 {
        print_multi_run_summary(&all_diagnostics);
    }

    // Exports come from the first run only; every run is identical.
    let Some((topology, unification)) = first else {
        return ExitCode::SUCCESS;
    };

    if let Some(ref path) = cli.output
        && let Err(msg) = write_shared_arcs(path, &topology, &unification, cli.pretty)
    {
        eprintln!("{msg}");
        return ExitCode::FAILURE;
    }

    if let Some(ref path) = cli.svg
        && let Err(msg) = write_svg(path, &cli.topology_path, &topology, &unification)
    {
        eprintln!("{msg}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

/// Write the shared-arc JSON document.
fn write_shared_arcs(
    path: &Path,
    topology: &Topology,
    unification: &Unification,
    pretty: bool,
) -> Result<(), String> {
    let json = to_shared_arcs(topology, unification)
        .and_then(|shared| to_json(&shared, pretty))
        .map_err(|e| format!("Error exporting shared arcs: {e}"))?;
    std::fs::write(path, &json)
        .map_err(|e| format!("Error writing JSON to {}: {e}", path.display()))?;
    eprintln!("JSON written to {} ({} bytes)", path.display(), json.len());
    Ok(())
}

/// Write the SVG preview, titled after the input file.
fn write_svg(
    path: &Path,
    input_path: &Path,
    topology: &Topology,
    unification: &Unification,
) -> Result<(), String> {
    let title = input_path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or("topology");
    let desc = format!(
        "{} arcs, {} canonical",
        unification.len(),
        unification.canonical_count(),
    );
    let metadata = SvgMetadata {
        title: Some(title),
        description: Some(&desc),
    };
    let svg = to_svg(topology, unification, &metadata)
        .map_err(|e| format!("Error exporting SVG: {e}"))?;
    std::fs::write(path, &svg)
        .map_err(|e| format!("Error writing SVG to {}: {e}", path.display()))?;
    eprintln!("SVG written to {} ({} bytes)", path.display(), svg.len());
    Ok(())
}

/// [`Clock`] implementation backed by [`std::time::Instant`].
struct StdClock;

impl Clock for StdClock {
    type Instant = Instant;

    fn now(&self) -> Instant {
        Instant::now()
    }

    fn elapsed(&self, since: &Instant) -> Duration {
        since.elapsed()
    }
}

/// Print aggregated timing across multiple runs.
#[allow(clippy::cast_precision_loss)]
fn print_multi_run_summary(all_diagnostics: &[UnifyDiagnostics]) {
    println!();
    println!(
        "Summary ({} runs)\n{}",
        all_diagnostics.len(),
        "=".repeat(60),
    );

    if all_diagnostics.is_empty() {
        println!("Warning: no diagnostics to summarize");
        return;
    }

    let durations: Vec<f64> = all_diagnostics
        .iter()
        .map(|d| d.duration.as_secs_f64() * 1000.0)
        .collect();

    let min = durations.iter().copied().reduce(f64::min).unwrap_or(0.0);
    let max = durations.iter().copied().reduce(f64::max).unwrap_or(0.0);
    let mean = durations.iter().sum::<f64>() / durations.len() as f64;

    println!("Duration: min={min:.3}ms  mean={mean:.3}ms  max={max:.3}ms");
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn flags_build_config() {
        let cli = Cli::parse_from(["topounify", "in.json", "--endpoint-capacity", "64"]);
        assert_eq!(config_from_cli(&cli).unwrap().endpoint_capacity, Some(64));
    }

    #[test]
    fn config_json_overrides_flags() {
        let cli = Cli::parse_from([
            "topounify",
            "in.json",
            "--endpoint-capacity",
            "64",
            "--config-json",
            r#"{"endpoint_capacity": 8}"#,
        ]);
        assert_eq!(config_from_cli(&cli).unwrap().endpoint_capacity, Some(8));
    }

    #[test]
    fn invalid_config_json_is_reported() {
        let cli = Cli::parse_from(["topounify", "in.json", "--config-json", "{"]);
        assert!(
            config_from_cli(&cli)
                .unwrap_err()
                .starts_with("Error parsing --config-json")
        );
    }

    #[test]
    fn zero_runs_is_rejected() {
        assert!(Cli::try_parse_from(["topounify", "in.json", "--runs", "0"]).is_err());
    }

    #[test]
    fn missing_topology_file_is_reported() {
        let msg = read_topology(Path::new("/nonexistent/topology.json")).unwrap_err();
        assert!(msg.starts_with("Error reading"));
    }
}
