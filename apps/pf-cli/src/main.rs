use clap::{Parser, Subcommand};
use pf_app::{AppResult, RunHandle};
use pf_core::timing::{self, PerfStats};
use pf_materials::filter_material_catalog;
use pf_project::RunParams;
use pf_results::{ResultsError, RunSummary};
use pf_sim::{ProgressEvent, RunStatus};
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pf-cli")]
#[command(about = "Plasma furnace CLI - transient heating of a cylindrical charge", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Validate a run parameter file
    Validate {
        /// Path to the parameter file (YAML, or JSON by extension)
        params_path: PathBuf,
    },
    /// List catalog materials
    Materials {
        /// Filter by key, name or alias
        query: Option<String>,
    },
    /// Run a simulation to completion
    Run {
        /// Path to the parameter file (YAML, or JSON by extension)
        params_path: PathBuf,
        /// Print the final summary as JSON
        #[arg(long)]
        json: bool,
        /// Suppress progress output
        #[arg(short, long)]
        quiet: bool,
        /// Print solver phase timings
        #[arg(long)]
        timing: bool,
    },
}

fn main() -> AppResult<()> {
    // Logs go to stderr so that `--json` output stays machine readable.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Validate { params_path } => cmd_validate(&params_path),
        Commands::Materials { query } => {
            cmd_materials(query.as_deref().unwrap_or(""));
            Ok(())
        }
        Commands::Run {
            params_path,
            json,
            quiet,
            timing,
        } => cmd_run(&params_path, json, quiet, timing),
    }
}

fn cmd_validate(params_path: &Path) -> AppResult<()> {
    println!("Validating parameters: {}", params_path.display());
    let params = pf_project::load_params(params_path)?;
    pf_app::compile_params(&params)?;
    println!("✓ Parameters are valid");
    print_params_overview(&params);
    Ok(())
}

fn cmd_materials(query: &str) {
    let entries = filter_material_catalog(query);
    if entries.is_empty() {
        println!("No materials match '{query}'");
        return;
    }
    println!(
        "{:<10} {:<14} {:>9} {:>10} {:>10}  aliases",
        "key", "name", "rho", "T_melt", "T_vap"
    );
    for entry in entries {
        let spec = entry.id.spec();
        println!(
            "{:<10} {:<14} {:>9.0} {:>10.1} {:>10.1}  {}",
            entry.id.key(),
            entry.display_name,
            spec.density_kg_m3,
            spec.melting_temperature_k,
            spec.vaporization_temperature_k,
            entry.aliases.join(", ")
        );
    }
}

fn cmd_run(params_path: &Path, json: bool, quiet: bool, timing_enabled: bool) -> AppResult<()> {
    if timing_enabled {
        timing::enable_timing();
    }
    timing::solver_timing::reset_all();

    let setup_started = Instant::now();
    let params = pf_project::load_params(params_path)?;
    let handle = pf_app::start(&params)?;
    let mut perf = PerfStats {
        setup_time_s: setup_started.elapsed().as_secs_f64(),
        ..Default::default()
    };

    if !json {
        println!("Running: {}", display_name(&params, params_path));
        println!("  run id = {}", handle.run_id());
        print_params_overview(&params);
    }

    let run_started = Instant::now();
    let status = run_with_progress(&handle, quiet || json, &mut perf);
    perf.run_time_s = run_started.elapsed().as_secs_f64();
    let bundle = handle.results()?;
    let summary = bundle.summary();

    if json {
        let out = serde_json::to_string_pretty(&summary).map_err(ResultsError::from)?;
        println!("{out}");
    } else {
        print_summary(&summary);
        perf.print_summary();
    }

    // The final status is in the summary; a failed run still exits with the
    // solver error.
    status.map(|_| ())
}

fn run_with_progress(handle: &RunHandle, silent: bool, perf: &mut PerfStats) -> AppResult<RunStatus> {
    let mut last_emit = Instant::now();
    let status = handle.run_with_progress(|event| {
        perf.steps = event.step_index;
        perf.sor_sweeps += event.sor_sweeps;
        perf.picard_iterations += event.picard_iterations;
        for warning in &event.warnings {
            tracing::warn!(
                step = warning.step,
                kind = ?warning.kind,
                residual = warning.residual,
                "convergence warning"
            );
        }
        if !silent && (last_emit.elapsed().as_millis() >= 100 || event.status.is_terminal()) {
            render_progress(event);
            last_emit = Instant::now();
        }
    });
    if !silent {
        clear_progress_line();
    }
    status
}

fn display_name(params: &RunParams, path: &Path) -> String {
    if params.name.is_empty() {
        path.display().to_string()
    } else {
        params.name.clone()
    }
}

fn print_params_overview(params: &RunParams) {
    println!(
        "  furnace R = {:.3} m, H = {:.3} m, mesh {}x{}x{} ({} cells)",
        params.furnace.radius_m,
        params.furnace.height_m,
        params.mesh.nr,
        params.mesh.ntheta,
        params.mesh.nz,
        params.mesh.cell_count()
    );
    println!(
        "  {} torch(es), dt = {:.3} s, total = {:.3} s",
        params.torches.len(),
        params.time.dt_s,
        params.time.total_time_s
    );
}

fn clear_progress_line() {
    print!("\r{}\r", " ".repeat(120));
    let _ = io::stdout().flush();
}

fn render_progress(event: &ProgressEvent) {
    let width = 28usize;
    let fraction = event.fraction_complete();
    let filled = ((fraction * width as f64).round() as usize).min(width);
    print!(
        "\r[{}{}] {:>6.2}%  t={:.2}/{:.2}s  step={}  T=[{:.1}, {:.1}] K  sweeps={}",
        "#".repeat(filled),
        "-".repeat(width - filled),
        fraction * 100.0,
        event.current_time,
        event.total_time,
        event.step_index,
        event.stats.min,
        event.stats.max,
        event.sor_sweeps
    );
    let _ = io::stdout().flush();
}

fn print_summary(summary: &RunSummary) {
    let metrics = &summary.final_metrics;
    match summary.status {
        RunStatus::Completed => println!("✓ Run completed"),
        status => println!("✗ Run {status}"),
    }
    println!("  Steps:        {}", summary.steps);
    println!("  Time:         {:.3} s", metrics.current_time);
    println!("  Frames:       {}", summary.frames);
    println!(
        "  Temperature:  min {:.2} K, max {:.2} K, mean {:.2} K",
        metrics.temperature.min, metrics.temperature.max, metrics.temperature.volume_mean
    );
    println!("  Energy:       {:.6e} J", metrics.total_energy);
    println!(
        "  Melted:       {:.4} m³ ({:.2}%)",
        metrics.melted_volume,
        metrics.melt_fraction * 100.0
    );
    if metrics.vaporized_volume > 0.0 {
        println!("  Vaporized:    {:.4} m³", metrics.vaporized_volume);
    }
    println!("  Warnings:     {}", summary.warnings);
    if let Some(err) = &summary.error {
        println!("  Error:        {err}");
    }
    println!("  Digest:       {}", summary.temperature_digest);
}
