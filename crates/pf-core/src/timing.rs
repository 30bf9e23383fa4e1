//! Lightweight performance timing utilities.
//!
//! This module provides simple timing infrastructure for measuring
//! where runtime is being spent. Can be enabled/disabled via environment
//! variable or programmatically.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

static ENABLED: AtomicBool = AtomicBool::new(false);

/// Enable performance timing globally.
pub fn enable_timing() {
    ENABLED.store(true, Ordering::Relaxed);
}

/// Disable performance timing globally.
pub fn disable_timing() {
    ENABLED.store(false, Ordering::Relaxed);
}

/// Check if timing is enabled.
pub fn is_enabled() -> bool {
    ENABLED.load(Ordering::Relaxed) || std::env::var("PF_TIMING").is_ok()
}

/// Stopwatch for one timed section. Reads the clock only when timing is on.
pub struct Timer {
    started: Option<Instant>,
}

impl Timer {
    pub fn start() -> Self {
        Self {
            started: is_enabled().then(Instant::now),
        }
    }

    /// Elapsed time, or `None` when timing is off.
    pub fn stop(self) -> Option<Duration> {
        self.started.map(|t| t.elapsed())
    }

    /// Stop and charge the elapsed time to `acc`.
    pub fn stop_into(self, acc: &AccumulatingTimer) {
        if let Some(elapsed) = self.stop() {
            acc.record(elapsed);
        }
    }
}

/// Total time and call count of one section, shared across threads.
pub struct AccumulatingTimer {
    total_ns: AtomicU64,
    count: AtomicU64,
}

impl Default for AccumulatingTimer {
    fn default() -> Self {
        Self::new()
    }
}

impl AccumulatingTimer {
    pub const fn new() -> Self {
        Self {
            total_ns: AtomicU64::new(0),
            count: AtomicU64::new(0),
        }
    }

    pub fn record(&self, elapsed: Duration) {
        let nanos = u64::try_from(elapsed.as_nanos()).unwrap_or(u64::MAX);
        self.total_ns.fetch_add(nanos, Ordering::Relaxed);
        self.count.fetch_add(1, Ordering::Relaxed);
    }

    pub fn total(&self) -> Duration {
        Duration::from_nanos(self.total_ns.load(Ordering::Relaxed))
    }

    pub fn count(&self) -> u64 {
        self.count.load(Ordering::Relaxed)
    }

    /// Mean time per call; zero before the first call.
    pub fn average(&self) -> Duration {
        match self.count() {
            0 => Duration::ZERO,
            n => self.total() / u32::try_from(n).unwrap_or(u32::MAX),
        }
    }

    pub fn reset(&self) {
        self.total_ns.store(0, Ordering::Relaxed);
        self.count.store(0, Ordering::Relaxed);
    }
}

/// Per-phase timers of the implicit step.
pub mod solver_timing {
    use super::AccumulatingTimer;

    /// Source evaluation and Crank-Nicolson assembly
    pub static ASSEMBLY: AccumulatingTimer = AccumulatingTimer::new();
    /// Red-black SOR solves (all sweeps of one linear solve per record)
    pub static SOR_SOLVE: AccumulatingTimer = AccumulatingTimer::new();
    /// Enthalpy to temperature/phase inversion
    pub static INVERSION: AccumulatingTimer = AccumulatingTimer::new();
    /// Whole time steps
    pub static STEP: AccumulatingTimer = AccumulatingTimer::new();

    /// Reset all solver timers.
    pub fn reset_all() {
        ASSEMBLY.reset();
        SOR_SOLVE.reset();
        INVERSION.reset();
        STEP.reset();
    }

    /// Print solver timing summary.
    pub fn print_summary() {
        use super::is_enabled;
        if !is_enabled() {
            return;
        }

        println!("\n=== Solver Phase Breakdown ===");
        for (label, timer) in [
            ("assembly", &ASSEMBLY),
            ("sor solve", &SOR_SOLVE),
            ("inversion", &INVERSION),
            ("step", &STEP),
        ] {
            let count = timer.count();
            if count > 0 {
                println!(
                    "{:<12} {} calls, {:.3}s total, {:.4}ms avg",
                    label,
                    count,
                    timer.total().as_secs_f64(),
                    timer.average().as_secs_f64() * 1000.0
                );
            }
        }
        println!("==============================\n");
    }
}

/// Performance statistics collector.
#[derive(Default)]
pub struct PerfStats {
    pub setup_time_s: f64,
    pub run_time_s: f64,
    pub steps: usize,
    pub sor_sweeps: usize,
    pub picard_iterations: usize,
}

impl PerfStats {
    /// Print a formatted summary of the statistics.
    pub fn print_summary(&self) {
        if !is_enabled() {
            return;
        }

        println!("\n=== Performance Summary ===");

        if self.setup_time_s > 0.0 {
            println!("Setup time:          {:.3}s", self.setup_time_s);
        }

        if self.run_time_s > 0.0 {
            println!("Run time:            {:.3}s", self.run_time_s);
            if self.steps > 0 {
                println!("  Steps:             {}", self.steps);
                println!(
                    "  Avg step time:     {:.4}s",
                    self.run_time_s / self.steps as f64
                );
                println!(
                    "  Sweeps per step:   {:.1}",
                    self.sor_sweeps as f64 / self.steps as f64
                );
                println!(
                    "  Picard per step:   {:.2}",
                    self.picard_iterations as f64 / self.steps as f64
                );
            }
        }

        println!("==========================\n");

        solver_timing::print_summary();
    }
}
