//! Trainer callbacks: device synchronization and throughput logging.

use std::time::Instant;

use crate::module::TrainingModule;
use crate::trainer::TrainerCallback;

// ============================================================================
// Device Sync Callback
// ============================================================================

/// Synchronizes the training module's resident state with the
/// accelerator after every training step.
#[derive(Clone, Copy, Debug, Default)]
pub struct DeviceSyncCallback;

impl DeviceSyncCallback {
    /// Create the callback.
    pub fn new() -> Self {
        Self
    }
}

impl<M: TrainingModule> TrainerCallback<M> for DeviceSyncCallback {
    fn on_train_step(&mut self, module: &mut M, _step: usize) {
        module.sync_device();
    }
}

// ============================================================================
// Performance Stats Callback
// ============================================================================

/// Logs training throughput at a configurable frequency.
///
/// Prints a row every `log_freq` steps with the iteration count,
/// environment steps consumed, steps per second, and elapsed time, plus
/// a summary when the fit ends.
pub struct PerfStatsCallback {
    batch_size: usize,
    num_iters: usize,
    log_freq: usize,
    start_time: Option<Instant>,
    rows_logged: usize,
    show_header: bool,
}

impl PerfStatsCallback {
    /// Create a callback for a module with the given batch size and
    /// iteration count.
    ///
    /// # Arguments
    ///
    /// * `batch_size` - Environment steps consumed per iteration
    /// * `num_iters` - Total training iterations
    /// * `log_freq` - Iterations between log rows
    pub fn new(batch_size: usize, num_iters: usize, log_freq: usize) -> Self {
        Self {
            batch_size,
            num_iters,
            log_freq: log_freq.max(1),
            start_time: None,
            rows_logged: 0,
            show_header: true,
        }
    }

    /// Whether a row is due at this (1-based) step.
    pub fn should_log(&self, step: usize) -> bool {
        step > 0 && step % self.log_freq == 0
    }

    /// Number of rows logged so far.
    pub fn rows_logged(&self) -> usize {
        self.rows_logged
    }

    fn print_header(&self) {
        println!(
            "{:>10} {:>12} {:>12} {:>10}",
            "Iter", "EnvSteps", "Steps/s", "Elapsed"
        );
        println!("{}", "-".repeat(48));
    }
}

impl<M: TrainingModule> TrainerCallback<M> for PerfStatsCallback {
    fn on_fit_start(&mut self, _module: &mut M) {
        self.start_time = Some(Instant::now());
    }

    fn on_train_step(&mut self, _module: &mut M, step: usize) {
        if !self.should_log(step) {
            return;
        }

        if self.show_header {
            self.print_header();
            self.show_header = false;
        }

        let elapsed = self
            .start_time
            .map(|t| t.elapsed().as_secs_f32())
            .unwrap_or(0.0);
        let env_steps = step * self.batch_size;
        let sps = if elapsed > 0.0 {
            env_steps as f32 / elapsed
        } else {
            0.0
        };

        println!(
            "{:>6}/{:<3} {:>12} {:>12.0} {:>9.1}s",
            step, self.num_iters, env_steps, sps, elapsed
        );

        self.rows_logged += 1;
    }

    fn on_fit_end(&mut self, _module: &mut M) {
        let elapsed = self
            .start_time
            .map(|t| t.elapsed().as_secs_f32())
            .unwrap_or(0.0);
        let total_steps = self.num_iters * self.batch_size;
        let mean_sps = if elapsed > 0.0 {
            total_steps as f32 / elapsed
        } else {
            0.0
        };

        println!(
            "Training done: {} env steps in {:.1}s ({:.0} steps/s mean)",
            total_steps, elapsed, mean_sps
        );
    }
}
