//! Trainer-side contracts.
//!
//! The optimization loop is an external collaborator: the session
//! assembles [`TrainerOptions`] and callbacks, hands them to a trainer
//! factory, and runs the whole training through one blocking
//! [`EpochTrainer::fit`] call.

use crate::module::TrainingModule;

/// Hardware accelerator selection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AcceleratorKind {
    /// GPU-class accelerator. The only selection the tag engine
    /// supports for training.
    Gpu,
    /// Host CPU.
    Cpu,
}

/// Probe for available accelerators.
///
/// Implemented by the engine; the session checks it once at launch and
/// refuses to start without a GPU.
pub trait AcceleratorProbe {
    /// Number of GPU-class devices available.
    fn gpu_count(&self) -> usize;
}

/// Construction parameters for the external trainer.
#[derive(Clone, Debug, PartialEq)]
pub struct TrainerOptions {
    /// Accelerator selection.
    pub accelerator: AcceleratorKind,
    /// Number of devices to train on.
    pub devices: usize,
    /// Maximum number of optimization epochs to run.
    pub max_epochs: usize,
}

impl TrainerOptions {
    /// Single-GPU options with the given epoch budget.
    pub fn new(max_epochs: usize) -> Self {
        Self {
            accelerator: AcceleratorKind::Gpu,
            devices: 1,
            max_epochs,
        }
    }

    /// Set the accelerator selection.
    pub fn with_accelerator(mut self, accelerator: AcceleratorKind) -> Self {
        self.accelerator = accelerator;
        self
    }

    /// Set the device count.
    pub fn with_devices(mut self, devices: usize) -> Self {
        self.devices = devices;
        self
    }
}

/// Hooks invoked by the trainer around and during the fit loop.
///
/// Callbacks are handed to the trainer at construction and called from
/// inside its loop; implementations must not assume anything about the
/// loop beyond the ordering fit-start, steps, fit-end.
pub trait TrainerCallback<M: TrainingModule> {
    /// Called once before the first training step.
    fn on_fit_start(&mut self, _module: &mut M) {}

    /// Called after every training step, with the 1-based step index.
    fn on_train_step(&mut self, _module: &mut M, _step: usize) {}

    /// Called once after the last training step.
    fn on_fit_end(&mut self, _module: &mut M) {}
}

/// Contract for the external training loop.
///
/// Construction takes [`TrainerOptions`] and the callback list;
/// [`fit`](EpochTrainer::fit) then runs the full optimization against
/// the module, blocking until the epoch budget is exhausted.
pub trait EpochTrainer<M: TrainingModule> {
    /// Run the training loop to completion.
    fn fit(&mut self, module: &mut M) -> Result<(), String>;
}
