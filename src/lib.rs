//! # Tag Session: Multi-Agent Tag Training Driver
//!
//! Configuration, session wiring, and rollout visualization for training
//! tagger/runner policies on a GPU-parallel continuous Tag engine.
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌────────────────────────────────────────────────────────────────┐
//! │                        TrainingSession                         │
//! ├────────────────────────────────────────────────────────────────┤
//! │  RunConfig ──► EnvWrapper ──► PolicyAgentMap                   │
//! │                    │               │                           │
//! │                    ▼               ▼                           │
//! │             ┌──────────────────────────────┐                   │
//! │             │  TrainingModule (external)   │◄── ModuleGuard    │
//! │             │  GPU sim + policy networks   │    (close on drop)│
//! │             └───────────┬──────────────────┘                   │
//! │                         │ fit                                  │
//! │             ┌───────────▼──────────────────┐                   │
//! │             │  EpochTrainer (external)     │                   │
//! │             │  callbacks: device sync,     │                   │
//! │             │             perf stats       │                   │
//! │             └───────────┬──────────────────┘                   │
//! │                         │ fetch_episode_states                 │
//! │             ┌───────────▼──────────────────┐                   │
//! │             │  renderer: frame states ──►  │                   │
//! │             │  scene ──► GIF animation     │                   │
//! │             └──────────────────────────────┘                   │
//! └────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The simulation engine, the policy-network training loop, and
//! checkpoint persistence live behind the [`TagSimulation`],
//! [`TrainingModule`], and [`EpochTrainer`] contracts. This crate owns
//! the run configuration, the session wiring (including the GPU
//! precondition and guaranteed module teardown), and the episode
//! rollout renderer.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tag_session::{AnimationConfig, RunConfig, TrainingSession};
//!
//! let config = RunConfig::default();
//! let mut session = TrainingSession::launch(config, engine_env, &probe, |env, cfg, map| {
//!     EngineModule::build(env, cfg, map)
//! })?;
//!
//! let before = session.rollout_animation(&AnimationConfig::default())?;
//! session.fit(|options, callbacks| EngineTrainer::new(options, callbacks))?;
//! let after = session.rollout_animation(&AnimationConfig::default())?;
//!
//! before.save("rollout_before.gif")?;
//! after.save("rollout_after.gif")?;
//! // Module teardown runs when the session drops, on every exit path.
//! ```

pub mod callbacks;
pub mod config;
pub mod environment;
pub mod module;
pub mod renderer;
pub mod rollout;
pub mod session;
pub mod trainer;

// Run configuration
pub use config::{
    Algorithm, EnvConfig, ModelConfig, PolicyConfig, PolicySet, RunConfig, SavingConfig,
    TrainerConfig,
};

// Environment wrapping
pub use environment::{EnvWrapper, TagSimulation};

// Training module contract and lifetime management
pub use module::{ModuleGuard, PolicyAgentMap, TrainingModule, RUNNER_POLICY, TAGGER_POLICY};

// Trainer contracts and callbacks
pub use callbacks::{DeviceSyncCallback, PerfStatsCallback};
pub use trainer::{AcceleratorKind, AcceleratorProbe, EpochTrainer, TrainerCallback, TrainerOptions};

// Rollout data
pub use rollout::{ChannelGrid, EpisodeStates, RolloutContext, LOC_X, LOC_Y, STILL_IN_GAME};

// Rendering
pub use renderer::{
    frame_state, AgentRole, AnimationConfig, CameraConfig, FrameState, MarkerState, RenderError,
    RenderResult, StatusLabel,
};

#[cfg(feature = "render-gif")]
pub use renderer::{render_rollout_animation, RolloutAnimation};

// Session driver
pub use session::{ensure_gpu, SessionError, TrainingSession};
