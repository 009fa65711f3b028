//! Run configuration for a tag training session.
//!
//! A [`RunConfig`] is built once, read for the remainder of the session,
//! and never mutated. It mirrors the engine's four configuration
//! sections: environment, trainer, per-policy-group networks, and
//! checkpoint saving. Range enforcement belongs to the external
//! environment/trainer constructors; the documented ranges here describe
//! what those constructors accept.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

// ============================================================================
// Environment Settings
// ============================================================================

/// Environment parameters for the continuous Tag game.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EnvConfig {
    /// Number of tagger agents (pursuers). Must be at least 1.
    pub num_taggers: usize,
    /// Number of runner agents (evaders).
    pub num_runners: usize,
    /// Side length of the square grid the game is played on. Positive.
    pub grid_length: f32,
    /// Episode length in timesteps. Must be at least 1.
    pub episode_length: usize,
    /// Maximum acceleration per step.
    pub max_acceleration: f32,
    /// Minimum acceleration per step (typically `-max_acceleration`).
    pub min_acceleration: f32,
    /// Maximum turn per step in radians, in `[-pi, pi]`.
    pub max_turn: f32,
    /// Minimum turn per step in radians (typically `-max_turn`).
    pub min_turn: f32,
    /// Number of discretized acceleration actions. At least 1.
    pub num_acceleration_levels: usize,
    /// Number of discretized turn actions. At least 1.
    pub num_turn_levels: usize,
    /// Top-speed multiplier for taggers. Positive.
    pub skill_level_tagger: f32,
    /// Top-speed multiplier for runners. Positive.
    pub skill_level_runner: f32,
    /// Whether every agent observes the full roster instead of a
    /// truncated neighborhood.
    pub use_full_observation: bool,
    /// Whether a runner is removed from the game once tagged.
    pub runner_exits_game_after_tagged: bool,
    /// Number of other agents visible under partial observation.
    pub num_other_agents_observed: usize,
    /// Reward granted to a tagger upon tagging a runner.
    pub tag_reward_for_tagger: f32,
    /// Penalty (negative reward) for a runner upon being tagged.
    pub tag_penalty_for_runner: f32,
    /// End-of-episode reward for a runner that was never tagged.
    pub end_of_game_reward_for_runner: f32,
    /// Tagger/runner distance below which the runner counts as tagged,
    /// as a fraction of the grid length. In `(0, 1)`.
    pub tagging_distance: f32,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            num_taggers: 5,
            num_runners: 100,
            grid_length: 20.0,
            episode_length: 200,
            max_acceleration: 0.1,
            min_acceleration: -0.1,
            // 3*pi/4 radians
            max_turn: 2.35,
            min_turn: -2.35,
            num_acceleration_levels: 10,
            num_turn_levels: 10,
            skill_level_tagger: 1.0,
            skill_level_runner: 1.0,
            use_full_observation: false,
            runner_exits_game_after_tagged: true,
            num_other_agents_observed: 10,
            tag_reward_for_tagger: 10.0,
            tag_penalty_for_runner: -10.0,
            end_of_game_reward_for_runner: 1.0,
            tagging_distance: 0.02,
        }
    }
}

impl EnvConfig {
    /// Create an environment config with the default game settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the tagger count.
    pub fn with_num_taggers(mut self, n: usize) -> Self {
        self.num_taggers = n;
        self
    }

    /// Set the runner count.
    pub fn with_num_runners(mut self, n: usize) -> Self {
        self.num_runners = n;
        self
    }

    /// Set the grid side length.
    pub fn with_grid_length(mut self, length: f32) -> Self {
        self.grid_length = length;
        self
    }

    /// Set the episode length in timesteps.
    pub fn with_episode_length(mut self, steps: usize) -> Self {
        self.episode_length = steps;
        self
    }

    /// Set symmetric acceleration limits (`-limit`, `limit`).
    pub fn with_acceleration_limit(mut self, limit: f32) -> Self {
        self.max_acceleration = limit;
        self.min_acceleration = -limit;
        self
    }

    /// Set symmetric turn limits in radians (`-limit`, `limit`).
    pub fn with_turn_limit(mut self, limit: f32) -> Self {
        self.max_turn = limit;
        self.min_turn = -limit;
        self
    }

    /// Set the tagging distance as a fraction of the grid length.
    pub fn with_tagging_distance(mut self, distance: f32) -> Self {
        self.tagging_distance = distance;
        self
    }

    /// Total number of agents on the roster.
    pub fn num_agents(&self) -> usize {
        self.num_taggers + self.num_runners
    }
}

// ============================================================================
// Trainer Settings
// ============================================================================

/// Trainer parameters: parallelism and episode budget.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrainerConfig {
    /// Number of environment replicas run in parallel on the device.
    /// Must be at least 1.
    pub num_envs: usize,
    /// Total batch size per training iteration, across all replicas.
    /// Must be at least 1.
    pub train_batch_size: usize,
    /// Total number of episodes to train on.
    pub num_episodes: usize,
}

impl Default for TrainerConfig {
    fn default() -> Self {
        Self {
            num_envs: 50,
            train_batch_size: 10_000,
            num_episodes: 50_000,
        }
    }
}

impl TrainerConfig {
    /// Create a trainer config with the default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of environment replicas.
    pub fn with_num_envs(mut self, n: usize) -> Self {
        self.num_envs = n;
        self
    }

    /// Set the per-iteration training batch size.
    pub fn with_train_batch_size(mut self, size: usize) -> Self {
        self.train_batch_size = size;
        self
    }

    /// Set the total episode budget.
    pub fn with_num_episodes(mut self, n: usize) -> Self {
        self.num_episodes = n;
        self
    }
}

// ============================================================================
// Policy Settings
// ============================================================================

/// Training algorithm for a policy group.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum Algorithm {
    /// Advantage Actor-Critic.
    #[serde(rename = "A2C")]
    A2c,
    /// Proximal Policy Optimization.
    #[serde(rename = "PPO")]
    Ppo,
}

/// Policy network architecture description.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Network family. The engine currently ships `fully_connected`.
    pub kind: String,
    /// Hidden layer widths, input to output.
    pub fc_dims: Vec<usize>,
    /// Checkpoint to initialize from, if any.
    pub checkpoint_path: Option<PathBuf>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            kind: "fully_connected".to_string(),
            fc_dims: vec![256, 256],
            checkpoint_path: None,
        }
    }
}

/// Settings for one policy group (a named set of agents sharing one
/// decision model).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PolicyConfig {
    /// Whether this group's model is trained or frozen.
    pub to_train: bool,
    /// Training algorithm.
    pub algorithm: Algorithm,
    /// Discount rate, in `[0, 1]`.
    pub gamma: f32,
    /// Learning rate. Positive.
    pub lr: f64,
    /// Network architecture.
    pub model: ModelConfig,
}

impl PolicyConfig {
    /// Create a trainable A2C policy with the given discount and
    /// learning rates and the default network.
    pub fn a2c(gamma: f32, lr: f64) -> Self {
        Self {
            to_train: true,
            algorithm: Algorithm::A2c,
            gamma,
            lr,
            model: ModelConfig::default(),
        }
    }

    /// Set the algorithm.
    pub fn with_algorithm(mut self, algorithm: Algorithm) -> Self {
        self.algorithm = algorithm;
        self
    }

    /// Freeze or unfreeze the policy.
    pub fn with_to_train(mut self, to_train: bool) -> Self {
        self.to_train = to_train;
        self
    }

    /// Set the network architecture.
    pub fn with_model(mut self, model: ModelConfig) -> Self {
        self.model = model;
        self
    }
}

/// The two policy groups of the Tag game.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PolicySet {
    /// Policy shared by all tagger agents.
    pub tagger: PolicyConfig,
    /// Policy shared by all runner agents.
    pub runner: PolicyConfig,
}

impl Default for PolicySet {
    fn default() -> Self {
        Self {
            tagger: PolicyConfig::a2c(0.98, 0.002),
            runner: PolicyConfig::a2c(0.98, 0.005),
        }
    }
}

// ============================================================================
// Saving Settings
// ============================================================================

/// Checkpoint-saving and metrics-logging parameters. Persistence itself
/// is performed by the engine; this section only configures it.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SavingConfig {
    /// Iterations between metrics log lines. Must be at least 1.
    pub metrics_log_freq: usize,
    /// Iterations between model parameter saves. Must be at least 1.
    pub model_params_save_freq: usize,
    /// Base directory for run outputs.
    pub basedir: PathBuf,
    /// Experiment name.
    pub name: String,
    /// Experiment tag.
    pub tag: String,
}

impl Default for SavingConfig {
    fn default() -> Self {
        Self {
            metrics_log_freq: 10,
            model_params_save_freq: 5_000,
            basedir: PathBuf::from("/tmp"),
            name: "continuous_tag".to_string(),
            tag: "example".to_string(),
        }
    }
}

// ============================================================================
// Run Configuration
// ============================================================================

/// Full configuration for one training run.
///
/// Created once and read-only for the remainder of the session. The
/// external environment and trainer constructors are responsible for
/// validating the values they consume.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RunConfig {
    /// Run name.
    pub name: String,
    /// Environment settings.
    pub env: EnvConfig,
    /// Trainer settings.
    pub trainer: TrainerConfig,
    /// Policy network settings per group.
    pub policy: PolicySet,
    /// Checkpoint saving settings.
    pub saving: SavingConfig,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            name: "tag_continuous".to_string(),
            env: EnvConfig::default(),
            trainer: TrainerConfig::default(),
            policy: PolicySet::default(),
            saving: SavingConfig::default(),
        }
    }
}

impl RunConfig {
    /// Create a run config with the default experiment settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the environment section.
    pub fn with_env(mut self, env: EnvConfig) -> Self {
        self.env = env;
        self
    }

    /// Replace the trainer section.
    pub fn with_trainer(mut self, trainer: TrainerConfig) -> Self {
        self.trainer = trainer;
        self
    }

    /// Replace the policy section.
    pub fn with_policy(mut self, policy: PolicySet) -> Self {
        self.policy = policy;
        self
    }

    /// Replace the saving section.
    pub fn with_saving(mut self, saving: SavingConfig) -> Self {
        self.saving = saving;
        self
    }

    /// Maximum-epoch count handed to the trainer.
    ///
    /// One epoch consumes one training batch, so the episode budget
    /// translates to `num_episodes * episode_length / train_batch_size`
    /// epochs (integer division; a trailing partial batch is dropped).
    pub fn num_epochs(&self) -> usize {
        self.trainer.num_episodes * self.env.episode_length / self.trainer.train_batch_size
    }
}
