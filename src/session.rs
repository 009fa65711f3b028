//! Training session driver.
//!
//! Wires the run configuration into the external engine objects:
//! checks the GPU precondition, wraps the environment, builds the
//! training module behind a teardown guard, runs the blocking fit with
//! the device-sync and perf-stats callbacks attached, and fetches
//! rollouts for visualization.

use std::fmt;

use crate::callbacks::{DeviceSyncCallback, PerfStatsCallback};
use crate::config::RunConfig;
use crate::environment::{EnvWrapper, TagSimulation};
use crate::module::{ModuleGuard, PolicyAgentMap, TrainingModule};
use crate::renderer::RenderError;
use crate::rollout::{EpisodeStates, RolloutContext, RENDER_CHANNELS};
use crate::trainer::{AcceleratorProbe, EpochTrainer, TrainerCallback, TrainerOptions};

#[cfg(feature = "render-gif")]
use crate::renderer::{render_rollout_animation, AnimationConfig, RolloutAnimation};

// ============================================================================
// Errors
// ============================================================================

/// Errors raised by the session driver.
#[derive(Debug)]
pub enum SessionError {
    /// No GPU-class accelerator is available. The session refuses to
    /// start; there is no retry.
    NoAccelerator,
    /// The engine failed to build the training module.
    Module(String),
    /// The training loop failed.
    Trainer(String),
    /// Rollout rendering failed.
    Render(RenderError),
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionError::NoAccelerator => {
                write!(f, "a tag training session needs at least one GPU")
            }
            SessionError::Module(msg) => write!(f, "training module error: {}", msg),
            SessionError::Trainer(msg) => write!(f, "trainer error: {}", msg),
            SessionError::Render(e) => write!(f, "render error: {}", e),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Render(e) => Some(e),
            _ => None,
        }
    }
}

impl From<RenderError> for SessionError {
    fn from(err: RenderError) -> Self {
        SessionError::Render(err)
    }
}

/// Precondition: at least one GPU-class accelerator must be present.
///
/// Returns the device count, or [`SessionError::NoAccelerator`].
pub fn ensure_gpu(probe: &dyn AcceleratorProbe) -> Result<usize, SessionError> {
    let count = probe.gpu_count();
    if count == 0 {
        return Err(SessionError::NoAccelerator);
    }
    Ok(count)
}

// ============================================================================
// Training Session
// ============================================================================

/// One training session over the external engine.
///
/// Owns the training module for its whole lifetime; the module's
/// teardown runs when the session drops, on every exit path.
pub struct TrainingSession<M: TrainingModule> {
    config: RunConfig,
    policy_map: PolicyAgentMap,
    context: RolloutContext,
    module: ModuleGuard<M>,
}

impl<M: TrainingModule> TrainingSession<M> {
    /// Launch a session.
    ///
    /// Checks the GPU precondition, wraps the environment with the
    /// configured replica count (GPU-resident), derives the
    /// policy-to-agent mapping from the roster membership, and builds
    /// the training module through the engine-supplied factory.
    pub fn launch<E, F>(
        config: RunConfig,
        env: E,
        probe: &dyn AcceleratorProbe,
        build_module: F,
    ) -> Result<Self, SessionError>
    where
        E: TagSimulation,
        F: FnOnce(EnvWrapper<E>, &RunConfig, &PolicyAgentMap) -> Result<M, String>,
    {
        ensure_gpu(probe)?;

        let wrapper = EnvWrapper::new(env, config.trainer.num_envs, true);
        let policy_map = wrapper.policy_agent_map();
        let context = wrapper.rollout_context();

        log::debug!(
            "launching session {:?}: {} agents, {} replicas, {} policy groups",
            config.name,
            context.num_agents,
            wrapper.num_envs(),
            policy_map.len()
        );

        let module = build_module(wrapper, &config, &policy_map).map_err(SessionError::Module)?;

        Ok(Self {
            config,
            policy_map,
            context,
            module: ModuleGuard::new(module),
        })
    }

    /// The run configuration.
    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// The policy-to-agent mapping.
    pub fn policy_map(&self) -> &PolicyAgentMap {
        &self.policy_map
    }

    /// Context for interpreting this session's rollouts.
    pub fn context(&self) -> &RolloutContext {
        &self.context
    }

    /// Direct access to the training module.
    pub fn module(&mut self) -> &mut M {
        &mut self.module
    }

    /// Run one episode with the current policies and fetch the position
    /// and liveness channels for its full duration.
    ///
    /// May be called at any point during training; the rollout reflects
    /// the policy models at that time.
    pub fn fetch_rollout(&mut self) -> Result<EpisodeStates, SessionError> {
        self.module
            .fetch_episode_states(&RENDER_CHANNELS)
            .map_err(SessionError::Module)
    }

    /// Fetch a rollout and render it into a replayable animation.
    #[cfg(feature = "render-gif")]
    pub fn rollout_animation(
        &mut self,
        config: &AnimationConfig,
    ) -> Result<RolloutAnimation, SessionError> {
        let states = self.fetch_rollout()?;
        let animation = render_rollout_animation(&states, &self.context, config)?;
        Ok(animation)
    }

    /// Run the full training loop.
    ///
    /// Assembles single-GPU [`TrainerOptions`] with the configured epoch
    /// budget, attaches the device-sync and perf-stats callbacks, builds
    /// the trainer through the engine-supplied factory, and blocks until
    /// fit completes. On error the module is still torn down when the
    /// session drops.
    pub fn fit<T, F>(&mut self, build_trainer: F) -> Result<(), SessionError>
    where
        T: EpochTrainer<M>,
        F: FnOnce(TrainerOptions, Vec<Box<dyn TrainerCallback<M>>>) -> T,
    {
        let options = TrainerOptions::new(self.config.num_epochs());
        let callbacks: Vec<Box<dyn TrainerCallback<M>>> = vec![
            Box::new(DeviceSyncCallback::new()),
            Box::new(PerfStatsCallback::new(
                self.module.training_batch_size(),
                self.module.num_iters(),
                self.config.saving.metrics_log_freq,
            )),
        ];

        let mut trainer = build_trainer(options, callbacks);
        trainer.fit(&mut self.module).map_err(SessionError::Trainer)
    }

    /// Tear the session down now, releasing the module's device memory.
    ///
    /// Dropping the session has the same effect; this makes the point
    /// explicit at the end of a driver.
    pub fn close(self) {
        self.module.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rollout::{ChannelGrid, LOC_X, LOC_Y, STILL_IN_GAME};
    use std::cell::Cell;
    use std::rc::Rc;

    struct FakeSim {
        num_taggers: usize,
        num_runners: usize,
    }

    impl TagSimulation for FakeSim {
        fn num_agents(&self) -> usize {
            self.num_taggers + self.num_runners
        }

        fn taggers(&self) -> Vec<usize> {
            (0..self.num_taggers).collect()
        }

        fn runners(&self) -> Vec<usize> {
            (self.num_taggers..self.num_agents()).collect()
        }

        fn grid_length(&self) -> f32 {
            20.0
        }

        fn episode_length(&self) -> usize {
            5
        }
    }

    struct FakeModule {
        episode_length: usize,
        num_agents: usize,
        fetched_channels: Vec<String>,
        syncs: usize,
        closes: Rc<Cell<usize>>,
    }

    impl TrainingModule for FakeModule {
        fn fetch_episode_states(&mut self, channels: &[&str]) -> Result<EpisodeStates, String> {
            self.fetched_channels = channels.iter().map(|s| s.to_string()).collect();

            let num_frames = self.episode_length + 1;
            let mut states = EpisodeStates::new(num_frames, self.num_agents);
            for name in channels {
                let value = if *name == STILL_IN_GAME { 1.0 } else { 4.0 };
                states
                    .insert(*name, ChannelGrid::filled(num_frames, self.num_agents, value))
                    .map_err(|e| e.to_string())?;
            }
            Ok(states)
        }

        fn training_batch_size(&self) -> usize {
            50
        }

        fn num_iters(&self) -> usize {
            4
        }

        fn sync_device(&mut self) {
            self.syncs += 1;
        }

        fn close(&mut self) {
            self.closes.set(self.closes.get() + 1);
        }
    }

    struct FakeProbe(usize);

    impl AcceleratorProbe for FakeProbe {
        fn gpu_count(&self) -> usize {
            self.0
        }
    }

    struct FakeTrainer {
        callbacks: Vec<Box<dyn TrainerCallback<FakeModule>>>,
        steps: usize,
        fail: bool,
    }

    impl EpochTrainer<FakeModule> for FakeTrainer {
        fn fit(&mut self, module: &mut FakeModule) -> Result<(), String> {
            for callback in &mut self.callbacks {
                callback.on_fit_start(module);
            }
            for step in 1..=self.steps {
                for callback in &mut self.callbacks {
                    callback.on_train_step(module, step);
                }
            }
            if self.fail {
                return Err("device lost".to_string());
            }
            for callback in &mut self.callbacks {
                callback.on_fit_end(module);
            }
            Ok(())
        }
    }

    fn launch_session(closes: Rc<Cell<usize>>) -> TrainingSession<FakeModule> {
        let sim = FakeSim {
            num_taggers: 2,
            num_runners: 3,
        };
        TrainingSession::launch(RunConfig::default(), sim, &FakeProbe(1), |env, _cfg, _map| {
            Ok(FakeModule {
                episode_length: env.inner().episode_length(),
                num_agents: env.inner().num_agents(),
                fetched_channels: Vec::new(),
                syncs: 0,
                closes,
            })
        })
        .unwrap()
    }

    #[test]
    fn test_launch_requires_gpu() {
        let sim = FakeSim {
            num_taggers: 1,
            num_runners: 1,
        };
        let closes = Rc::new(Cell::new(0));
        let result = TrainingSession::launch(
            RunConfig::default(),
            sim,
            &FakeProbe(0),
            |env, _cfg, _map| {
                Ok(FakeModule {
                    episode_length: env.inner().episode_length(),
                    num_agents: env.inner().num_agents(),
                    fetched_channels: Vec::new(),
                    syncs: 0,
                    closes,
                })
            },
        );
        assert!(matches!(result, Err(SessionError::NoAccelerator)));
    }

    #[test]
    fn test_launch_builds_policy_map() {
        let closes = Rc::new(Cell::new(0));
        let session = launch_session(closes);

        assert_eq!(
            session.policy_map().agent_ids(crate::module::TAGGER_POLICY),
            Some(&[0, 1][..])
        );
        assert_eq!(
            session.policy_map().agent_ids(crate::module::RUNNER_POLICY),
            Some(&[2, 3, 4][..])
        );
        assert_eq!(session.context().initial_runner_count(), 3);
    }

    #[test]
    fn test_fetch_rollout_channels() {
        let closes = Rc::new(Cell::new(0));
        let mut session = launch_session(closes);

        let states = session.fetch_rollout().unwrap();
        assert_eq!(
            session.module().fetched_channels,
            vec![LOC_X, LOC_Y, STILL_IN_GAME]
        );
        // episode_length 5 -> 6 rows
        assert_eq!(states.num_frames(), 6);
        assert_eq!(states.num_agents(), 5);
    }

    #[test]
    fn test_fit_runs_callbacks() {
        let closes = Rc::new(Cell::new(0));
        let mut session = launch_session(closes);

        session
            .fit(|options, callbacks| {
                assert_eq!(options.max_epochs, RunConfig::default().num_epochs());
                assert_eq!(options.devices, 1);
                assert_eq!(callbacks.len(), 2);
                FakeTrainer {
                    callbacks,
                    steps: 3,
                    fail: false,
                }
            })
            .unwrap();

        // DeviceSyncCallback ran once per step.
        assert_eq!(session.module().syncs, 3);
    }

    #[test]
    fn test_module_closed_when_session_drops() {
        let closes = Rc::new(Cell::new(0));
        {
            let _session = launch_session(closes.clone());
        }
        assert_eq!(closes.get(), 1);
    }

    #[test]
    fn test_module_closed_after_trainer_error() {
        let closes = Rc::new(Cell::new(0));
        {
            let mut session = launch_session(closes.clone());
            let result = session.fit(|_options, callbacks| FakeTrainer {
                callbacks,
                steps: 2,
                fail: true,
            });
            assert!(matches!(result, Err(SessionError::Trainer(msg)) if msg == "device lost"));
            // Teardown has not run yet; the guard still owns the module.
            assert_eq!(closes.get(), 0);
        }
        // The early-exit path still releases the module.
        assert_eq!(closes.get(), 1);
    }

    #[test]
    fn test_explicit_close() {
        let closes = Rc::new(Cell::new(0));
        let session = launch_session(closes.clone());
        session.close();
        assert_eq!(closes.get(), 1);
    }

    #[cfg(feature = "render-gif")]
    #[test]
    fn test_rollout_animation_frame_count() {
        let closes = Rc::new(Cell::new(0));
        let mut session = launch_session(closes);

        let config = AnimationConfig::default().with_size(40, 40);
        let animation = session.rollout_animation(&config).unwrap();
        // episode_length 5 -> 6 frames, timestep 0 through 5.
        assert_eq!(animation.frame_count(), 6);
    }
}
