//! Environment abstraction for the tag training session.
//!
//! The simulation itself is an external collaborator; this module holds
//! the contract it must satisfy and the wrapper that pins down replica
//! count and device placement before the training module is built.

use crate::module::{PolicyAgentMap, RUNNER_POLICY, TAGGER_POLICY};
use crate::rollout::RolloutContext;

/// Contract for a continuous Tag simulation instance.
///
/// Implementations wrap the engine's environment object and expose the
/// roster split and geometry the session needs for policy mapping and
/// rollout rendering.
pub trait TagSimulation {
    /// Total number of agents on the roster.
    fn num_agents(&self) -> usize;

    /// Agent indices playing the tagger role.
    fn taggers(&self) -> Vec<usize>;

    /// Agent indices playing the runner role.
    fn runners(&self) -> Vec<usize>;

    /// Side length of the square grid.
    fn grid_length(&self) -> f32;

    /// Episode length in timesteps.
    fn episode_length(&self) -> usize;
}

/// A simulation pinned to a replica count and a device placement.
///
/// Wraps the environment instance together with the number of parallel
/// replicas and the GPU-usage flag, and derives the policy-to-agent
/// mapping from the roster membership.
pub struct EnvWrapper<E> {
    env: E,
    num_envs: usize,
    use_gpu: bool,
}

impl<E: TagSimulation> EnvWrapper<E> {
    /// Wrap an environment with a replica count and device placement.
    pub fn new(env: E, num_envs: usize, use_gpu: bool) -> Self {
        Self {
            env,
            num_envs,
            use_gpu,
        }
    }

    /// Get a reference to the underlying environment.
    pub fn inner(&self) -> &E {
        &self.env
    }

    /// Get a mutable reference to the underlying environment.
    pub fn inner_mut(&mut self) -> &mut E {
        &mut self.env
    }

    /// Consume the wrapper and return the underlying environment.
    pub fn into_inner(self) -> E {
        self.env
    }

    /// Number of parallel environment replicas.
    pub fn num_envs(&self) -> usize {
        self.num_envs
    }

    /// Whether the simulation runs on the GPU.
    pub fn uses_gpu(&self) -> bool {
        self.use_gpu
    }

    /// Map each policy group to the agent ids sharing its model.
    pub fn policy_agent_map(&self) -> PolicyAgentMap {
        let mut map = PolicyAgentMap::new();
        map.insert(TAGGER_POLICY, self.env.taggers());
        map.insert(RUNNER_POLICY, self.env.runners());
        map
    }

    /// Context for interpreting rollouts of this environment.
    pub fn rollout_context(&self) -> RolloutContext {
        RolloutContext::new(
            self.env.num_agents(),
            self.env.taggers(),
            self.env.grid_length(),
        )
    }
}
