//! Training-module contract and lifetime management.
//!
//! The training module is the engine object that owns device-resident
//! simulation state and policy networks. It is consumed through the
//! [`TrainingModule`] contract and kept inside a [`ModuleGuard`] so its
//! teardown runs on every exit path.

use std::collections::BTreeMap;
use std::ops::{Deref, DerefMut};

use crate::rollout::EpisodeStates;

/// Policy group shared by all tagger agents.
pub const TAGGER_POLICY: &str = "tagger";
/// Policy group shared by all runner agents.
pub const RUNNER_POLICY: &str = "runner";

// ============================================================================
// Policy-to-Agent Mapping
// ============================================================================

/// Maps each policy group name to the agent ids sharing its model.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PolicyAgentMap {
    groups: BTreeMap<String, Vec<usize>>,
}

impl PolicyAgentMap {
    /// Create an empty mapping.
    pub fn new() -> Self {
        Self::default()
    }

    /// Assign a list of agent ids to a policy group.
    pub fn insert(&mut self, policy: impl Into<String>, agent_ids: Vec<usize>) {
        self.groups.insert(policy.into(), agent_ids);
    }

    /// Agent ids for a policy group, if present.
    pub fn agent_ids(&self, policy: &str) -> Option<&[usize]> {
        self.groups.get(policy).map(Vec::as_slice)
    }

    /// Policy group names, sorted.
    pub fn policy_names(&self) -> impl Iterator<Item = &str> {
        self.groups.keys().map(String::as_str)
    }

    /// Iterate over `(policy, agent_ids)` pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &[usize])> {
        self.groups.iter().map(|(k, v)| (k.as_str(), v.as_slice()))
    }

    /// Number of policy groups.
    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Whether the mapping is empty.
    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of mapped agents across all groups.
    pub fn num_agents(&self) -> usize {
        self.groups.values().map(Vec::len).sum()
    }
}

// ============================================================================
// Training Module Contract
// ============================================================================

/// Contract for the engine's training module.
///
/// The module owns the device-resident simulation state and the policy
/// networks; training itself runs through an
/// [`EpochTrainer`](crate::trainer::EpochTrainer). Construction takes
/// the wrapped environment, the full run configuration, and the
/// policy-to-agent mapping, and is left to the engine (the session
/// accepts a factory closure).
pub trait TrainingModule {
    /// Run one episode with the current policies and fetch the named
    /// state channels for its full duration, `episode_length + 1` rows
    /// per channel.
    fn fetch_episode_states(&mut self, channels: &[&str]) -> Result<EpisodeStates, String>;

    /// Total batch size used for training per iteration.
    fn training_batch_size(&self) -> usize;

    /// Number of training iterations the episode budget translates to.
    fn num_iters(&self) -> usize;

    /// Synchronize module state with the accelerator. Invoked once per
    /// training step by [`DeviceSyncCallback`](crate::callbacks::DeviceSyncCallback).
    fn sync_device(&mut self) {}

    /// Release device-resident memory held by the module. Called at
    /// most once.
    fn close(&mut self);
}

// ============================================================================
// Module Guard
// ============================================================================

/// Owns a training module and guarantees its teardown.
///
/// [`TrainingModule::close`] runs when the guard drops, on every exit
/// path, including an error returned mid-training. Use
/// [`close`](ModuleGuard::close) for explicit teardown or
/// [`into_inner`](ModuleGuard::into_inner) to take the module back and
/// disarm the guard.
pub struct ModuleGuard<M: TrainingModule> {
    module: Option<M>,
}

impl<M: TrainingModule> ModuleGuard<M> {
    /// Take ownership of a module.
    pub fn new(module: M) -> Self {
        Self {
            module: Some(module),
        }
    }

    /// Tear the module down now.
    pub fn close(mut self) {
        if let Some(mut module) = self.module.take() {
            module.close();
        }
    }

    /// Take the module back without tearing it down.
    pub fn into_inner(mut self) -> M {
        self.module.take().expect("module already taken")
    }
}

impl<M: TrainingModule> Deref for ModuleGuard<M> {
    type Target = M;

    fn deref(&self) -> &M {
        self.module.as_ref().expect("module already taken")
    }
}

impl<M: TrainingModule> DerefMut for ModuleGuard<M> {
    fn deref_mut(&mut self) -> &mut M {
        self.module.as_mut().expect("module already taken")
    }
}

impl<M: TrainingModule> Drop for ModuleGuard<M> {
    fn drop(&mut self) {
        if let Some(mut module) = self.module.take() {
            log::debug!("releasing training module device memory");
            module.close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    struct CountingModule {
        closes: Rc<Cell<usize>>,
        syncs: usize,
    }

    impl CountingModule {
        fn new(closes: Rc<Cell<usize>>) -> Self {
            Self { closes, syncs: 0 }
        }
    }

    impl TrainingModule for CountingModule {
        fn fetch_episode_states(&mut self, _channels: &[&str]) -> Result<EpisodeStates, String> {
            Ok(EpisodeStates::new(1, 1))
        }

        fn training_batch_size(&self) -> usize {
            64
        }

        fn num_iters(&self) -> usize {
            10
        }

        fn sync_device(&mut self) {
            self.syncs += 1;
        }

        fn close(&mut self) {
            self.closes.set(self.closes.get() + 1);
        }
    }

    #[test]
    fn test_policy_agent_map() {
        let mut map = PolicyAgentMap::new();
        map.insert(TAGGER_POLICY, vec![0, 1]);
        map.insert(RUNNER_POLICY, vec![2, 3, 4]);

        assert_eq!(map.len(), 2);
        assert_eq!(map.num_agents(), 5);
        assert_eq!(map.agent_ids(TAGGER_POLICY), Some(&[0, 1][..]));
        assert_eq!(map.agent_ids("other"), None);

        let names: Vec<_> = map.policy_names().collect();
        assert_eq!(names, vec![RUNNER_POLICY, TAGGER_POLICY]);
    }

    #[test]
    fn test_guard_closes_on_drop() {
        let closes = Rc::new(Cell::new(0));
        {
            let _guard = ModuleGuard::new(CountingModule::new(closes.clone()));
        }
        assert_eq!(closes.get(), 1);
    }

    #[test]
    fn test_explicit_close_runs_once() {
        let closes = Rc::new(Cell::new(0));
        let guard = ModuleGuard::new(CountingModule::new(closes.clone()));
        guard.close();
        assert_eq!(closes.get(), 1);
    }

    #[test]
    fn test_into_inner_disarms_guard() {
        let closes = Rc::new(Cell::new(0));
        let guard = ModuleGuard::new(CountingModule::new(closes.clone()));
        let module = guard.into_inner();
        assert_eq!(closes.get(), 0);
        drop(module);
        assert_eq!(closes.get(), 0);
    }

    #[test]
    fn test_guard_derefs_to_module() {
        let closes = Rc::new(Cell::new(0));
        let mut guard = ModuleGuard::new(CountingModule::new(closes.clone()));
        assert_eq!(guard.training_batch_size(), 64);
        guard.sync_device();
        assert_eq!(guard.syncs, 1);
    }
}
