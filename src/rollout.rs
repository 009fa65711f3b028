//! Episode rollout data fetched from the training module.
//!
//! A rollout is a set of named state channels, each a `[frame, agent]`
//! grid covering one full episode: `episode_length + 1` rows, where row
//! zero is the state before the first step.

use std::collections::BTreeMap;

use crate::renderer::{RenderError, RenderResult};

/// Agent x-positions on the grid.
pub const LOC_X: &str = "loc_x";
/// Agent y-positions on the grid.
pub const LOC_Y: &str = "loc_y";
/// Per-agent liveness flags (nonzero = still in the game).
pub const STILL_IN_GAME: &str = "still_in_the_game";

/// The channels the rollout renderer consumes.
pub const RENDER_CHANNELS: [&str; 3] = [LOC_X, LOC_Y, STILL_IN_GAME];

// ============================================================================
// Channel Grid
// ============================================================================

/// One state channel over a full episode, stored row-major as
/// `[frame * num_agents + agent]`.
///
/// Flag channels use `0.0` / `1.0` values, matching the engine's
/// all-`f32` state layout.
#[derive(Clone, Debug, PartialEq)]
pub struct ChannelGrid {
    data: Vec<f32>,
    num_frames: usize,
    num_agents: usize,
}

impl ChannelGrid {
    /// Create a grid from row-major data.
    ///
    /// Fails with [`RenderError::ShapeMismatch`] if the data length is
    /// not `num_frames * num_agents`.
    pub fn new(num_frames: usize, num_agents: usize, data: Vec<f32>) -> RenderResult<Self> {
        if data.len() != num_frames * num_agents {
            return Err(RenderError::ShapeMismatch {
                expected: num_frames * num_agents,
                actual: data.len(),
            });
        }
        Ok(Self {
            data,
            num_frames,
            num_agents,
        })
    }

    /// Create a grid filled with a constant value.
    pub fn filled(num_frames: usize, num_agents: usize, value: f32) -> Self {
        Self {
            data: vec![value; num_frames * num_agents],
            num_frames,
            num_agents,
        }
    }

    /// Number of frames (rows).
    pub fn num_frames(&self) -> usize {
        self.num_frames
    }

    /// Number of agents (columns).
    pub fn num_agents(&self) -> usize {
        self.num_agents
    }

    /// Value at `(frame, agent)`.
    pub fn get(&self, frame: usize, agent: usize) -> f32 {
        self.data[frame * self.num_agents + agent]
    }

    /// Set the value at `(frame, agent)`.
    pub fn set(&mut self, frame: usize, agent: usize, value: f32) {
        self.data[frame * self.num_agents + agent] = value;
    }

    /// All agent values at one frame.
    pub fn row(&self, frame: usize) -> &[f32] {
        let start = frame * self.num_agents;
        &self.data[start..start + self.num_agents]
    }
}

// ============================================================================
// Episode States
// ============================================================================

/// Named state channels for one episode.
///
/// Produced by [`TrainingModule::fetch_episode_states`] and consumed by
/// the rollout renderer; its lifetime is one animation build. A missing
/// channel is only discovered at access time, via
/// [`RenderError::MissingChannel`].
///
/// [`TrainingModule::fetch_episode_states`]: crate::module::TrainingModule::fetch_episode_states
#[derive(Clone, Debug, Default, PartialEq)]
pub struct EpisodeStates {
    channels: BTreeMap<String, ChannelGrid>,
    num_frames: usize,
    num_agents: usize,
}

impl EpisodeStates {
    /// Create an empty snapshot with the given dimensions.
    ///
    /// `num_frames` is `episode_length + 1`: the initial state plus one
    /// row per timestep.
    pub fn new(num_frames: usize, num_agents: usize) -> Self {
        Self {
            channels: BTreeMap::new(),
            num_frames,
            num_agents,
        }
    }

    /// Number of frames every channel spans.
    pub fn num_frames(&self) -> usize {
        self.num_frames
    }

    /// Number of agents every channel covers.
    pub fn num_agents(&self) -> usize {
        self.num_agents
    }

    /// Insert a channel.
    ///
    /// Fails with [`RenderError::ShapeMismatch`] if the grid's
    /// dimensions disagree with the snapshot's.
    pub fn insert(&mut self, name: impl Into<String>, grid: ChannelGrid) -> RenderResult<()> {
        if grid.num_frames != self.num_frames || grid.num_agents != self.num_agents {
            return Err(RenderError::ShapeMismatch {
                expected: self.num_frames * self.num_agents,
                actual: grid.num_frames * grid.num_agents,
            });
        }
        self.channels.insert(name.into(), grid);
        Ok(())
    }

    /// Insert a channel from row-major data.
    pub fn insert_raw(
        &mut self,
        name: impl Into<String>,
        data: Vec<f32>,
    ) -> RenderResult<()> {
        let grid = ChannelGrid::new(self.num_frames, self.num_agents, data)?;
        self.insert(name, grid)
    }

    /// Look up a channel by name.
    pub fn channel(&self, name: &str) -> RenderResult<&ChannelGrid> {
        self.channels
            .get(name)
            .ok_or_else(|| RenderError::MissingChannel(name.to_string()))
    }

    /// Whether a channel is present.
    pub fn has_channel(&self, name: &str) -> bool {
        self.channels.contains_key(name)
    }

    /// Names of all channels, sorted.
    pub fn channel_names(&self) -> impl Iterator<Item = &str> {
        self.channels.keys().map(String::as_str)
    }
}

// ============================================================================
// Rollout Context
// ============================================================================

/// Everything needed to interpret a rollout besides the channels
/// themselves: the roster split and the grid geometry.
#[derive(Clone, Debug, PartialEq)]
pub struct RolloutContext {
    /// Total number of agents.
    pub num_agents: usize,
    /// Agent indices playing the tagger role.
    pub taggers: Vec<usize>,
    /// Grid side length, used to normalize positions.
    pub grid_length: f32,
}

impl RolloutContext {
    /// Create a context from the roster split and grid geometry.
    pub fn new(num_agents: usize, mut taggers: Vec<usize>, grid_length: f32) -> Self {
        taggers.sort_unstable();
        Self {
            num_agents,
            taggers,
            grid_length,
        }
    }

    /// Number of tagger agents.
    pub fn num_taggers(&self) -> usize {
        self.taggers.len()
    }

    /// Whether the given agent index is a tagger.
    pub fn is_tagger(&self, agent: usize) -> bool {
        self.taggers.binary_search(&agent).is_ok()
    }

    /// Number of runners on the initial roster.
    pub fn initial_runner_count(&self) -> usize {
        self.num_agents - self.taggers.len()
    }
}
