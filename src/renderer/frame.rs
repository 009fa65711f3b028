//! Per-frame render state, computed as a pure function of the rollout.
//!
//! The original per-frame callback mutated plot objects in place; here
//! each animation frame is an explicit [`FrameState`] value derived from
//! the episode snapshot, and the drawing backends consume it without
//! touching the snapshot themselves.

use super::config::AnimationConfig;
use super::error::{RenderError, RenderResult};
use crate::rollout::{EpisodeStates, RolloutContext, LOC_X, LOC_Y, STILL_IN_GAME};

/// Role an agent plays in the game.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AgentRole {
    /// Pursuer.
    Tagger,
    /// Evader.
    Runner,
}

/// Render state of one agent marker at one frame.
#[derive(Clone, Debug, PartialEq)]
pub struct MarkerState {
    /// Agent index in the roster.
    pub agent: usize,
    /// Role, fixed over the episode.
    pub role: AgentRole,
    /// X position normalized to the grid extent, in `[0, 1]`.
    pub x: f32,
    /// Y position normalized to the grid extent, in `[0, 1]`.
    pub y: f32,
    /// Whether the agent is still in the game at this frame.
    pub active: bool,
    /// Marker color at this frame: the role color while active, the
    /// inactive color afterwards.
    pub color: [u8; 3],
    /// Marker radius in pixels; `None` once the glyph is removed for an
    /// inactive agent.
    pub marker_radius: Option<u32>,
}

/// Status line shown on every frame.
#[derive(Clone, Debug, PartialEq)]
pub struct StatusLabel {
    /// Timestep index of this frame.
    pub timestep: usize,
    /// Runners still in the game: active-agent count saturating-minus
    /// the tagger count, never negative.
    pub runners_left: usize,
    /// `runners_left` over the initial runner count. With a zero-runner
    /// roster this is the unguarded 0/0 and evaluates to NaN.
    pub runners_left_fraction: f32,
}

impl StatusLabel {
    /// The label text, matching the animation overlay format.
    pub fn text(&self) -> String {
        format!(
            "{}\n{:<14}{:4}\n{:<14}{:4} ({:.0}%)",
            "Continuous Tag",
            "Time Step:",
            self.timestep,
            "Runners Left:",
            self.runners_left,
            self.runners_left_fraction * 100.0
        )
        .to_lowercase()
    }
}

/// Full render state for one animation frame.
#[derive(Clone, Debug, PartialEq)]
pub struct FrameState {
    /// Timestep index (0 = initial state).
    pub timestep: usize,
    /// One marker per agent, in roster order.
    pub markers: Vec<MarkerState>,
    /// The status overlay.
    pub label: StatusLabel,
}

/// Compute the render state for one frame of the rollout.
///
/// Pure: reads the snapshot and returns a new value. Fails if the frame
/// index is out of range or one of the `loc_x` / `loc_y` /
/// `still_in_the_game` channels is absent.
pub fn frame_state(
    states: &EpisodeStates,
    context: &RolloutContext,
    style: &AnimationConfig,
    frame: usize,
) -> RenderResult<FrameState> {
    if states.num_frames() == 0 {
        return Err(RenderError::EmptyRollout);
    }
    if frame >= states.num_frames() {
        return Err(RenderError::FrameOutOfRange {
            frame,
            num_frames: states.num_frames(),
        });
    }

    let loc_x = states.channel(LOC_X)?;
    let loc_y = states.channel(LOC_Y)?;
    let in_game = states.channel(STILL_IN_GAME)?;

    let mut markers = Vec::with_capacity(states.num_agents());
    let mut active_count = 0usize;

    for agent in 0..states.num_agents() {
        let active = in_game.get(frame, agent) != 0.0;
        if active {
            active_count += 1;
        }

        let (role, role_color, role_radius) = if context.is_tagger(agent) {
            (AgentRole::Tagger, style.tagger_color, style.tagger_marker_radius)
        } else {
            (AgentRole::Runner, style.runner_color, style.runner_marker_radius)
        };

        markers.push(MarkerState {
            agent,
            role,
            x: loc_x.get(frame, agent) / context.grid_length,
            y: loc_y.get(frame, agent) / context.grid_length,
            active,
            color: if active { role_color } else { style.inactive_color },
            marker_radius: if active { Some(role_radius) } else { None },
        });
    }

    let runners_left = active_count.saturating_sub(context.num_taggers());
    // Unguarded on purpose: a zero-runner roster yields NaN here.
    let runners_left_fraction = runners_left as f32 / context.initial_runner_count() as f32;

    Ok(FrameState {
        timestep: frame,
        markers,
        label: StatusLabel {
            timestep: frame,
            runners_left,
            runners_left_fraction,
        },
    })
}

/// Compute the render states for every frame of the rollout, timestep 0
/// through the last row inclusive.
pub fn all_frame_states(
    states: &EpisodeStates,
    context: &RolloutContext,
    style: &AnimationConfig,
) -> RenderResult<Vec<FrameState>> {
    (0..states.num_frames())
        .map(|frame| frame_state(states, context, style, frame))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rollout::ChannelGrid;

    /// Two taggers (0, 1) and two runners (2, 3) over T = 3 timesteps.
    /// Runner 3 leaves the game at frame 2.
    fn sample_rollout() -> (EpisodeStates, RolloutContext) {
        let num_frames = 4;
        let num_agents = 4;
        let mut states = EpisodeStates::new(num_frames, num_agents);

        let mut xs = ChannelGrid::filled(num_frames, num_agents, 0.0);
        let mut ys = ChannelGrid::filled(num_frames, num_agents, 0.0);
        let mut in_game = ChannelGrid::filled(num_frames, num_agents, 1.0);

        for frame in 0..num_frames {
            for agent in 0..num_agents {
                xs.set(frame, agent, agent as f32 + frame as f32);
                ys.set(frame, agent, agent as f32);
            }
        }
        in_game.set(2, 3, 0.0);
        in_game.set(3, 3, 0.0);

        states.insert(LOC_X, xs).unwrap();
        states.insert(LOC_Y, ys).unwrap();
        states.insert(STILL_IN_GAME, in_game).unwrap();

        (states, RolloutContext::new(num_agents, vec![0, 1], 10.0))
    }

    #[test]
    fn test_one_frame_per_row() {
        let (states, ctx) = sample_rollout();
        let style = AnimationConfig::default();

        // T = 3 timesteps -> 4 rows -> exactly T + 1 frames.
        let frames = all_frame_states(&states, &ctx, &style).unwrap();
        assert_eq!(frames.len(), 4);
        assert_eq!(frames[0].timestep, 0);
        assert_eq!(frames[3].timestep, 3);
    }

    #[test]
    fn test_positions_normalized_to_grid() {
        let (states, ctx) = sample_rollout();
        let style = AnimationConfig::default();

        let frame = frame_state(&states, &ctx, &style, 1).unwrap();
        // loc_x[1][2] = 3.0 on a grid of length 10.
        assert!((frame.markers[2].x - 0.3).abs() < 1e-6);
        assert!((frame.markers[2].y - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_roles_and_colors() {
        let (states, ctx) = sample_rollout();
        let style = AnimationConfig::default();

        let frame = frame_state(&states, &ctx, &style, 0).unwrap();
        assert_eq!(frame.markers[0].role, AgentRole::Tagger);
        assert_eq!(frame.markers[0].color, style.tagger_color);
        assert_eq!(frame.markers[0].marker_radius, Some(style.tagger_marker_radius));
        assert_eq!(frame.markers[2].role, AgentRole::Runner);
        assert_eq!(frame.markers[2].color, style.runner_color);
        assert_eq!(frame.markers[2].marker_radius, Some(style.runner_marker_radius));
    }

    #[test]
    fn test_inactive_marker_recolored_and_glyphless() {
        let (states, ctx) = sample_rollout();
        let style = AnimationConfig::default();

        // Before leaving the game: role color and glyph.
        for frame_idx in 0..2 {
            let frame = frame_state(&states, &ctx, &style, frame_idx).unwrap();
            assert!(frame.markers[3].active);
            assert_eq!(frame.markers[3].color, style.runner_color);
            assert!(frame.markers[3].marker_radius.is_some());
        }

        // From frame 2 on: inactive color, no glyph.
        for frame_idx in 2..4 {
            let frame = frame_state(&states, &ctx, &style, frame_idx).unwrap();
            assert!(!frame.markers[3].active);
            assert_eq!(frame.markers[3].color, style.inactive_color);
            assert!(frame.markers[3].marker_radius.is_none());
        }
    }

    #[test]
    fn test_runners_left_count() {
        let (states, ctx) = sample_rollout();
        let style = AnimationConfig::default();

        let before = frame_state(&states, &ctx, &style, 1).unwrap();
        assert_eq!(before.label.runners_left, 2);
        assert!((before.label.runners_left_fraction - 1.0).abs() < 1e-6);

        let after = frame_state(&states, &ctx, &style, 2).unwrap();
        assert_eq!(after.label.runners_left, 1);
        assert!((after.label.runners_left_fraction - 0.5).abs() < 1e-6);
    }

    #[test]
    fn test_runners_left_never_negative() {
        // Pathological snapshot: even the taggers are flagged out.
        let num_frames = 1;
        let num_agents = 3;
        let mut states = EpisodeStates::new(num_frames, num_agents);
        states
            .insert(LOC_X, ChannelGrid::filled(num_frames, num_agents, 0.0))
            .unwrap();
        states
            .insert(LOC_Y, ChannelGrid::filled(num_frames, num_agents, 0.0))
            .unwrap();
        states
            .insert(STILL_IN_GAME, ChannelGrid::filled(num_frames, num_agents, 0.0))
            .unwrap();

        let ctx = RolloutContext::new(num_agents, vec![0, 1], 1.0);
        let frame = frame_state(&states, &ctx, &AnimationConfig::default(), 0).unwrap();
        assert_eq!(frame.label.runners_left, 0);
    }

    #[test]
    fn test_zero_runner_roster_fraction_is_nan() {
        // All-tagger roster: the fraction is 0/0 and stays unguarded.
        let num_frames = 2;
        let num_agents = 2;
        let mut states = EpisodeStates::new(num_frames, num_agents);
        states
            .insert(LOC_X, ChannelGrid::filled(num_frames, num_agents, 0.5))
            .unwrap();
        states
            .insert(LOC_Y, ChannelGrid::filled(num_frames, num_agents, 0.5))
            .unwrap();
        states
            .insert(STILL_IN_GAME, ChannelGrid::filled(num_frames, num_agents, 1.0))
            .unwrap();

        let ctx = RolloutContext::new(num_agents, vec![0, 1], 1.0);
        let frame = frame_state(&states, &ctx, &AnimationConfig::default(), 0).unwrap();
        assert_eq!(frame.label.runners_left, 0);
        assert!(frame.label.runners_left_fraction.is_nan());
    }

    #[test]
    fn test_missing_channel_surfaces_on_render() {
        let num_frames = 2;
        let num_agents = 2;
        let mut states = EpisodeStates::new(num_frames, num_agents);
        states
            .insert(LOC_X, ChannelGrid::filled(num_frames, num_agents, 0.0))
            .unwrap();
        states
            .insert(LOC_Y, ChannelGrid::filled(num_frames, num_agents, 0.0))
            .unwrap();

        let ctx = RolloutContext::new(num_agents, vec![0], 1.0);
        let result = frame_state(&states, &ctx, &AnimationConfig::default(), 0);
        assert!(matches!(
            result,
            Err(RenderError::MissingChannel(name)) if name == STILL_IN_GAME
        ));
    }

    #[test]
    fn test_frame_out_of_range() {
        let (states, ctx) = sample_rollout();
        let result = frame_state(&states, &ctx, &AnimationConfig::default(), 4);
        assert!(matches!(
            result,
            Err(RenderError::FrameOutOfRange {
                frame: 4,
                num_frames: 4
            })
        ));
    }

    #[test]
    fn test_label_text_format() {
        let label = StatusLabel {
            timestep: 7,
            runners_left: 2,
            runners_left_fraction: 0.5,
        };
        let text = label.text();
        assert!(text.starts_with("continuous tag\n"));
        assert!(text.contains("time step:"));
        assert!(text.contains("runners left:"));
        assert!(text.contains("(50%)"));
        // Lowercased throughout.
        assert_eq!(text, text.to_lowercase());
    }
}
