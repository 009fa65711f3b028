//! Episode rollout renderer.
//!
//! Turns a fetched episode snapshot (agent positions and liveness flags
//! per timestep) into a replayable animation of the Tag arena:
//!
//! - **Frame states**: a pure per-frame state update computes marker
//!   positions, colors, glyphs, and the status label for each timestep.
//! - **Scene drawing**: frame states are drawn onto a tilted arena
//!   plane under a perspective camera (`render` feature, via plotters).
//! - **Animation export**: all frames are collected into a looping GIF
//!   (`render-gif` feature).
//!
//! # Example
//!
//! ```ignore
//! use tag_session::renderer::{render_rollout_animation, AnimationConfig};
//!
//! let states = session.fetch_rollout()?;
//! let animation = render_rollout_animation(&states, session.context(), &AnimationConfig::default())?;
//! animation.save("rollout.gif")?;
//! ```

// Core modules - always available
mod config;
mod error;
mod frame;
mod projection;

pub use config::{AnimationConfig, CameraConfig};
pub use error::{RenderError, RenderResult};
pub use frame::{all_frame_states, frame_state, AgentRole, FrameState, MarkerState, StatusLabel};
pub use projection::{orbit_position, Camera};

// Bitmap drawing (requires render feature)
#[cfg(feature = "render")]
mod scene;

#[cfg(feature = "render")]
pub use scene::SceneRenderer;

// GIF export (requires render-gif feature)
#[cfg(feature = "render-gif")]
mod animation;

#[cfg(feature = "render-gif")]
pub use animation::{render_rollout_animation, RolloutAnimation};
