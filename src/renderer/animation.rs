//! Replayable rollout animation with GIF export.
//!
//! Builds one frame per rollout row (timestep 0 through the episode
//! length inclusive) and owns the resulting frames until the caller
//! saves or drops them.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use gif::{Encoder, Frame, Repeat};

use super::config::AnimationConfig;
use super::error::{RenderError, RenderResult};
use super::frame::all_frame_states;
use super::scene::SceneRenderer;
use crate::rollout::{EpisodeStates, RolloutContext};

/// A rendered episode rollout, one RGBA frame per timestep.
///
/// Returned by [`render_rollout_animation`]; the caller decides whether
/// to [`save`](RolloutAnimation::save) it or drop it.
pub struct RolloutAnimation {
    frames: Vec<Vec<u8>>,
    width: u16,
    height: u16,
    /// Inter-frame delay in centiseconds, derived from the fps setting.
    frame_delay: u16,
}

impl RolloutAnimation {
    fn new(width: u16, height: u16, fps: u16) -> Self {
        // GIF frame delay is in centiseconds (1/100th of a second).
        let frame_delay = (100 / fps.max(1)).max(1);

        Self {
            frames: Vec::new(),
            width,
            height,
            frame_delay,
        }
    }

    fn push_rgb_frame(&mut self, rgb: &[u8]) {
        self.frames.push(rgb_to_rgba(rgb));
    }

    /// Number of frames in the animation.
    pub fn frame_count(&self) -> usize {
        self.frames.len()
    }

    /// Inter-frame delay in centiseconds.
    pub fn frame_delay(&self) -> u16 {
        self.frame_delay
    }

    /// Frame dimensions in pixels.
    pub fn dimensions(&self) -> (u16, u16) {
        (self.width, self.height)
    }

    /// Estimated memory held by the frames, in bytes.
    pub fn memory_usage(&self) -> usize {
        self.frames.len() * (self.width as usize * self.height as usize * 4)
    }

    /// Encode the animation to a looping GIF file.
    pub fn save(&self, path: impl AsRef<Path>) -> RenderResult<()> {
        if self.frames.is_empty() {
            return Err(RenderError::EmptyRollout);
        }

        let file = File::create(path.as_ref())?;
        let writer = BufWriter::new(file);

        let mut encoder = Encoder::new(writer, self.width, self.height, &[])
            .map_err(|e| RenderError::GifEncoding(e.to_string()))?;

        encoder
            .set_repeat(Repeat::Infinite)
            .map_err(|e| RenderError::GifEncoding(e.to_string()))?;

        for frame_data in &self.frames {
            let mut frame = Frame::from_rgba_speed(
                self.width,
                self.height,
                &mut frame_data.clone(),
                10, // Speed: 1-30, lower = better quality but slower
            );
            frame.delay = self.frame_delay;

            encoder
                .write_frame(&frame)
                .map_err(|e| RenderError::GifEncoding(e.to_string()))?;
        }

        Ok(())
    }
}

/// Render the full rollout into a [`RolloutAnimation`].
///
/// Produces exactly `states.num_frames()` frames: one per rollout row,
/// timestep 0 through the episode length inclusive.
pub fn render_rollout_animation(
    states: &EpisodeStates,
    context: &RolloutContext,
    config: &AnimationConfig,
) -> RenderResult<RolloutAnimation> {
    if states.num_frames() == 0 {
        return Err(RenderError::EmptyRollout);
    }

    let renderer = SceneRenderer::new(config);
    let frames = all_frame_states(states, context, config)?;

    let mut animation =
        RolloutAnimation::new(config.width as u16, config.height as u16, config.fps);

    for frame in &frames {
        let rgb = renderer.render_frame(frame)?;
        animation.push_rgb_frame(&rgb);
    }

    log::debug!(
        "rendered rollout animation: {} frames, ~{} KiB",
        animation.frame_count(),
        animation.memory_usage() / 1024
    );

    Ok(animation)
}

/// Convert an RGB buffer to RGBA.
fn rgb_to_rgba(rgb: &[u8]) -> Vec<u8> {
    let pixels = rgb.len() / 3;
    let mut rgba = Vec::with_capacity(pixels * 4);

    for i in 0..pixels {
        rgba.push(rgb[i * 3]);
        rgba.push(rgb[i * 3 + 1]);
        rgba.push(rgb[i * 3 + 2]);
        rgba.push(255);
    }

    rgba
}
