//! Bitmap drawing of a single animation frame.
//!
//! Consumes a [`FrameState`] and draws it into an RGB buffer: the arena
//! plane under the tilted camera, one circle marker per active agent,
//! and the status label overlay.

use plotters::backend::BitMapBackend;
use plotters::prelude::*;

use super::config::AnimationConfig;
use super::error::{RenderError, RenderResult};
use super::frame::FrameState;
use super::projection::Camera;

/// Grid lines drawn across the arena plane.
const ARENA_GRID_DIVISIONS: usize = 10;

/// Renders frame states into RGB pixel buffers.
pub struct SceneRenderer {
    width: u32,
    height: u32,
    camera: Camera,
    style: AnimationConfig,
}

impl SceneRenderer {
    /// Create a renderer for the given animation configuration.
    pub fn new(style: &AnimationConfig) -> Self {
        Self {
            width: style.width,
            height: style.height,
            camera: Camera::new(&style.camera, style.width, style.height),
            style: style.clone(),
        }
    }

    /// Frame width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Frame height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Draw one frame into a fresh RGB buffer (`width * height * 3`).
    pub fn render_frame(&self, frame: &FrameState) -> RenderResult<Vec<u8>> {
        let mut buffer = vec![0u8; (self.width * self.height * 3) as usize];

        {
            let root = BitMapBackend::with_buffer(&mut buffer, (self.width, self.height))
                .into_drawing_area();

            let [br, bg, bb] = self.style.background_color;
            root.fill(&RGBColor(br, bg, bb))
                .map_err(|e| RenderError::ImageEncoding(e.to_string()))?;

            self.draw_arena(&root)?;
            self.draw_markers(&root, frame)?;
            self.draw_label(&root, frame)?;

            root.present()
                .map_err(|e| RenderError::ImageEncoding(e.to_string()))?;
        }

        Ok(buffer)
    }

    /// Draw the arena plane: border and grid lines under the camera.
    fn draw_arena(
        &self,
        root: &DrawingArea<BitMapBackend, plotters::coord::Shift>,
    ) -> RenderResult<()> {
        let grid_color = RGBColor(210, 215, 230);
        let border_color = RGBColor(150, 158, 180);

        let divisions = ARENA_GRID_DIVISIONS;
        for i in 0..=divisions {
            let t = i as f32 / divisions as f32;
            let heavy = i == 0 || i == divisions;
            let color = if heavy { border_color } else { grid_color };
            let stroke = if heavy { 2 } else { 1 };

            self.draw_plane_line(root, [t, 0.0, 0.0], [t, 1.0, 0.0], color, stroke)?;
            self.draw_plane_line(root, [0.0, t, 0.0], [1.0, t, 0.0], color, stroke)?;
        }

        Ok(())
    }

    fn draw_plane_line(
        &self,
        root: &DrawingArea<BitMapBackend, plotters::coord::Shift>,
        from: [f32; 3],
        to: [f32; 3],
        color: RGBColor,
        stroke: u32,
    ) -> RenderResult<()> {
        if let (Some(start), Some(end)) = (self.camera.project(from), self.camera.project(to)) {
            root.draw(&PathElement::new(
                [(start.0 as i32, start.1 as i32), (end.0 as i32, end.1 as i32)],
                color.stroke_width(stroke),
            ))
            .map_err(|e| RenderError::ImageEncoding(format!("{:?}", e)))?;
        }
        Ok(())
    }

    /// Draw agent markers, furthest from the camera first.
    fn draw_markers(
        &self,
        root: &DrawingArea<BitMapBackend, plotters::coord::Shift>,
        frame: &FrameState,
    ) -> RenderResult<()> {
        let mut markers: Vec<_> = frame
            .markers
            .iter()
            .filter(|m| m.marker_radius.is_some())
            .collect();
        markers.sort_by(|a, b| {
            let da = self.camera.distance_to([a.x, a.y, 0.0]);
            let db = self.camera.distance_to([b.x, b.y, 0.0]);
            db.partial_cmp(&da).unwrap_or(std::cmp::Ordering::Equal)
        });

        for marker in markers {
            let radius = match marker.marker_radius {
                Some(r) => r as i32,
                None => continue,
            };
            if let Some((x, y)) = self.camera.project([marker.x, marker.y, 0.0]) {
                let [r, g, b] = marker.color;
                root.draw(&Circle::new(
                    (x as i32, y as i32),
                    radius,
                    RGBColor(r, g, b).filled(),
                ))
                .map_err(|e| RenderError::ImageEncoding(format!("{:?}", e)))?;
            }
        }

        Ok(())
    }

    /// Draw the multi-line status label in the top-left corner.
    fn draw_label(
        &self,
        root: &DrawingArea<BitMapBackend, plotters::coord::Shift>,
        frame: &FrameState,
    ) -> RenderResult<()> {
        let color = RGBColor(102, 102, 102);
        let style = ("sans-serif", 16).into_font().color(&color);

        for (i, line) in frame.label.text().lines().enumerate() {
            root.draw(&Text::new(
                line.to_string(),
                (12, 20 + i as i32 * 20),
                &style,
            ))
            .map_err(|e| RenderError::ImageEncoding(format!("{:?}", e)))?;
        }

        Ok(())
    }
}
