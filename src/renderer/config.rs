//! Animation configuration: cosmetics and camera placement.

/// Cosmetic parameters for the rollout animation.
#[derive(Clone, Debug, PartialEq)]
pub struct AnimationConfig {
    /// Playback frame rate.
    pub fps: u16,
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// Marker color for tagger agents.
    pub tagger_color: [u8; 3],
    /// Marker color for runner agents still in the game.
    pub runner_color: [u8; 3],
    /// Marker color once an agent has left the game.
    pub inactive_color: [u8; 3],
    /// Background color.
    pub background_color: [u8; 3],
    /// Marker radius for taggers, in pixels.
    pub tagger_marker_radius: u32,
    /// Marker radius for runners, in pixels.
    pub runner_marker_radius: u32,
    /// Camera placement over the arena.
    pub camera: CameraConfig,
}

impl Default for AnimationConfig {
    fn default() -> Self {
        Self {
            fps: 25,
            width: 600,
            height: 600,
            // #C843C3
            tagger_color: [200, 67, 195],
            // #245EB6
            runner_color: [36, 94, 182],
            // #666666
            inactive_color: [102, 102, 102],
            background_color: [255, 255, 255],
            tagger_marker_radius: 5,
            runner_marker_radius: 3,
            camera: CameraConfig::default(),
        }
    }
}

impl AnimationConfig {
    /// Create a config with the default cosmetics.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the playback frame rate.
    pub fn with_fps(mut self, fps: u16) -> Self {
        self.fps = fps;
        self
    }

    /// Set frame dimensions in pixels.
    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }

    /// Set the tagger marker color.
    pub fn with_tagger_color(mut self, color: [u8; 3]) -> Self {
        self.tagger_color = color;
        self
    }

    /// Set the runner marker color.
    pub fn with_runner_color(mut self, color: [u8; 3]) -> Self {
        self.runner_color = color;
        self
    }

    /// Set the inactive marker color.
    pub fn with_inactive_color(mut self, color: [u8; 3]) -> Self {
        self.inactive_color = color;
        self
    }

    /// Set the camera placement.
    pub fn with_camera(mut self, camera: CameraConfig) -> Self {
        self.camera = camera;
        self
    }
}

/// Camera placement for the tilted-plane view of the arena.
///
/// The camera orbits the arena center on a sphere described by
/// elevation, azimuth, and distance, looking at the target point.
#[derive(Clone, Debug, PartialEq)]
pub struct CameraConfig {
    /// Elevation above the arena plane, in degrees.
    pub elevation_deg: f32,
    /// Azimuth around the arena, in degrees.
    pub azimuth_deg: f32,
    /// Distance from the target, in normalized arena units.
    pub distance: f32,
    /// Point the camera looks at, in normalized arena coordinates.
    pub target: [f32; 3],
    /// Vertical field of view, in degrees.
    pub fov_deg: f32,
    /// Near clip plane.
    pub near: f32,
    /// Far clip plane.
    pub far: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            elevation_deg: 40.0,
            azimuth_deg: -55.0,
            distance: 2.4,
            target: [0.5, 0.5, 0.0],
            fov_deg: 35.0,
            near: 0.1,
            far: 100.0,
        }
    }
}

impl CameraConfig {
    /// Create a camera with the default viewpoint.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set elevation in degrees.
    pub fn with_elevation(mut self, deg: f32) -> Self {
        self.elevation_deg = deg;
        self
    }

    /// Set azimuth in degrees.
    pub fn with_azimuth(mut self, deg: f32) -> Self {
        self.azimuth_deg = deg;
        self
    }

    /// Set orbit distance.
    pub fn with_distance(mut self, distance: f32) -> Self {
        self.distance = distance;
        self
    }
}
