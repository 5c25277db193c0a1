//! Centralized constants used across the canvas.
//!
//! Geometry values are in canvas pixels unless stated otherwise.

/// Default window width in pixels
pub const DEFAULT_WINDOW_WIDTH: f32 = 1600.0;

/// Default window height in pixels
pub const DEFAULT_WINDOW_HEIGHT: f32 = 900.0;

/// Default canvas (scene output) resolution
pub const DEFAULT_CANVAS_WIDTH: f32 = 1920.0;
pub const DEFAULT_CANVAS_HEIGHT: f32 = 1080.0;

/// Base radius of a transform handle, before device pixel ratio scaling
pub const HANDLE_RADIUS: f32 = 4.0;

/// Pick radius for handles, in screen pixels
pub const HANDLE_SEL_RADIUS: f32 = HANDLE_RADIUS * 1.5;

/// Tolerance for the box round-trip validity check and handle position matching
pub const CLOSE_EPSILON: f32 = 0.01;

/// Determinant magnitude below which a matrix is treated as singular
pub const SINGULAR_EPSILON: f32 = 1.0e-6;

/// Minimum content (in unscaled pixels) a crop or resize leaves on each axis
pub const MIN_EXTENT: f32 = 2.0;

/// Rotation snap step and threshold with the fine modifier held (degrees)
pub const FINE_ROTATION_STEP: f32 = 15.0;
pub const FINE_ROTATION_THRESHOLD: f32 = 7.5;

/// Rotation snap threshold against the default candidate angles (degrees)
pub const ROTATION_SNAP_THRESHOLD: f32 = 5.0;

/// Default distance within which edges snap, in canvas pixels
pub const DEFAULT_SNAP_DISTANCE: f32 = 10.0;

/// Rotation at which spacing helper sides swap (degrees)
pub const HELPER_ROT_BREAKPOINT: f32 = 45.0;

/// Gap between a spacing guide line and its label
pub const SPACER_LABEL_MARGIN: f32 = 6.0;

/// Period of the dashed pattern drawn along cropped edges
pub const CROP_STRIPE_PERIOD: f32 = 15.0;

/// Segments used for the rotate handle circle
pub const CIRCLE_SEGMENTS: usize = 40;

/// Screen pixels per tile of the overflow indicator texture
pub const OVERFLOW_TILE_SIZE: f32 = 96.0;

/// Font size of overlay labels drawn by the host
pub const LABEL_FONT_SIZE: f32 = 14.0;
