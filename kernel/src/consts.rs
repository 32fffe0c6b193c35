//! Shared numeric constants for the kernel crate.

// ── Math ────────────────────────────────────────────────────────

/// Tolerance for float comparisons and degenerate-length guards.
pub const MINVALUE: f64 = 1e-6;

// ── Hit-testing ─────────────────────────────────────────────────

/// Screen-space hit slop in pixels for corner and edge handles.
pub const HANDLE_RADIUS_PX: f64 = 8.0;

/// Distance from the top-right corner to the rotate handle, in screen pixels.
pub const ROTATE_HANDLE_OFFSET_PX: f64 = 24.0;

/// Hit radius of the rotate handle, in screen pixels.
pub const ROTATE_HANDLE_RADIUS_PX: f64 = 10.0;

/// Half-width of the clickable band around a line shape, in world units.
pub const LINE_HIT_WIDTH: f64 = 4.0;

// ── Rotation ────────────────────────────────────────────────────

/// Angle grid used by rotation snapping (45°).
pub const ROTATION_SNAP_STEP: f64 = std::f64::consts::FRAC_PI_4;

/// Loose rotation snapping engages within this many degrees of the grid.
pub const ROTATION_LOOSE_SNAP_DEG: f64 = 3.0;

// ── Snapping ────────────────────────────────────────────────────

/// Snap distance in screen pixels; divided by the view scale before use.
pub const SNAP_THRESHOLD_PX: f64 = 8.0;

// ── Shapes ──────────────────────────────────────────────────────

/// Width and height of a shape created without explicit size.
pub const DEFAULT_SHAPE_SIZE: f64 = 100.0;

/// Offset applied to pasted copies, in world units.
pub const PASTE_OFFSET: f64 = 10.0;

/// Drawn rectangles smaller than this (world units) on either axis are discarded.
pub const MIN_DRAW_SIZE: f64 = 2.0;

// ── State machine ───────────────────────────────────────────────

/// Upper bound on transitions chained through `on_start` for one event.
pub const MAX_TRANSITION_CHAIN: usize = 32;
