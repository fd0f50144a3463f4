// Per-player touch gesture state.

/// Horizontal region of the player surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Zone {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    Horizontal,
    Vertical,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(self, other: Point) -> f64 {
        (self.x - other.x).hypot(self.y - other.y)
    }
}

/// A completed single tap, kept to pair with the next one.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tap {
    pub at_ms: f64,
    /// Position relative to the player's top-left corner.
    pub pos: Point,
}

/// Snapshot taken when a single finger lands. Swipe deltas are measured from
/// here so repeated moves in one gesture never drift.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TouchAnchor {
    /// Client coordinates of the touch start.
    pub start: Point,
    pub at_ms: f64,
    pub zone: Zone,
    pub initial_volume: f64,
    pub initial_brightness: f64,
    pub initial_time: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Phase {
    #[default]
    Idle,
    /// One finger down, not yet past the swipe threshold.
    Pressed(TouchAnchor),
    /// Direction locked until the finger lifts or the sequence is cancelled.
    Swiping { anchor: TouchAnchor, axis: Axis },
    Pinching { start_distance: f64 },
}

/// Mutable state of one gesture controller.
#[derive(Debug, Clone, PartialEq)]
pub struct GestureState {
    pub phase: Phase,
    pub last_tap: Option<Tap>,
    /// Current brightness level; 1.0 means no darkening.
    pub brightness: f64,
}

impl Default for GestureState {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            last_tap: None,
            brightness: 1.0,
        }
    }
}

impl GestureState {
    /// Drop any swipe or pinch in progress. Tap memory survives.
    pub fn reset_phase(&mut self) {
        self.phase = Phase::Idle;
    }
}
