pub mod theme;
pub mod touch;

pub use theme::Theme;
pub use touch::{Axis, GestureState, Phase, Point, Tap, TouchAnchor, Zone};
