//! Touch gesture recognition for the video player.
//!
//! [`GestureController`] is a pure state machine: it is fed touch events,
//! mutates a [`Playback`] implementation and answers with a [`Reaction`]
//! listing the UI effects the host should render. The browser binding lives
//! in [`dom`].
//!
//! States: idle, tap-pending, swiping-horizontal, swiping-vertical and
//! pinching. Only one gesture is ever live; two fingers preempt a
//! single-finger drag, and a swipe's axis is fixed once chosen.

pub mod dom;

use crate::config::GestureConfig;
use crate::state::{Axis, GestureState, Phase, Point, Tap, TouchAnchor, Zone};
use crate::util::{clamp_time, format_clock, format_offset};

/// The subset of a media element the controller drives.
pub trait Playback {
    fn current_time(&self) -> f64;
    fn set_current_time(&mut self, secs: f64);
    /// NaN while unknown, infinite for live streams.
    fn duration(&self) -> f64;
    fn volume(&self) -> f64;
    fn set_volume(&mut self, volume: f64);
    fn paused(&self) -> bool;
    fn play(&mut self);
    fn pause(&mut self);
}

/// Player bounding box in client coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Bounds {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn relative(&self, p: Point) -> Point {
        Point::new(p.x - self.left, p.y - self.top)
    }

    /// Zone for an x offset measured from the left edge.
    pub fn zone_at(&self, x: f64, config: &GestureConfig) -> Zone {
        if self.width <= 0.0 {
            return Zone::Center;
        }
        let ratio = x / self.width;
        if ratio < config.left_zone_ratio {
            Zone::Left
        } else if ratio > config.right_zone_ratio {
            Zone::Right
        } else {
            Zone::Center
        }
    }
}

/// What the controller knows about the page at event time.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Surface {
    pub bounds: Bounds,
    pub fullscreen: bool,
}

/// One touch event, reduced to client coordinates.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct TouchInput {
    /// Fingers still on the surface.
    pub touches: Vec<Point>,
    /// Fingers that changed in this event (for an end: the lifted ones).
    pub changed: Vec<Point>,
    pub timestamp_ms: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LevelKind {
    Volume,
    Brightness,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    Toast(String),
    /// Double-tap feedback on a zone; the center carries the play/pause glyph.
    Flash { zone: Zone, icon: Option<&'static str> },
    ShowLevel {
        kind: LevelKind,
        value: f64,
        icon: &'static str,
    },
    /// Live preview of a horizontal seek; playback has not moved yet.
    ShowSeek { delta: String, target: String },
    HideIndicators,
    /// Opacity of the darkening layer over the player.
    Darken(f64),
    EnterFullscreen,
    ExitFullscreen,
}

/// Result of feeding one event to the controller.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Reaction {
    pub effects: Vec<Effect>,
    /// The host should call `preventDefault` to stop page scrolling.
    pub prevent_default: bool,
}

impl Reaction {
    fn push(&mut self, effect: Effect) {
        self.effects.push(effect);
    }
}

/// Named gesture states, as observed from outside.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureKind {
    Idle,
    TapPending,
    SwipingHorizontal,
    SwipingVertical,
    Pinching,
}

pub fn volume_icon(value: f64) -> &'static str {
    if value == 0.0 {
        "🔇"
    } else if value < 0.5 {
        "🔉"
    } else {
        "🔊"
    }
}

pub fn brightness_icon(value: f64) -> &'static str {
    if value < 0.3 {
        "🌙"
    } else if value < 0.7 {
        "☀️"
    } else {
        "🔆"
    }
}

/// Gesture state machine for a single player.
#[derive(Debug, Clone)]
pub struct GestureController {
    config: GestureConfig,
    state: GestureState,
}

impl GestureController {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            state: GestureState::default(),
        }
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    pub fn gesture_state(&self) -> &GestureState {
        &self.state
    }

    pub fn state(&self) -> GestureKind {
        match self.state.phase {
            Phase::Pinching { .. } => GestureKind::Pinching,
            Phase::Swiping {
                axis: Axis::Horizontal,
                ..
            } => GestureKind::SwipingHorizontal,
            Phase::Swiping {
                axis: Axis::Vertical,
                ..
            } => GestureKind::SwipingVertical,
            Phase::Idle | Phase::Pressed(_) if self.state.last_tap.is_some() => {
                GestureKind::TapPending
            }
            Phase::Idle | Phase::Pressed(_) => GestureKind::Idle,
        }
    }

    pub fn touch_start<P: Playback + ?Sized>(
        &mut self,
        input: &TouchInput,
        surface: &Surface,
        player: &P,
    ) -> Reaction {
        let mut reaction = Reaction::default();
        match input.touches.as_slice() {
            [a, b] => {
                if matches!(self.state.phase, Phase::Swiping { .. }) {
                    reaction.push(Effect::HideIndicators);
                }
                self.state.phase = Phase::Pinching {
                    start_distance: a.distance(*b),
                };
            }
            [touch] => {
                let rel = surface.bounds.relative(*touch);
                self.state.phase = Phase::Pressed(TouchAnchor {
                    start: *touch,
                    at_ms: input.timestamp_ms,
                    zone: surface.bounds.zone_at(rel.x, &self.config),
                    initial_volume: player.volume(),
                    initial_brightness: self.state.brightness,
                    initial_time: player.current_time(),
                });
            }
            _ => {}
        }
        reaction
    }

    pub fn touch_move<P: Playback + ?Sized>(
        &mut self,
        input: &TouchInput,
        player: &mut P,
    ) -> Reaction {
        let mut reaction = Reaction::default();
        let (anchor, axis) = match (self.state.phase, input.touches.as_slice()) {
            (Phase::Pinching { .. }, [_, _]) => {
                reaction.prevent_default = true;
                return reaction;
            }
            (Phase::Pressed(anchor), [touch]) => {
                let dx = touch.x - anchor.start.x;
                let dy = touch.y - anchor.start.y;
                let threshold = self.config.swipe_threshold_px;
                if dx.abs() <= threshold && dy.abs() <= threshold {
                    return reaction;
                }
                let axis = if dx.abs() > dy.abs() {
                    Axis::Horizontal
                } else {
                    Axis::Vertical
                };
                log::debug!("swipe locked {axis:?} in {:?} zone", anchor.zone);
                self.state.phase = Phase::Swiping { anchor, axis };
                (anchor, axis)
            }
            (Phase::Swiping { anchor, axis }, [_]) => (anchor, axis),
            _ => return reaction,
        };
        reaction.prevent_default = true;

        let touch = input.touches[0];
        match axis {
            Axis::Vertical => {
                let dy = touch.y - anchor.start.y;
                self.vertical_swipe(&anchor, dy, player, &mut reaction);
            }
            Axis::Horizontal => {
                let seek = self.seek_for(touch.x - anchor.start.x);
                let target = clamp_time(anchor.initial_time + seek, player.duration());
                reaction.push(Effect::ShowSeek {
                    delta: format_offset(seek),
                    target: format_clock(target),
                });
            }
        }
        reaction
    }

    pub fn touch_end<P: Playback + ?Sized>(
        &mut self,
        input: &TouchInput,
        surface: &Surface,
        player: &mut P,
    ) -> Reaction {
        let mut reaction = Reaction::default();
        match self.state.phase {
            Phase::Pinching { start_distance } => {
                if input.touches.len() >= 2 {
                    return reaction;
                }
                if let Some(end) = pinch_end_distance(input) {
                    self.finish_pinch(end - start_distance, surface.fullscreen, &mut reaction);
                }
                self.state.reset_phase();
            }
            Phase::Swiping { anchor, axis } => {
                if axis == Axis::Horizontal {
                    let end_x = input.changed.first().map_or(anchor.start.x, |p| p.x);
                    let seek = self.seek_for(end_x - anchor.start.x);
                    player.set_current_time(clamp_time(
                        anchor.initial_time + seek,
                        player.duration(),
                    ));
                    if seek.abs() >= 1.0 {
                        reaction.push(Effect::Toast(format_offset(seek)));
                    }
                }
                reaction.push(Effect::HideIndicators);
                self.state.reset_phase();
            }
            Phase::Pressed(_) => {
                self.state.reset_phase();
                if let Some(lifted) = input.changed.first() {
                    let pos = surface.bounds.relative(*lifted);
                    self.register_tap(pos, input.timestamp_ms, surface, player, &mut reaction);
                }
            }
            Phase::Idle => {}
        }
        reaction
    }

    pub fn touch_cancel(&mut self) -> Reaction {
        self.state.reset_phase();
        Reaction {
            effects: vec![Effect::HideIndicators],
            prevent_default: false,
        }
    }

    fn seek_for(&self, dx: f64) -> f64 {
        dx / 100.0 * self.config.horizontal_secs_per_100px
    }

    fn vertical_swipe<P: Playback + ?Sized>(
        &mut self,
        anchor: &TouchAnchor,
        dy: f64,
        player: &mut P,
        reaction: &mut Reaction,
    ) {
        let change = -dy / self.config.vertical_sensitivity_px;
        match anchor.zone {
            Zone::Right => {
                let volume = (anchor.initial_volume + change).clamp(0.0, 1.0);
                player.set_volume(volume);
                reaction.push(Effect::ShowLevel {
                    kind: LevelKind::Volume,
                    value: volume,
                    icon: volume_icon(volume),
                });
            }
            Zone::Left => {
                let brightness = (anchor.initial_brightness + change).clamp(0.0, 1.0);
                self.state.brightness = brightness;
                reaction.push(Effect::Darken(1.0 - brightness));
                reaction.push(Effect::ShowLevel {
                    kind: LevelKind::Brightness,
                    value: brightness,
                    icon: brightness_icon(brightness),
                });
            }
            Zone::Center => {}
        }
    }

    fn register_tap<P: Playback + ?Sized>(
        &mut self,
        pos: Point,
        now_ms: f64,
        surface: &Surface,
        player: &mut P,
        reaction: &mut Reaction,
    ) {
        let paired = self.state.last_tap.is_some_and(|prev| {
            now_ms - prev.at_ms < self.config.double_tap_delay_ms
                && pos.distance(prev.pos) < self.config.double_tap_slop_px
        });
        if !paired {
            self.state.last_tap = Some(Tap { at_ms: now_ms, pos });
            return;
        }
        // Cleared so a third tap starts a fresh pair.
        self.state.last_tap = None;
        let zone = surface.bounds.zone_at(pos.x, &self.config);
        self.double_tap(zone, player, reaction);
    }

    fn double_tap<P: Playback + ?Sized>(
        &self,
        zone: Zone,
        player: &mut P,
        reaction: &mut Reaction,
    ) {
        let step = self.config.seek_step_secs;
        match zone {
            Zone::Left => {
                player.set_current_time((player.current_time() - step).max(0.0));
                reaction.push(Effect::Toast(format!("-{step}s")));
                reaction.push(Effect::Flash { zone, icon: None });
            }
            Zone::Right => {
                let target = clamp_time(player.current_time() + step, player.duration());
                player.set_current_time(target);
                reaction.push(Effect::Toast(format!("+{step}s")));
                reaction.push(Effect::Flash { zone, icon: None });
            }
            Zone::Center => {
                if player.paused() {
                    player.play();
                } else {
                    player.pause();
                }
                let icon = if player.paused() { "▶" } else { "⏸" };
                reaction.push(Effect::Flash {
                    zone,
                    icon: Some(icon),
                });
            }
        }
        log::debug!("double tap in {zone:?} zone");
    }

    fn finish_pinch(&self, delta: f64, fullscreen: bool, reaction: &mut Reaction) {
        if delta.abs() <= self.config.pinch_threshold_px {
            return;
        }
        if delta > 0.0 && !fullscreen {
            reaction.push(Effect::EnterFullscreen);
            reaction.push(Effect::Toast("Fullscreen".into()));
        } else if delta < 0.0 && fullscreen {
            reaction.push(Effect::ExitFullscreen);
            reaction.push(Effect::Toast("Exit fullscreen".into()));
        }
    }
}

impl Default for GestureController {
    fn default() -> Self {
        Self::new(GestureConfig::default())
    }
}

/// Finger distance when a pinch ends.
///
/// With one finger still down, it is measured between that finger and the
/// first lifted one; with both lifted in the same event, between the two
/// lifted fingers. Anything else leaves the distance unknown and the pinch is
/// dropped without acting.
fn pinch_end_distance(input: &TouchInput) -> Option<f64> {
    match (input.touches.as_slice(), input.changed.as_slice()) {
        ([remaining], [lifted, ..]) => Some(remaining.distance(*lifted)),
        ([], [a, b, ..]) => Some(a.distance(*b)),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone)]
    struct FakePlayer {
        time: f64,
        duration: f64,
        volume: f64,
        paused: bool,
    }

    impl FakePlayer {
        fn at(time: f64) -> Self {
            Self {
                time,
                duration: 100.0,
                volume: 0.5,
                paused: false,
            }
        }
    }

    impl Playback for FakePlayer {
        fn current_time(&self) -> f64 {
            self.time
        }
        fn set_current_time(&mut self, secs: f64) {
            self.time = secs;
        }
        fn duration(&self) -> f64 {
            self.duration
        }
        fn volume(&self) -> f64 {
            self.volume
        }
        fn set_volume(&mut self, volume: f64) {
            self.volume = volume;
        }
        fn paused(&self) -> bool {
            self.paused
        }
        fn play(&mut self) {
            self.paused = false;
        }
        fn pause(&mut self) {
            self.paused = true;
        }
    }

    // 300px wide: left zone below x=99, right zone above x=201.
    fn surface() -> Surface {
        Surface {
            bounds: Bounds {
                left: 0.0,
                top: 0.0,
                width: 300.0,
                height: 200.0,
            },
            fullscreen: false,
        }
    }

    fn down(points: &[(f64, f64)], t: f64) -> TouchInput {
        TouchInput {
            touches: points.iter().map(|&(x, y)| Point::new(x, y)).collect(),
            changed: Vec::new(),
            timestamp_ms: t,
        }
    }

    fn up(remaining: &[(f64, f64)], lifted: &[(f64, f64)], t: f64) -> TouchInput {
        TouchInput {
            touches: remaining.iter().map(|&(x, y)| Point::new(x, y)).collect(),
            changed: lifted.iter().map(|&(x, y)| Point::new(x, y)).collect(),
            timestamp_ms: t,
        }
    }

    fn tap(
        ctl: &mut GestureController,
        player: &mut FakePlayer,
        x: f64,
        y: f64,
        t: f64,
    ) -> Reaction {
        ctl.touch_start(&down(&[(x, y)], t), &surface(), player);
        ctl.touch_end(&up(&[], &[(x, y)], t + 40.0), &surface(), player)
    }

    fn drag(
        ctl: &mut GestureController,
        player: &mut FakePlayer,
        from: (f64, f64),
        to: (f64, f64),
    ) -> (Reaction, Reaction) {
        ctl.touch_start(&down(&[from], 0.0), &surface(), player);
        let moved = ctl.touch_move(&down(&[to], 50.0), player);
        let ended = ctl.touch_end(&up(&[], &[to], 100.0), &surface(), player);
        (moved, ended)
    }

    fn toasts(reaction: &Reaction) -> Vec<String> {
        reaction
            .effects
            .iter()
            .filter_map(|e| match e {
                Effect::Toast(msg) => Some(msg.clone()),
                _ => None,
            })
            .collect()
    }

    #[test]
    fn double_tap_right_seeks_forward() {
        let mut ctl = GestureController::default();
        let mut player = FakePlayer::at(20.0);
        let first = tap(&mut ctl, &mut player, 250.0, 100.0, 0.0);
        assert!(first.effects.is_empty());
        assert_eq!(ctl.state(), GestureKind::TapPending);

        let second = tap(&mut ctl, &mut player, 255.0, 104.0, 200.0);
        assert_eq!(player.time, 30.0);
        assert_eq!(toasts(&second), vec!["+10s"]);
        assert!(second.effects.contains(&Effect::Flash {
            zone: Zone::Right,
            icon: None
        }));
        assert_eq!(ctl.state(), GestureKind::Idle);
    }

    #[test]
    fn double_tap_left_clamps_at_zero() {
        let mut ctl = GestureController::default();
        let mut player = FakePlayer::at(4.0);
        tap(&mut ctl, &mut player, 20.0, 50.0, 0.0);
        let reaction = tap(&mut ctl, &mut player, 22.0, 50.0, 150.0);
        assert_eq!(player.time, 0.0);
        assert_eq!(toasts(&reaction), vec!["-10s"]);

        let mut player = FakePlayer::at(35.0);
        tap(&mut ctl, &mut player, 20.0, 50.0, 1000.0);
        tap(&mut ctl, &mut player, 20.0, 50.0, 1100.0);
        assert_eq!(player.time, 25.0);
    }

    #[test]
    fn double_tap_right_clamps_at_duration() {
        let mut ctl = GestureController::default();
        let mut player = FakePlayer::at(95.0);
        tap(&mut ctl, &mut player, 280.0, 50.0, 0.0);
        tap(&mut ctl, &mut player, 280.0, 50.0, 100.0);
        assert_eq!(player.time, 100.0);
    }

    #[test]
    fn double_tap_center_toggles_and_shows_resulting_state() {
        let mut ctl = GestureController::default();
        let mut player = FakePlayer::at(10.0);
        tap(&mut ctl, &mut player, 150.0, 50.0, 0.0);
        let paused = tap(&mut ctl, &mut player, 150.0, 50.0, 100.0);
        assert!(player.paused);
        assert!(paused.effects.contains(&Effect::Flash {
            zone: Zone::Center,
            icon: Some("▶")
        }));

        tap(&mut ctl, &mut player, 150.0, 50.0, 1000.0);
        let playing = tap(&mut ctl, &mut player, 150.0, 50.0, 1100.0);
        assert!(!player.paused);
        assert!(playing.effects.contains(&Effect::Flash {
            zone: Zone::Center,
            icon: Some("⏸")
        }));
        assert_eq!(player.time, 10.0);
    }

    #[test]
    fn slow_or_distant_second_tap_becomes_new_baseline() {
        let mut ctl = GestureController::default();
        let mut player = FakePlayer::at(50.0);
        tap(&mut ctl, &mut player, 250.0, 50.0, 0.0);
        // Ends 340ms after the first tap ended at 40ms.
        let slow = tap(&mut ctl, &mut player, 250.0, 50.0, 300.0);
        assert!(slow.effects.is_empty());
        let far = tap(&mut ctl, &mut player, 250.0, 120.0, 400.0);
        assert!(far.effects.is_empty());
        assert_eq!(player.time, 50.0);

        // Pairs with the distant tap, which became the baseline.
        tap(&mut ctl, &mut player, 252.0, 118.0, 500.0);
        assert_eq!(player.time, 60.0);
    }

    #[test]
    fn triple_tap_fires_once() {
        let mut ctl = GestureController::default();
        let mut player = FakePlayer::at(50.0);
        tap(&mut ctl, &mut player, 250.0, 50.0, 0.0);
        tap(&mut ctl, &mut player, 250.0, 50.0, 100.0);
        let third = tap(&mut ctl, &mut player, 250.0, 50.0, 200.0);
        assert!(third.effects.is_empty());
        assert_eq!(player.time, 60.0);
    }

    #[test]
    fn small_movement_stays_a_tap() {
        let mut ctl = GestureController::default();
        let mut player = FakePlayer::at(50.0);
        ctl.touch_start(&down(&[(250.0, 50.0)], 0.0), &surface(), &player);
        let moved = ctl.touch_move(&down(&[(275.0, 75.0)], 20.0), &mut player);
        assert_eq!(moved, Reaction::default());
        ctl.touch_end(&up(&[], &[(275.0, 75.0)], 40.0), &surface(), &mut player);
        assert_eq!(ctl.state(), GestureKind::TapPending);

        tap(&mut ctl, &mut player, 270.0, 70.0, 150.0);
        assert_eq!(player.time, 60.0);
    }

    #[test]
    fn horizontal_swipe_previews_then_commits() {
        let mut ctl = GestureController::default();
        let mut player = FakePlayer::at(60.0);
        let (moved, ended) = drag(&mut ctl, &mut player, (20.0, 100.0), (270.0, 110.0));

        assert!(moved.prevent_default);
        assert_eq!(
            moved.effects,
            vec![Effect::ShowSeek {
                delta: "+0:05".into(),
                target: "1:05".into()
            }]
        );
        assert_eq!(player.time, 65.0);
        assert_eq!(toasts(&ended), vec!["+0:05"]);
        assert!(ended.effects.contains(&Effect::HideIndicators));
        assert_eq!(ctl.state(), GestureKind::Idle);
    }

    #[test]
    fn horizontal_swipe_preview_leaves_playback_alone() {
        let mut ctl = GestureController::default();
        let mut player = FakePlayer::at(60.0);
        ctl.touch_start(&down(&[(100.0, 100.0)], 0.0), &surface(), &player);
        ctl.touch_move(&down(&[(200.0, 100.0)], 10.0), &mut player);
        assert_eq!(player.time, 60.0);
        assert_eq!(ctl.state(), GestureKind::SwipingHorizontal);
    }

    #[test]
    fn short_horizontal_swipe_commits_without_toast() {
        let mut ctl = GestureController::default();
        let mut player = FakePlayer::at(10.0);
        let (_, ended) = drag(&mut ctl, &mut player, (100.0, 100.0), (60.0, 100.0));
        assert!((player.time - 9.2).abs() < 1e-9);
        assert!(toasts(&ended).is_empty());
    }

    #[test]
    fn backward_swipe_clamps_at_zero() {
        let mut ctl = GestureController::default();
        let mut player = FakePlayer::at(2.0);
        let (moved, _) = drag(&mut ctl, &mut player, (290.0, 100.0), (40.0, 100.0));
        assert_eq!(
            moved.effects,
            vec![Effect::ShowSeek {
                delta: "-0:05".into(),
                target: "0:00".into()
            }]
        );
        assert_eq!(player.time, 0.0);
    }

    #[test]
    fn vertical_swipe_right_sets_volume_from_baseline() {
        for initial in [0.0, 0.3, 0.9] {
            let mut ctl = GestureController::default();
            let mut player = FakePlayer::at(0.0);
            player.volume = initial;
            let (moved, ended) = drag(&mut ctl, &mut player, (250.0, 180.0), (250.0, 30.0));
            assert_eq!(player.volume, 1.0);
            assert!(moved.effects.contains(&Effect::ShowLevel {
                kind: LevelKind::Volume,
                value: 1.0,
                icon: "🔊"
            }));
            assert!(toasts(&ended).is_empty());
        }
    }

    #[test]
    fn vertical_swipe_moves_are_measured_from_touch_start() {
        let mut ctl = GestureController::default();
        let mut player = FakePlayer::at(0.0);
        player.volume = 0.5;
        ctl.touch_start(&down(&[(250.0, 100.0)], 0.0), &surface(), &player);
        ctl.touch_move(&down(&[(250.0, 140.0)], 10.0), &mut player);
        ctl.touch_move(&down(&[(250.0, 160.0)], 20.0), &mut player);
        let last = ctl.touch_move(&down(&[(250.0, 175.0)], 30.0), &mut player);
        assert!((player.volume - 0.0).abs() < 1e-9);
        assert!(last.effects.contains(&Effect::ShowLevel {
            kind: LevelKind::Volume,
            value: 0.0,
            icon: "🔇"
        }));
    }

    #[test]
    fn vertical_swipe_left_darkens_and_becomes_next_baseline() {
        let mut ctl = GestureController::default();
        let mut player = FakePlayer::at(0.0);
        let (moved, _) = drag(&mut ctl, &mut player, (30.0, 50.0), (30.0, 110.0));
        let darkness = moved.effects.iter().find_map(|e| match e {
            Effect::Darken(opacity) => Some(*opacity),
            _ => None,
        });
        assert!((darkness.unwrap() - 0.4).abs() < 1e-9);
        assert!((ctl.gesture_state().brightness - 0.6).abs() < 1e-9);

        let (moved, _) = drag(&mut ctl, &mut player, (30.0, 50.0), (30.0, 125.0));
        let level = moved.effects.iter().find_map(|e| match e {
            Effect::ShowLevel { value, icon, .. } => Some((*value, *icon)),
            _ => None,
        });
        let (value, icon) = level.unwrap();
        assert!((value - 0.1).abs() < 1e-9);
        assert_eq!(icon, "🌙");
        assert_eq!(player.volume, 0.5);
    }

    #[test]
    fn vertical_swipe_center_is_locked_but_inert() {
        let mut ctl = GestureController::default();
        let mut player = FakePlayer::at(12.0);
        let (moved, _) = drag(&mut ctl, &mut player, (150.0, 20.0), (150.0, 180.0));
        assert!(moved.prevent_default);
        assert!(moved.effects.is_empty());
        assert_eq!(player.volume, 0.5);
        assert_eq!(player.time, 12.0);
    }

    #[test]
    fn swipe_direction_never_changes_mid_gesture() {
        let mut ctl = GestureController::default();
        let mut player = FakePlayer::at(30.0);
        ctl.touch_start(&down(&[(250.0, 100.0)], 0.0), &surface(), &player);
        ctl.touch_move(&down(&[(290.0, 100.0)], 10.0), &mut player);
        assert_eq!(ctl.state(), GestureKind::SwipingHorizontal);

        let later = ctl.touch_move(&down(&[(250.0, 10.0)], 20.0), &mut player);
        assert_eq!(ctl.state(), GestureKind::SwipingHorizontal);
        assert!(matches!(later.effects.as_slice(), [Effect::ShowSeek { .. }]));
        assert_eq!(player.volume, 0.5);
    }

    #[test]
    fn swipe_end_does_not_count_as_tap() {
        let mut ctl = GestureController::default();
        let mut player = FakePlayer::at(30.0);
        tap(&mut ctl, &mut player, 250.0, 100.0, 0.0);
        ctl.touch_start(&down(&[(250.0, 100.0)], 60.0), &surface(), &player);
        ctl.touch_move(&down(&[(250.0, 20.0)], 80.0), &mut player);
        ctl.touch_end(&up(&[], &[(250.0, 20.0)], 100.0), &surface(), &mut player);
        assert_eq!(player.time, 30.0);
    }

    fn pinch(
        ctl: &mut GestureController,
        start_gap: f64,
        end_gap: f64,
        fullscreen: bool,
    ) -> Reaction {
        let mut player = FakePlayer::at(0.0);
        let surface = Surface {
            fullscreen,
            ..surface()
        };
        let start = down(&[(100.0, 100.0), (100.0 + start_gap, 100.0)], 0.0);
        ctl.touch_start(&start, &surface, &player);
        let spread = down(&[(100.0, 100.0), (100.0 + end_gap, 100.0)], 10.0);
        let moved = ctl.touch_move(&spread, &mut player);
        assert!(moved.prevent_default);
        ctl.touch_end(
            &up(&[(100.0, 100.0)], &[(100.0 + end_gap, 100.0)], 20.0),
            &surface,
            &mut player,
        )
    }

    fn count(reaction: &Reaction, effect: &Effect) -> usize {
        reaction.effects.iter().filter(|e| *e == effect).count()
    }

    #[test]
    fn pinch_out_past_threshold_requests_fullscreen_once() {
        let mut ctl = GestureController::default();
        let reaction = pinch(&mut ctl, 100.0, 160.0, false);
        assert_eq!(count(&reaction, &Effect::EnterFullscreen), 1);
        assert_eq!(toasts(&reaction), vec!["Fullscreen"]);
        assert_eq!(ctl.state(), GestureKind::Idle);

        let small = pinch(&mut ctl, 100.0, 140.0, false);
        assert_eq!(small, Reaction::default());
        assert_eq!(ctl.state(), GestureKind::Idle);
    }

    #[test]
    fn pinch_out_while_fullscreen_is_a_no_op() {
        let mut ctl = GestureController::default();
        assert!(pinch(&mut ctl, 100.0, 200.0, true).effects.is_empty());
    }

    #[test]
    fn pinch_in_exits_only_when_fullscreen() {
        let mut ctl = GestureController::default();
        let reaction = pinch(&mut ctl, 200.0, 100.0, true);
        assert_eq!(count(&reaction, &Effect::ExitFullscreen), 1);
        assert_eq!(toasts(&reaction), vec!["Exit fullscreen"]);
        assert!(pinch(&mut ctl, 200.0, 100.0, false).effects.is_empty());
    }

    #[test]
    fn pinch_with_both_fingers_lifted_together() {
        let mut ctl = GestureController::default();
        let mut player = FakePlayer::at(0.0);
        ctl.touch_start(&down(&[(0.0, 0.0), (30.0, 40.0)], 0.0), &surface(), &player);
        assert_eq!(ctl.state(), GestureKind::Pinching);
        let reaction = ctl.touch_end(
            &up(&[], &[(0.0, 0.0), (90.0, 120.0)], 10.0),
            &surface(),
            &mut player,
        );
        // 50px to 150px.
        assert_eq!(count(&reaction, &Effect::EnterFullscreen), 1);
    }

    #[test]
    fn pinch_with_unknown_end_distance_is_dropped() {
        let mut ctl = GestureController::default();
        let mut player = FakePlayer::at(0.0);
        ctl.touch_start(&down(&[(0.0, 0.0), (200.0, 0.0)], 0.0), &surface(), &player);
        let lift = up(&[], &[(0.0, 0.0)], 10.0);
        let reaction = ctl.touch_end(&lift, &surface(), &mut player);
        assert!(reaction.effects.is_empty());
        assert_eq!(ctl.state(), GestureKind::Idle);
    }

    #[test]
    fn pinch_preempts_swipe_and_leftover_finger_is_not_a_tap() {
        let mut ctl = GestureController::default();
        let mut player = FakePlayer::at(40.0);
        tap(&mut ctl, &mut player, 250.0, 100.0, 0.0);

        ctl.touch_start(&down(&[(250.0, 100.0)], 60.0), &surface(), &player);
        ctl.touch_move(&down(&[(250.0, 40.0)], 70.0), &mut player);
        let volume_after_swipe = player.volume;
        let second_finger = down(&[(250.0, 40.0), (150.0, 40.0)], 80.0);
        let preempt = ctl.touch_start(&second_finger, &surface(), &player);
        assert_eq!(preempt.effects, vec![Effect::HideIndicators]);
        assert_eq!(ctl.state(), GestureKind::Pinching);

        let first_lift = up(&[(250.0, 40.0)], &[(150.0, 40.0)], 90.0);
        ctl.touch_end(&first_lift, &surface(), &mut player);
        let stray = ctl.touch_move(&down(&[(250.0, 0.0)], 100.0), &mut player);
        assert_eq!(stray, Reaction::default());
        let last_lift = up(&[], &[(250.0, 0.0)], 110.0);
        let lifted = ctl.touch_end(&last_lift, &surface(), &mut player);
        assert!(lifted.effects.is_empty());
        assert_eq!(player.time, 40.0);
        assert_eq!(player.volume, volume_after_swipe);
    }

    #[test]
    fn third_finger_lifting_keeps_pinch_alive() {
        let mut ctl = GestureController::default();
        let mut player = FakePlayer::at(0.0);
        ctl.touch_start(&down(&[(0.0, 0.0), (100.0, 0.0)], 0.0), &surface(), &player);
        let reaction = ctl.touch_end(
            &up(&[(0.0, 0.0), (100.0, 0.0)], &[(50.0, 50.0)], 10.0),
            &surface(),
            &mut player,
        );
        assert!(reaction.effects.is_empty());
        assert_eq!(ctl.state(), GestureKind::Pinching);
    }

    #[test]
    fn cancel_clears_gestures_but_keeps_tap_memory() {
        let mut ctl = GestureController::default();
        let mut player = FakePlayer::at(40.0);
        tap(&mut ctl, &mut player, 250.0, 100.0, 0.0);
        ctl.touch_start(&down(&[(20.0, 20.0)], 50.0), &surface(), &player);
        ctl.touch_move(&down(&[(120.0, 20.0)], 60.0), &mut player);
        let reaction = ctl.touch_cancel();
        assert_eq!(reaction.effects, vec![Effect::HideIndicators]);
        assert_eq!(ctl.state(), GestureKind::TapPending);
        assert_eq!(player.time, 40.0);
    }

    #[test]
    fn zones_split_at_configured_ratios() {
        let cfg = GestureConfig::default();
        let b = Bounds {
            left: 100.0,
            top: 0.0,
            width: 300.0,
            height: 100.0,
        };
        assert_eq!(b.zone_at(b.relative(Point::new(150.0, 0.0)).x, &cfg), Zone::Left);
        assert_eq!(b.zone_at(150.0, &cfg), Zone::Center);
        assert_eq!(b.zone_at(250.0, &cfg), Zone::Right);
        let empty = Bounds::default();
        assert_eq!(empty.zone_at(10.0, &cfg), Zone::Center);
    }

    #[test]
    fn custom_seek_step_is_used() {
        let mut ctl = GestureController::new(GestureConfig::default().with_seek_step(5.0));
        let mut player = FakePlayer::at(50.0);
        tap(&mut ctl, &mut player, 280.0, 50.0, 0.0);
        let reaction = tap(&mut ctl, &mut player, 280.0, 50.0, 100.0);
        assert_eq!(player.time, 55.0);
        assert_eq!(toasts(&reaction), vec!["+5s"]);
    }
}
