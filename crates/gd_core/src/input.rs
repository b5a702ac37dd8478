//! Input binding between physical devices and logical game actions.
//!
//! - **Key state:** `InputState` tracks held keys so OS key-repeat does not
//!   produce duplicate transitions, and exposes edge-triggered queries for
//!   system keys (quit, debug toggle, restart).
//!
//! - **Action dispatch:** devices post scalar magnitudes through an
//!   `InputDispatcher`, which maps each `InputSource` to an `Action` and queues
//!   a `ScalarInputEvent`. At the frame boundary the queue is drained into the
//!   handlers registered for each action. Handlers are plain function pointers
//!   over the target type, so every binding is checked at compile time.

use serde::Deserialize;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Left,
    Right,
    Up,
    Down,
    Space,
    Escape,
    F3,
    R,
}

pub struct InputState {
    held: HashSet<Key>,
    just_pressed: HashSet<Key>,
    just_released: HashSet<Key>,
}

impl InputState {
    pub fn new() -> Self {
        Self {
            held: HashSet::new(),
            just_pressed: HashSet::new(),
            just_released: HashSet::new(),
        }
    }

    /// Returns true when this call is a real up-to-down transition.
    pub fn key_down(&mut self, key: Key) -> bool {
        if self.held.insert(key) {
            self.just_pressed.insert(key);
            true
        } else {
            false
        }
    }

    /// Returns true when this call is a real down-to-up transition.
    pub fn key_up(&mut self, key: Key) -> bool {
        if self.held.remove(&key) {
            self.just_released.insert(key);
            true
        } else {
            false
        }
    }

    pub fn is_held(&self, key: Key) -> bool {
        self.held.contains(&key)
    }

    pub fn is_just_pressed(&self, key: Key) -> bool {
        self.just_pressed.contains(&key)
    }

    pub fn is_just_released(&self, key: Key) -> bool {
        self.just_released.contains(&key)
    }

    pub fn end_frame(&mut self) {
        self.just_pressed.clear();
        self.just_released.clear();
    }
}

impl Default for InputState {
    fn default() -> Self {
        Self::new()
    }
}

/// Logical commands understood by the gameplay scene.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    Launch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TiltDirection {
    Up,
    Down,
    Left,
    Right,
}

/// Physical origin of a scalar input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputSource {
    Key(Key),
    Tilt(TiltDirection),
    Touch,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScalarInputEvent {
    pub action: Action,
    pub source: InputSource,
    /// Unit magnitude in [0, 1]. Zero means the input was relaxed.
    pub magnitude: f32,
}

pub type ActionHandler<T> = fn(&mut T, &ScalarInputEvent);

pub struct InputDispatcher<T> {
    source_bindings: HashMap<InputSource, Action>,
    handlers: HashMap<Action, Vec<ActionHandler<T>>>,
    pending: Vec<ScalarInputEvent>,
}

impl<T> InputDispatcher<T> {
    pub fn new() -> Self {
        Self {
            source_bindings: HashMap::new(),
            handlers: HashMap::new(),
            pending: Vec::new(),
        }
    }

    pub fn bind_source(&mut self, source: InputSource, action: Action) {
        if let Some(previous) = self.source_bindings.insert(source, action) {
            if previous != action {
                log::debug!("Rebinding {:?}: {:?} -> {:?}", source, previous, action);
            }
        }
    }

    pub fn bind_action(&mut self, action: Action, handler: ActionHandler<T>) {
        self.handlers.entry(action).or_default().push(handler);
    }

    pub fn action_for(&self, source: InputSource) -> Option<Action> {
        self.source_bindings.get(&source).copied()
    }

    /// Queue an event for `source`. Returns false when the source is unbound.
    pub fn post(&mut self, source: InputSource, magnitude: f32) -> bool {
        let Some(action) = self.action_for(source) else {
            return false;
        };
        let magnitude = if magnitude.is_finite() {
            magnitude.clamp(0.0, 1.0)
        } else {
            0.0
        };
        self.pending.push(ScalarInputEvent {
            action,
            source,
            magnitude,
        });
        true
    }

    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Deliver queued events in arrival order. Returns the number delivered.
    pub fn dispatch(&mut self, target: &mut T) -> usize {
        let events = std::mem::take(&mut self.pending);
        let mut delivered = 0;
        for event in &events {
            match self.handlers.get(&event.action) {
                Some(handlers) => {
                    for handler in handlers {
                        handler(target, event);
                    }
                    delivered += 1;
                }
                None => log::debug!("No handler bound for {:?}", event.action),
            }
        }
        delivered
    }
}

impl<T> Default for InputDispatcher<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Device orientation sample, in degrees away from the resting pose.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TiltReading {
    pub pitch_deg: f32,
    pub roll_deg: f32,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(default)]
pub struct TiltConfig {
    pub dead_zone_deg: f32,
    pub full_scale_deg: f32,
}

impl Default for TiltConfig {
    fn default() -> Self {
        Self {
            dead_zone_deg: 3.0,
            full_scale_deg: 25.0,
        }
    }
}

/// Convert a tilt sample into one `(direction, magnitude)` pair per axis.
///
/// Only the active direction of an axis is reported, so a relaxed axis yields
/// a single zero-magnitude event instead of two conflicting ones.
pub fn tilt_to_scalars(reading: TiltReading, config: &TiltConfig) -> [(TiltDirection, f32); 2] {
    let vertical = if reading.pitch_deg < 0.0 {
        (TiltDirection::Down, tilt_magnitude(-reading.pitch_deg, config))
    } else {
        (TiltDirection::Up, tilt_magnitude(reading.pitch_deg, config))
    };
    let horizontal = if reading.roll_deg < 0.0 {
        (TiltDirection::Left, tilt_magnitude(-reading.roll_deg, config))
    } else {
        (TiltDirection::Right, tilt_magnitude(reading.roll_deg, config))
    };
    [vertical, horizontal]
}

fn tilt_magnitude(angle_deg: f32, config: &TiltConfig) -> f32 {
    let span = config.full_scale_deg - config.dead_zone_deg;
    if angle_deg <= config.dead_zone_deg || span <= 0.0 {
        return 0.0;
    }
    ((angle_deg - config.dead_zone_deg) / span).min(1.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        vertical: f32,
        launches: Vec<f32>,
    }

    fn on_up(target: &mut Recorder, event: &ScalarInputEvent) {
        target.vertical = event.magnitude;
    }

    fn on_down(target: &mut Recorder, event: &ScalarInputEvent) {
        target.vertical = -event.magnitude;
    }

    fn on_launch(target: &mut Recorder, event: &ScalarInputEvent) {
        target.launches.push(event.magnitude);
    }

    fn recorder_dispatcher() -> InputDispatcher<Recorder> {
        let mut dispatcher = InputDispatcher::new();
        dispatcher.bind_source(InputSource::Key(Key::Up), Action::MoveUp);
        dispatcher.bind_source(InputSource::Key(Key::Down), Action::MoveDown);
        dispatcher.bind_source(InputSource::Key(Key::Space), Action::Launch);
        dispatcher.bind_source(InputSource::Touch, Action::Launch);
        dispatcher.bind_action(Action::MoveUp, on_up);
        dispatcher.bind_action(Action::MoveDown, on_down);
        dispatcher.bind_action(Action::Launch, on_launch);
        dispatcher
    }

    #[test]
    fn key_down_reports_transition_once() {
        let mut input = InputState::new();
        assert!(input.key_down(Key::Space));
        assert!(!input.key_down(Key::Space));
        assert!(input.is_held(Key::Space));
        assert!(input.is_just_pressed(Key::Space));
    }

    #[test]
    fn key_up_without_down_is_no_op() {
        let mut input = InputState::new();
        assert!(!input.key_up(Key::Left));
        assert!(!input.is_just_released(Key::Left));
    }

    #[test]
    fn end_frame_clears_edges_but_keeps_held() {
        let mut input = InputState::new();
        input.key_down(Key::F3);
        input.key_down(Key::Up);
        input.key_up(Key::Up);
        input.end_frame();
        assert!(!input.is_just_pressed(Key::F3));
        assert!(!input.is_just_released(Key::Up));
        assert!(input.is_held(Key::F3));
    }

    #[test]
    fn dispatch_routes_events_to_bound_handlers_in_order() {
        let mut dispatcher = recorder_dispatcher();
        let mut target = Recorder::default();

        assert!(dispatcher.post(InputSource::Key(Key::Up), 1.0));
        assert!(dispatcher.post(InputSource::Key(Key::Down), 0.5));
        assert_eq!(dispatcher.pending_len(), 2);

        assert_eq!(dispatcher.dispatch(&mut target), 2);
        assert!((target.vertical + 0.5).abs() < f32::EPSILON);
        assert_eq!(dispatcher.pending_len(), 0);
    }

    #[test]
    fn unbound_source_is_rejected() {
        let mut dispatcher = recorder_dispatcher();
        assert!(!dispatcher.post(InputSource::Key(Key::Escape), 1.0));
        assert!(!dispatcher.post(InputSource::Tilt(TiltDirection::Left), 1.0));
        assert_eq!(dispatcher.pending_len(), 0);
    }

    #[test]
    fn keyboard_and_touch_share_the_launch_action() {
        let mut dispatcher = recorder_dispatcher();
        let mut target = Recorder::default();
        dispatcher.post(InputSource::Key(Key::Space), 1.0);
        dispatcher.post(InputSource::Touch, 0.0);
        dispatcher.dispatch(&mut target);
        assert_eq!(target.launches, vec![1.0, 0.0]);
    }

    #[test]
    fn magnitudes_are_clamped_to_unit_range() {
        let mut dispatcher = recorder_dispatcher();
        let mut target = Recorder::default();
        dispatcher.post(InputSource::Key(Key::Up), 4.0);
        dispatcher.dispatch(&mut target);
        assert!((target.vertical - 1.0).abs() < f32::EPSILON);

        dispatcher.post(InputSource::Key(Key::Up), f32::NAN);
        dispatcher.dispatch(&mut target);
        assert_eq!(target.vertical, 0.0);
    }

    #[test]
    fn action_without_handler_is_not_counted() {
        let mut dispatcher: InputDispatcher<Recorder> = InputDispatcher::new();
        dispatcher.bind_source(InputSource::Key(Key::Left), Action::MoveLeft);
        let mut target = Recorder::default();
        dispatcher.post(InputSource::Key(Key::Left), 1.0);
        assert_eq!(dispatcher.dispatch(&mut target), 0);
    }

    #[test]
    fn tilt_inside_dead_zone_is_zero() {
        let config = TiltConfig::default();
        let [vertical, horizontal] = tilt_to_scalars(
            TiltReading {
                pitch_deg: 2.0,
                roll_deg: -1.0,
            },
            &config,
        );
        assert_eq!(vertical, (TiltDirection::Up, 0.0));
        assert_eq!(horizontal, (TiltDirection::Left, 0.0));
    }

    #[test]
    fn tilt_scales_linearly_and_saturates() {
        let config = TiltConfig {
            dead_zone_deg: 5.0,
            full_scale_deg: 25.0,
        };
        let [vertical, horizontal] = tilt_to_scalars(
            TiltReading {
                pitch_deg: -15.0,
                roll_deg: 60.0,
            },
            &config,
        );
        assert_eq!(vertical.0, TiltDirection::Down);
        assert!((vertical.1 - 0.5).abs() < 1e-6);
        assert_eq!(horizontal, (TiltDirection::Right, 1.0));
    }
}
