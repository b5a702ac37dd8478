//! Default device bindings for the sleigh scene.
//!
//! Physical sources (arrow keys, space, touch/mouse, device tilt) map onto
//! logical actions, and each action has one handler that writes into the
//! simulation: movement sets a thrust component, launch requests a gift box.

use gd_core::input::{
    tilt_to_scalars, Action, InputDispatcher, InputSource, Key, ScalarInputEvent, TiltConfig,
    TiltDirection, TiltReading,
};

use crate::simulation::Simulation;

pub type SceneDispatcher = InputDispatcher<Simulation>;

const SOURCE_BINDINGS: [(InputSource, Action); 10] = [
    (InputSource::Key(Key::Up), Action::MoveUp),
    (InputSource::Key(Key::Down), Action::MoveDown),
    (InputSource::Key(Key::Left), Action::MoveLeft),
    (InputSource::Key(Key::Right), Action::MoveRight),
    (InputSource::Key(Key::Space), Action::Launch),
    (InputSource::Touch, Action::Launch),
    (InputSource::Tilt(TiltDirection::Up), Action::MoveUp),
    (InputSource::Tilt(TiltDirection::Down), Action::MoveDown),
    (InputSource::Tilt(TiltDirection::Left), Action::MoveLeft),
    (InputSource::Tilt(TiltDirection::Right), Action::MoveRight),
];

pub fn scene_dispatcher() -> SceneDispatcher {
    let mut dispatcher = SceneDispatcher::new();
    for (source, action) in SOURCE_BINDINGS {
        dispatcher.bind_source(source, action);
    }
    dispatcher.bind_action(Action::MoveUp, move_up);
    dispatcher.bind_action(Action::MoveDown, move_down);
    dispatcher.bind_action(Action::MoveLeft, move_left);
    dispatcher.bind_action(Action::MoveRight, move_right);
    dispatcher.bind_action(Action::Launch, launch);
    dispatcher
}

/// Queue a key transition: pressed keys post full magnitude, released keys zero.
pub fn post_key(dispatcher: &mut SceneDispatcher, key: Key, pressed: bool) -> bool {
    dispatcher.post(InputSource::Key(key), if pressed { 1.0 } else { 0.0 })
}

/// Queue one event per tilt axis.
pub fn post_tilt(dispatcher: &mut SceneDispatcher, reading: TiltReading, config: &TiltConfig) {
    for (direction, magnitude) in tilt_to_scalars(reading, config) {
        dispatcher.post(InputSource::Tilt(direction), magnitude);
    }
}

fn move_up(sim: &mut Simulation, event: &ScalarInputEvent) {
    sim.sleigh_mut().thrust.y = event.magnitude;
}

fn move_down(sim: &mut Simulation, event: &ScalarInputEvent) {
    sim.sleigh_mut().thrust.y = -event.magnitude;
}

fn move_left(sim: &mut Simulation, event: &ScalarInputEvent) {
    sim.sleigh_mut().thrust.x = -event.magnitude;
}

fn move_right(sim: &mut Simulation, event: &ScalarInputEvent) {
    sim.sleigh_mut().thrust.x = event.magnitude;
}

fn launch(sim: &mut Simulation, event: &ScalarInputEvent) {
    if sim.request_launch(event.magnitude) {
        log::debug!("Gift box launched via {:?}", event.source);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GameConfig;
    use crate::entities::sample_models;
    use gd_core::random::SceneRng;
    use glam::Vec3;

    fn simulation(launch_interval_ms: f64) -> Simulation {
        let mut config = GameConfig::default();
        config.gift_box.launch_interval_ms = launch_interval_ms;
        Simulation::new(config, sample_models(), SceneRng::seeded(11))
    }

    #[test]
    fn arrow_keys_set_and_clear_thrust() {
        let mut sim = simulation(400.0);
        let mut dispatcher = scene_dispatcher();
        post_key(&mut dispatcher, Key::Up, true);
        post_key(&mut dispatcher, Key::Left, true);
        assert_eq!(dispatcher.dispatch(&mut sim), 2);
        assert_eq!(sim.sleigh().thrust, Vec3::new(-1.0, 1.0, 0.0));

        post_key(&mut dispatcher, Key::Up, false);
        post_key(&mut dispatcher, Key::Right, true);
        dispatcher.dispatch(&mut sim);
        assert_eq!(sim.sleigh().thrust, Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn space_and_touch_both_launch() {
        let mut sim = simulation(0.0);
        let mut dispatcher = scene_dispatcher();
        post_key(&mut dispatcher, Key::Space, true);
        post_key(&mut dispatcher, Key::Space, false);
        dispatcher.post(InputSource::Touch, 1.0);
        dispatcher.post(InputSource::Touch, 0.0);
        dispatcher.dispatch(&mut sim);
        assert_eq!(sim.gift_boxes().len(), 2);
    }

    #[test]
    fn held_launch_fires_once() {
        let mut sim = simulation(0.0);
        let mut dispatcher = scene_dispatcher();
        for _ in 0..3 {
            post_key(&mut dispatcher, Key::Space, true);
        }
        dispatcher.dispatch(&mut sim);
        assert_eq!(sim.gift_boxes().len(), 1);
    }

    #[test]
    fn tilt_drives_thrust_proportionally() {
        let mut sim = simulation(400.0);
        let mut dispatcher = scene_dispatcher();
        let config = TiltConfig::default();
        post_tilt(
            &mut dispatcher,
            TiltReading {
                pitch_deg: -14.0,
                roll_deg: 40.0,
            },
            &config,
        );
        dispatcher.dispatch(&mut sim);
        let thrust = sim.sleigh().thrust;
        assert!((thrust.y + 0.5).abs() < 1e-6);
        assert_eq!(thrust.x, 1.0);

        post_tilt(&mut dispatcher, TiltReading::default(), &config);
        dispatcher.dispatch(&mut sim);
        assert_eq!(sim.sleigh().thrust, Vec3::ZERO);
    }

    #[test]
    fn escape_is_not_a_scene_input() {
        let mut dispatcher = scene_dispatcher();
        assert!(!post_key(&mut dispatcher, Key::Escape, true));
        assert_eq!(dispatcher.pending_len(), 0);
    }
}
