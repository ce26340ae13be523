use super::constants::{DUCK_FRICTION, FRAME_RATE, RUN_ACCEL, RUN_REDUCE};
use super::{PhysicsModifiers, approach};
use crate::core::models::input::InputSequence;
use crate::core::models::state::InitialState;

pub(super) fn simulate(
    initial: &InitialState,
    modifiers: &PhysicsModifiers,
    sequence: &InputSequence,
) -> (f64, f64) {
    let mut x = initial.position;
    let mut speed_x = initial.velocity;
    let max = modifiers.max_run_speed();
    let mult = modifiers.friction_mult();
    let brake_step = DUCK_FRICTION / FRAME_RATE;
    let accel_step = RUN_ACCEL / FRAME_RATE * mult;
    let reduce_step = RUN_REDUCE / FRAME_RATE * mult;

    for key in sequence.frame_keys() {
        if modifiers.on_ground && (modifiers.ducking || key.is_down()) {
            speed_x = approach(speed_x, 0.0, brake_step);
        } else {
            let move_x = key.horizontal_direction();
            // Overspeed in the held direction decays slowly; everything else accelerates fast.
            if speed_x.abs() <= max || direction_sign(speed_x) != move_x {
                speed_x = approach(speed_x, max * move_x, accel_step);
            } else {
                speed_x = approach(speed_x, max * move_x, reduce_step);
            }
        }

        x += speed_x / FRAME_RATE;
    }

    (x, speed_x)
}

/// Sign of a velocity, with zero (including `-0.0`) treated as directionless.
#[inline]
fn direction_sign(value: f64) -> f64 {
    if value == 0.0 { 0.0 } else { value.signum() }
}
