use super::constants::{FAST_MAX_ACCEL, FRAME_RATE, GRAVITY, HALF_GRAV_THRESHOLD, SPACE_PHYSICS_MULT};
use super::{PhysicsModifiers, approach};
use crate::core::models::input::InputSequence;
use crate::core::models::state::InitialState;

pub(super) fn simulate(
    initial: &InitialState,
    modifiers: &PhysicsModifiers,
    sequence: &InputSequence,
) -> (f64, f64) {
    let mut y = initial.position;
    let mut speed_y = initial.velocity;
    let mut max_fall = modifiers.max_fall;
    let mut jump_timer = i64::from(modifiers.jump_timer);
    let normal_max_fall = modifiers.normal_max_fall();
    let fast_max_fall = modifiers.fast_max_fall();

    for key in sequence.frame_keys() {
        let fast_falling = key.is_down() && speed_y >= normal_max_fall;
        let fall_target = if fast_falling {
            fast_max_fall
        } else {
            normal_max_fall
        };
        max_fall = approach(max_fall, fall_target, FAST_MAX_ACCEL / FRAME_RATE);

        let jump_held = key.is_jump() || modifiers.auto_jump;
        let mut mult = if speed_y.abs() <= HALF_GRAV_THRESHOLD && jump_held {
            0.5
        } else {
            1.0
        };
        if modifiers.in_space {
            mult *= SPACE_PHYSICS_MULT;
        }
        speed_y = approach(speed_y, max_fall, (GRAVITY * mult) / FRAME_RATE);

        if jump_timer > 0 {
            if jump_held {
                speed_y = speed_y.min(initial.velocity);
            } else {
                jump_timer = 0;
            }
        }
        jump_timer -= 1;

        y += speed_y / FRAME_RATE;
    }

    (y, speed_y)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::input::{InputRun, KeySymbol};

    fn run(initial: InitialState, modifiers: PhysicsModifiers, runs: Vec<InputRun>) -> (f64, f64) {
        simulate(&initial, &modifiers, &InputSequence::new(runs))
    }

    #[test]
    fn falling_converges_to_normal_max_fall() {
        let (_, speed) = run(
            InitialState::new(0.0, 0.0),
            PhysicsModifiers::default(),
            vec![InputRun::new(60, KeySymbol::None)],
        );
        assert_eq!(speed, 160.0);
    }

    #[test]
    fn holding_down_at_max_fall_raises_the_cap() {
        let (_, speed) = run(
            InitialState::new(0.0, 160.0),
            PhysicsModifiers::default(),
            vec![InputRun::new(60, KeySymbol::Down)],
        );
        assert_eq!(speed, 240.0);
    }

    #[test]
    fn down_below_threshold_has_no_effect() {
        let modifiers = PhysicsModifiers::default();
        let initial = InitialState::new(0.0, 0.0);
        let neutral = run(initial, modifiers, vec![InputRun::new(5, KeySymbol::None)]);
        let down = run(initial, modifiers, vec![InputRun::new(5, KeySymbol::Down)]);
        assert_eq!(neutral, down);
    }

    #[test]
    fn jump_near_apex_halves_gravity() {
        let (_, speed) = run(
            InitialState::new(0.0, -10.0),
            PhysicsModifiers::default(),
            vec![InputRun::new(1, KeySymbol::Jump)],
        );
        assert_eq!(speed, approach(-10.0, 160.0, (GRAVITY * 0.5) / FRAME_RATE));
    }

    #[test]
    fn jump_timer_holds_launch_velocity_while_jump_is_held() {
        let modifiers = PhysicsModifiers {
            jump_timer: 3,
            ..PhysicsModifiers::default()
        };
        let (_, speed) = run(
            InitialState::new(0.0, -105.0),
            modifiers,
            vec![InputRun::new(3, KeySymbol::Jump)],
        );
        assert_eq!(speed, -105.0);
    }

    #[test]
    fn releasing_jump_cancels_the_timer() {
        let modifiers = PhysicsModifiers {
            jump_timer: 5,
            ..PhysicsModifiers::default()
        };
        let released = run(
            InitialState::new(0.0, -105.0),
            modifiers,
            vec![InputRun::new(1, KeySymbol::None), InputRun::new(2, KeySymbol::Jump)],
        );
        let held = run(
            InitialState::new(0.0, -105.0),
            modifiers,
            vec![InputRun::new(3, KeySymbol::Jump)],
        );
        assert!(released.1 > held.1);
    }

    #[test]
    fn auto_jump_behaves_like_holding_jump() {
        let modifiers = PhysicsModifiers {
            auto_jump: true,
            jump_timer: 4,
            ..PhysicsModifiers::default()
        };
        let neutral = run(InitialState::new(3.0, -80.0), modifiers, vec![InputRun::new(6, KeySymbol::None)]);
        let jump = run(InitialState::new(3.0, -80.0), modifiers, vec![InputRun::new(6, KeySymbol::Jump)]);
        assert_eq!(neutral, jump);
    }

    #[test]
    fn space_scales_fall_speed() {
        let modifiers = PhysicsModifiers {
            in_space: true,
            ..PhysicsModifiers::default()
        };
        let (_, speed) = run(
            InitialState::new(0.0, 0.0),
            modifiers,
            vec![InputRun::new(120, KeySymbol::None)],
        );
        assert_eq!(speed, 96.0);
    }
}
