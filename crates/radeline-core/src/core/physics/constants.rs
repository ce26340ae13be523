// Values from Celeste's Player class; rates are per second unless noted.

pub const FRAME_RATE: f64 = 60.0;
pub const OUTPUT_DECIMALS: usize = 10;

pub const MAX_RUN: f64 = 90.0;
pub const HOLDING_MAX_RUN: f64 = 70.0;
pub const RUN_ACCEL: f64 = 1000.0;
pub const RUN_REDUCE: f64 = 400.0;
pub const DUCK_FRICTION: f64 = 500.0;
pub const AIR_MULT: f64 = 0.65;
pub const COLD_CORE_FRICTION_MULT: f64 = 0.3;
pub const SPACE_PHYSICS_MULT: f64 = 0.6;

pub const GRAVITY: f64 = 900.0;
pub const HALF_GRAV_THRESHOLD: f64 = 40.0;
pub const MAX_FALL: f64 = 160.0;
pub const FAST_MAX_FALL: f64 = 240.0;
pub const FAST_MAX_ACCEL: f64 = 300.0;
