use super::input::InputSequence;

#[derive(Debug, Clone, PartialEq)]
pub struct SimulationResult {
    pub position: f64,
    pub velocity: f64,
    pub sequence: InputSequence,
}

impl SimulationResult {
    pub fn new(position: f64, velocity: f64, sequence: InputSequence) -> Self {
        Self {
            position,
            velocity,
            sequence,
        }
    }

    /// Distance between the final velocity and the goal velocity.
    #[inline]
    pub fn velocity_error(&self, goal_velocity: f64) -> f64 {
        (self.velocity - goal_velocity).abs()
    }
}
