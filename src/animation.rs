//! Bounded back-and-forth motion.
//!
//! [`Oscillator`] is the per-frame counter that drives the sliding square: it
//! moves a fixed step every tick and reflects at `±bound`.

/// Travel direction along the oscillation axis.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Direction {
    Positive,
    Negative,
}

impl Direction {
    fn sign(self) -> f32 {
        match self {
            Direction::Positive => 1.0,
            Direction::Negative => -1.0,
        }
    }
}

/// A position that moves `step` units per tick and reverses at `±bound`.
///
/// The position never leaves `[-bound, bound]`: a step that would overshoot is
/// clamped to the bound and the direction flips on the same tick.
#[derive(Clone, Debug, PartialEq)]
pub struct Oscillator {
    position: f32,
    direction: Direction,
    step: f32,
    bound: f32,
}

impl Oscillator {
    /// NaN inputs are treated as zero.
    pub fn new(start: f32, step: f32, bound: f32) -> Self {
        let or_zero = |v: f32| if v.is_nan() { 0.0 } else { v };
        let bound = or_zero(bound).abs();
        Self {
            position: or_zero(start).clamp(-bound, bound),
            direction: Direction::Positive,
            step: or_zero(step).abs(),
            bound,
        }
    }

    /// Advance by one step and return the new position.
    pub fn tick(&mut self) -> f32 {
        let next = self.position + self.direction.sign() * self.step;
        if next >= self.bound {
            self.position = self.bound;
            self.direction = Direction::Negative;
        } else if next <= -self.bound {
            self.position = -self.bound;
            self.direction = Direction::Positive;
        } else {
            self.position = next;
        }
        self.position
    }

    pub fn position(&self) -> f32 {
        self.position
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn bound(&self) -> f32 {
        self.bound
    }
}

impl Default for Oscillator {
    fn default() -> Self {
        Self::new(0.0, 1.0, 50.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reverses_exactly_at_upper_bound() {
        let mut osc = Oscillator::default();
        for _ in 0..49 {
            osc.tick();
        }
        assert_eq!(osc.position(), 49.0);
        assert_eq!(osc.direction(), Direction::Positive);

        assert_eq!(osc.tick(), 50.0);
        assert_eq!(osc.direction(), Direction::Negative);
        assert_eq!(osc.tick(), 49.0);
    }

    #[test]
    fn reverses_exactly_at_lower_bound() {
        let mut osc = Oscillator::default();
        for _ in 0..148 {
            osc.tick();
        }
        assert_eq!(osc.position(), -48.0);
        assert_eq!(osc.direction(), Direction::Negative);
        assert_eq!(osc.tick(), -49.0);
        assert_eq!(osc.tick(), -50.0);
        assert_eq!(osc.direction(), Direction::Positive);
        assert_eq!(osc.tick(), -49.0);
    }

    #[test]
    fn overshooting_step_is_clamped() {
        let mut osc = Oscillator::new(45.0, 7.0, 50.0);
        assert_eq!(osc.tick(), 50.0);
        assert_eq!(osc.tick(), 43.0);
    }

    #[test]
    fn start_outside_bounds_is_clamped() {
        assert_eq!(Oscillator::new(120.0, 1.0, 50.0).position(), 50.0);
        assert_eq!(Oscillator::new(-120.0, 1.0, -50.0).position(), -50.0);
    }

    #[test]
    fn zero_bound_pins_position() {
        let mut osc = Oscillator::new(3.0, 1.0, 0.0);
        assert_eq!(osc.position(), 0.0);
        assert_eq!(osc.tick(), 0.0);
        assert_eq!(osc.direction(), Direction::Negative);
        assert_eq!(osc.tick(), 0.0);
        assert_eq!(osc.direction(), Direction::Positive);
    }

    #[test]
    fn full_period_returns_to_start() {
        let mut osc = Oscillator::default();
        // 50 up, 100 down, 50 up
        for _ in 0..200 {
            let x = osc.tick();
            assert!((-50.0..=50.0).contains(&x));
        }
        assert_eq!(osc.position(), 0.0);
        assert_eq!(osc.direction(), Direction::Positive);
    }

    #[test]
    fn nan_parameters_do_not_panic() {
        let mut osc = Oscillator::new(f32::NAN, f32::NAN, f32::NAN);
        assert_eq!(osc.position(), 0.0);
        assert_eq!(osc.bound(), 0.0);
        assert_eq!(osc.tick(), 0.0);

        let mut osc = Oscillator::new(0.0, 1.0, f32::INFINITY);
        assert_eq!(osc.tick(), 1.0);
    }
}
