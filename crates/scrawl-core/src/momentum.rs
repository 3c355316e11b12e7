//! Inertial auto-scroll driven by drawing near the leading edge of the view.

/// Below this the scroller snaps to rest.
const REST_VELOCITY: f64 = 1e-3;

/// Scalar velocity accumulator for one scroll axis.
#[derive(Debug, Clone)]
pub struct MomentumScroller {
    velocity: f64,
    remainder: f64,
    decay: f64,
    sensitivity: f64,
}

impl MomentumScroller {
    pub fn new(decay: f64, sensitivity: f64) -> Self {
        Self {
            velocity: 0.0,
            remainder: 0.0,
            decay,
            sensitivity,
        }
    }

    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    pub fn is_idle(&self) -> bool {
        self.velocity == 0.0
    }

    /// Feed one drawing move.
    ///
    /// `position` is the pointer's offset into the viewport along the axis,
    /// `extent` the viewport length, `delta` the signed movement. Only moves
    /// in the half of the viewport ahead of the movement add velocity.
    pub fn feed(&mut self, position: f64, extent: f64, delta: f64) {
        if extent <= 0.0 || delta == 0.0 {
            return;
        }
        let relative = (position / extent).clamp(0.0, 1.0);
        let feedback = if delta > 0.0 { relative } else { 1.0 - relative };
        if feedback < 0.5 {
            return;
        }
        self.velocity += delta.signum() * (feedback - 0.5) * delta.abs() * self.sensitivity;
    }

    /// Set the velocity directly.
    pub fn kick(&mut self, velocity: f64) {
        self.velocity = velocity;
    }

    /// Stop immediately, dropping any sub-unit remainder.
    pub fn stop(&mut self) {
        self.velocity = 0.0;
        self.remainder = 0.0;
    }

    /// Advance one fixed-rate frame and return the whole units to scroll.
    ///
    /// The fractional part carries over to the next frame.
    pub fn tick(&mut self) -> i64 {
        if self.is_idle() {
            return 0;
        }
        let total = self.remainder + self.velocity;
        let whole = total.trunc();
        self.remainder = total - whole;
        self.velocity *= self.decay;
        if self.velocity.abs() < REST_VELOCITY {
            self.velocity = 0.0;
        }
        whole as i64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trailing_half_adds_nothing() {
        let mut scroller = MomentumScroller::new(0.9, 1.0);
        scroller.feed(100.0, 800.0, 10.0);
        scroller.feed(700.0, 800.0, -10.0);
        assert!(scroller.is_idle());
    }

    #[test]
    fn test_leading_half_adds_signed_velocity() {
        let mut scroller = MomentumScroller::new(0.9, 1.0);
        scroller.feed(600.0, 800.0, 10.0);
        assert!((scroller.velocity() - 2.5).abs() < 1e-12);

        let mut backwards = MomentumScroller::new(0.9, 1.0);
        backwards.feed(200.0, 800.0, -10.0);
        assert!((backwards.velocity() + 2.5).abs() < 1e-12);
    }

    #[test]
    fn test_decay_reaches_below_one() {
        let v0: f64 = 100.0;
        let r: f64 = 0.9;
        let expected = ((1.0 / v0).ln() / r.ln()).ceil() as usize;
        let mut scroller = MomentumScroller::new(r, 1.0);
        scroller.kick(v0);

        for _ in 0..expected - 1 {
            scroller.tick();
        }
        assert!(scroller.velocity().abs() >= 1.0);
        scroller.tick();
        assert!(scroller.velocity().abs() < 1.0);
    }

    #[test]
    fn test_never_reverses_sign() {
        let mut scroller = MomentumScroller::new(0.8, 1.0);
        scroller.kick(-37.5);
        for _ in 0..500 {
            let step = scroller.tick();
            assert!(step <= 0);
            assert!(scroller.velocity() <= 0.0);
        }
        assert!(scroller.is_idle());
    }

    #[test]
    fn test_remainder_carries() {
        let mut scroller = MomentumScroller::new(0.999_999, 1.0);
        scroller.kick(0.5);
        let first = scroller.tick();
        let second = scroller.tick();
        assert_eq!(first, 0);
        assert_eq!(second, 0);
        assert_eq!(scroller.tick(), 1);
    }
}
