//! Energy: the clamped resource that ends the session when it hits zero.

/// Counter clamped to `0..=max`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Energy {
    value: u32,
    max: u32,
}

impl Energy {
    /// Starts full.
    pub fn full(max: u32) -> Self {
        Self { value: max, max }
    }

    pub fn with_value(value: u32, max: u32) -> Self {
        Self {
            value: value.min(max),
            max,
        }
    }

    #[inline]
    pub fn value(&self) -> u32 {
        self.value
    }

    #[inline]
    pub fn max(&self) -> u32 {
        self.max
    }

    /// Add, clamping at max.
    pub fn gain(&mut self, amount: u32) {
        self.value = self.value.saturating_add(amount).min(self.max);
    }

    /// Subtract, flooring at zero.
    pub fn lose(&mut self, amount: u32) {
        self.value = self.value.saturating_sub(amount);
    }

    pub fn is_depleted(&self) -> bool {
        self.value == 0
    }

    /// Fill fraction in `0.0..=1.0` (for the HUD gauge).
    pub fn ratio(&self) -> f64 {
        if self.max == 0 {
            0.0
        } else {
            self.value as f64 / self.max as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gain_clamps_at_max() {
        let mut e = Energy::with_value(90, 100);
        e.gain(25);
        assert_eq!(e.value(), 100);
    }

    #[test]
    fn test_lose_floors_at_zero() {
        let mut e = Energy::with_value(10, 100);
        e.lose(35);
        assert_eq!(e.value(), 0);
        assert!(e.is_depleted());
    }

    #[test]
    fn test_with_value_clamps() {
        assert_eq!(Energy::with_value(500, 100).value(), 100);
        assert!((Energy::with_value(50, 100).ratio() - 0.5).abs() < f64::EPSILON);
    }
}
