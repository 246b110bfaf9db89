//! Combat resolution constants - all tunable values in one place

/// Stand-in for a combat value of exactly zero
///
/// Keeps survivor ratios finite while still leaving the side effectively powerless.
pub const ZERO_VALUE_FLOOR: f64 = 0.5;

/// Share of its losses a winning side recovers after the battle
pub const WINNER_RECOVERY_DIVISOR: f64 = 3.0;

/// Tolerance subtracted before rounding casualties up
///
/// Absorbs floating point noise such as 2.0000000000000004 so it does not cost a whole unit.
pub const CASUALTY_EPSILON: f64 = 1e-9;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floor_is_below_any_real_value() {
        assert!(ZERO_VALUE_FLOOR > 0.0 && ZERO_VALUE_FLOOR < 1.0);
    }

    #[test]
    fn test_epsilon_is_tiny() {
        assert!(CASUALTY_EPSILON > 0.0 && CASUALTY_EPSILON < 1e-6);
    }
}
