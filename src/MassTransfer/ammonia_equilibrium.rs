//! # Ammonia/ammonium equilibrium
//!
//! In water total ammonia nitrogen is split between the ammonium ion NH4+ and free
//! ammonia NH3. Only the free form can leave the liquid through a gas film or a
//! hydrophobic membrane. The split is given by the Henderson-Hasselbalch relation
//!
//! fraction(NH3) = 1 / (1 + 10^(pKa - pH))
//!
//! with pKa = 9.25 for ammonia at 25 °C. At pH = pKa half of the ammonia is free.
//! The expression is evaluated as is for every real pH: far below pKa the power
//! overflows to infinity and the fraction goes to 0, far above it the fraction goes to 1.
use nalgebra::DVector;

/// pKa of the NH4+/NH3 couple
pub const PKA_NH3: f64 = 9.25;

/// Free-ammonia fraction at the given pH for an arbitrary pKa
#[allow(non_snake_case)]
pub fn nh3_fraction(pH: f64, pKa: f64) -> f64 {
    1.0 / (1.0 + 10f64.powf(pKa - pH))
}

/// Free-ammonia fraction with the ammonia pKa
#[allow(non_snake_case)]
pub fn nh3_fraction_default(pH: f64) -> f64 {
    nh3_fraction(pH, PKA_NH3)
}

/// Part of every measured concentration that is in free form. One pH for the whole series.
#[allow(non_snake_case)]
pub fn available_ammonia(total_ammonia: &DVector<f64>, pH: f64) -> DVector<f64> {
    total_ammonia * nh3_fraction_default(pH)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_half_fraction_at_pka() {
        assert_eq!(nh3_fraction(PKA_NH3, PKA_NH3), 0.5);
        for pka in [-3.0, 0.0, 4.75, 9.25, 14.0, 120.5] {
            assert_eq!(nh3_fraction(pka, pka), 0.5);
        }
    }

    #[test]
    fn test_fraction_is_monotonic_in_ph() {
        let mut previous = nh3_fraction_default(-20.0);
        let mut ph = -20.0;
        while ph < 40.0 {
            ph += 0.05;
            let current = nh3_fraction_default(ph);
            assert!(current >= previous, "fraction decreased at pH {}", ph);
            previous = current;
        }
    }

    #[test]
    fn test_fraction_at_default_ph() {
        let expected = 1.0 / (1.0 + 10f64.powf(1.75));
        assert_eq!(nh3_fraction_default(7.5), expected);
        assert_relative_eq!(nh3_fraction_default(7.5), 0.0174721, epsilon = 1e-6);
    }

    #[test]
    fn test_extreme_ph_values() {
        // 10^400 overflows to infinity, 1/inf is 0
        assert_eq!(nh3_fraction_default(-400.0), 0.0);
        assert_eq!(nh3_fraction_default(400.0), 1.0);
        let f = nh3_fraction_default(f64::MAX);
        assert_eq!(f, 1.0);
    }

    #[test]
    fn test_available_ammonia() {
        let total = DVector::from_vec(vec![0.0, 1.0, 2.0, 10.0]);
        let available = available_ammonia(&total, 11.0);
        let f = nh3_fraction_default(11.0);
        assert_eq!(available.len(), 4);
        assert_eq!(available[0], 0.0);
        assert_eq!(available[1], f);
        assert_relative_eq!(available[3], 10.0 * f, epsilon = 1e-14);
        assert!(available[3] < 10.0);
    }
}
