//! Population / rent model of a housing market.
//!
//! Population grows logistically toward a carrying capacity but is drained
//! by rent; rent either grows unchecked or, under rent legislation, grows
//! logistically toward a population-dependent ceiling:
//!
//!   P' = P (capacity - P) - R
//!   R' = g R                                    (unchecked)
//!   R' = g R (1 - R / (R0 + a ln P))            (legislated)
//!
//! Units in the reference scenario: P in millions, R in thousands of
//! dollars, t in decades.

use crate::traits::OdeSystem;

/// Floor applied to P before taking `ln(P)` in the legislated rent ceiling.
/// The logarithm is undefined for non-positive population, which transient
/// overshoot can produce; clamping here is a deliberate stabilization of
/// this particular model, not a general solver facility.
pub const POPULATION_FLOOR: f64 = 1e-3;

/// How rent evolves.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RentPolicy {
    /// Unchecked exponential growth, R' = g R.
    Exponential,
    /// Rent legislation: logistic growth toward the ceiling
    /// R0 + a ln(P).
    Legislated {
        /// Baseline rent ceiling R0 (thousands of dollars).
        base_rent: f64,
        /// Sensitivity a of the ceiling to population.
        sensitivity: f64,
    },
}

/// The (P, R) housing-market system. State layout: `[P, R]`.
#[derive(Debug, Clone, Copy)]
pub struct HousingMarket {
    /// Population carrying capacity (millions).
    pub capacity: f64,
    /// Rent growth rate g (per decade).
    pub rent_growth: f64,
    pub policy: RentPolicy,
}

impl HousingMarket {
    /// The reference model without legislation.
    pub fn unchecked() -> Self {
        Self {
            capacity: 10.0,
            rent_growth: 0.5,
            policy: RentPolicy::Exponential,
        }
    }

    /// The reference model with rent legislation.
    pub fn legislated(base_rent: f64, sensitivity: f64) -> Self {
        Self {
            capacity: 10.0,
            rent_growth: 0.5,
            policy: RentPolicy::Legislated {
                base_rent,
                sensitivity,
            },
        }
    }
}

impl OdeSystem<f64> for HousingMarket {
    fn dim(&self) -> usize {
        2
    }

    fn rhs(&self, _t: f64, x: &[f64], out: &mut [f64]) {
        let (p, r) = (x[0], x[1]);
        out[0] = p * (self.capacity - p) - r;
        out[1] = match self.policy {
            RentPolicy::Exponential => self.rent_growth * r,
            RentPolicy::Legislated {
                base_rent,
                sensitivity,
            } => {
                let ceiling = base_rent + sensitivity * p.max(POPULATION_FLOOR).ln();
                self.rent_growth * r * (1.0 - r / ceiling)
            }
        };
    }
}

#[cfg(test)]
mod tests {
    use super::{HousingMarket, RentPolicy};
    use crate::adaptive::DormandPrince;
    use crate::traits::OdeSystem;

    #[test]
    fn unchecked_rent_grows_exponentially() {
        let solver = DormandPrince::default();
        let solution = solver
            .solve(&HousingMarket::unchecked(), (0.0, 4.0), &[5.0, 2.5], None)
            .unwrap();
        let r_final = solution.trajectory.last_state()[1];
        let expected = 2.5 * (0.5f64 * 4.0).exp();
        assert!(
            (r_final - expected).abs() < 1e-3,
            "expected R(4) ~ {expected}, got {r_final}"
        );
    }

    #[test]
    fn log_guard_keeps_rent_rate_finite_for_collapsed_population() {
        let market = HousingMarket::legislated(2.5, 0.5);
        let mut out = [0.0; 2];
        for &p in &[0.0, -1.0, 1e-9] {
            market.rhs(0.0, &[p, 3.0], &mut out);
            assert!(out[1].is_finite(), "rent rate not finite at P = {p}");
        }
    }

    #[test]
    fn legislated_rent_respects_its_ceiling_at_capacity() {
        // At the ceiling R = R0 + a ln(P) the rent rate vanishes.
        let market = HousingMarket::legislated(2.5, 0.5);
        let p = 5.0f64;
        let ceiling = 2.5 + 0.5 * p.ln();
        let mut out = [0.0; 2];
        market.rhs(0.0, &[p, ceiling], &mut out);
        assert!(out[1].abs() < 1e-12);
    }

    #[test]
    fn policy_selects_the_rent_equation() {
        let mut out_a = [0.0; 2];
        let mut out_b = [0.0; 2];
        HousingMarket::unchecked().rhs(0.0, &[5.0, 2.5], &mut out_a);
        HousingMarket::legislated(2.5, 0.5).rhs(0.0, &[5.0, 2.5], &mut out_b);
        assert_eq!(out_a[0], out_b[0]);
        assert!(out_a[1] != out_b[1]);
        assert!(matches!(
            HousingMarket::legislated(2.5, 0.5).policy,
            RentPolicy::Legislated { .. }
        ));
    }
}
