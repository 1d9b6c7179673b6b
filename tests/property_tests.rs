use hedging_engine::core::bond::Bond;
use hedging_engine::core::curve::YieldCurve;
use hedging_engine::core::liability::Liability;
use hedging_engine::optimization::cashflow::build_coverage_grid;
use hedging_engine::optimization::{
    build_initial_portfolio, cash_flow_matching, duration_matching, CoverageTarget,
    HedgingOptimizer, OptimizerConfig,
};
use hedging_engine::pricing::cashflows::cashflows;
use hedging_engine::pricing::valuation::{bond_present_value, liability_present_value};
use proptest::prelude::*;

/// Generate an upward-sloping curve with positive rates on 2..8 pillars.
fn arb_curve() -> impl Strategy<Value = YieldCurve> {
    (
        0.001f64..0.05,
        prop::collection::vec((0.25f64..5.0, 0.0f64..0.005), 1..8),
    )
        .prop_map(|(short_rate, steps)| {
            let mut times = vec![0.5];
            let mut rates = vec![short_rate];
            for (dt, dr) in steps {
                times.push(times[times.len() - 1] + dt);
                rates.push(rates[rates.len() - 1] + dr);
            }
            YieldCurve::new(times, rates).unwrap()
        })
}

/// Generate a bond with a maturity of up to 30 years, possibly fractional.
fn arb_bond() -> impl Strategy<Value = Bond> {
    (0.25f64..30.0, 0.0f64..0.1, 100.0f64..10_000.0)
        .prop_map(|(maturity, coupon, face)| Bond::new(maturity, coupon, face).unwrap())
}

/// Generate a whole-year bond of 1..=10 years.
fn arb_whole_year_bond() -> impl Strategy<Value = Bond> {
    (1u32..=10, 0.0f64..0.08)
        .prop_map(|(years, coupon)| Bond::new(f64::from(years), coupon, 1000.0).unwrap())
}

/// Generate 1..5 liabilities on whole years within 10 years.
fn arb_liabilities() -> impl Strategy<Value = Vec<Liability>> {
    prop::collection::vec((1u32..=10, 10_000.0f64..5_000_000.0), 1..5).prop_map(|items| {
        items
            .into_iter()
            .map(|(year, amount)| Liability::new(f64::from(year), amount).unwrap())
            .collect()
    })
}

proptest! {
    // ===================================================================
    // INVARIANT 1: Discount factors start at one and fall with time.
    //
    // For positive, non-decreasing rates r(t)·t is strictly increasing,
    // so exp(-r(t)·t) is strictly decreasing and equals 1 at t = 0.
    // ===================================================================
    #[test]
    fn discount_factor_decreasing(curve in arb_curve(), t in 0.0f64..40.0, dt in 0.01f64..10.0) {
        prop_assert_eq!(curve.discount_factor(0.0), 1.0);
        let near = curve.discount_factor(t);
        let far = curve.discount_factor(t + dt);
        prop_assert!(near > 0.0 && near <= 1.0);
        prop_assert!(far < near, "DF({}) = {} must be below DF({}) = {}", t + dt, far, t, near);
    }

    // ===================================================================
    // INVARIANT 2: Parallel shifts compose additively.
    //
    // Shifting by a then b gives the same rates as shifting by a + b, and
    // the original curve is never modified.
    // ===================================================================
    #[test]
    fn parallel_shifts_are_additive(
        curve in arb_curve(),
        a in -0.02f64..0.02,
        b in -0.02f64..0.02,
        t in 0.0f64..40.0,
    ) {
        let before = curve.rate(t);
        let stepwise = curve.shift_parallel(a).shift_parallel(b);
        let direct = curve.shift_parallel(a + b);
        prop_assert!((stepwise.rate(t) - direct.rate(t)).abs() < 1e-12);
        prop_assert!((direct.rate(t) - (before + a + b)).abs() < 1e-12);
        prop_assert_eq!(curve.rate(t), before);
        prop_assert_eq!(stepwise.times(), curve.times());
    }

    // ===================================================================
    // INVARIANT 3: One principal repayment, at maturity, nothing after.
    //
    // The last payment falls exactly on the maturity date and is the only
    // one carrying the face value.
    // ===================================================================
    #[test]
    fn principal_paid_once_at_maturity(bond in arb_bond()) {
        let schedule: Vec<_> = cashflows(&bond).collect();
        let last = schedule.last().copied().unwrap();
        prop_assert_eq!(last.time, bond.maturity_years());
        prop_assert!(last.amount >= bond.face_value());
        prop_assert!(schedule.iter().all(|cf| cf.time <= bond.maturity_years()));
        prop_assert!(schedule.windows(2).all(|w| w[0].time < w[1].time));
        let at_or_above_face = schedule.iter().filter(|cf| cf.amount >= bond.face_value()).count();
        // Coupons alone never reach face value for coupon rates below 100%.
        prop_assert_eq!(at_or_above_face, 1);
    }

    // ===================================================================
    // INVARIANT 4: Whole-year bonds pay every coupon plus principal.
    //
    // Total cash over the life equals face + years × annual coupon.
    // ===================================================================
    #[test]
    fn coupon_conservation(bond in arb_whole_year_bond()) {
        let total: f64 = cashflows(&bond).map(|cf| cf.amount).sum();
        let expected = bond.face_value() + bond.maturity_years() * bond.annual_coupon();
        prop_assert!((total - expected).abs() < 1e-9 * expected);
        prop_assert_eq!(cashflows(&bond).len(), bond.maturity_years() as usize);
    }

    // ===================================================================
    // INVARIANT 5: Higher rates mean lower value.
    //
    // A +100bp parallel shift strictly lowers the PV of any bond and of
    // any liability schedule.
    // ===================================================================
    #[test]
    fn value_falls_when_rates_rise(
        bond in arb_bond(),
        liabilities in arb_liabilities(),
        curve in arb_curve(),
    ) {
        let up = curve.shift_parallel(0.01);
        prop_assert!(bond_present_value(&bond, &up) < bond_present_value(&bond, &curve));
        prop_assert!(
            liability_present_value(&liabilities, &up) < liability_present_value(&liabilities, &curve)
        );
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    // ===================================================================
    // INVARIANT 6: The bucketing baseline prices to the liabilities.
    // ===================================================================
    #[test]
    fn initial_portfolio_value_matches(
        liabilities in arb_liabilities(),
        bonds in prop::collection::vec(arb_bond(), 1..6),
        curve in arb_curve(),
    ) {
        let result = build_initial_portfolio(&liabilities, &bonds, &curve);
        prop_assert!(result.success);
        prop_assert!(result.quantities.iter().all(|q| *q >= 0.0));
        prop_assert!(
            (result.portfolio_pv - result.liability_pv).abs() <= 1e-9 * result.liability_pv
        );
    }

    // ===================================================================
    // INVARIANT 7: A successful duration match meets both targets.
    //
    // PV within 1e-4 relative, duration within 0.01 years, no shorts.
    // Failures are allowed (the target may be out of reach) but must
    // leave the portfolio metrics zeroed.
    // ===================================================================
    #[test]
    fn duration_match_meets_tolerances(
        liabilities in arb_liabilities(),
        bonds in prop::collection::vec(arb_whole_year_bond(), 2..6),
        curve in arb_curve(),
    ) {
        let result = duration_matching(&liabilities, &bonds, &curve).unwrap();
        if result.success {
            prop_assert!(result.quantities.iter().all(|q| *q >= 0.0));
            prop_assert!(
                (result.portfolio_pv - result.liability_pv).abs() <= 1e-4 * result.liability_pv
            );
            prop_assert!((result.portfolio_duration - result.liability_duration).abs() <= 1e-2);
        } else {
            prop_assert_eq!(result.portfolio_pv, 0.0);
            prop_assert!(result.bond_allocations.is_empty());
        }
    }

    // ===================================================================
    // INVARIANT 8: A successful cash-flow match covers every date.
    //
    // A x ≥ b − ε on the coverage grid, for both coverage targets, and the
    // reported cost is the curve value of the portfolio.
    // ===================================================================
    #[test]
    fn cash_flow_match_covers_requirements(
        liabilities in arb_liabilities(),
        bonds in prop::collection::vec(arb_whole_year_bond(), 1..6),
        curve in arb_curve(),
        per_date in any::<bool>(),
    ) {
        let target = if per_date {
            CoverageTarget::PerDate
        } else {
            CoverageTarget::AggregateLiabilities
        };
        let config = OptimizerConfig { coverage_target: target, ..Default::default() };
        let result = HedgingOptimizer::new(&liabilities, &bonds, &curve)
            .with_config(config)
            .cash_flow_matching();

        if result.success {
            let grid = build_coverage_grid(&liabilities, &bonds, target);
            let scale = grid.required.iter().fold(1.0f64, |a, b| a.max(*b));
            prop_assert!(grid.max_shortfall(&result.quantities) <= 1e-6 * scale);
            prop_assert!(result.quantities.iter().all(|q| *q >= 0.0));
            let cost = result.total_cost.unwrap();
            prop_assert!((cost - result.portfolio_pv).abs() <= 1e-6 * cost.max(1.0));
        } else {
            prop_assert_eq!(result.total_cost, Some(0.0));
        }
    }

    // ===================================================================
    // INVARIANT 9: The default free functions agree with the facade.
    // ===================================================================
    #[test]
    fn free_functions_use_default_config(
        liabilities in arb_liabilities(),
        bonds in prop::collection::vec(arb_whole_year_bond(), 1..4),
        curve in arb_curve(),
    ) {
        let facade = HedgingOptimizer::new(&liabilities, &bonds, &curve).cash_flow_matching();
        let free = cash_flow_matching(&liabilities, &bonds, &curve);
        prop_assert_eq!(facade.success, free.success);
        prop_assert_eq!(facade.quantities, free.quantities);
    }
}
