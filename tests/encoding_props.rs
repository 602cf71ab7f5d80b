//! Property tests for the encoder and geometry functions

use proptest::prelude::*;

use basinsearch::core::encoding::BasinEncoder;
use basinsearch::core::geometry::{
    DEFAULT_EPS, basin_distance, fisher_rao_distance, measure_kappa, measure_phi,
};

fn norm(v: &[f32]) -> f64 {
    v.iter().map(|x| f64::from(*x) * f64::from(*x)).sum::<f64>().sqrt()
}

proptest! {
    #[test]
    fn encoded_norm_is_unit_or_zero(text in ".{0,200}") {
        let basin = BasinEncoder::default().encode(&text);
        let n = norm(&basin);
        prop_assert!(n < 1e-9 || (n - 1.0).abs() < 1e-5, "norm was {n}");
    }

    #[test]
    fn distance_is_symmetric(a in "[a-z ]{0,60}", b in "[a-z ]{0,60}") {
        let encoder = BasinEncoder::default();
        let va = encoder.encode(&a);
        let vb = encoder.encode(&b);
        let dab = basin_distance(&va, &vb);
        let dba = basin_distance(&vb, &va);
        if dab.is_finite() {
            prop_assert!((dab - dba).abs() < 1e-9);
            prop_assert!(dab >= 0.0);
        } else {
            prop_assert!(dba.is_infinite());
        }
    }

    #[test]
    fn fisher_rao_is_symmetric(a in "[a-z ]{1,60}", b in "[a-z ]{1,60}") {
        let encoder = BasinEncoder::default();
        let va = encoder.encode(&a);
        let vb = encoder.encode(&b);
        let dab = fisher_rao_distance(&va, &vb, DEFAULT_EPS).unwrap();
        let dba = fisher_rao_distance(&vb, &va, DEFAULT_EPS).unwrap();
        prop_assert!(dab >= 0.0);
        prop_assert!((dab - dba).abs() < 1e-9);
    }

    #[test]
    fn phi_stays_in_unit_interval(text in ".{0,200}") {
        let basin = BasinEncoder::default().encode(&text);
        let phi = measure_phi(&basin, DEFAULT_EPS);
        prop_assert!((0.0..=1.0).contains(&phi));
    }

    #[test]
    fn kappa_is_non_negative_and_finite(text in ".{0,200}") {
        let basin = BasinEncoder::default().encode(&text);
        let kappa = measure_kappa(&basin);
        prop_assert!(kappa >= 0.0);
        prop_assert!(kappa.is_finite());
    }
}
