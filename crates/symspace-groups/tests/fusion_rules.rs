use proptest::prelude::*;
use symspace_core::{SectorArray, SymError};
use symspace_groups::{
    fermion_parity, no_symmetry, su2_symmetry, u1_symmetry, z2_symmetry, z4_symmetry,
    FusionStyle, SectorCount, Symmetry,
};

fn rows(array: &SectorArray) -> Vec<Vec<i64>> {
    array.to_rows()
}

#[test]
fn zn_fuses_modulo_order() {
    let z4 = z4_symmetry();
    let out = z4.fusion_outcomes(&[2], &[3]).unwrap();
    assert_eq!(rows(&out), vec![vec![1]]);
    assert_eq!(z4.dual_sector(&[1]), vec![3]);
    assert_eq!(z4.dual_sector(&[0]), vec![0]);
}

#[test]
fn su2_fusion_range() {
    let su2 = su2_symmetry();
    let out = su2.fusion_outcomes(&[2], &[2]).unwrap();
    assert_eq!(rows(&out), vec![vec![0], vec![2], vec![4]]);
    let out = su2.fusion_outcomes(&[1], &[2]).unwrap();
    assert_eq!(rows(&out), vec![vec![1], vec![3]]);
    assert_eq!(su2.sector_dim(&[3]), 4);
    assert_eq!(su2.fusion_style(), FusionStyle::MultipleUnique);
    assert!(!su2.is_abelian());
}

#[test]
fn trivial_and_parity_rules() {
    let trivial = no_symmetry();
    assert_eq!(rows(&trivial.fusion_outcomes(&[0], &[0]).unwrap()), vec![vec![0]]);
    assert!(!trivial.is_valid_sector(&[1]));

    let parity = fermion_parity();
    assert_eq!(rows(&parity.fusion_outcomes(&[1], &[1]).unwrap()), vec![vec![0]]);
    assert_eq!(parity.dual_sector(&[1]), vec![1]);
    assert!(parity.is_valid_sector(&[1]));
    assert!(!parity.is_valid_sector(&[2]));
}

#[test]
fn u1_duals_negate() {
    let u1 = u1_symmetry();
    let sectors = SectorArray::from_rows(1, [[-2], [0], [5]]).unwrap();
    assert_eq!(rows(&u1.dual_sectors(&sectors)), vec![vec![2], vec![0], vec![-5]]);
    assert_eq!(u1.sector_count(), SectorCount::Infinite);
}

#[test]
fn shape_is_checked_before_fusion() {
    let err = u1_symmetry().fusion_outcomes(&[1, 2], &[0]).unwrap_err();
    match err {
        SymError::Validation(info) => assert_eq!(info.code, "sector-shape"),
        other => panic!("unexpected error: {other:?}"),
    }
}

#[test]
fn all_sectors_of_unbounded_symmetry_fails() {
    let err = u1_symmetry().all_sectors().unwrap_err();
    match err {
        SymError::Unsupported(info) => assert_eq!(info.code, "infinite-sectors"),
        other => panic!("unexpected error: {other:?}"),
    }
    let z4 = z4_symmetry().all_sectors().unwrap();
    assert_eq!(rows(&z4), vec![vec![0], vec![1], vec![2], vec![3]]);
}

#[test]
fn broadcast_requires_single_fusion() {
    let a = SectorArray::from_rows(1, [[0], [2]]).unwrap();
    let err = su2_symmetry().fusion_outcomes_broadcast(&a, &a).unwrap_err();
    assert_eq!(err.code(), "non-single-fusion");

    let b = SectorArray::from_rows(1, [[1], [3]]).unwrap();
    let out = z4_symmetry().fusion_outcomes_broadcast(&a, &b).unwrap();
    assert_eq!(rows(&out), vec![vec![1], vec![1]]);

    let short = SectorArray::from_rows(1, [[1]]).unwrap();
    let err = z4_symmetry().fusion_outcomes_broadcast(&a, &short).unwrap_err();
    assert_eq!(err.code(), "batch-length");
}

#[test]
fn n_symbols() {
    let z2 = z2_symmetry();
    assert_eq!(z2.n_symbol(&[1], &[1], &[0]).unwrap(), 1);
    assert_eq!(z2.n_symbol(&[1], &[1], &[1]).unwrap(), 0);
    let err = su2_symmetry().n_symbol(&[1], &[1], &[0]).unwrap_err();
    match err {
        SymError::Unsupported(info) => assert_eq!(info.code, "n-symbol-unimplemented"),
        other => panic!("unexpected error: {other:?}"),
    }
    assert_eq!(su2_symmetry().fusion_multiplicity(&[1], &[1], &[0]).unwrap(), 1);
}

#[test]
fn zn_order_is_validated() {
    assert_eq!(Symmetry::zn(1).unwrap_err().code(), "invalid-order");
    assert_eq!(Symmetry::zn(3).unwrap().group_name(), "ℤ₃");
    assert_eq!(Symmetry::zn(12).unwrap().group_name(), "ℤ₁₂");
}

#[test]
fn charges_at_the_edge_of_the_range() {
    let u1 = u1_symmetry();
    assert!(u1.is_valid_sector(&[i64::MAX]));
    assert!(u1.is_valid_sector(&[-i64::MAX]));
    assert!(!u1.is_valid_sector(&[i64::MIN]));
    assert_eq!(u1.validate_sector(&[i64::MIN]).unwrap_err().code(), "invalid-sector");
    assert_eq!(u1.dual_sector(&[-i64::MAX]), vec![i64::MAX]);
    assert_eq!(u1.dual_sector(&[i64::MIN]), vec![i64::MIN]);

    let err = u1.fusion_outcomes(&[i64::MAX], &[1]).unwrap_err();
    match err {
        SymError::Range(info) => assert_eq!(info.code, "charge-overflow"),
        other => panic!("unexpected error: {other:?}"),
    }
    let err = u1.fusion_outcomes(&[-i64::MAX], &[-1]).unwrap_err();
    assert_eq!(err.code(), "charge-overflow");
    let out = u1.fusion_outcomes(&[i64::MAX], &[-i64::MAX]).unwrap();
    assert_eq!(rows(&out), vec![vec![0]]);

    let err = su2_symmetry().fusion_outcomes(&[i64::MAX], &[1]).unwrap_err();
    assert_eq!(err.code(), "charge-overflow");
    let batch = SectorArray::from_rows(1, [[1], [i64::MAX]]).unwrap();
    let err = u1.fusion_outcomes_broadcast(&batch, &batch).unwrap_err();
    assert_eq!(err.code(), "charge-overflow");

    let big = Symmetry::zn(i64::MAX).unwrap();
    let out = big.fusion_outcomes(&[i64::MAX - 1], &[i64::MAX - 1]).unwrap();
    assert_eq!(rows(&out), vec![vec![i64::MAX - 2]]);
    assert_eq!(big.dual_sector(&[1]), vec![i64::MAX - 1]);
}

#[test]
fn hand_built_zn_with_degenerate_order() {
    for n in [-3, 0, 1] {
        let sym = Symmetry::ZN { n, name: None };
        assert!(!sym.is_valid_sector(&[0]));
        assert_eq!(sym.validate_sector(&[0]).unwrap_err().code(), "invalid-order");
        assert_eq!(sym.dual_sector(&[0]), vec![0]);
        assert_eq!(rows(&sym.fusion_outcomes(&[0], &[0]).unwrap()), vec![vec![0]]);
    }
    assert_eq!(Symmetry::ZN { n: -3, name: None }.sector_count(), SectorCount::Finite(0));
    let product = &u1_symmetry() * &Symmetry::ZN { n: 0, name: None };
    assert_eq!(product.validate_sector(&[1, 0]).unwrap_err().code(), "invalid-order");
}

#[test]
fn names_take_part_in_equality() {
    let sz = u1_symmetry().with_name("Sz").unwrap();
    assert_ne!(sz, u1_symmetry());
    assert!(sz.is_same_symmetry(&u1_symmetry()));
    assert_eq!(sz.to_string(), "U(1)(\"Sz\")");
    assert_eq!(fermion_parity().with_name("p").unwrap_err().code(), "unnamed-symmetry");
}

#[test]
fn symmetry_json_roundtrip() {
    let sym = z4_symmetry().with_name("k").unwrap();
    let json = serde_json::to_string(&sym).unwrap();
    let back: Symmetry = serde_json::from_str(&json).unwrap();
    assert_eq!(back, sym);
    assert!(serde_json::from_str::<Symmetry>(r#"{"kind":"zn","n":1}"#).is_err());
}

proptest! {
    #[test]
    fn zn_fusion_is_addition_mod_n(n in 2i64..12, a in 0i64..12, b in 0i64..12) {
        let a = a % n;
        let b = b % n;
        let sym = Symmetry::zn(n).unwrap();
        let out = sym.fusion_outcomes(&[a], &[b]).unwrap();
        prop_assert_eq!(out.to_rows(), vec![vec![(a + b) % n]]);
        let dual = sym.dual_sector(&[a]);
        prop_assert_eq!(sym.dual_sector(&dual), vec![a]);
        prop_assert_eq!(sym.n_symbol(&[a], &dual, &sym.trivial_sector()).unwrap(), 1);
    }

    #[test]
    fn su2_outcomes_respect_triangle_rule(a in 0i64..20, b in 0i64..20) {
        let out = su2_symmetry().fusion_outcomes(&[a], &[b]).unwrap();
        prop_assert_eq!(out.len() as i64, a.min(b) + 1);
        let total: i64 = out.rows().map(|c| c[0] + 1).sum();
        prop_assert_eq!(total, (a + 1) * (b + 1));
    }
}
