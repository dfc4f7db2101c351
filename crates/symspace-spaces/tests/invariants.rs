use proptest::prelude::*;
use symspace_core::{Sector, SectorArray};
use symspace_groups::{fermion_parity, su2_symmetry, u1_symmetry, z3_symmetry, Symmetry};
use symspace_spaces::{ProductSpace, Space, SpaceOpts, VectorSpace};

fn graded_space(
    symmetry: Symmetry,
    sectors: impl Strategy<Value = Sector>,
    max_sectors: usize,
) -> impl Strategy<Value = VectorSpace> {
    (
        prop::collection::btree_map(sectors, 1usize..4, 1..max_sectors),
        any::<bool>(),
    )
        .prop_flat_map(|(sectors, is_dual)| {
            let entries: Vec<(Sector, usize)> = sectors.into_iter().collect();
            (Just(entries).prop_shuffle(), Just(is_dual))
        })
        .prop_map(move |(entries, is_dual)| {
            let width = symmetry.sector_ind_len();
            let rows = SectorArray::from_rows(width, entries.iter().map(|(s, _)| s)).unwrap();
            let mults = entries.iter().map(|(_, m)| *m).collect();
            let opts = SpaceOpts {
                is_dual,
                ..SpaceOpts::default()
            };
            VectorSpace::with_opts(symmetry.clone(), rows, Some(mults), &opts).unwrap()
        })
}

fn u1_space() -> impl Strategy<Value = VectorSpace> {
    graded_space(u1_symmetry(), (-4i64..=4).prop_map(|q| vec![q]), 5)
}

fn u1_z3_space() -> impl Strategy<Value = VectorSpace> {
    let charges = (-3i64..=3, 0i64..3).prop_map(|(q, k)| vec![q, k]);
    graded_space(&u1_symmetry() * &z3_symmetry(), charges, 6)
}

fn su2_space() -> impl Strategy<Value = VectorSpace> {
    graded_space(su2_symmetry(), (0i64..5).prop_map(|jj| vec![jj]), 4)
}

fn su2_u1_space() -> impl Strategy<Value = VectorSpace> {
    let charges = (0i64..3, -2i64..=2).prop_map(|(jj, q)| vec![jj, q]);
    graded_space(&su2_symmetry() * &u1_symmetry(), charges, 4)
}

fn parity_space() -> impl Strategy<Value = VectorSpace> {
    graded_space(fermion_parity(), (0i64..2).prop_map(|p| vec![p]), 3)
}

fn any_space() -> impl Strategy<Value = VectorSpace> {
    prop_oneof![u1_space(), u1_z3_space(), su2_space(), su2_u1_space(), parity_space()]
}

fn space_pair() -> impl Strategy<Value = (VectorSpace, VectorSpace)> {
    prop_oneof![
        (u1_space(), u1_space()),
        (u1_z3_space(), u1_z3_space()),
        (su2_space(), su2_space()),
        (su2_u1_space(), su2_u1_space()),
        (parity_space(), parity_space()),
    ]
}

fn sorted_rows(array: &SectorArray) -> Vec<Vec<i64>> {
    let mut rows = array.to_rows();
    rows.sort();
    rows
}

fn assert_layout(space: &VectorSpace) -> Result<(), TestCaseError> {
    prop_assert!(space.non_dual_sorted_sectors().is_strictly_sorted());
    prop_assert!(space.check_sanity().is_ok());
    let slices = space.slices();
    prop_assert_eq!(slices[0].start, 0);
    for pair in slices.windows(2) {
        prop_assert_eq!(pair[0].end, pair[1].start);
    }
    prop_assert_eq!(slices[slices.len() - 1].end, space.dim());
    for (i, sector) in space.sectors().rows().enumerate() {
        let block = space.multiplicities()[i] * space.symmetry().sector_dim(sector);
        prop_assert_eq!(slices[i].len(), block);
        prop_assert_eq!(space.sectors_where(sector), Some(i));
    }
    Ok(())
}

proptest! {
    #[test]
    fn canonical_layout_holds(space in any_space()) {
        assert_layout(&space)?;
        assert_layout(&space.dual())?;
    }

    #[test]
    fn duality_is_an_involution(space in any_space()) {
        let dual = space.dual();
        prop_assert_eq!(dual.dual(), space.clone());
        let expected = space.symmetry().dual_sectors(space.sectors());
        prop_assert_eq!(dual.sectors(), &expected);
        prop_assert_eq!(dual.non_dual_sorted_sectors(), space.non_dual_sorted_sectors());
    }

    #[test]
    fn flip_keeps_public_sectors(space in any_space()) {
        let flipped = space.flip_is_dual();
        prop_assert_eq!(sorted_rows(flipped.sectors()), sorted_rows(space.sectors()));
        prop_assert_eq!(flipped.is_dual(), !space.is_dual());
        assert_layout(&flipped)?;
    }

    #[test]
    fn contraction_is_symmetric(a in u1_z3_space(), b in u1_z3_space()) {
        prop_assert_eq!(a.can_contract_with(&b), b.can_contract_with(&a));
        prop_assert!(a.can_contract_with(&a.dual()));
        prop_assert!(!a.can_contract_with(&a));
    }

    #[test]
    fn nested_products_match_flat_products(a in u1_space(), b in u1_space(), c in u1_space()) {
        let inner = ProductSpace::new(vec![a.clone().into(), b.clone().into()]).unwrap();
        let nested = ProductSpace::new(vec![inner.into(), c.clone().into()]).unwrap();
        let flat = ProductSpace::new(vec![a.into(), b.into(), c.into()]).unwrap();
        prop_assert_eq!(nested.non_dual_sorted_sectors(), flat.non_dual_sorted_sectors());
        prop_assert_eq!(nested.sorted_multiplicities(), flat.sorted_multiplicities());
        prop_assert!(nested.check_sanity().is_ok());
    }

    #[test]
    fn nesting_is_associative_for_product_charges(
        a in u1_z3_space(),
        b in u1_z3_space(),
        c in u1_z3_space(),
    ) {
        let left = ProductSpace::new(vec![a.clone().into(), b.clone().into()]).unwrap();
        let right = ProductSpace::new(vec![b.clone().into(), c.clone().into()]).unwrap();
        let left_nested = ProductSpace::new(vec![left.into(), c.clone().into()]).unwrap();
        let right_nested = ProductSpace::new(vec![a.clone().into(), right.into()]).unwrap();
        let flat = ProductSpace::new(vec![a.into(), b.into(), c.into()]).unwrap();
        for nested in [&left_nested, &right_nested] {
            prop_assert_eq!(nested.non_dual_sorted_sectors(), flat.non_dual_sorted_sectors());
            prop_assert_eq!(nested.sorted_multiplicities(), flat.sorted_multiplicities());
            prop_assert!(nested.check_sanity().is_ok());
        }
        assert_layout(flat.as_vector_space())?;
    }

    #[test]
    fn nonabelian_products_scale_slices(
        a in su2_u1_space(),
        b in su2_u1_space(),
        c in su2_space(),
    ) {
        let p = ProductSpace::new(vec![a.clone().into(), b.clone().into()]).unwrap();
        prop_assert_eq!(p.dim(), a.dim() * b.dim());
        assert_layout(p.as_vector_space())?;
        assert_layout(p.flip_is_dual().as_vector_space())?;

        let d = c.dual();
        let inner = ProductSpace::new(vec![c.clone().into(), d.clone().into()]).unwrap();
        let nested = ProductSpace::new(vec![inner.into(), c.clone().into()]).unwrap();
        let flat = ProductSpace::new(vec![c.clone().into(), d.into(), c.clone().into()]).unwrap();
        prop_assert_eq!(nested.non_dual_sorted_sectors(), flat.non_dual_sorted_sectors());
        prop_assert_eq!(nested.sorted_multiplicities(), flat.sorted_multiplicities());
        prop_assert_eq!(flat.dim(), c.dim().pow(3));
    }

    #[test]
    fn products_contract_with_their_dual((a, b) in space_pair()) {
        let p = ProductSpace::new(vec![Space::from(a), Space::from(b)]).unwrap();
        prop_assert!(p.can_contract_with(&p.dual()));
        prop_assert!(p.dual().can_contract_with(&p));
        prop_assert_eq!(p.dim(), p.factors().iter().map(|f| f.dim()).product::<usize>());
        prop_assert!(p.flip_is_dual().check_sanity().is_ok());

        let fused = Space::from(p.clone());
        let plain = Space::from(p.to_vector_space().dual());
        prop_assert!(!fused.can_contract_with(&plain));
        prop_assert!(!plain.can_contract_with(&fused));
    }
}
