use symspace_core::{from_json_slice, SectorArray, SymError};
use symspace_groups::{u1_symmetry, z2_symmetry, Symmetry};
use symspace_spaces::{SpaceOpts, VectorSpace};

fn space(symmetry: Symmetry, sectors: &[i64], mults: &[usize]) -> VectorSpace {
    let rows = SectorArray::from_rows(1, sectors.iter().map(|&c| [c])).unwrap();
    VectorSpace::new(symmetry, rows, Some(mults.to_vec())).unwrap()
}

fn sample() -> VectorSpace {
    space(u1_symmetry(), &[2, -1, 0], &[2, 1, 3])
}

#[test]
fn subspace_scenario() {
    let big = space(z2_symmetry(), &[0, 1], &[3, 2]);
    let small = space(z2_symmetry(), &[0, 1], &[2, 1]);
    let too_many = space(z2_symmetry(), &[0, 1], &[2, 3]);
    let odd_only = space(z2_symmetry(), &[1], &[2]);
    assert!(small.is_subspace_of(&big));
    assert!(!too_many.is_subspace_of(&big));
    assert!(odd_only.is_subspace_of(&big));
    assert!(!big.is_subspace_of(&odd_only));
    assert!(!small.dual().is_subspace_of(&big));
}

#[test]
fn index_parsing_scenario() {
    let space = VectorSpace::without_symmetry(8, &SpaceOpts::default()).unwrap();
    assert_eq!(space.dim(), 8);
    assert_eq!(space.parse_index(5).unwrap(), (0, 5));
    assert_eq!(space.parse_index(-1).unwrap(), (0, 7));
    match space.parse_index(8).unwrap_err() {
        SymError::Range(info) => assert_eq!(info.code, "index-out-of-range"),
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(space.parse_index(-9).is_err());
}

#[test]
fn layout_follows_insertion_order() {
    let space = sample();
    assert_eq!(space.dim(), 6);
    assert_eq!(space.slices(), &[0..2, 2..3, 3..6]);
    assert_eq!(space.sector_perm(), &[1, 2, 0]);
    assert_eq!(space.sorted_slices(), &[2..3, 3..6, 0..2]);
    assert_eq!(space.non_dual_sorted_sectors().to_rows(), vec![vec![-1], vec![0], vec![2]]);
    assert_eq!(space.parse_index(2).unwrap(), (1, 0));
    assert_eq!(space.parse_index(4).unwrap(), (2, 1));
    assert_eq!(space.sorted_parse_index(4).unwrap(), (1, 1));
    assert_eq!(space.idx_to_sector(4).unwrap(), vec![0]);
    assert_eq!(space.dual().idx_to_sector(0).unwrap(), vec![-2]);
}

#[test]
fn lookups_respect_duality() {
    let space = sample();
    let dual = space.dual();
    assert_eq!(dual.sectors().to_rows(), vec![vec![-2], vec![1], vec![0]]);
    assert_eq!(space.sectors_where(&[-1]), Some(1));
    assert_eq!(dual.sectors_where(&[1]), Some(1));
    assert_eq!(dual.sectors_where(&[-1]), None);
    assert_eq!(dual.sector_multiplicity(&[1]), 1);
    assert_eq!(dual.sector_multiplicity(&[5]), 0);
    assert_eq!(dual.non_dual_sector_multiplicity(&[2]), 2);
    assert_eq!(space.non_dual_sorted_sectors_where(&[0]), Some(1));
    assert_eq!(dual.sector(0).unwrap(), vec![-2]);
    assert_eq!(space.sector(3).unwrap_err().code(), "index-out-of-range");
}

#[test]
fn dual_is_an_involution_and_contractible() {
    let space = sample();
    let dual = space.dual();
    assert_eq!(dual.dual(), space);
    assert_ne!(dual, space);
    assert!(dual.is_equal_or_dual(&space));
    assert_eq!(dual.sectors(), &space.symmetry().dual_sectors(space.sectors()));
    assert!(space.can_contract_with(&dual));
    assert!(dual.can_contract_with(&space));
    assert!(!space.can_contract_with(&space));
}

#[test]
fn flip_is_dual_keeps_public_content() {
    let space = sample();
    let flipped = space.flip_is_dual();
    assert!(flipped.is_dual());
    assert_ne!(flipped, space);
    assert_ne!(flipped, space.dual());
    assert_eq!(flipped.sectors(), space.non_dual_sorted_sectors());
    assert_eq!(flipped.multiplicities(), space.sorted_multiplicities());
    assert_eq!(flipped.dim(), space.dim());
    assert_eq!(flipped.non_dual_sorted_sectors().to_rows(), vec![vec![-2], vec![0], vec![1]]);
    flipped.check_sanity().unwrap();
}

#[test]
fn trivial_space_and_parameters() {
    let trivial = space(u1_symmetry(), &[0], &[1]);
    assert!(trivial.is_trivial());
    assert!(!space(u1_symmetry(), &[0], &[2]).is_trivial());
    assert!(!space(u1_symmetry(), &[1], &[1]).is_trivial());
    assert_eq!(sample().num_parameters(), 3);
    assert_eq!(space(u1_symmetry(), &[1, 2], &[1, 1]).num_parameters(), 0);
}

#[test]
fn construction_rejects_bad_input() {
    let rows = SectorArray::from_rows(1, [[1], [0], [1]]).unwrap();
    let err = VectorSpace::new(u1_symmetry(), rows, None).unwrap_err();
    assert_eq!(err.code(), "duplicate-sector");

    let wide = SectorArray::from_rows(2, [[1, 0]]).unwrap();
    assert_eq!(VectorSpace::new(u1_symmetry(), wide, None).unwrap_err().code(), "sector-shape");

    let rows = SectorArray::from_rows(1, [[1], [0]]).unwrap();
    let err = VectorSpace::new(u1_symmetry(), rows.clone(), Some(vec![1])).unwrap_err();
    assert_eq!(err.code(), "multiplicity-length");
    let err = VectorSpace::new(u1_symmetry(), rows, Some(vec![1, 0])).unwrap_err();
    assert_eq!(err.code(), "zero-multiplicity");

    let err = VectorSpace::new(z2_symmetry(), SectorArray::single(&[2]), None).unwrap_err();
    assert_eq!(err.code(), "invalid-sector");
}

#[test]
fn from_sorted_validates_canonical_input() {
    let opts = SpaceOpts::default();
    let unsorted = SectorArray::from_rows(1, [[1], [0]]).unwrap();
    let err = VectorSpace::from_sorted(u1_symmetry(), unsorted, vec![1, 1], None, None, &opts)
        .unwrap_err();
    assert_eq!(err.code(), "unsorted-sectors");

    let sorted = SectorArray::from_rows(1, [[0], [1]]).unwrap();
    let err = VectorSpace::from_sorted(
        u1_symmetry(),
        sorted.clone(),
        vec![1, 1],
        Some(vec![0, 0]),
        None,
        &opts,
    )
    .unwrap_err();
    assert_eq!(err.code(), "invalid-permutation");

    let space =
        VectorSpace::from_sorted(u1_symmetry(), sorted, vec![2, 1], Some(vec![1, 0]), None, &opts)
            .unwrap();
    assert_eq!(space.sectors().to_rows(), vec![vec![1], vec![0]]);
    assert_eq!(space.slices(), &[0..1, 1..3]);
    space.check_sanity().unwrap();
}

#[test]
fn json_roundtrip_revalidates() {
    let space = sample().dual();
    let bytes = serde_json::to_vec(&space).unwrap();
    let back: VectorSpace = from_json_slice(&bytes).unwrap();
    assert_eq!(back, space);
    assert_eq!(back.sectors(), space.sectors());

    let mut value: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    value["multiplicities"][0] = serde_json::json!(5);
    let tampered = serde_json::to_vec(&value).unwrap();
    assert_eq!(from_json_slice::<VectorSpace>(&tampered).unwrap_err().code(), "json-read");
}

#[test]
fn fingerprint_tracks_duality() {
    let space = sample();
    let again = sample();
    assert_eq!(space.fingerprint().unwrap(), again.fingerprint().unwrap());
    assert_ne!(space.fingerprint().unwrap(), space.dual().fingerprint().unwrap());
}
