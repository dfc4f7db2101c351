//! Dense-basis slice layout.

use std::ops::Range;

use symspace_core::{inverse_permutation, permute, SectorArray, SymError};
use symspace_groups::Symmetry;

/// Contiguous slices for sectors listed in dense order.
///
/// Slice `i` has length `multiplicities[i] * sector_dim(sectors[i])` and starts where slice
/// `i - 1` ends.
pub fn dense_slices(
    symmetry: &Symmetry,
    sectors: &SectorArray,
    multiplicities: &[usize],
) -> Vec<Range<usize>> {
    let dims = symmetry.batch_sector_dim(sectors);
    let mut start = 0;
    dims.iter()
        .zip(multiplicities)
        .map(|(dim, mult)| {
            let end = start + dim * mult;
            let slice = start..end;
            start = end;
            slice
        })
        .collect()
}

fn slice_error(message: &str) -> SymError {
    SymError::validation("invalid-slices", message.to_string())
}

/// Validates slices given in canonical order against canonical sectors and the sector
/// permutation. Returns the total dimension.
pub(crate) fn check_sorted_slices(
    symmetry: &Symmetry,
    sectors: &SectorArray,
    multiplicities: &[usize],
    perm: &[usize],
    sorted_slices: &[Range<usize>],
) -> Result<usize, SymError> {
    if sorted_slices.len() != sectors.len() {
        return Err(slice_error("one slice per sector is required")
            .with_context("expected", sectors.len())
            .with_context("found", sorted_slices.len()));
    }
    let dims = symmetry.batch_sector_dim(sectors);
    let expected = dims.iter().zip(multiplicities).map(|(dim, mult)| dim * mult);
    for (k, (slice, len)) in sorted_slices.iter().zip(expected).enumerate() {
        if slice.start > slice.end || slice.len() != len {
            return Err(slice_error("slice length differs from multiplicity times dimension")
                .with_context("sector", k)
                .with_context("slice", format!("{slice:?}")));
        }
    }
    let public = permute(sorted_slices, &inverse_permutation(perm));
    let mut end = 0;
    for (i, slice) in public.iter().enumerate() {
        if slice.start != end {
            return Err(slice_error("slices are not contiguous in dense order")
                .with_context("sector", i)
                .with_context("expected_start", end));
        }
        end = slice.end;
    }
    Ok(end)
}
