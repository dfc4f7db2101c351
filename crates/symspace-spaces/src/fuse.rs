//! Fusion of factor spaces into the canonical data of a product space.

use std::collections::BTreeMap;

use serde_json::Value;
use symspace_core::{Charge, Sector, SectorArray, SymError};
use symspace_groups::Symmetry;
use tracing::{debug, trace};

use crate::space::Space;

/// Canonical data produced by a [`FuseBackend`].
#[derive(Debug, Clone, PartialEq)]
pub struct FusionOutcome {
    /// Non-dual sectors, strictly sorted.
    pub sectors: SectorArray,
    /// Multiplicities in the order of `sectors`.
    pub multiplicities: Vec<usize>,
    /// Opaque backend bookkeeping attached to the product space.
    pub metadata: BTreeMap<String, Value>,
}

/// Hook computing the fused sectors of a product space.
///
/// Tensor backends implement this to attach per-leg metadata. The returned sectors and
/// multiplicities must equal those of [`fuse_sectors`].
pub trait FuseBackend: Send + Sync {
    /// Fuses `factors` left to right; with `is_dual` the duals of the factors are fused.
    fn fuse_spaces(
        &self,
        symmetry: &Symmetry,
        factors: &[Space],
        is_dual: bool,
    ) -> Result<FusionOutcome, SymError>;
}

/// Backend-free fusion without metadata.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultFusion;

impl FuseBackend for DefaultFusion {
    fn fuse_spaces(
        &self,
        symmetry: &Symmetry,
        factors: &[Space],
        is_dual: bool,
    ) -> Result<FusionOutcome, SymError> {
        let (sectors, multiplicities) = fuse_sectors(symmetry, factors, is_dual)?;
        Ok(FusionOutcome {
            sectors,
            multiplicities,
            metadata: BTreeMap::new(),
        })
    }
}

fn multiplicity_overflow(sector: &[Charge]) -> SymError {
    SymError::range("multiplicity-overflow", "fused multiplicity overflows")
        .with_context("sector", format!("{sector:?}"))
}

/// Fuses the sectors of `factors` pairwise from the left: `((f0 ⊗ f1) ⊗ f2) ⊗ ...`.
///
/// With `is_dual` the duals of the factors are fused, so that the result can be stored directly
/// as the non-dual sectors of a bra space. Returns sorted sectors and their multiplicities.
///
/// Fails with `charge-overflow` when a fused charge is not representable.
#[tracing::instrument(skip_all, fields(num_factors = factors.len(), is_dual = is_dual))]
pub fn fuse_sectors(
    symmetry: &Symmetry,
    factors: &[Space],
    is_dual: bool,
) -> Result<(SectorArray, Vec<usize>), SymError> {
    let Some((first, rest)) = factors.split_first() else {
        return Err(SymError::validation(
            "empty-product-space",
            "a product space needs at least one factor",
        ));
    };
    let effective = |space: &Space| if is_dual { space.dual() } else { space.clone() };

    let first = effective(first);
    let mut fusion: BTreeMap<Sector, usize> = first
        .sorted_sectors()
        .rows()
        .map(<[_]>::to_vec)
        .zip(first.sorted_multiplicities().iter().copied())
        .collect();

    for (step, factor) in rest.iter().enumerate() {
        let factor = effective(factor);
        let mut next: BTreeMap<Sector, usize> = BTreeMap::new();
        for (a, &mult_a) in &fusion {
            for (b, &mult_b) in factor
                .sorted_sectors()
                .rows()
                .zip(factor.sorted_multiplicities())
            {
                for c in symmetry.fusion_outcomes_unchecked(a, b)?.rows() {
                    let n = symmetry.fusion_multiplicity(a, b, c)?;
                    let entry = next.entry(c.to_vec()).or_insert(0);
                    let current = *entry;
                    *entry = mult_a
                        .checked_mul(mult_b)
                        .and_then(|m| m.checked_mul(n))
                        .and_then(|m| m.checked_add(current))
                        .ok_or_else(|| multiplicity_overflow(c))?;
                }
            }
        }
        fusion = next;
        trace!(step = step + 1, num_sectors = fusion.len(), "fused factor");
    }

    fusion.retain(|_, mult| *mult > 0);
    let mut sectors = SectorArray::with_capacity(symmetry.sector_ind_len(), fusion.len());
    let mut multiplicities = Vec::with_capacity(fusion.len());
    for (sector, mult) in fusion {
        sectors.push(&sector)?;
        multiplicities.push(mult);
    }
    debug!(num_sectors = sectors.len(), "fused product space");
    Ok((sectors, multiplicities))
}
