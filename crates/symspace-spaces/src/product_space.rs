use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use symspace_core::{permute, stable_hash_string, SymError};
use symspace_groups::Symmetry;
use tracing::debug;

use crate::fuse::{fuse_sectors, DefaultFusion, FuseBackend};
use crate::opts::{ProductOpts, SpaceOpts};
use crate::space::Space;
use crate::vector_space::VectorSpace;

/// The left-to-right fusion `((f0 ⊗ f1) ⊗ f2) ⊗ ...` of several factor spaces.
///
/// Mathematically `(V ⊗ W)^*` and `V^* ⊗ W^*` coincide, but they are distinct values here.
/// For factor spaces `V` and `W`:
///
/// | space | factors              | `is_dual` | non-dual sorted sectors |
/// |-------|----------------------|-----------|-------------------------|
/// | P1    | `[V, W]`             | false     | `S`                     |
/// | P2    | `[V.dual, W.dual]`   | true      | `S`                     |
/// | P3    | `[V.dual, W.dual]`   | false     | `dual(S)`               |
/// | P4    | `[V, W]`             | true      | `dual(S)`               |
///
/// with `P1.dual() == P2`, `P3.dual() == P4`, `P1.flip_is_dual() == P4` and
/// `P2.flip_is_dual() == P3`. Only mutually dual pairs such as P1 and P2 are contractible.
///
/// Read accessors forward to the fused [`VectorSpace`]; [`ProductSpace::as_vector_space`] gives
/// the plain view explicitly.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawProductSpace", into = "RawProductSpace")]
pub struct ProductSpace {
    base: VectorSpace,
    factors: Vec<Space>,
    metadata: BTreeMap<String, Value>,
}

#[derive(Serialize, Deserialize)]
struct RawProductSpace {
    factors: Vec<Space>,
    space: VectorSpace,
    #[serde(default)]
    metadata: BTreeMap<String, Value>,
}

impl TryFrom<RawProductSpace> for ProductSpace {
    type Error = SymError;

    fn try_from(raw: RawProductSpace) -> Result<Self, Self::Error> {
        let product = ProductSpace {
            base: raw.space,
            factors: raw.factors,
            metadata: raw.metadata,
        };
        product.check_sanity()?;
        Ok(product)
    }
}

impl From<ProductSpace> for RawProductSpace {
    fn from(product: ProductSpace) -> Self {
        RawProductSpace {
            factors: product.factors,
            space: product.base,
            metadata: product.metadata,
        }
    }
}

fn check_factors(symmetry: &Symmetry, is_real: bool, factors: &[Space]) -> Result<(), SymError> {
    for (i, factor) in factors.iter().enumerate() {
        if factor.symmetry() != symmetry {
            return Err(SymError::validation(
                "symmetry-mismatch",
                "all factors of a product space must share one symmetry",
            )
            .with_context("factor", i)
            .with_context("expected", symmetry)
            .with_context("found", factor.symmetry()));
        }
        if factor.is_real() != is_real {
            return Err(SymError::validation(
                "reality-mismatch",
                "factors of a product space must be all real or all complex",
            )
            .with_context("factor", i));
        }
    }
    Ok(())
}

impl ProductSpace {
    /// Fuses `factors` with the default backend; the product is dual iff the first factor is.
    pub fn new(factors: Vec<Space>) -> Result<Self, SymError> {
        Self::with_opts(factors, &ProductOpts::default())
    }

    /// [`ProductSpace::new`] with explicit options.
    pub fn with_opts(factors: Vec<Space>, opts: &ProductOpts) -> Result<Self, SymError> {
        Self::with_backend(factors, &DefaultFusion, opts)
    }

    /// Fuses `factors` through `backend`, keeping whatever metadata it returns.
    pub fn with_backend(
        factors: Vec<Space>,
        backend: &dyn FuseBackend,
        opts: &ProductOpts,
    ) -> Result<Self, SymError> {
        let Some(first) = factors.first() else {
            return Err(SymError::validation(
                "empty-product-space",
                "a product space needs at least one factor",
            ));
        };
        let symmetry = first.symmetry().clone();
        let is_real = first.is_real();
        let is_dual = opts.is_dual.unwrap_or_else(|| first.is_dual());
        check_factors(&symmetry, is_real, &factors)?;

        let outcome = backend.fuse_spaces(&symmetry, &factors, is_dual)?;
        if opts.verify_fusion {
            let (sectors, multiplicities) = fuse_sectors(&symmetry, &factors, is_dual)?;
            if sectors != outcome.sectors || multiplicities != outcome.multiplicities {
                return Err(SymError::validation(
                    "fusion-mismatch",
                    "backend fusion disagrees with the default fusion",
                )
                .with_context("expected_sectors", sectors.len())
                .with_context("found_sectors", outcome.sectors.len()));
            }
        }
        let space_opts = SpaceOpts {
            is_real,
            is_dual,
            validate_sectors: true,
        };
        let base = VectorSpace::from_sorted(
            symmetry,
            outcome.sectors,
            outcome.multiplicities,
            None,
            None,
            &space_opts,
        )?;
        Ok(Self {
            base,
            factors,
            metadata: outcome.metadata,
        })
    }

    forward_space_accessors!();

    /// The factor spaces in fusion order.
    pub fn factors(&self) -> &[Space] {
        &self.factors
    }

    /// Number of factors.
    pub fn num_factors(&self) -> usize {
        self.factors.len()
    }

    /// Iterates over the factors.
    pub fn iter(&self) -> std::slice::Iter<'_, Space> {
        self.factors.iter()
    }

    /// Backend metadata attached during fusion.
    pub fn metadata(&self) -> &BTreeMap<String, Value> {
        &self.metadata
    }

    /// The fused space without factor structure.
    pub fn as_vector_space(&self) -> &VectorSpace {
        &self.base
    }

    /// The dual product: dual factors, same canonical data, opposite `is_dual`.
    pub fn dual(&self) -> ProductSpace {
        Self {
            base: self.base.dual(),
            factors: self.factors.iter().map(Space::dual).collect(),
            metadata: self.metadata.clone(),
        }
    }

    /// Realizes `(V ⊗ W)^* ≅ V^* ⊗ W^*`: same public sectors and factors, opposite `is_dual`.
    ///
    /// Backend metadata is dropped.
    pub fn flip_is_dual(&self) -> ProductSpace {
        let base = &self.base;
        let dual = base.symmetry().dual_sectors(base.non_dual_sorted_sectors());
        let sort = dual.lexsort_permutation();
        let flipped = VectorSpace::assemble(
            base.symmetry().clone(),
            base.is_real(),
            !base.is_dual(),
            dual.permuted(&sort),
            permute(base.sorted_multiplicities(), &sort),
            permute(base.sector_perm(), &sort),
            permute(base.sorted_slices(), &sort),
        );
        if !self.metadata.is_empty() {
            debug!(keys = self.metadata.len(), "flip_is_dual drops backend metadata");
        }
        Self {
            base: flipped,
            factors: self.factors.clone(),
            metadata: BTreeMap::new(),
        }
    }

    /// Opposite `is_dual` and pairwise contractible factors.
    pub fn can_contract_with(&self, other: &ProductSpace) -> bool {
        self.is_dual() != other.is_dual()
            && self.factors.len() == other.factors.len()
            && self
                .factors
                .iter()
                .zip(&other.factors)
                .all(|(a, b)| a.can_contract_with(b))
    }

    /// Every factor is trivial.
    pub fn is_trivial(&self) -> bool {
        self.factors.iter().all(Space::is_trivial)
    }

    /// Forgets the factor structure, e.g. before truncating sectors.
    pub fn to_vector_space(&self) -> VectorSpace {
        self.base.clone()
    }

    /// Checks the fused space, every factor, and that re-fusing the factors reproduces the
    /// canonical sectors and multiplicities.
    pub fn check_sanity(&self) -> Result<(), SymError> {
        self.base.check_sanity()?;
        if self.factors.is_empty() {
            return Err(SymError::validation(
                "empty-product-space",
                "a product space needs at least one factor",
            ));
        }
        check_factors(self.symmetry(), self.is_real(), &self.factors)?;
        for factor in &self.factors {
            factor.check_sanity()?;
        }
        let (sectors, multiplicities) =
            fuse_sectors(self.symmetry(), &self.factors, self.is_dual())?;
        if &sectors != self.non_dual_sorted_sectors()
            || multiplicities != self.sorted_multiplicities()
        {
            return Err(
                SymError::validation("sanity-violation", "product space invariant does not hold")
                    .with_context("invariant", "fused factors reproduce the canonical sectors"),
            );
        }
        Ok(())
    }

    /// Stable fingerprint covering the factors and backend metadata.
    pub fn fingerprint(&self) -> Result<String, SymError> {
        stable_hash_string(self)
    }
}

impl PartialEq for ProductSpace {
    fn eq(&self, other: &Self) -> bool {
        self.is_dual() == other.is_dual() && self.factors == other.factors
    }
}

impl Eq for ProductSpace {}

impl<'a> IntoIterator for &'a ProductSpace {
    type Item = &'a Space;
    type IntoIter = std::slice::Iter<'a, Space>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
