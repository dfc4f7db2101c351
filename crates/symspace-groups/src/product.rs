use serde::{Deserialize, Serialize};
use symspace_core::{Charge, Sector, SectorArray, SymError};

use crate::style::{BraidingStyle, FusionStyle};
use crate::symmetry::Symmetry;

/// Tensor product of several symmetries.
///
/// A sector is the concatenation of one sector per factor; factor `i` owns the charges
/// `sector_slices()[i]..sector_slices()[i + 1]`. Fusion and braiding styles are the most
/// severe among the factors.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawProduct", into = "RawProduct")]
pub struct ProductSymmetry {
    factors: Vec<Symmetry>,
    offsets: Vec<usize>,
    fusion_style: FusionStyle,
    braiding_style: BraidingStyle,
    name: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct RawProduct {
    factors: Vec<Symmetry>,
}

impl TryFrom<RawProduct> for ProductSymmetry {
    type Error = SymError;

    fn try_from(raw: RawProduct) -> Result<Self, Self::Error> {
        ProductSymmetry::new(raw.factors)
    }
}

impl From<ProductSymmetry> for RawProduct {
    fn from(product: ProductSymmetry) -> Self {
        RawProduct {
            factors: product.factors,
        }
    }
}

impl ProductSymmetry {
    /// Builds the product of `factors`.
    ///
    /// Factors must not themselves be products; use `&a * &b` to flatten.
    pub fn new(factors: Vec<Symmetry>) -> Result<Self, SymError> {
        if factors.is_empty() {
            return Err(SymError::validation(
                "empty-product",
                "a product symmetry needs at least one factor",
            ));
        }
        if let Some(pos) = factors.iter().position(|f| matches!(f, Symmetry::Product(_))) {
            return Err(SymError::validation(
                "nested-product",
                "product symmetries must not be nested",
            )
            .with_context("factor", pos)
            .with_hint("flatten with the `*` operator"));
        }
        Ok(Self::from_flat_factors(factors))
    }

    pub(crate) fn from_flat_factors(factors: Vec<Symmetry>) -> Self {
        let mut offsets = Vec::with_capacity(factors.len() + 1);
        offsets.push(0);
        for factor in &factors {
            offsets.push(offsets[offsets.len() - 1] + factor.sector_ind_len());
        }
        let fusion_style = factors
            .iter()
            .map(Symmetry::fusion_style)
            .max()
            .unwrap_or(FusionStyle::Single);
        let braiding_style = factors
            .iter()
            .map(Symmetry::braiding_style)
            .max()
            .unwrap_or(BraidingStyle::Bosonic);
        let names: Option<Vec<&str>> = factors.iter().map(Symmetry::descriptive_name).collect();
        let name = names.map(|names| format!("[{}]", names.join(", ")));
        Self {
            factors,
            offsets,
            fusion_style,
            braiding_style,
            name,
        }
    }

    /// The factor symmetries in order.
    pub fn factors(&self) -> &[Symmetry] {
        &self.factors
    }

    /// Cumulative charge offsets of the factors, starting at 0.
    pub fn sector_slices(&self) -> &[usize] {
        &self.offsets
    }

    /// Total number of charges per sector.
    pub fn sector_ind_len(&self) -> usize {
        self.offsets[self.offsets.len() - 1]
    }

    /// Part of `a` that labels a sector of factor `i`.
    pub fn factor_sector<'a>(&self, a: &'a [Charge], i: usize) -> &'a [Charge] {
        &a[self.offsets[i]..self.offsets[i + 1]]
    }

    /// Most severe fusion style among the factors.
    pub fn fusion_style(&self) -> FusionStyle {
        self.fusion_style
    }

    /// Most severe braiding style among the factors.
    pub fn braiding_style(&self) -> BraidingStyle {
        self.braiding_style
    }

    /// `[n1, n2, ...]` if every factor is named.
    pub fn descriptive_name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    fn factor_columns(&self, sectors: &SectorArray, i: usize) -> SectorArray {
        sectors.columns(self.offsets[i], self.offsets[i + 1])
    }

    /// All combinations of one row per part, last part varying fastest.
    fn cartesian(&self, parts: &[SectorArray]) -> Result<SectorArray, SymError> {
        let total: usize = parts.iter().map(SectorArray::len).product();
        let mut out = SectorArray::with_capacity(self.sector_ind_len(), total);
        if total == 0 {
            return Ok(out);
        }
        let mut idx = vec![0usize; parts.len()];
        let mut row: Sector = Vec::with_capacity(self.sector_ind_len());
        loop {
            row.clear();
            for (part, &i) in parts.iter().zip(&idx) {
                row.extend_from_slice(part.row(i));
            }
            out.push(&row)?;
            let mut axis = parts.len();
            loop {
                if axis == 0 {
                    return Ok(out);
                }
                axis -= 1;
                idx[axis] += 1;
                if idx[axis] < parts[axis].len() {
                    break;
                }
                idx[axis] = 0;
            }
        }
    }

    pub(crate) fn fusion_outcomes(
        &self,
        a: &[Charge],
        b: &[Charge],
    ) -> Result<SectorArray, SymError> {
        let parts = self
            .factors
            .iter()
            .enumerate()
            .map(|(i, f)| {
                f.fusion_outcomes_unchecked(self.factor_sector(a, i), self.factor_sector(b, i))
            })
            .collect::<Result<Vec<_>, _>>()?;
        self.cartesian(&parts)
    }

    pub(crate) fn fusion_outcomes_broadcast(
        &self,
        a: &SectorArray,
        b: &SectorArray,
    ) -> Result<SectorArray, SymError> {
        let parts = self
            .factors
            .iter()
            .enumerate()
            .map(|(i, f)| {
                f.broadcast_unchecked(&self.factor_columns(a, i), &self.factor_columns(b, i))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(SectorArray::hstack(&parts))
    }

    pub(crate) fn sector_dim(&self, a: &[Charge]) -> usize {
        if self.fusion_style == FusionStyle::Single {
            return 1;
        }
        self.factors
            .iter()
            .enumerate()
            .map(|(i, f)| f.sector_dim(self.factor_sector(a, i)))
            .product()
    }

    pub(crate) fn dual_sector(&self, a: &[Charge]) -> Sector {
        self.factors
            .iter()
            .enumerate()
            .flat_map(|(i, f)| f.dual_sector(self.factor_sector(a, i)))
            .collect()
    }

    pub(crate) fn dual_sectors(&self, sectors: &SectorArray) -> SectorArray {
        let parts: Vec<SectorArray> = self
            .factors
            .iter()
            .enumerate()
            .map(|(i, f)| f.dual_sectors(&self.factor_columns(sectors, i)))
            .collect();
        SectorArray::hstack(&parts)
    }

    pub(crate) fn n_symbol(
        &self,
        a: &[Charge],
        b: &[Charge],
        c: &[Charge],
    ) -> Result<usize, SymError> {
        let mut total = 1;
        for (i, f) in self.factors.iter().enumerate() {
            total *= f.n_symbol_unchecked(
                self.factor_sector(a, i),
                self.factor_sector(b, i),
                self.factor_sector(c, i),
            )?;
        }
        Ok(total)
    }

    pub(crate) fn all_sectors(&self) -> Result<SectorArray, SymError> {
        let parts = self
            .factors
            .iter()
            .map(Symmetry::all_sectors)
            .collect::<Result<Vec<_>, _>>()?;
        self.cartesian(&parts)
    }
}
