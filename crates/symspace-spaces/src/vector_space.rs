use std::cmp::Ordering;
use std::ops::Range;
use std::sync::{Arc, OnceLock};

use serde::{Deserialize, Serialize};
use symspace_core::{
    inverse_permutation, is_permutation, permute, stable_hash_string, Charge, Sector,
    SectorArray, SymError,
};
use symspace_groups::Symmetry;

use crate::opts::SpaceOpts;
use crate::slices::{check_sorted_slices, dense_slices};

/// Canonical (non-dual, sorted) data shared by a space and its dual.
#[derive(Debug)]
struct CanonicalData {
    symmetry: Symmetry,
    is_real: bool,
    sectors: SectorArray,
    multiplicities: Vec<usize>,
    slices: Vec<Range<usize>>,
    perm: Vec<usize>,
    inv_perm: Vec<usize>,
    public_multiplicities: Vec<usize>,
    public_slices: Vec<Range<usize>>,
    dim: usize,
    dual_sorted: OnceLock<SectorArray>,
    public_sectors: [OnceLock<SectorArray>; 2],
}

impl CanonicalData {
    fn assemble(
        symmetry: Symmetry,
        is_real: bool,
        sectors: SectorArray,
        multiplicities: Vec<usize>,
        perm: Vec<usize>,
        slices: Vec<Range<usize>>,
    ) -> Self {
        let inv_perm = inverse_permutation(&perm);
        let public_multiplicities = permute(&multiplicities, &inv_perm);
        let public_slices = permute(&slices, &inv_perm);
        let dim = slices.iter().map(ExactSizeIterator::len).sum();
        Self {
            symmetry,
            is_real,
            sectors,
            multiplicities,
            slices,
            perm,
            inv_perm,
            public_multiplicities,
            public_slices,
            dim,
            dual_sorted: OnceLock::new(),
            public_sectors: [OnceLock::new(), OnceLock::new()],
        }
    }
}

/// A graded vector space: unique sectors of a [`Symmetry`], each with a multiplicity and a
/// contiguous slice of a dense basis.
///
/// Internally the space stores the non-dual sectors sorted lexicographically, together with
/// the permutation `sector_perm` relating them to the public (insertion) order:
/// `non_dual_sorted_sectors[k] == maybe_dual(sectors[sector_perm[k]])`. A space and its
/// [`VectorSpace::dual`] share this canonical data.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "RawVectorSpace", into = "RawVectorSpace")]
pub struct VectorSpace {
    data: Arc<CanonicalData>,
    is_dual: bool,
}

#[derive(Serialize, Deserialize)]
struct RawVectorSpace {
    symmetry: Symmetry,
    is_real: bool,
    is_dual: bool,
    sectors: SectorArray,
    multiplicities: Vec<usize>,
    sector_perm: Vec<usize>,
    slices: Vec<Range<usize>>,
}

impl TryFrom<RawVectorSpace> for VectorSpace {
    type Error = SymError;

    fn try_from(raw: RawVectorSpace) -> Result<Self, Self::Error> {
        let opts = SpaceOpts {
            is_real: raw.is_real,
            is_dual: raw.is_dual,
            validate_sectors: true,
        };
        VectorSpace::from_sorted(
            raw.symmetry,
            raw.sectors,
            raw.multiplicities,
            Some(raw.sector_perm),
            Some(raw.slices),
            &opts,
        )
    }
}

impl From<VectorSpace> for RawVectorSpace {
    fn from(space: VectorSpace) -> Self {
        let data = &space.data;
        RawVectorSpace {
            symmetry: data.symmetry.clone(),
            is_real: data.is_real,
            is_dual: space.is_dual,
            sectors: data.sectors.clone(),
            multiplicities: data.multiplicities.clone(),
            sector_perm: data.perm.clone(),
            slices: data.slices.clone(),
        }
    }
}

fn check_sectors(
    symmetry: &Symmetry,
    sectors: &SectorArray,
    validate: bool,
) -> Result<(), SymError> {
    if sectors.width() != symmetry.sector_ind_len() {
        return Err(
            SymError::validation("sector-shape", "sectors have the wrong number of charges")
                .with_context("symmetry", symmetry)
                .with_context("expected", symmetry.sector_ind_len())
                .with_context("found", sectors.width()),
        );
    }
    if validate {
        for (i, row) in sectors.rows().enumerate() {
            symmetry
                .validate_sector(row)
                .map_err(|err| err.with_context("row", i))?;
        }
    }
    Ok(())
}

fn check_multiplicities(num_sectors: usize, multiplicities: &[usize]) -> Result<(), SymError> {
    if multiplicities.len() != num_sectors {
        return Err(SymError::validation(
            "multiplicity-length",
            "one multiplicity per sector is required",
        )
        .with_context("expected", num_sectors)
        .with_context("found", multiplicities.len()));
    }
    if let Some(i) = multiplicities.iter().position(|&m| m == 0) {
        return Err(
            SymError::validation("zero-multiplicity", "multiplicities must be positive")
                .with_context("sector", i),
        );
    }
    Ok(())
}

fn order_error(sectors: &SectorArray, row: usize) -> SymError {
    let err = if sectors.row(row - 1) == sectors.row(row) {
        SymError::validation("duplicate-sector", "sectors must be unique")
    } else {
        SymError::validation("unsorted-sectors", "canonical sectors must be strictly sorted")
    };
    err.with_context("sector", format!("{:?}", sectors.row(row)))
}

fn sanity_error(invariant: &str) -> SymError {
    SymError::validation("sanity-violation", "vector space invariant does not hold")
        .with_context("invariant", invariant)
}

impl VectorSpace {
    /// Builds a space from non-dual sectors in arbitrary (dense) order.
    ///
    /// `multiplicities` defaults to 1 for every sector.
    pub fn new(
        symmetry: Symmetry,
        sectors: SectorArray,
        multiplicities: Option<Vec<usize>>,
    ) -> Result<Self, SymError> {
        Self::with_opts(symmetry, sectors, multiplicities, &SpaceOpts::default())
    }

    /// [`VectorSpace::new`] with explicit options.
    ///
    /// `sectors` are the non-dual labels; with `opts.is_dual` the public sectors are their duals.
    /// Duplicate sectors are rejected, never merged.
    pub fn with_opts(
        symmetry: Symmetry,
        sectors: SectorArray,
        multiplicities: Option<Vec<usize>>,
        opts: &SpaceOpts,
    ) -> Result<Self, SymError> {
        let multiplicities = multiplicities.unwrap_or_else(|| vec![1; sectors.len()]);
        check_sectors(&symmetry, &sectors, opts.validate_sectors)?;
        check_multiplicities(sectors.len(), &multiplicities)?;
        let perm = sectors.lexsort_permutation();
        let sorted = sectors.permuted(&perm);
        if let Some(row) = sorted.first_unsorted_row() {
            return Err(order_error(&sorted, row));
        }
        let slices = permute(&dense_slices(&symmetry, &sectors, &multiplicities), &perm);
        let sorted_multiplicities = permute(&multiplicities, &perm);
        Ok(Self::assemble(
            symmetry,
            opts.is_real,
            opts.is_dual,
            sorted,
            sorted_multiplicities,
            perm,
            slices,
        ))
    }

    /// Builds a space from data that is already in canonical order.
    ///
    /// `sectors` must be non-dual and strictly sorted, `multiplicities` must follow the same
    /// order. `sector_perm` defaults to the identity; `sorted_slices` are recomputed when
    /// omitted. Everything supplied is validated.
    pub fn from_sorted(
        symmetry: Symmetry,
        sectors: SectorArray,
        multiplicities: Vec<usize>,
        sector_perm: Option<Vec<usize>>,
        sorted_slices: Option<Vec<Range<usize>>>,
        opts: &SpaceOpts,
    ) -> Result<Self, SymError> {
        check_sectors(&symmetry, &sectors, opts.validate_sectors)?;
        check_multiplicities(sectors.len(), &multiplicities)?;
        if let Some(row) = sectors.first_unsorted_row() {
            return Err(order_error(&sectors, row));
        }
        let perm = sector_perm.unwrap_or_else(|| (0..sectors.len()).collect());
        if perm.len() != sectors.len() || !is_permutation(&perm) {
            return Err(SymError::validation(
                "invalid-permutation",
                "sector_perm is not a permutation of the sectors",
            )
            .with_context("num_sectors", sectors.len()));
        }
        let slices = match sorted_slices {
            Some(slices) => {
                check_sorted_slices(&symmetry, &sectors, &multiplicities, &perm, &slices)?;
                slices
            }
            None => {
                let inv = inverse_permutation(&perm);
                let dense = dense_slices(
                    &symmetry,
                    &sectors.permuted(&inv),
                    &permute(&multiplicities, &inv),
                );
                permute(&dense, &perm)
            }
        };
        Ok(Self::assemble(
            symmetry,
            opts.is_real,
            opts.is_dual,
            sectors,
            multiplicities,
            perm,
            slices,
        ))
    }

    /// One-dimensional blocks of the trivial symmetry, as a single sector of multiplicity `dim`.
    pub fn without_symmetry(dim: usize, opts: &SpaceOpts) -> Result<Self, SymError> {
        let symmetry = Symmetry::no_symmetry();
        let sectors = SectorArray::single(&symmetry.trivial_sector());
        Self::with_opts(symmetry, sectors, Some(vec![dim]), opts)
    }

    pub(crate) fn assemble(
        symmetry: Symmetry,
        is_real: bool,
        is_dual: bool,
        sectors: SectorArray,
        multiplicities: Vec<usize>,
        perm: Vec<usize>,
        slices: Vec<Range<usize>>,
    ) -> Self {
        let data =
            CanonicalData::assemble(symmetry, is_real, sectors, multiplicities, perm, slices);
        Self {
            data: Arc::new(data),
            is_dual,
        }
    }

    /// The symmetry grading this space.
    pub fn symmetry(&self) -> &Symmetry {
        &self.data.symmetry
    }

    /// Whether the space is real.
    pub fn is_real(&self) -> bool {
        self.data.is_real
    }

    /// Whether the space is a dual (bra) space.
    pub fn is_dual(&self) -> bool {
        self.is_dual
    }

    /// Total dimension, `Σ multiplicity × sector_dim`.
    pub fn dim(&self) -> usize {
        self.data.dim
    }

    /// Number of distinct sectors.
    pub fn num_sectors(&self) -> usize {
        self.data.sectors.len()
    }

    /// Sectors in public order, dualized for bra spaces.
    pub fn sectors(&self) -> &SectorArray {
        self.data.public_sectors[usize::from(self.is_dual)]
            .get_or_init(|| self.sorted_sectors().permuted(&self.data.inv_perm))
    }

    /// Multiplicities in public order.
    pub fn multiplicities(&self) -> &[usize] {
        &self.data.public_multiplicities
    }

    /// Slices in public order; contiguous, starting at 0.
    pub fn slices(&self) -> &[Range<usize>] {
        &self.data.public_slices
    }

    /// Canonical sectors: non-dual and strictly sorted.
    pub fn non_dual_sorted_sectors(&self) -> &SectorArray {
        &self.data.sectors
    }

    /// Canonical order, but with the duality of [`VectorSpace::sectors`].
    pub fn sorted_sectors(&self) -> &SectorArray {
        if !self.is_dual {
            return &self.data.sectors;
        }
        self.data
            .dual_sorted
            .get_or_init(|| self.data.symmetry.dual_sectors(&self.data.sectors))
    }

    /// Multiplicities in canonical order.
    pub fn sorted_multiplicities(&self) -> &[usize] {
        &self.data.multiplicities
    }

    /// Slices in canonical order.
    pub fn sorted_slices(&self) -> &[Range<usize>] {
        &self.data.slices
    }

    /// Permutation with `sorted_sectors()[k] == sectors()[sector_perm()[k]]`.
    pub fn sector_perm(&self) -> &[usize] {
        &self.data.perm
    }

    /// Inverse of [`VectorSpace::sector_perm`].
    pub fn inverse_sector_perm(&self) -> &[usize] {
        &self.data.inv_perm
    }

    fn maybe_dual(&self, sector: &[Charge]) -> Sector {
        if self.is_dual {
            self.data.symmetry.dual_sector(sector)
        } else {
            sector.to_vec()
        }
    }

    /// The `i`-th public sector.
    pub fn sector(&self, i: usize) -> Result<Sector, SymError> {
        if i >= self.num_sectors() {
            return Err(
                SymError::range("index-out-of-range", "sector index out of bounds")
                    .with_context("index", i)
                    .with_context("num_sectors", self.num_sectors()),
            );
        }
        Ok(self.maybe_dual(self.data.sectors.row(self.data.inv_perm[i])))
    }

    /// Splits a flat basis index into `(sector_idx, multiplicity_idx)` w.r.t. the public order.
    ///
    /// Negative indices count from the end.
    pub fn parse_index(&self, idx: isize) -> Result<(usize, usize), SymError> {
        let dim = isize::try_from(self.dim()).unwrap_or(isize::MAX);
        if idx < -dim || idx >= dim {
            return Err(SymError::range(
                "index-out-of-range",
                "flat index out of bounds for space",
            )
            .with_context("index", idx)
            .with_context("dim", self.dim()));
        }
        let idx = idx.rem_euclid(dim) as usize;
        let slices = self.slices();
        let sector_idx = slices.partition_point(|slice| slice.start <= idx) - 1;
        Ok((sector_idx, idx - slices[sector_idx].start))
    }

    /// Like [`VectorSpace::parse_index`], with the sector index w.r.t. the canonical order.
    pub fn sorted_parse_index(&self, idx: isize) -> Result<(usize, usize), SymError> {
        let (sector_idx, multiplicity_idx) = self.parse_index(idx)?;
        Ok((self.data.inv_perm[sector_idx], multiplicity_idx))
    }

    /// Sector that the `idx`-th basis element lives in.
    pub fn idx_to_sector(&self, idx: isize) -> Result<Sector, SymError> {
        let (k, _) = self.sorted_parse_index(idx)?;
        Ok(self.maybe_dual(self.data.sectors.row(k)))
    }

    /// Position `i` with `sectors()[i] == sector`.
    pub fn sectors_where(&self, sector: &[Charge]) -> Option<usize> {
        if !self.data.symmetry.is_valid_sector(sector) {
            return None;
        }
        let non_dual = self.maybe_dual(sector);
        self.non_dual_sorted_sectors_where(&non_dual)
            .map(|k| self.data.perm[k])
    }

    /// Position `k` with `non_dual_sorted_sectors()[k] == sector`.
    ///
    /// Panics if the canonical sectors contain `sector` twice.
    pub fn non_dual_sorted_sectors_where(&self, sector: &[Charge]) -> Option<usize> {
        let sectors = &self.data.sectors;
        if sector.len() != sectors.width() {
            return None;
        }
        let pos = sectors.binary_search(sector).ok()?;
        let repeated = (pos > 0 && sectors.row(pos - 1) == sector)
            || sectors.get(pos + 1) == Some(sector);
        assert!(!repeated, "canonical sectors contain {sector:?} more than once");
        Some(pos)
    }

    /// Multiplicity of a public sector, 0 if absent.
    pub fn sector_multiplicity(&self, sector: &[Charge]) -> usize {
        self.sectors_where(sector)
            .map_or(0, |i| self.data.public_multiplicities[i])
    }

    /// Multiplicity of a canonical (non-dual) sector, 0 if absent.
    pub fn non_dual_sector_multiplicity(&self, sector: &[Charge]) -> usize {
        self.non_dual_sorted_sectors_where(sector)
            .map_or(0, |k| self.data.multiplicities[k])
    }

    /// The dual space. Shares the canonical data.
    pub fn dual(&self) -> VectorSpace {
        Self {
            data: Arc::clone(&self.data),
            is_dual: !self.is_dual,
        }
    }

    /// Space with the same public sectors but opposite `is_dual`.
    ///
    /// The canonical sectors become the duals of the current ones and are re-sorted, so the
    /// result is equal to neither `self` nor `self.dual()`.
    pub fn flip_is_dual(&self) -> VectorSpace {
        let data = &self.data;
        let dual = data.symmetry.dual_sectors(&data.sectors);
        let perm = dual.lexsort_permutation();
        let slices = permute(&dense_slices(&data.symmetry, &dual, &data.multiplicities), &perm);
        Self::assemble(
            data.symmetry.clone(),
            data.is_real,
            !self.is_dual,
            dual.permuted(&perm),
            permute(&data.multiplicities, &perm),
            perm,
            slices,
        )
    }

    /// Equal to `other` or to `other.dual()`: same reality, symmetry, canonical sectors,
    /// multiplicities and sector permutation.
    pub fn is_equal_or_dual(&self, other: &VectorSpace) -> bool {
        if Arc::ptr_eq(&self.data, &other.data) {
            return true;
        }
        let (a, b) = (&self.data, &other.data);
        a.is_real == b.is_real
            && a.symmetry == b.symmetry
            && a.sectors == b.sectors
            && a.multiplicities == b.multiplicities
            && a.perm == b.perm
    }

    /// Whether the spaces have opposite duality and are otherwise equal.
    ///
    /// Compares canonical data only; use [`crate::Space::can_contract_with`] when either side
    /// may be a product.
    pub fn can_contract_with(&self, other: &VectorSpace) -> bool {
        self.is_dual != other.is_dual && self.is_equal_or_dual(other)
    }

    /// Exactly the trivial sector, once.
    pub fn is_trivial(&self) -> bool {
        self.num_sectors() == 1
            && self.data.multiplicities[0] == 1
            && self.data.sectors.row(0) == self.data.symmetry.trivial_sector().as_slice()
    }

    /// Number of linearly independent symmetric tensors: multiplicity of the trivial sector.
    pub fn num_parameters(&self) -> usize {
        // the trivial sector is self-dual
        self.non_dual_sector_multiplicity(&self.data.symmetry.trivial_sector())
    }

    /// Whether every sector of `self` appears in `other` with at least the same multiplicity.
    ///
    /// Spaces with different duality are never subspaces of each other.
    pub fn is_subspace_of(&self, other: &VectorSpace) -> bool {
        if self.is_dual != other.is_dual || self.data.symmetry != other.data.symmetry {
            return false;
        }
        let ours = &self.data.sectors;
        if ours.is_empty() {
            return true;
        }
        let mut n = 0;
        for (theirs, &their_mult) in other.data.sectors.rows().zip(&other.data.multiplicities) {
            match ours.row(n).cmp(theirs) {
                Ordering::Less => return false,
                Ordering::Greater => continue,
                Ordering::Equal => {
                    if self.data.multiplicities[n] > their_mult {
                        return false;
                    }
                    n += 1;
                    if n == ours.len() {
                        return true;
                    }
                }
            }
        }
        false
    }

    /// A plain copy of this space.
    pub fn to_vector_space(&self) -> VectorSpace {
        self.clone()
    }

    /// Re-checks every structural invariant of the canonical data.
    pub fn check_sanity(&self) -> Result<(), SymError> {
        let data = &self.data;
        check_sectors(&data.symmetry, &data.sectors, true)?;
        check_multiplicities(data.sectors.len(), &data.multiplicities)?;
        if !data.sectors.is_strictly_sorted() {
            return Err(sanity_error("canonical sectors strictly sorted"));
        }
        if data.perm.len() != data.sectors.len() || !is_permutation(&data.perm) {
            return Err(sanity_error("sector_perm is a permutation"));
        }
        if data.inv_perm != inverse_permutation(&data.perm) {
            return Err(sanity_error("inverse permutation matches sector_perm"));
        }
        let dim = check_sorted_slices(
            &data.symmetry,
            &data.sectors,
            &data.multiplicities,
            &data.perm,
            &data.slices,
        )?;
        if dim != data.dim {
            return Err(sanity_error("dim equals the end of the last slice"));
        }
        Ok(())
    }

    /// Stable SHA-256 fingerprint of the canonical JSON form.
    pub fn fingerprint(&self) -> Result<String, SymError> {
        stable_hash_string(self)
    }
}

impl PartialEq for VectorSpace {
    fn eq(&self, other: &Self) -> bool {
        self.is_dual == other.is_dual && self.is_equal_or_dual(other)
    }
}

impl Eq for VectorSpace {}
