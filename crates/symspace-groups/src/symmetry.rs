use std::fmt;
use std::ops::Mul;

use serde::{Deserialize, Deserializer, Serialize};
use symspace_core::{Charge, Sector, SectorArray, SymError};

use crate::capability::Capability;
use crate::product::ProductSymmetry;
use crate::style::{BraidingStyle, FusionStyle, SectorCount};

/// Symmetry imposing a block structure on tensors.
///
/// The set of supported algebras is closed; every operation dispatches over the variants.
/// Prefer the constructors ([`Symmetry::u1`], [`Symmetry::zn`], ...) over building variants
/// by hand, since they enforce the domain of the parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Symmetry {
    /// Trivial symmetry with the single sector `[0]`.
    NoSymmetry,
    /// U(1) charge conservation, sectors `[n]` for any integer `n` with `|n| <= Charge::MAX`.
    U1 {
        /// Optional descriptive name (e.g. "Sz").
        #[serde(default)]
        name: Option<String>,
    },
    /// Cyclic group Z_N, sectors `[0]`, ..., `[N-1]`.
    ///
    /// An order below 2 has no valid sectors; [`Symmetry::zn`] rejects it.
    #[serde(rename = "zn")]
    ZN {
        /// Order of the group; at least 2.
        #[serde(deserialize_with = "deserialize_order")]
        n: Charge,
        /// Optional descriptive name.
        #[serde(default)]
        name: Option<String>,
    },
    /// SU(2), sectors `[jj]` with `jj = 2 * spin >= 0`.
    #[serde(rename = "su2")]
    SU2 {
        /// Optional descriptive name.
        #[serde(default)]
        name: Option<String>,
    },
    /// Fermionic parity, sectors `[0]` (even) and `[1]` (odd).
    FermionParity,
    /// Product of several non-product symmetries.
    Product(ProductSymmetry),
}

fn deserialize_order<'de, D>(deserializer: D) -> Result<Charge, D::Error>
where
    D: Deserializer<'de>,
{
    let n = Charge::deserialize(deserializer)?;
    if n < 2 {
        return Err(serde::de::Error::custom(format!("invalid Z_N order {n}")));
    }
    Ok(n)
}

fn subscript(n: Charge) -> String {
    const DIGITS: [char; 10] = ['₀', '₁', '₂', '₃', '₄', '₅', '₆', '₇', '₈', '₉'];
    n.to_string()
        .chars()
        .filter_map(|c| c.to_digit(10).map(|d| DIGITS[d as usize]))
        .collect()
}

/// `value mod n`; orders below 1 reduce everything to 0.
fn reduce_mod(value: i128, n: Charge) -> Charge {
    let n = i128::from(n.max(1));
    // the remainder lies in 0..n and fits a charge
    value.rem_euclid(n) as Charge
}

fn overflow_error(symmetry: &Symmetry, a: &[Charge], b: &[Charge]) -> SymError {
    SymError::range("charge-overflow", "fused charge leaves the representable range")
        .with_context("symmetry", symmetry)
        .with_context("left", format!("{a:?}"))
        .with_context("right", format!("{b:?}"))
}

pub(crate) fn shape_error(symmetry: &Symmetry, sector: &[Charge]) -> SymError {
    SymError::validation("sector-shape", "sector has the wrong number of charges")
        .with_context("symmetry", symmetry)
        .with_context("expected", symmetry.sector_ind_len())
        .with_context("found", sector.len())
}

impl Symmetry {
    /// The trivial symmetry.
    pub fn no_symmetry() -> Self {
        Symmetry::NoSymmetry
    }

    /// U(1) symmetry.
    pub fn u1() -> Self {
        Symmetry::U1 { name: None }
    }

    /// Z_N symmetry; `n` must be at least 2.
    pub fn zn(n: Charge) -> Result<Self, SymError> {
        if n < 2 {
            return Err(
                SymError::validation("invalid-order", "Z_N requires N >= 2").with_context("n", n)
            );
        }
        Ok(Symmetry::ZN { n, name: None })
    }

    /// SU(2) symmetry with doubled-spin sector labels.
    pub fn su2() -> Self {
        Symmetry::SU2 { name: None }
    }

    /// Fermionic parity.
    pub fn fermion_parity() -> Self {
        Symmetry::FermionParity
    }

    /// Product of the given symmetries, see [`ProductSymmetry::new`].
    pub fn product(factors: Vec<Symmetry>) -> Result<Self, SymError> {
        Ok(Symmetry::Product(ProductSymmetry::new(factors)?))
    }

    /// Attaches a descriptive name.
    ///
    /// Only U(1), Z_N and SU(2) carry names; products derive theirs from the factors.
    pub fn with_name(self, name: impl Into<String>) -> Result<Self, SymError> {
        let name = Some(name.into());
        match self {
            Symmetry::U1 { .. } => Ok(Symmetry::U1 { name }),
            Symmetry::ZN { n, .. } => Ok(Symmetry::ZN { n, name }),
            Symmetry::SU2 { .. } => Ok(Symmetry::SU2 { name }),
            other => Err(SymError::validation(
                "unnamed-symmetry",
                "this symmetry does not accept a descriptive name",
            )
            .with_context("symmetry", other.group_name())),
        }
    }

    /// Descriptive name, if any. Ignored by [`Symmetry::is_same_symmetry`].
    pub fn descriptive_name(&self) -> Option<&str> {
        match self {
            Symmetry::U1 { name } | Symmetry::ZN { name, .. } | Symmetry::SU2 { name } => {
                name.as_deref()
            }
            Symmetry::Product(product) => product.descriptive_name(),
            Symmetry::NoSymmetry | Symmetry::FermionParity => None,
        }
    }

    /// Name of the underlying group, e.g. `"U(1)"` or `"ℤ₄"`.
    pub fn group_name(&self) -> String {
        match self {
            Symmetry::NoSymmetry => "NoSymmetry".to_string(),
            Symmetry::U1 { .. } => "U(1)".to_string(),
            Symmetry::ZN { n, .. } => format!("ℤ{}", subscript(*n)),
            Symmetry::SU2 { .. } => "SU(2)".to_string(),
            Symmetry::FermionParity => "FermionParity".to_string(),
            Symmetry::Product(product) => product
                .factors()
                .iter()
                .map(Symmetry::group_name)
                .collect::<Vec<_>>()
                .join(" ⨉ "),
        }
    }

    /// Fusion style of the symmetry.
    pub fn fusion_style(&self) -> FusionStyle {
        match self {
            Symmetry::SU2 { .. } => FusionStyle::MultipleUnique,
            Symmetry::Product(product) => product.fusion_style(),
            _ => FusionStyle::Single,
        }
    }

    /// Braiding style of the symmetry.
    pub fn braiding_style(&self) -> BraidingStyle {
        match self {
            Symmetry::FermionParity => BraidingStyle::Fermionic,
            Symmetry::Product(product) => product.braiding_style(),
            _ => BraidingStyle::Bosonic,
        }
    }

    /// Whether every fusion has a single outcome.
    pub fn is_abelian(&self) -> bool {
        self.fusion_style() == FusionStyle::Single
    }

    /// Number of distinct sectors.
    pub fn sector_count(&self) -> SectorCount {
        match self {
            Symmetry::NoSymmetry => SectorCount::Finite(1),
            Symmetry::U1 { .. } | Symmetry::SU2 { .. } => SectorCount::Infinite,
            Symmetry::ZN { n, .. } => SectorCount::Finite(u64::try_from(*n).unwrap_or(0)),
            Symmetry::FermionParity => SectorCount::Finite(2),
            Symmetry::Product(product) => {
                SectorCount::product(product.factors().iter().map(Symmetry::sector_count))
            }
        }
    }

    /// How many charges label one sector.
    pub fn sector_ind_len(&self) -> usize {
        match self {
            Symmetry::Product(product) => product.sector_ind_len(),
            _ => 1,
        }
    }

    /// The fusion identity.
    pub fn trivial_sector(&self) -> Sector {
        match self {
            Symmetry::Product(product) => product
                .factors()
                .iter()
                .flat_map(Symmetry::trivial_sector)
                .collect(),
            _ => vec![0],
        }
    }

    /// Whether `a` is a valid sector of this symmetry.
    pub fn is_valid_sector(&self, a: &[Charge]) -> bool {
        if a.len() != self.sector_ind_len() {
            return false;
        }
        match self {
            Symmetry::NoSymmetry => a[0] == 0,
            Symmetry::U1 { .. } => a[0] != Charge::MIN,
            Symmetry::ZN { n, .. } => *n >= 2 && (0..*n).contains(&a[0]),
            Symmetry::SU2 { .. } => a[0] >= 0,
            Symmetry::FermionParity => a[0] == 0 || a[0] == 1,
            Symmetry::Product(product) => product
                .factors()
                .iter()
                .enumerate()
                .all(|(i, factor)| factor.is_valid_sector(product.factor_sector(a, i))),
        }
    }

    /// Checks `a` with [`Symmetry::is_valid_sector`] and reports the offending sector.
    pub fn validate_sector(&self, a: &[Charge]) -> Result<(), SymError> {
        if a.len() != self.sector_ind_len() {
            return Err(shape_error(self, a));
        }
        if let Some(n) = self.factors().iter().find_map(|f| match f {
            Symmetry::ZN { n, .. } if *n < 2 => Some(*n),
            _ => None,
        }) {
            return Err(
                SymError::validation("invalid-order", "Z_N requires N >= 2").with_context("n", n)
            );
        }
        if !self.is_valid_sector(a) {
            return Err(
                SymError::validation("invalid-sector", "sector is not valid for this symmetry")
                    .with_context("symmetry", self)
                    .with_context("sector", format!("{a:?}")),
            );
        }
        Ok(())
    }

    fn check_shapes(&self, sectors: &[&[Charge]]) -> Result<(), SymError> {
        match sectors.iter().find(|s| s.len() != self.sector_ind_len()) {
            Some(bad) => Err(shape_error(self, bad)),
            None => Ok(()),
        }
    }

    /// All distinct sectors `c` with `N^{ab}_c > 0`, each listed once.
    ///
    /// Fails with `charge-overflow` when an outcome is not a representable sector.
    pub fn fusion_outcomes(&self, a: &[Charge], b: &[Charge]) -> Result<SectorArray, SymError> {
        self.check_shapes(&[a, b])?;
        self.fusion_outcomes_unchecked(a, b)
    }

    /// [`Symmetry::fusion_outcomes`] without the shape check.
    ///
    /// The caller guarantees that both sectors have `sector_ind_len` charges.
    pub fn fusion_outcomes_unchecked(
        &self,
        a: &[Charge],
        b: &[Charge],
    ) -> Result<SectorArray, SymError> {
        let sum = i128::from(a[0]) + i128::from(b[0]);
        match self {
            Symmetry::NoSymmetry => Ok(SectorArray::single(a)),
            Symmetry::U1 { .. } => match a[0].checked_add(b[0]) {
                Some(c) if c != Charge::MIN => Ok(SectorArray::single(&[c])),
                _ => Err(overflow_error(self, a, b)),
            },
            Symmetry::ZN { n, .. } => Ok(SectorArray::single(&[reduce_mod(sum, *n)])),
            Symmetry::FermionParity => Ok(SectorArray::single(&[reduce_mod(sum, 2)])),
            Symmetry::SU2 { .. } => {
                // J_tot = |J1 - J2|, ..., J1 + J2
                let high = Charge::try_from(sum).map_err(|_| overflow_error(self, a, b))?;
                let low = (i128::from(a[0]) - i128::from(b[0])).abs();
                let count = usize::try_from((sum - low) / 2 + 1).unwrap_or(0);
                let mut out = SectorArray::with_capacity(1, count);
                let mut jj = low;
                while jj <= i128::from(high) {
                    out.push(&[jj as Charge])?;
                    jj += 2;
                }
                Ok(out)
            }
            Symmetry::Product(product) => product.fusion_outcomes(a, b),
        }
    }

    /// Element-wise fusion of two equally long sector tables.
    ///
    /// Only defined for [`FusionStyle::Single`], where every pair has a unique outcome.
    pub fn fusion_outcomes_broadcast(
        &self,
        a: &SectorArray,
        b: &SectorArray,
    ) -> Result<SectorArray, SymError> {
        if self.fusion_style() != FusionStyle::Single {
            return Err(SymError::unsupported(
                "non-single-fusion",
                "broadcast fusion requires a single fusion outcome per pair",
            )
            .with_context("symmetry", self));
        }
        if a.len() != b.len() {
            return Err(
                SymError::validation("batch-length", "sector tables differ in length")
                    .with_context("left", a.len())
                    .with_context("right", b.len()),
            );
        }
        if a.width() != self.sector_ind_len() || b.width() != self.sector_ind_len() {
            return Err(
                SymError::validation("sector-shape", "sector table has the wrong width")
                    .with_context("symmetry", self)
                    .with_context("expected", self.sector_ind_len()),
            );
        }
        self.broadcast_unchecked(a, b)
    }

    pub(crate) fn broadcast_unchecked(
        &self,
        a: &SectorArray,
        b: &SectorArray,
    ) -> Result<SectorArray, SymError> {
        match self {
            Symmetry::Product(product) => product.fusion_outcomes_broadcast(a, b),
            _ => {
                let mut out = SectorArray::with_capacity(a.width(), a.len());
                for (s_a, s_b) in a.rows().zip(b.rows()) {
                    out.extend_from(&self.fusion_outcomes_unchecked(s_a, s_b)?)?;
                }
                Ok(out)
            }
        }
    }

    /// Dimension of the irrep labelled by `a`.
    pub fn sector_dim(&self, a: &[Charge]) -> usize {
        match self {
            // dim = 2 * J + 1 = jj + 1
            Symmetry::SU2 { .. } => usize::try_from(a[0] + 1).unwrap_or(0),
            Symmetry::Product(product) => product.sector_dim(a),
            _ => 1,
        }
    }

    /// [`Symmetry::sector_dim`] for every row of `sectors`.
    pub fn batch_sector_dim(&self, sectors: &SectorArray) -> Vec<usize> {
        if self.is_abelian() {
            return vec![1; sectors.len()];
        }
        sectors.rows().map(|a| self.sector_dim(a)).collect()
    }

    /// The sector `dual(a)` with `N^{a, dual(a)}_{trivial} = 1`.
    ///
    /// Valid sectors map to valid sectors; `Charge::MIN`, which is not a U(1) sector, maps to
    /// itself.
    pub fn dual_sector(&self, a: &[Charge]) -> Sector {
        match self {
            Symmetry::U1 { .. } => vec![a[0].wrapping_neg()],
            Symmetry::ZN { n, .. } => vec![reduce_mod(-i128::from(a[0]), *n)],
            Symmetry::Product(product) => product.dual_sector(a),
            Symmetry::NoSymmetry | Symmetry::SU2 { .. } | Symmetry::FermionParity => a.to_vec(),
        }
    }

    /// [`Symmetry::dual_sector`] for every row of `sectors`.
    pub fn dual_sectors(&self, sectors: &SectorArray) -> SectorArray {
        match self {
            Symmetry::NoSymmetry | Symmetry::SU2 { .. } | Symmetry::FermionParity => {
                sectors.clone()
            }
            Symmetry::Product(product) => product.dual_sectors(sectors),
            Symmetry::U1 { .. } => sectors.map_charges(Charge::wrapping_neg),
            Symmetry::ZN { n, .. } => sectors.map_charges(|c| reduce_mod(-i128::from(c), *n)),
        }
    }

    /// The N-symbol `N^{ab}_c`: how often `c` appears in `a ⊗ b`.
    ///
    /// Not available for SU(2) (and products containing it) yet.
    pub fn n_symbol(&self, a: &[Charge], b: &[Charge], c: &[Charge]) -> Result<usize, SymError> {
        self.check_shapes(&[a, b, c])?;
        self.n_symbol_unchecked(a, b, c)
    }

    pub(crate) fn n_symbol_unchecked(
        &self,
        a: &[Charge],
        b: &[Charge],
        c: &[Charge],
    ) -> Result<usize, SymError> {
        match self {
            Symmetry::SU2 { .. } => Err(SymError::unsupported(
                "n-symbol-unimplemented",
                "SU(2) N-symbols are not implemented",
            )
            .with_hint("use fusion_multiplicity for outcomes listed by fusion_outcomes")),
            Symmetry::Product(product) => product.n_symbol(a, b, c),
            _ => {
                let outcome = self.fusion_outcomes_unchecked(a, b)?;
                Ok(usize::from(outcome.row(0) == c))
            }
        }
    }

    /// Multiplicity of an outcome `c` that was listed by [`Symmetry::fusion_outcomes`].
    ///
    /// For [`FusionStyle::Single`] and [`FusionStyle::MultipleUnique`] this is 1 by definition;
    /// only general fusion consults [`Symmetry::n_symbol`].
    pub fn fusion_multiplicity(
        &self,
        a: &[Charge],
        b: &[Charge],
        c: &[Charge],
    ) -> Result<usize, SymError> {
        match self.fusion_style() {
            FusionStyle::Single | FusionStyle::MultipleUnique => Ok(1),
            FusionStyle::General => self.n_symbol_unchecked(a, b, c),
        }
    }

    /// All sectors of a symmetry with finitely many of them.
    pub fn all_sectors(&self) -> Result<SectorArray, SymError> {
        let infinite = || {
            SymError::unsupported("infinite-sectors", "symmetry has infinitely many sectors")
                .with_context("symmetry", self)
        };
        match self {
            Symmetry::NoSymmetry => Ok(SectorArray::single(&[0])),
            Symmetry::ZN { n, .. } => SectorArray::from_flat(1, (0..*n).collect()),
            Symmetry::FermionParity => SectorArray::from_flat(1, vec![0, 1]),
            Symmetry::U1 { .. } | Symmetry::SU2 { .. } => Err(infinite()),
            Symmetry::Product(product) => {
                if !self.sector_count().is_finite() {
                    return Err(infinite());
                }
                product.all_sectors()
            }
        }
    }

    /// Whether `self` and `other` describe the same mathematical structure.
    ///
    /// Descriptive names are ignored.
    pub fn is_same_symmetry(&self, other: &Symmetry) -> bool {
        match (self, other) {
            (Symmetry::NoSymmetry, Symmetry::NoSymmetry)
            | (Symmetry::U1 { .. }, Symmetry::U1 { .. })
            | (Symmetry::SU2 { .. }, Symmetry::SU2 { .. })
            | (Symmetry::FermionParity, Symmetry::FermionParity) => true,
            (Symmetry::ZN { n: n1, .. }, Symmetry::ZN { n: n2, .. }) => n1 == n2,
            (Symmetry::Product(p1), Symmetry::Product(p2)) => {
                p1.factors().len() == p2.factors().len()
                    && p1
                        .factors()
                        .iter()
                        .zip(p2.factors())
                        .all(|(f1, f2)| f1.is_same_symmetry(f2))
            }
            _ => false,
        }
    }

    /// Structural capability query, see [`Capability`].
    pub fn satisfies(&self, capability: Capability) -> bool {
        match self {
            Symmetry::Product(product) => product.factors().iter().all(|f| f.satisfies(capability)),
            Symmetry::NoSymmetry | Symmetry::U1 { .. } | Symmetry::ZN { .. } => true,
            Symmetry::SU2 { .. } => capability == Capability::Group,
            Symmetry::FermionParity => false,
        }
    }

    /// Factors of a product, or `self` alone.
    pub fn factors(&self) -> &[Symmetry] {
        match self {
            Symmetry::Product(product) => product.factors(),
            other => std::slice::from_ref(other),
        }
    }
}

impl PartialEq for Symmetry {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Symmetry::Product(p1), Symmetry::Product(p2)) => p1.factors() == p2.factors(),
            _ => {
                self.descriptive_name() == other.descriptive_name() && self.is_same_symmetry(other)
            }
        }
    }
}

impl Eq for Symmetry {}

impl fmt::Display for Symmetry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Symmetry::Product(product) => {
                for (idx, factor) in product.factors().iter().enumerate() {
                    if idx > 0 {
                        write!(f, " ⨉ ")?;
                    }
                    write!(f, "{factor}")?;
                }
                Ok(())
            }
            other => {
                write!(f, "{}", other.group_name())?;
                if let Some(name) = other.descriptive_name() {
                    write!(f, "(\"{name}\")")?;
                }
                Ok(())
            }
        }
    }
}

impl Mul for &Symmetry {
    type Output = Symmetry;

    /// Product symmetry; nested products are flattened.
    fn mul(self, rhs: &Symmetry) -> Symmetry {
        let factors: Vec<Symmetry> = self.factors().iter().chain(rhs.factors()).cloned().collect();
        Symmetry::Product(ProductSymmetry::from_flat_factors(factors))
    }
}
