use serde::{Deserialize, Serialize};

/// How many distinct outcomes the fusion of two sectors may have.
///
/// Variants are ordered by severity; a product of symmetries takes the maximum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FusionStyle {
    /// Exactly one outcome, `a ⊗ b = c`. Abelian groups.
    Single,
    /// Every outcome appears at most once, `N^{ab}_c ∈ {0, 1}`.
    MultipleUnique,
    /// No assumption on `N^{ab}_c`.
    General,
}

/// Exchange statistics of the sectors.
///
/// Ordered by severity like [`FusionStyle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BraidingStyle {
    /// Symmetric braiding with trivial twist.
    Bosonic,
    /// Symmetric braiding with a parity dependent sign.
    Fermionic,
    /// Non-symmetric braiding.
    Anyonic,
    /// Braiding is not defined.
    NoBraiding,
}

/// Number of distinct sectors a symmetry admits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SectorCount {
    /// Finitely many sectors.
    Finite(u64),
    /// Unbounded sector labels (e.g. U(1) charges).
    Infinite,
}

impl SectorCount {
    /// Whether the count is finite.
    pub fn is_finite(&self) -> bool {
        matches!(self, SectorCount::Finite(_))
    }

    /// Count of sectors of a product symmetry.
    pub fn product(counts: impl IntoIterator<Item = SectorCount>) -> SectorCount {
        let mut total: u64 = 1;
        for count in counts {
            match count {
                SectorCount::Finite(n) => match total.checked_mul(n) {
                    Some(next) => total = next,
                    None => return SectorCount::Infinite,
                },
                SectorCount::Infinite => return SectorCount::Infinite,
            }
        }
        SectorCount::Finite(total)
    }
}
