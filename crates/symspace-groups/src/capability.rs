use serde::{Deserialize, Serialize};

use crate::symmetry::Symmetry;

/// Algebraic capabilities queried structurally.
///
/// A product symmetry has a capability iff every factor has it, so e.g. `U(1) ⨉ ℤ₃` is an
/// abelian group even though it is represented by [`Symmetry::Product`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    /// Described by a group acting faithfully on the Hilbert space. Excludes fermion parity.
    Group,
    /// An abelian group.
    AbelianGroup,
}

/// Whether `symmetry` is a group symmetry.
pub fn satisfies_group_capability(symmetry: &Symmetry) -> bool {
    symmetry.satisfies(Capability::Group)
}

/// Whether `symmetry` is an abelian group symmetry.
pub fn satisfies_abelian_group_capability(symmetry: &Symmetry) -> bool {
    symmetry.satisfies(Capability::AbelianGroup)
}
