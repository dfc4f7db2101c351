use serde::{Deserialize, Serialize};
use symspace_core::SymError;

use crate::product_space::ProductSpace;
use crate::vector_space::VectorSpace;

/// Either a plain space or a product space.
///
/// Factors of a [`ProductSpace`] are `Space`s, so products nest. Comparisons never match a
/// plain space against a product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Space {
    /// A plain graded space.
    Vector(VectorSpace),
    /// A fused product of factor spaces.
    Product(ProductSpace),
}

impl Space {
    /// The underlying graded space.
    pub fn as_vector_space(&self) -> &VectorSpace {
        match self {
            Space::Vector(space) => space,
            Space::Product(product) => product.as_vector_space(),
        }
    }

    forward_space_accessors!();

    /// The product structure, if any.
    pub fn as_product(&self) -> Option<&ProductSpace> {
        match self {
            Space::Product(product) => Some(product),
            Space::Vector(_) => None,
        }
    }

    /// Whether this is a product space.
    pub fn is_product(&self) -> bool {
        matches!(self, Space::Product(_))
    }

    /// See [`VectorSpace::dual`] and [`ProductSpace::dual`].
    pub fn dual(&self) -> Space {
        match self {
            Space::Vector(space) => Space::Vector(space.dual()),
            Space::Product(product) => Space::Product(product.dual()),
        }
    }

    /// See [`VectorSpace::flip_is_dual`] and [`ProductSpace::flip_is_dual`].
    pub fn flip_is_dual(&self) -> Space {
        match self {
            Space::Vector(space) => Space::Vector(space.flip_is_dual()),
            Space::Product(product) => Space::Product(product.flip_is_dual()),
        }
    }

    /// Contractibility; a plain space never contracts with a product.
    pub fn can_contract_with(&self, other: &Space) -> bool {
        match (self, other) {
            (Space::Vector(a), Space::Vector(b)) => a.can_contract_with(b),
            (Space::Product(a), Space::Product(b)) => a.can_contract_with(b),
            _ => false,
        }
    }

    /// See [`VectorSpace::is_trivial`] and [`ProductSpace::is_trivial`].
    pub fn is_trivial(&self) -> bool {
        match self {
            Space::Vector(space) => space.is_trivial(),
            Space::Product(product) => product.is_trivial(),
        }
    }

    /// Forgets any product structure.
    pub fn to_vector_space(&self) -> VectorSpace {
        self.as_vector_space().clone()
    }

    /// Checks all invariants, recursing into product factors.
    pub fn check_sanity(&self) -> Result<(), SymError> {
        match self {
            Space::Vector(space) => space.check_sanity(),
            Space::Product(product) => product.check_sanity(),
        }
    }

    /// Stable fingerprint covering the product structure.
    pub fn fingerprint(&self) -> Result<String, SymError> {
        symspace_core::stable_hash_string(self)
    }
}

impl From<VectorSpace> for Space {
    fn from(space: VectorSpace) -> Self {
        Space::Vector(space)
    }
}

impl From<ProductSpace> for Space {
    fn from(product: ProductSpace) -> Self {
        Space::Product(product)
    }
}
