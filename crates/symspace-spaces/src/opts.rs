use serde::{Deserialize, Serialize};

fn default_validate_sectors() -> bool {
    true
}

/// Options controlling [`crate::VectorSpace`] construction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpaceOpts {
    /// Whether the space is a real vector space.
    #[serde(default)]
    pub is_real: bool,
    /// Whether the space is a dual (bra) space. Input sectors are always the non-dual labels.
    #[serde(default)]
    pub is_dual: bool,
    /// Run [`symspace_groups::Symmetry::is_valid_sector`] on every input row.
    ///
    /// Shape and uniqueness are checked regardless.
    #[serde(default = "default_validate_sectors")]
    pub validate_sectors: bool,
}

impl Default for SpaceOpts {
    fn default() -> Self {
        Self {
            is_real: false,
            is_dual: false,
            validate_sectors: default_validate_sectors(),
        }
    }
}

/// Options controlling [`crate::ProductSpace`] construction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductOpts {
    /// Duality of the product; `None` takes the duality of the first factor.
    #[serde(default)]
    pub is_dual: Option<bool>,
    /// Re-run the default fusion and reject backend results that disagree with it.
    #[serde(default)]
    pub verify_fusion: bool,
}
