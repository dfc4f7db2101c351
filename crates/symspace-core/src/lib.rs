#![deny(missing_docs)]
#![doc = "Sector primitives, structured errors and canonical serialization shared by the symspace crates."]

pub mod errors;
mod hash;
pub mod sector;
mod serde;

pub use errors::{ErrorInfo, SymError};
pub use hash::stable_hash_string;
pub use sector::{inverse_permutation, is_permutation, permute, Charge, Sector, SectorArray};
pub use self::serde::{from_json_slice, to_canonical_json_bytes};
