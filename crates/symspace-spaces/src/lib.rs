#![deny(missing_docs)]
#![doc = "Graded vector spaces over symspace symmetries and their left-to-right fused products."]

/// Read accessors of the underlying [`VectorSpace`] for types exposing `as_vector_space`.
///
/// Spaces with factor structure forward these explicitly instead of dereferencing, so a
/// product is never accepted where a plain space is expected.
macro_rules! forward_space_accessors {
    () => {
        /// See [`VectorSpace::symmetry`].
        pub fn symmetry(&self) -> &symspace_groups::Symmetry {
            self.as_vector_space().symmetry()
        }

        /// See [`VectorSpace::is_real`].
        pub fn is_real(&self) -> bool {
            self.as_vector_space().is_real()
        }

        /// See [`VectorSpace::is_dual`].
        pub fn is_dual(&self) -> bool {
            self.as_vector_space().is_dual()
        }

        /// See [`VectorSpace::dim`].
        pub fn dim(&self) -> usize {
            self.as_vector_space().dim()
        }

        /// See [`VectorSpace::num_sectors`].
        pub fn num_sectors(&self) -> usize {
            self.as_vector_space().num_sectors()
        }

        /// See [`VectorSpace::sectors`].
        pub fn sectors(&self) -> &symspace_core::SectorArray {
            self.as_vector_space().sectors()
        }

        /// See [`VectorSpace::multiplicities`].
        pub fn multiplicities(&self) -> &[usize] {
            self.as_vector_space().multiplicities()
        }

        /// See [`VectorSpace::slices`].
        pub fn slices(&self) -> &[std::ops::Range<usize>] {
            self.as_vector_space().slices()
        }

        /// See [`VectorSpace::non_dual_sorted_sectors`].
        pub fn non_dual_sorted_sectors(&self) -> &symspace_core::SectorArray {
            self.as_vector_space().non_dual_sorted_sectors()
        }

        /// See [`VectorSpace::sorted_sectors`].
        pub fn sorted_sectors(&self) -> &symspace_core::SectorArray {
            self.as_vector_space().sorted_sectors()
        }

        /// See [`VectorSpace::sorted_multiplicities`].
        pub fn sorted_multiplicities(&self) -> &[usize] {
            self.as_vector_space().sorted_multiplicities()
        }

        /// See [`VectorSpace::sorted_slices`].
        pub fn sorted_slices(&self) -> &[std::ops::Range<usize>] {
            self.as_vector_space().sorted_slices()
        }

        /// See [`VectorSpace::sector_perm`].
        pub fn sector_perm(&self) -> &[usize] {
            self.as_vector_space().sector_perm()
        }

        /// See [`VectorSpace::inverse_sector_perm`].
        pub fn inverse_sector_perm(&self) -> &[usize] {
            self.as_vector_space().inverse_sector_perm()
        }

        /// See [`VectorSpace::sector`].
        pub fn sector(
            &self,
            i: usize,
        ) -> Result<symspace_core::Sector, symspace_core::SymError> {
            self.as_vector_space().sector(i)
        }

        /// See [`VectorSpace::parse_index`].
        pub fn parse_index(
            &self,
            idx: isize,
        ) -> Result<(usize, usize), symspace_core::SymError> {
            self.as_vector_space().parse_index(idx)
        }

        /// See [`VectorSpace::sorted_parse_index`].
        pub fn sorted_parse_index(
            &self,
            idx: isize,
        ) -> Result<(usize, usize), symspace_core::SymError> {
            self.as_vector_space().sorted_parse_index(idx)
        }

        /// See [`VectorSpace::idx_to_sector`].
        pub fn idx_to_sector(
            &self,
            idx: isize,
        ) -> Result<symspace_core::Sector, symspace_core::SymError> {
            self.as_vector_space().idx_to_sector(idx)
        }

        /// See [`VectorSpace::sectors_where`].
        pub fn sectors_where(&self, sector: &[symspace_core::Charge]) -> Option<usize> {
            self.as_vector_space().sectors_where(sector)
        }

        /// See [`VectorSpace::non_dual_sorted_sectors_where`].
        pub fn non_dual_sorted_sectors_where(
            &self,
            sector: &[symspace_core::Charge],
        ) -> Option<usize> {
            self.as_vector_space().non_dual_sorted_sectors_where(sector)
        }

        /// See [`VectorSpace::sector_multiplicity`].
        pub fn sector_multiplicity(&self, sector: &[symspace_core::Charge]) -> usize {
            self.as_vector_space().sector_multiplicity(sector)
        }

        /// See [`VectorSpace::non_dual_sector_multiplicity`].
        pub fn non_dual_sector_multiplicity(&self, sector: &[symspace_core::Charge]) -> usize {
            self.as_vector_space().non_dual_sector_multiplicity(sector)
        }

        /// See [`VectorSpace::num_parameters`].
        pub fn num_parameters(&self) -> usize {
            self.as_vector_space().num_parameters()
        }
    };
}

mod fuse;
mod opts;
mod product_space;
pub mod slices;
mod space;
mod vector_space;

pub use fuse::{fuse_sectors, DefaultFusion, FuseBackend, FusionOutcome};
pub use opts::{ProductOpts, SpaceOpts};
pub use product_space::ProductSpace;
pub use space::Space;
pub use vector_space::VectorSpace;
