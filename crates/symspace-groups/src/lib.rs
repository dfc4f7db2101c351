#![deny(missing_docs)]
#![doc = "Symmetry algebra for graded vector spaces: sector validity, fusion rules, duality and N-symbols."]

mod capability;
mod product;
mod style;
mod symmetry;

pub use capability::{
    satisfies_abelian_group_capability, satisfies_group_capability, Capability,
};
pub use product::ProductSymmetry;
pub use style::{BraidingStyle, FusionStyle, SectorCount};
pub use symmetry::Symmetry;

/// The trivial symmetry.
pub fn no_symmetry() -> Symmetry {
    Symmetry::NoSymmetry
}

/// U(1) charge conservation.
pub fn u1_symmetry() -> Symmetry {
    Symmetry::u1()
}

/// SU(2) with doubled-spin sector labels.
pub fn su2_symmetry() -> Symmetry {
    Symmetry::su2()
}

/// Fermionic parity.
pub fn fermion_parity() -> Symmetry {
    Symmetry::FermionParity
}

macro_rules! zn_constructors {
    ($($fn_name:ident => $n:expr),* $(,)?) => {
        $(
            #[doc = concat!("The cyclic group Z_", stringify!($n), ".")]
            pub fn $fn_name() -> Symmetry {
                Symmetry::ZN { n: $n, name: None }
            }
        )*
    };
}

zn_constructors! {
    z2_symmetry => 2,
    z3_symmetry => 3,
    z4_symmetry => 4,
    z5_symmetry => 5,
    z6_symmetry => 6,
    z7_symmetry => 7,
    z8_symmetry => 8,
    z9_symmetry => 9,
}
