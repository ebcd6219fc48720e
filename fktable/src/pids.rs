//! Flavour-index convention of FK tables.
//!
//! FK tables store PDFs in the evolution basis. A flavour index `i` in `0..FLAVOURS` denotes the
//! `i`-th entry of [`EVOL_BASIS_IDS`].

/// Number of flavours in the basis of an FK table.
pub const FLAVOURS: usize = 14;

/// Particle IDs of the evolution basis, in the order used by FK tables. `22` is the photon, `21`
/// the gluon, `100` the singlet, `2xx` the valence and `1xx` the non-singlet triplet
/// combinations.
pub const EVOL_BASIS_IDS: [i32; FLAVOURS] = [
    22, 100, 21, 200, 203, 208, 215, 224, 235, 103, 108, 115, 124, 135,
];

const EVOL_BASIS_NAMES: [&str; FLAVOURS] = [
    "photon", "Sigma", "g", "V", "V3", "V8", "V15", "V24", "V35", "T3", "T8", "T15", "T24", "T35",
];

/// Returns the particle ID of the flavour with index `flavour`, or `None` if the index is outside
/// of the basis.
#[must_use]
pub fn evol_id(flavour: usize) -> Option<i32> {
    EVOL_BASIS_IDS.get(flavour).copied()
}

/// Returns a human-readable name of the flavour with index `flavour`.
#[must_use]
pub fn evol_name(flavour: usize) -> Option<&'static str> {
    EVOL_BASIS_NAMES.get(flavour).copied()
}

/// Inverse of [`evol_id`].
#[must_use]
pub fn flavour_index(id: i32) -> Option<usize> {
    EVOL_BASIS_IDS.iter().position(|&pid| pid == id)
}
