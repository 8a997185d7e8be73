//! Angular momentum: spherical harmonics, their rotation matrices and their coupling.

use phf::phf_map;

pub mod clebsch_gordan;
pub mod sh_conversion;
pub mod sh_rotation_3d;
pub mod spherical_harmonics;

/// Alphabetical labels of angular momenta.
pub static ANGMOM_LABELS: [&str; 7] = ["S", "P", "D", "F", "G", "H", "I"];

/// Indices of alphabetical labels of angular momenta.
pub static ANGMOM_INDICES: phf::Map<&'static str, u32> = phf_map! {
    "S" => 0,
    "P" => 1,
    "D" => 2,
    "F" => 3,
    "G" => 4,
    "H" => 5,
    "I" => 6,
};

/// Returns the label of a degree: the spectroscopic letter if there is one, and `L<l>`
/// otherwise.
pub fn degree_label(l: u32) -> String {
    usize::try_from(l)
        .ok()
        .and_then(|li| ANGMOM_LABELS.get(li))
        .map_or_else(|| format!("L{l}"), |label| (*label).to_string())
}

/// Parses a label produced by [`degree_label`] back into a degree.
pub fn parse_degree_label(label: &str) -> Option<u32> {
    ANGMOM_INDICES.get(label).copied().or_else(|| {
        label
            .strip_prefix('L')
            .and_then(|digits| digits.parse::<u32>().ok())
    })
}

/// Returns the dimension $`2l + 1`$ of the carrier space of degree $`l`$.
#[must_use]
pub fn degree_dim(l: u32) -> usize {
    2 * l as usize + 1
}
