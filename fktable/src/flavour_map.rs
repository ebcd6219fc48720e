//! Provides the [`FlavourMap`] type, which maps active-flavour indices to flavours.

use super::error::{Error, Result};
use super::pids::{self, FLAVOURS};
use itertools::Itertools;
use std::fmt::{self, Display, Formatter};

/// The flavours (DIS) or flavour pairs (hadronic) that are stored in an FK table. The position of
/// an entry is its *active-flavour index*, which is distinct from the flavour index in
/// `0..FLAVOURS`.
///
/// In the header of a table the map is stored as bit vector (DIS) or row-major bit matrix
/// (hadronic) of `0` and `1` tokens. Entries appear in the order of that scan.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum FlavourMap {
    /// Single flavours of a DIS table.
    Dis(Vec<usize>),
    /// Flavour pairs of a hadronic table.
    Hadronic(Vec<(usize, usize)>),
}

impl FlavourMap {
    /// Decodes the bit vector or matrix `blob`.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Range`] if `blob` contains fewer than `FLAVOURS` (DIS) or
    /// `FLAVOURS * FLAVOURS` (hadronic) entries, or tokens other than `0` and `1`.
    pub fn from_blob(blob: &str, hadronic: bool) -> Result<Self> {
        let size = if hadronic { FLAVOURS * FLAVOURS } else { FLAVOURS };
        let mask: Vec<bool> = blob
            .split_whitespace()
            .take(size)
            .map(|token| match token {
                "1" => Ok(true),
                "0" => Ok(false),
                _ => Err(Error::Range(format!(
                    "flavour map formatting error: unexpected token `{token}`"
                ))),
            })
            .collect::<Result<_>>()?;

        if mask.len() != size {
            return Err(Error::Range(format!(
                "flavour map formatting error: expected {size} entries, found {}",
                mask.len()
            )));
        }

        let active = mask
            .into_iter()
            .enumerate()
            .filter_map(|(index, bit)| bit.then_some(index));

        Ok(if hadronic {
            Self::Hadronic(
                active
                    .map(|index| (index / FLAVOURS, index % FLAVOURS))
                    .collect(),
            )
        } else {
            Self::Dis(active.collect())
        })
    }

    /// Encodes this map as bit vector (DIS) or bit matrix (hadronic), with one row per line.
    #[must_use]
    pub fn to_blob(&self) -> String {
        match self {
            Self::Dis(flavours) => (0..FLAVOURS)
                .map(|fl| u8::from(flavours.contains(&fl)))
                .join(" "),
            Self::Hadronic(pairs) => (0..FLAVOURS)
                .map(|fl1| {
                    (0..FLAVOURS)
                        .map(|fl2| u8::from(pairs.contains(&(fl1, fl2))))
                        .join(" ")
                })
                .join("\n"),
        }
    }

    /// Returns `true` if this is the map of a hadronic table.
    #[must_use]
    pub const fn is_hadronic(&self) -> bool {
        matches!(self, Self::Hadronic(_))
    }

    /// Returns the number of active flavours.
    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            Self::Dis(flavours) => flavours.len(),
            Self::Hadronic(pairs) => pairs.len(),
        }
    }

    /// Returns `true` if no flavour is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the active-flavour index of the DIS flavour `flavour`.
    #[must_use]
    pub fn position_dis(&self, flavour: usize) -> Option<usize> {
        match self {
            Self::Dis(flavours) => flavours.iter().position(|&fl| fl == flavour),
            Self::Hadronic(_) => None,
        }
    }

    /// Returns the active-flavour index of the hadronic flavour pair `(flavour1, flavour2)`.
    #[must_use]
    pub fn position_hadronic(&self, flavour1: usize, flavour2: usize) -> Option<usize> {
        match self {
            Self::Dis(_) => None,
            Self::Hadronic(pairs) => pairs.iter().position(|&pair| pair == (flavour1, flavour2)),
        }
    }

    /// Offset of the value belonging to the active flavour `index` on a data line, counted from
    /// the first token of the line.
    pub(crate) fn column(&self, index: usize) -> usize {
        match self {
            Self::Dis(flavours) => flavours[index] + 2,
            Self::Hadronic(pairs) => {
                let (fl1, fl2) = pairs[index];
                FLAVOURS * fl1 + fl2 + 3
            }
        }
    }

    /// Returns a map containing only the entries for which `keep` is `true`. `keep` is indexed by
    /// the active-flavour index.
    #[must_use]
    pub fn retain(&self, keep: &[bool]) -> Self {
        match self {
            Self::Dis(flavours) => Self::Dis(
                flavours
                    .iter()
                    .zip(keep)
                    .filter_map(|(&fl, &keep)| keep.then_some(fl))
                    .collect(),
            ),
            Self::Hadronic(pairs) => Self::Hadronic(
                pairs
                    .iter()
                    .zip(keep)
                    .filter_map(|(&pair, &keep)| keep.then_some(pair))
                    .collect(),
            ),
        }
    }
}

impl Display for FlavourMap {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        let name = |fl| pids::evol_name(fl).unwrap_or("?");

        match self {
            Self::Dis(flavours) => write!(f, "{}", flavours.iter().map(|&fl| name(fl)).join(", ")),
            Self::Hadronic(pairs) => write!(
                f,
                "{}",
                pairs
                    .iter()
                    .map(|&(fl1, fl2)| format!("({}, {})", name(fl1), name(fl2)))
                    .join(", ")
            ),
        }
    }
}
