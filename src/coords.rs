//! Coordinate name normalization.
//!
//! Incoming variables may spell their axes `latitude`, `longitude`, `height` or
//! `frequency`. Everything downstream only knows the canonical names
//! `time`, `level`, `lat` and `lon`, so arrays pass through [`normalize`] first.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::array::LabeledArray;
use crate::error::{EcubevisError, Result};

/// The canonical coordinate vocabulary
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CoordKind {
    Time,
    Level,
    Lat,
    Lon,
}

impl CoordKind {
    pub const ALL: [CoordKind; 4] = [CoordKind::Time, CoordKind::Level, CoordKind::Lat, CoordKind::Lon];

    pub fn as_str(&self) -> &'static str {
        match self {
            CoordKind::Time => "time",
            CoordKind::Level => "level",
            CoordKind::Lat => "lat",
            CoordKind::Lon => "lon",
        }
    }
}

impl fmt::Display for CoordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CoordKind {
    type Err = EcubevisError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        CoordKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| EcubevisError::InvalidParameter {
                param: "coordinate".to_string(),
                message: format!("'{}' is not a canonical coordinate name", s),
            })
    }
}

/// Mapping from alternate axis spellings to canonical coordinates.
///
/// Passed explicitly to [`normalize`]; `Default` yields the standard mapping
/// (latitude, longitude, height, frequency).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoordinateVocabulary {
    pub alternates: BTreeMap<String, CoordKind>,
}

impl Default for CoordinateVocabulary {
    fn default() -> Self {
        let alternates = [
            ("latitude", CoordKind::Lat),
            ("longitude", CoordKind::Lon),
            ("height", CoordKind::Level),
            ("frequency", CoordKind::Time),
        ]
        .into_iter()
        .map(|(name, kind)| (name.to_string(), kind))
        .collect();
        Self { alternates }
    }
}

impl CoordinateVocabulary {
    /// Canonical coordinate for `name`, whether it is canonical or an alternate
    pub fn resolve(&self, name: &str) -> Option<CoordKind> {
        CoordKind::from_str(name)
            .ok()
            .or_else(|| self.alternates.get(name).copied())
    }

    /// Every accepted name: canonical names first, then alternates
    pub fn accepted_names(&self) -> Vec<String> {
        CoordKind::ALL
            .iter()
            .map(|kind| kind.as_str().to_string())
            .chain(self.alternates.keys().cloned())
            .collect()
    }

    /// Alternates must not shadow canonical names
    pub fn validate(&self) -> Result<()> {
        for name in self.alternates.keys() {
            if CoordKind::from_str(name).is_ok() {
                return Err(EcubevisError::Config {
                    message: format!("Alternate coordinate name '{}' is already canonical", name),
                });
            }
        }
        Ok(())
    }
}

/// Rename alternate coordinate names to their canonical form.
///
/// Every name is checked before anything is renamed, so a failure leaves no
/// partially renamed result behind. Data values and attributes are untouched.
pub fn normalize(mut array: LabeledArray, vocabulary: &CoordinateVocabulary) -> Result<LabeledArray> {
    let mut resolved: Vec<CoordKind> = Vec::with_capacity(array.coords.len());

    for (i, coord) in array.coords.iter().enumerate() {
        let kind = vocabulary
            .resolve(&coord.name)
            .ok_or_else(|| EcubevisError::UnknownCoordinate {
                name: coord.name.clone(),
                accepted: vocabulary.accepted_names(),
            })?;

        if let Some(j) = resolved.iter().position(|&k| k == kind) {
            return Err(EcubevisError::DuplicateCoordinate {
                first: array.coords[j].name.clone(),
                second: array.coords[i].name.clone(),
                canonical: kind.to_string(),
            });
        }
        resolved.push(kind);
    }

    for (coord, kind) in array.coords.iter_mut().zip(resolved) {
        if coord.name != kind.as_str() {
            tracing::debug!(from = %coord.name, to = %kind, "Renaming coordinate");
            coord.name = kind.as_str().to_string();
        }
    }

    Ok(array)
}
