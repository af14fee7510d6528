//! Near-duplicate tile filtering.
//!
//! Tiles are reduced greedily: the first remaining tile becomes a
//! representative, every remaining tile similar to it is dropped, and the
//! process repeats on what is left. Representatives keep their original
//! relative order.
//!
//! Similarity comes from the raster engine as a pair of scores in `[0, 1]`
//! (perceptual `distance` and pixel `difference`, lower means more alike).
//! A tile is a duplicate when its scores are at or below the policy
//! thresholds: both of them for [`Requirement::Both`], either of them for
//! [`Requirement::One`].

use std::collections::VecDeque;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, SplitError};
use crate::raster::{RasterEngine, Similarity};

/// Default perceptual distance ceiling.
pub const DEFAULT_DISTANCE: f64 = 0.15;

/// Default pixel difference ceiling.
pub const DEFAULT_DIFFERENCE: f64 = 0.15;

// =============================================================================
// Policy
// =============================================================================

/// Which scores must fall within threshold for a tile to count as a duplicate.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Requirement {
    /// Distance or difference.
    One,
    /// Distance and difference.
    #[default]
    Both,
}

impl Requirement {
    pub fn as_str(&self) -> &'static str {
        match self {
            Requirement::One => "one",
            Requirement::Both => "both",
        }
    }
}

impl fmt::Display for Requirement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Requirement {
    type Err = SplitError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "one" => Ok(Requirement::One),
            "both" => Ok(Requirement::Both),
            other => Err(SplitError::geometry(format!(
                "unique requirement ({}) has to be one or both",
                other
            ))),
        }
    }
}

fn default_enabled() -> bool {
    true
}

fn default_distance() -> f64 {
    DEFAULT_DISTANCE
}

fn default_difference() -> f64 {
    DEFAULT_DIFFERENCE
}

/// Thresholds for the duplicate filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UniquePolicy {
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default)]
    pub requirement: Requirement,
    /// Perceptual distance ceiling, `[0, 1]`.
    #[serde(default = "default_distance")]
    pub distance: f64,
    /// Pixel difference ceiling, `[0, 1]`.
    #[serde(default = "default_difference")]
    pub difference: f64,
}

impl Default for UniquePolicy {
    fn default() -> Self {
        Self {
            enabled: true,
            requirement: Requirement::Both,
            distance: DEFAULT_DISTANCE,
            difference: DEFAULT_DIFFERENCE,
        }
    }
}

impl UniquePolicy {
    /// A policy that keeps every tile.
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn with_requirement(mut self, requirement: Requirement) -> Self {
        self.requirement = requirement;
        self
    }

    pub fn with_thresholds(mut self, distance: f64, difference: f64) -> Self {
        self.distance = distance;
        self.difference = difference;
        self
    }

    /// Check that both thresholds lie in `[0, 1]`.
    pub fn validate(&self) -> Result<()> {
        check_threshold("distance", self.distance)?;
        check_threshold("difference", self.difference)
    }

    /// Whether a tile with `similarity` to a representative is a duplicate of it.
    pub fn is_duplicate(&self, similarity: Similarity) -> bool {
        let close = similarity.distance <= self.distance;
        let same = similarity.difference <= self.difference;
        match self.requirement {
            Requirement::Both => close && same,
            Requirement::One => close || same,
        }
    }
}

fn check_threshold(name: &str, value: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&value) {
        return Err(SplitError::geometry(format!(
            "unique {} ({}) has to be between 0 and 1",
            name, value
        )));
    }
    Ok(())
}

// =============================================================================
// Filter
// =============================================================================

/// Drop near-duplicate tiles using the comparison primitive of `engine`.
pub fn filter_unique<E: RasterEngine>(
    engine: &E,
    tiles: Vec<E::Handle>,
    policy: &UniquePolicy,
) -> Vec<E::Handle> {
    filter_unique_by(tiles, policy, |a, b| engine.compare(a, b))
}

/// Drop near-duplicate items, scoring pairs with `compare`.
///
/// `compare` is always called as `compare(representative, candidate)`. A
/// comparison that fails is logged and the candidate is kept.
pub fn filter_unique_by<T, F>(tiles: Vec<T>, policy: &UniquePolicy, mut compare: F) -> Vec<T>
where
    F: FnMut(&T, &T) -> Result<Similarity>,
{
    if !policy.enabled || tiles.len() < 2 {
        return tiles;
    }

    let total = tiles.len();
    let mut remaining: VecDeque<(usize, T)> = tiles.into_iter().enumerate().collect();
    let mut kept = Vec::new();

    while let Some((index, representative)) = remaining.pop_front() {
        remaining.retain(|(candidate_index, candidate)| {
            match compare(&representative, candidate) {
                Ok(similarity) => {
                    let duplicate = policy.is_duplicate(similarity);
                    if duplicate {
                        debug!(
                            representative = index,
                            duplicate = candidate_index,
                            distance = similarity.distance,
                            difference = similarity.difference,
                            "Dropping duplicate tile"
                        );
                    }
                    !duplicate
                }
                Err(e) => {
                    warn!(
                        representative = index,
                        candidate = candidate_index,
                        "Error comparing tiles, keeping both: {}",
                        e
                    );
                    true
                }
            }
        });
        kept.push(representative);
    }

    debug!("Kept {} of {} tiles", kept.len(), total);
    kept
}

// =============================================================================
// Tests
// =============================================================================
