//! Mood banding sequencer
//!
//! Orders items by valence bands with an energy zig-zag inside each band.
//! No pairwise comparisons are made.
//!
//! **Phase 1 (coarse, optional):** sort by valence, cut into chunks of at
//! most `chunk_size` items, reverse the valence order of odd chunks.
//!
//! **Phase 2 (fine, always):** walk the phase 1 sequence and start a new band
//! on the first item, when valence rises more than `band_width` above the
//! band's first valence, or (with author separation) when the band already
//! holds an item by the same primary author. Even bands are sorted by
//! energy ascending, odd bands descending.
//!
//! Author conflicts only ever open a new band, so there is no fallback
//! path here.

use crate::error::SequenceError;
use crate::item::{Item, MoodCoordinates};
use crate::permutation::Permutation;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

/// Mood banding parameters
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MoodBandConfig {
    /// Run the coarse chunking pass before fine banding
    pub coarse_banding: bool,
    /// Maximum items per coarse chunk
    pub chunk_size: usize,
    /// Maximum valence rise within a fine band
    pub band_width: f64,
}

impl Default for MoodBandConfig {
    fn default() -> Self {
        Self {
            coarse_banding: true,
            chunk_size: 30,
            band_width: 0.1,
        }
    }
}

impl MoodBandConfig {
    pub fn validate(&self) -> Result<(), SequenceError> {
        if self.chunk_size == 0 {
            return Err(SequenceError::InvalidConfig(
                "chunk_size must be at least 1".to_string(),
            ));
        }
        if !self.band_width.is_finite() || self.band_width < 0.0 {
            return Err(SequenceError::InvalidConfig(format!(
                "band_width must be a non-negative number, got {}",
                self.band_width
            )));
        }
        Ok(())
    }
}

/// Two-phase valence/energy banding
#[derive(Debug, Clone, Default)]
pub struct MoodBandSequencer {
    config: MoodBandConfig,
}

impl MoodBandSequencer {
    pub fn new(config: MoodBandConfig) -> Result<Self, SequenceError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &MoodBandConfig {
        &self.config
    }

    /// Compute the ordering of `items`; empty and single-item inputs are
    /// returned unchanged
    pub fn sequence(&self, items: &[Item], separate_authors: bool) -> Permutation {
        let missing = items.iter().filter(|item| item.mood.is_none()).count();
        if missing > 0 {
            warn!(missing, "Items without mood coordinates sequenced as (0, 0)");
        }

        let moods: Vec<MoodCoordinates> = items.iter().map(Item::mood_or_default).collect();

        let walk = self.coarse_order(&moods);
        let mut bands = self.fine_bands(&walk, &moods, items, separate_authors);

        for (band_index, band) in bands.iter_mut().enumerate() {
            if band_index % 2 == 0 {
                band.sort_by(|&a, &b| moods[a].energy.total_cmp(&moods[b].energy));
            } else {
                band.sort_by(|&a, &b| moods[b].energy.total_cmp(&moods[a].energy));
            }
        }

        debug!(
            items = items.len(),
            bands = bands.len(),
            coarse_banding = self.config.coarse_banding,
            separate_authors,
            "Mood bands built"
        );

        Permutation::from_indices(bands.into_iter().flatten().collect())
    }

    /// Valence-ascending order, zig-zagged per chunk when coarse banding is on
    fn coarse_order(&self, moods: &[MoodCoordinates]) -> Vec<usize> {
        let mut order: Vec<usize> = (0..moods.len()).collect();
        order.sort_by(|&a, &b| moods[a].valence.total_cmp(&moods[b].valence));

        if self.config.coarse_banding {
            for (chunk_index, chunk) in order.chunks_mut(self.config.chunk_size).enumerate() {
                if chunk_index % 2 == 0 {
                    chunk.sort_by(|&a, &b| moods[a].valence.total_cmp(&moods[b].valence));
                } else {
                    chunk.sort_by(|&a, &b| moods[b].valence.total_cmp(&moods[a].valence));
                }
            }
        }

        order
    }

    /// Group the walk into valence bands
    fn fine_bands(
        &self,
        walk: &[usize],
        moods: &[MoodCoordinates],
        items: &[Item],
        separate_authors: bool,
    ) -> Vec<Vec<usize>> {
        let mut bands: Vec<Vec<usize>> = Vec::new();
        let mut base_valence = 0.0;

        for &index in walk {
            let valence = moods[index].valence;

            let starts_band = match bands.last() {
                None => true,
                Some(band) => {
                    valence - base_valence > self.config.band_width
                        || (separate_authors
                            && band.iter().any(|&member| {
                                items[member].primary_author_id == items[index].primary_author_id
                            }))
                }
            };

            match bands.last_mut() {
                Some(band) if !starts_band => band.push(index),
                _ => {
                    base_valence = valence;
                    bands.push(vec![index]);
                }
            }
        }

        bands
    }
}
