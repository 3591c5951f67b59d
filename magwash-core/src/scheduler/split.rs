//! Volume splitting and source rotation

use crate::config::{is_positive, ConfigError};

/// A volume divided into equal sub-transfers
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Split {
    /// Number of sub-transfers
    pub count: u16,
    /// Volume per sub-transfer (µl)
    pub volume_ul: f32,
}

impl Split {
    /// Whether an air gap follows sub-transfer `index`
    ///
    /// The tip only returns to the source between sub-transfers, so the last
    /// one is not followed by a gap.
    pub fn air_gap_after(&self, index: u16) -> bool {
        index + 1 < self.count
    }
}

/// Divide `volume_ul` into `ceil(volume / max)` equal parts
///
/// Returns `None` for non-positive or non-finite inputs.
pub fn split_volume(volume_ul: f32, max_ul: f32) -> Option<Split> {
    if !is_positive(volume_ul) || !is_positive(max_ul) {
        return None;
    }

    let ratio = volume_ul / max_ul;
    if ratio > u16::MAX as f32 {
        return None;
    }
    let mut count = ratio as u16;
    if (count as f32) * max_ul < volume_ul {
        count += 1;
    }
    let count = count.max(1);

    Some(Split {
        count,
        volume_ul: volume_ul / count as f32,
    })
}

/// Source index for target `well_index` of `total` wells
///
/// Targets are divided into equal consecutive blocks, one block per source.
pub fn source_index(well_index: usize, total: usize, sources: usize) -> Result<usize, ConfigError> {
    if sources == 0 {
        return Err(ConfigError::NoSources);
    }
    if sources > total {
        return Err(ConfigError::TooManySources);
    }
    if total % sources != 0 {
        return Err(ConfigError::UnevenSourcePartition {
            targets: total as u8,
            sources: sources as u8,
        });
    }
    Ok(well_index / (total / sources))
}
