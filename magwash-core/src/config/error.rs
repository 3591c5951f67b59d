//! Configuration errors
//!
//! Every variant is fatal and is reported before any hardware moves.

use core::fmt;

/// Invalid run configuration or step parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Sample count is zero or not a multiple of the channel width
    SampleCountNotMultiple { samples: u8, channels: u8 },
    /// Sample count above what the plate supports
    SampleCountOutOfRange { samples: u8, max: u8 },
    /// No tip racks declared
    NoTipRacks,
    /// More tip racks than supported
    TooManyTipRacks,
    /// Step has no liquid source
    NoSources,
    /// More sources than supported, or more sources than targets
    TooManySources,
    /// Target count not evenly divisible across sources
    UnevenSourcePartition { targets: u8, sources: u8 },
    /// Bind step would draw from a reservoir channel that was not declared
    SourceChannelOutOfRange { channel: u8, sources: u8 },
    /// Tip parking requested without a parking rack
    MissingParkingRack,
    /// Elution requested without an elution plate
    MissingElutionPlate,
    /// More target wells than the parking rack or elution plate has positions
    TooManyTargets { targets: u8, positions: u8 },
    /// Volume, capacity or threshold is zero, negative or not finite
    InvalidVolume,
    /// Pipette channel count other than 1 or 8
    UnsupportedChannels(u8),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::SampleCountNotMultiple { samples, channels } => write!(
                f,
                "sample count {} is not a positive multiple of {}",
                samples, channels
            ),
            ConfigError::SampleCountOutOfRange { samples, max } => {
                write!(f, "sample count {} is outside 1..={}", samples, max)
            }
            ConfigError::NoTipRacks => f.write_str("no tip racks declared"),
            ConfigError::TooManyTipRacks => f.write_str("too many tip racks declared"),
            ConfigError::NoSources => f.write_str("step has no liquid source"),
            ConfigError::TooManySources => f.write_str("too many liquid sources"),
            ConfigError::UnevenSourcePartition { targets, sources } => write!(
                f,
                "{} targets cannot be split evenly across {} sources",
                targets, sources
            ),
            ConfigError::SourceChannelOutOfRange { channel, sources } => write!(
                f,
                "reservoir channel {} needed but only {} sources declared",
                channel, sources
            ),
            ConfigError::MissingParkingRack => {
                f.write_str("tip parking requested without a parking rack")
            }
            ConfigError::MissingElutionPlate => {
                f.write_str("elution requested without an elution plate")
            }
            ConfigError::TooManyTargets { targets, positions } => write!(
                f,
                "{} target wells but only {} matching positions",
                targets, positions
            ),
            ConfigError::InvalidVolume => f.write_str("volume must be positive and finite"),
            ConfigError::UnsupportedChannels(n) => {
                write!(f, "unsupported pipette channel count {}", n)
            }
        }
    }
}

impl core::error::Error for ConfigError {}
