//! Tip and plunger model
//!
//! Tracks whether a tip is attached and how much it holds. Air gaps count
//! toward the held volume, the same as on a real plunger.

use magwash_core::traits::PipetteError;

/// Tolerance for floating-point volume comparisons (µl)
const VOLUME_EPSILON: f32 = 1e-3;

/// Tip state of a simulated pipette
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TipModel {
    capacity_ul: f32,
    attached: bool,
    volume_ul: f32,
}

impl TipModel {
    /// Create a model for tips holding `capacity_ul`
    pub const fn new(capacity_ul: f32) -> Self {
        Self {
            capacity_ul,
            attached: false,
            volume_ul: 0.0,
        }
    }

    /// Tip capacity (µl)
    pub fn capacity(&self) -> f32 {
        self.capacity_ul
    }

    /// Volume held (µl)
    pub fn volume(&self) -> f32 {
        self.volume_ul
    }

    /// Check if a tip is attached
    pub fn attached(&self) -> bool {
        self.attached
    }

    fn require_tip(&self) -> Result<(), PipetteError> {
        if self.attached {
            Ok(())
        } else {
            Err(PipetteError::NoTip)
        }
    }

    fn require_room(&self, volume: f32) -> Result<(), PipetteError> {
        if self.volume_ul + volume > self.capacity_ul + VOLUME_EPSILON {
            Err(PipetteError::OverCapacity)
        } else {
            Ok(())
        }
    }

    /// Attach a tip
    pub fn pick_up(&mut self) -> Result<(), PipetteError> {
        if self.attached {
            return Err(PipetteError::TipAttached);
        }
        self.attached = true;
        self.volume_ul = 0.0;
        Ok(())
    }

    /// Drop the tip along with anything in it
    pub fn drop_tip(&mut self) -> Result<(), PipetteError> {
        self.require_tip()?;
        self.attached = false;
        self.volume_ul = 0.0;
        Ok(())
    }

    /// Draw liquid or air into the tip
    pub fn draw(&mut self, volume: f32) -> Result<(), PipetteError> {
        self.require_tip()?;
        self.require_room(volume)?;
        self.volume_ul += volume;
        Ok(())
    }

    /// Push liquid out of the tip
    pub fn expel(&mut self, volume: f32) -> Result<(), PipetteError> {
        self.require_tip()?;
        if volume > self.volume_ul + VOLUME_EPSILON {
            return Err(PipetteError::InsufficientVolume);
        }
        self.volume_ul = (self.volume_ul - volume).max(0.0);
        Ok(())
    }

    /// Empty the tip completely
    pub fn blow_out(&mut self) -> Result<(), PipetteError> {
        self.require_tip()?;
        self.volume_ul = 0.0;
        Ok(())
    }

    /// Check an in-place mix of `volume` fits on top of what is held
    pub fn check_mix(&self, volume: f32) -> Result<(), PipetteError> {
        self.require_tip()?;
        self.require_room(volume)
    }

    /// Check a tip is attached
    pub fn check_tip(&self) -> Result<(), PipetteError> {
        self.require_tip()
    }
}
