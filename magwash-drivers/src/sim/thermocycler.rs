//! Thermocycler model

use core::time::Duration;

use magwash_core::traits::ModuleError;

/// Temperature ranges the module accepts (°C)
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ThermocyclerLimits {
    pub block_min_c: f32,
    pub block_max_c: f32,
    pub lid_min_c: f32,
    pub lid_max_c: f32,
}

impl Default for ThermocyclerLimits {
    fn default() -> Self {
        Self {
            block_min_c: 4.0,
            block_max_c: 99.0,
            lid_min_c: 37.0,
            lid_max_c: 110.0,
        }
    }
}

/// Block, lid heater and lid position of a simulated thermocycler
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ThermocyclerModel {
    limits: ThermocyclerLimits,
    block_c: Option<f32>,
    lid_c: Option<f32>,
    lid_open: bool,
}

impl ThermocyclerModel {
    /// Create a model with the lid closed and both heaters off
    pub const fn new(limits: ThermocyclerLimits) -> Self {
        Self {
            limits,
            block_c: None,
            lid_c: None,
            lid_open: false,
        }
    }

    /// Block target, if set
    pub fn block(&self) -> Option<f32> {
        self.block_c
    }

    /// Lid heater target, if on
    pub fn lid(&self) -> Option<f32> {
        self.lid_c
    }

    /// Check if the lid is open
    pub fn is_lid_open(&self) -> bool {
        self.lid_open
    }

    /// Set the block target
    ///
    /// Returns how long the call blocks: the hold, if any.
    pub fn set_block(&mut self, celsius: f32, hold: Option<Duration>) -> Result<Duration, ModuleError> {
        if !(self.limits.block_min_c..=self.limits.block_max_c).contains(&celsius) {
            return Err(ModuleError::TemperatureOutOfRange);
        }
        self.block_c = Some(celsius);
        Ok(hold.unwrap_or_default())
    }

    /// Set the lid heater target
    pub fn set_lid(&mut self, celsius: f32) -> Result<(), ModuleError> {
        if !(self.limits.lid_min_c..=self.limits.lid_max_c).contains(&celsius) {
            return Err(ModuleError::TemperatureOutOfRange);
        }
        self.lid_c = Some(celsius);
        Ok(())
    }

    /// Turn the lid heater off
    pub fn deactivate_lid(&mut self) {
        self.lid_c = None;
    }

    /// Move the lid
    pub fn set_lid_open(&mut self, open: bool) {
        self.lid_open = open;
    }
}

impl Default for ThermocyclerModel {
    fn default() -> Self {
        Self::new(ThermocyclerLimits::default())
    }
}
