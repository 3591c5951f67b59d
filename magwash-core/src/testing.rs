//! Test doubles shared by the unit tests

use alloc::string::{String, ToString};
use alloc::vec::Vec;
use core::time::Duration;

use heapless::Vec as HVec;

use crate::config::DeckLayout;
use crate::labware::{LabwareId, Location, WellRef};
use crate::traits::{
    FlowRates, MagnetStatus, MagneticModule, ModuleError, Operator, Pipette, PipetteError,
    Thermocycler, Workcell,
};

/// Recorded driver call
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    PickUp(Location),
    Drop(Location),
    Aspirate(f32, Location, f32),
    Dispense(f32, Location, f32),
    BlowOut(Location),
    AirGap(f32),
    MoveTo(Location),
    Mix(u8, f32, Location),
    TouchTip,
    Home,
    SetFlow(FlowRates),
    Engage(f32),
    Disengage,
    BlockTemperature(f32, Option<Duration>, Option<f32>),
    LidTemperature(f32),
    DeactivateLid,
    OpenLid,
    CloseLid,
    Pause(String),
    Delay(Duration),
    Light(bool),
    Comment(String),
}

/// Standard layout used across tests
pub fn deck() -> DeckLayout {
    DeckLayout {
        sample_plate: LabwareId(4),
        elution_plate: Some(LabwareId(7)),
        reservoir: LabwareId(5),
        reservoir_well_capacity_ul: 15_000.0,
        liquid_waste: WellRef::first(LabwareId(9)),
        trash: WellRef::first(LabwareId(12)),
        tip_racks: HVec::from_slice(&[LabwareId(2), LabwareId(3)]).unwrap(),
        secondary_tip_racks: HVec::from_slice(&[LabwareId(6)]).unwrap(),
        parking_rack: Some(LabwareId(1)),
    }
}

/// Pipette that records calls and tracks tip and volume
#[derive(Debug)]
pub struct MockPipette {
    pub channels: u8,
    pub capacity: f32,
    pub tip: bool,
    pub volume: f32,
    pub flow: FlowRates,
    pub calls: Vec<Call>,
    pub last_drop: Option<Location>,
    pub fail_next: Option<PipetteError>,
}

impl MockPipette {
    pub fn new(channels: u8) -> Self {
        Self {
            channels,
            capacity: 300.0,
            tip: false,
            volume: 0.0,
            flow: FlowRates::default(),
            calls: Vec::new(),
            last_drop: None,
            fail_next: None,
        }
    }

    fn check(&mut self) -> Result<(), PipetteError> {
        match self.fail_next.take() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }

    fn need_tip(&self) -> Result<(), PipetteError> {
        if self.tip {
            Ok(())
        } else {
            Err(PipetteError::NoTip)
        }
    }
}

impl Pipette for MockPipette {
    fn channels(&self) -> u8 {
        self.channels
    }

    fn max_volume(&self) -> f32 {
        self.capacity
    }

    fn current_volume(&self) -> f32 {
        self.volume
    }

    fn has_tip(&self) -> bool {
        self.tip
    }

    fn flow_rates(&self) -> FlowRates {
        self.flow
    }

    fn set_flow_rates(&mut self, rates: FlowRates) {
        self.flow = rates;
        self.calls.push(Call::SetFlow(rates));
    }

    fn pick_up_tip(&mut self, at: Location) -> Result<(), PipetteError> {
        self.check()?;
        if self.tip {
            return Err(PipetteError::TipAttached);
        }
        self.tip = true;
        self.calls.push(Call::PickUp(at));
        Ok(())
    }

    fn drop_tip(&mut self, at: Location) -> Result<(), PipetteError> {
        self.check()?;
        self.need_tip()?;
        self.tip = false;
        self.volume = 0.0;
        self.last_drop = Some(at);
        self.calls.push(Call::Drop(at));
        Ok(())
    }

    fn aspirate(&mut self, volume: f32, at: Location, rate: f32) -> Result<(), PipetteError> {
        self.check()?;
        self.need_tip()?;
        if self.volume + volume > self.max_volume() + 1e-3 {
            return Err(PipetteError::OverCapacity);
        }
        self.volume += volume;
        self.calls.push(Call::Aspirate(volume, at, rate));
        Ok(())
    }

    fn dispense(&mut self, volume: f32, at: Location, rate: f32) -> Result<(), PipetteError> {
        self.check()?;
        self.need_tip()?;
        if volume > self.volume + 1e-3 {
            return Err(PipetteError::InsufficientVolume);
        }
        self.volume = (self.volume - volume).max(0.0);
        self.calls.push(Call::Dispense(volume, at, rate));
        Ok(())
    }

    fn blow_out(&mut self, at: Location) -> Result<(), PipetteError> {
        self.check()?;
        self.need_tip()?;
        self.volume = 0.0;
        self.calls.push(Call::BlowOut(at));
        Ok(())
    }

    fn air_gap(&mut self, volume: f32) -> Result<(), PipetteError> {
        self.check()?;
        self.need_tip()?;
        if self.volume + volume > self.max_volume() + 1e-3 {
            return Err(PipetteError::OverCapacity);
        }
        self.volume += volume;
        self.calls.push(Call::AirGap(volume));
        Ok(())
    }

    fn move_to(&mut self, at: Location) -> Result<(), PipetteError> {
        self.check()?;
        self.calls.push(Call::MoveTo(at));
        Ok(())
    }

    fn mix(&mut self, reps: u8, volume: f32, at: Location) -> Result<(), PipetteError> {
        self.check()?;
        self.need_tip()?;
        if self.volume + volume > self.max_volume() + 1e-3 {
            return Err(PipetteError::OverCapacity);
        }
        self.calls.push(Call::Mix(reps, volume, at));
        Ok(())
    }

    fn touch_tip(&mut self) -> Result<(), PipetteError> {
        self.check()?;
        self.need_tip()?;
        self.calls.push(Call::TouchTip);
        Ok(())
    }

    fn home(&mut self) -> Result<(), PipetteError> {
        self.check()?;
        self.calls.push(Call::Home);
        Ok(())
    }
}

/// Whole-robot double; every call lands in the pipette's journal
#[derive(Debug)]
pub struct MockDeck {
    pub pipette: MockPipette,
    pub secondary: Option<MockPipette>,
    pub magnet: MagnetStatus,
    pub paused: Vec<String>,
}

impl MockDeck {
    pub fn new(channels: u8) -> Self {
        Self {
            pipette: MockPipette::new(channels),
            secondary: None,
            magnet: MagnetStatus::Disengaged,
            paused: Vec::new(),
        }
    }

    /// Mount a low-volume pipette
    pub fn with_secondary(mut self, channels: u8, capacity: f32) -> Self {
        let mut pipette = MockPipette::new(channels);
        pipette.capacity = capacity;
        self.secondary = Some(pipette);
        self
    }

    pub fn calls(&self) -> &[Call] {
        &self.pipette.calls
    }

    pub fn count(&self, pred: impl Fn(&Call) -> bool) -> usize {
        self.calls().iter().filter(|c| pred(c)).count()
    }
}

impl MagneticModule for MockDeck {
    fn engage(&mut self, height_mm: f32) -> Result<(), ModuleError> {
        self.magnet = MagnetStatus::Engaged;
        self.pipette.calls.push(Call::Engage(height_mm));
        Ok(())
    }

    fn disengage(&mut self) -> Result<(), ModuleError> {
        self.magnet = MagnetStatus::Disengaged;
        self.pipette.calls.push(Call::Disengage);
        Ok(())
    }

    fn status(&self) -> MagnetStatus {
        self.magnet
    }
}

impl Thermocycler for MockDeck {
    fn set_block_temperature(
        &mut self,
        celsius: f32,
        hold: Option<Duration>,
        ramp_rate: Option<f32>,
    ) -> Result<(), ModuleError> {
        self.pipette
            .calls
            .push(Call::BlockTemperature(celsius, hold, ramp_rate));
        Ok(())
    }

    fn set_lid_temperature(&mut self, celsius: f32) -> Result<(), ModuleError> {
        self.pipette.calls.push(Call::LidTemperature(celsius));
        Ok(())
    }

    fn deactivate_lid(&mut self) -> Result<(), ModuleError> {
        self.pipette.calls.push(Call::DeactivateLid);
        Ok(())
    }

    fn open_lid(&mut self) -> Result<(), ModuleError> {
        self.pipette.calls.push(Call::OpenLid);
        Ok(())
    }

    fn close_lid(&mut self) -> Result<(), ModuleError> {
        self.pipette.calls.push(Call::CloseLid);
        Ok(())
    }
}

impl Operator for MockDeck {
    fn pause(&mut self, message: &str) {
        self.paused.push(message.to_string());
        self.pipette.calls.push(Call::Pause(message.to_string()));
    }

    fn delay(&mut self, duration: Duration, _message: Option<&str>) {
        self.pipette.calls.push(Call::Delay(duration));
    }

    fn set_indicator_light(&mut self, on: bool) {
        self.pipette.calls.push(Call::Light(on));
    }

    fn comment(&mut self, text: &str) {
        self.pipette.calls.push(Call::Comment(text.to_string()));
    }
}

impl Workcell for MockDeck {
    type Pipette = MockPipette;
    type Magnet = Self;
    type Thermocycler = Self;
    type Operator = Self;

    fn pipette(&mut self) -> &mut MockPipette {
        &mut self.pipette
    }

    fn secondary_pipette(&mut self) -> Option<&mut MockPipette> {
        self.secondary.as_mut()
    }

    fn magnet(&mut self) -> &mut Self {
        self
    }

    fn thermocycler(&mut self) -> &mut Self {
        self
    }

    fn operator(&mut self) -> &mut Self {
        self
    }
}
