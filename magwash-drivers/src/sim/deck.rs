//! Simulated workcell
//!
//! [`SimDeck`] implements every driver trait on one object, so the journal
//! keeps calls to different modules in their true order. Operator pauses
//! are acknowledged immediately; delays and thermocycler holds advance a
//! simulated clock instead of blocking.

use alloc::vec::Vec;
use core::time::Duration;

use magwash_core::config::{PipetteConfig, RunConfig};
use magwash_core::labware::Location;
use magwash_core::state::{message, Message};
use magwash_core::traits::{
    FlowRates, MagnetStatus, MagneticModule, ModuleError, Operator, Pipette, PipetteError,
    Thermocycler, Workcell,
};

use super::journal::{Entry, Journal};
use super::pipette::TipModel;
use super::thermocycler::{ThermocyclerLimits, ThermocyclerModel};

/// Simulated deck configuration
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SimConfig {
    /// Pipette channels (1 or 8)
    pub channels: u8,
    /// Tip capacity (µl)
    pub tip_capacity_ul: f32,
    /// Highest magnet engage height (mm)
    pub magnet_max_height_mm: f32,
    /// Thermocycler temperature ranges
    pub thermocycler: ThermocyclerLimits,
}

impl Default for SimConfig {
    fn default() -> Self {
        Self {
            channels: 8,
            tip_capacity_ul: 300.0,
            magnet_max_height_mm: 25.0,
            thermocycler: ThermocyclerLimits::default(),
        }
    }
}

impl SimConfig {
    /// Configuration matching a run's pipette
    pub fn for_run(run: &RunConfig) -> Self {
        Self::for_pipette(&run.pipette)
    }

    /// Configuration for a deck carrying `pipette`
    pub fn for_pipette(pipette: &PipetteConfig) -> Self {
        Self {
            channels: pipette.kind.channels(),
            tip_capacity_ul: pipette.max_volume_ul,
            ..Default::default()
        }
    }
}

/// Simulated liquid handler
#[derive(Debug, Clone)]
pub struct SimDeck {
    config: SimConfig,
    tip: TipModel,
    flow: FlowRates,
    position: Option<Location>,
    magnet: MagnetStatus,
    magnet_height_mm: f32,
    thermocycler: ThermocyclerModel,
    light: bool,
    clock: Duration,
    pauses: Vec<Message>,
    journal: Journal,
    pipette_fault: Option<PipetteError>,
    module_fault: Option<ModuleError>,
}

impl SimDeck {
    /// Create a deck with nothing attached and every module idle
    pub fn new(config: SimConfig) -> Self {
        Self {
            config,
            tip: TipModel::new(config.tip_capacity_ul),
            flow: FlowRates::default(),
            position: None,
            magnet: MagnetStatus::Disengaged,
            magnet_height_mm: 0.0,
            thermocycler: ThermocyclerModel::new(config.thermocycler),
            light: true,
            clock: Duration::ZERO,
            pauses: Vec::new(),
            journal: Journal::new(),
            pipette_fault: None,
            module_fault: None,
        }
    }

    /// Get the configuration
    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    /// Every call so far
    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    /// Tip state
    pub fn tip(&self) -> &TipModel {
        &self.tip
    }

    /// Thermocycler state
    pub fn thermocycler_state(&self) -> &ThermocyclerModel {
        &self.thermocycler
    }

    /// Last commanded pipette location
    pub fn position(&self) -> Option<Location> {
        self.position
    }

    /// Current magnet height, zero when disengaged (mm)
    pub fn magnet_height(&self) -> f32 {
        self.magnet_height_mm
    }

    /// Check if the deck light is on
    pub fn light(&self) -> bool {
        self.light
    }

    /// Simulated time spent in delays and holds
    pub fn elapsed(&self) -> Duration {
        self.clock
    }

    /// Pause messages acknowledged so far
    pub fn pauses(&self) -> &[Message] {
        &self.pauses
    }

    /// Make the next pipette call fail with `error`
    pub fn fail_next_pipette_call(&mut self, error: PipetteError) {
        self.pipette_fault = Some(error);
    }

    /// Make the next magnet or thermocycler call fail with `error`
    pub fn fail_next_module_call(&mut self, error: ModuleError) {
        self.module_fault = Some(error);
    }

    fn pipette_fault(&mut self) -> Result<(), PipetteError> {
        self.pipette_fault.take().map_or(Ok(()), Err)
    }

    fn module_fault(&mut self) -> Result<(), ModuleError> {
        self.module_fault.take().map_or(Ok(()), Err)
    }
}

impl Default for SimDeck {
    fn default() -> Self {
        Self::new(SimConfig::default())
    }
}

impl Pipette for SimDeck {
    fn channels(&self) -> u8 {
        self.config.channels
    }

    fn max_volume(&self) -> f32 {
        self.tip.capacity()
    }

    fn current_volume(&self) -> f32 {
        self.tip.volume()
    }

    fn has_tip(&self) -> bool {
        self.tip.attached()
    }

    fn flow_rates(&self) -> FlowRates {
        self.flow
    }

    fn set_flow_rates(&mut self, rates: FlowRates) {
        self.flow = rates;
        self.journal.record(Entry::FlowRates(rates));
    }

    fn pick_up_tip(&mut self, at: Location) -> Result<(), PipetteError> {
        self.pipette_fault()?;
        self.tip.pick_up()?;
        self.position = Some(at);
        self.journal.record(Entry::PickUp(at));
        Ok(())
    }

    fn drop_tip(&mut self, at: Location) -> Result<(), PipetteError> {
        self.pipette_fault()?;
        self.tip.drop_tip()?;
        self.position = Some(at);
        self.journal.record(Entry::Drop(at));
        Ok(())
    }

    fn aspirate(&mut self, volume: f32, at: Location, rate: f32) -> Result<(), PipetteError> {
        self.pipette_fault()?;
        self.tip.draw(volume)?;
        self.position = Some(at);
        self.journal.record(Entry::Aspirate { volume, at, rate });
        Ok(())
    }

    fn dispense(&mut self, volume: f32, at: Location, rate: f32) -> Result<(), PipetteError> {
        self.pipette_fault()?;
        self.tip.expel(volume)?;
        self.position = Some(at);
        self.journal.record(Entry::Dispense { volume, at, rate });
        Ok(())
    }

    fn blow_out(&mut self, at: Location) -> Result<(), PipetteError> {
        self.pipette_fault()?;
        self.tip.blow_out()?;
        self.position = Some(at);
        self.journal.record(Entry::BlowOut(at));
        Ok(())
    }

    fn air_gap(&mut self, volume: f32) -> Result<(), PipetteError> {
        self.pipette_fault()?;
        self.tip.draw(volume)?;
        self.journal.record(Entry::AirGap(volume));
        Ok(())
    }

    fn move_to(&mut self, at: Location) -> Result<(), PipetteError> {
        self.pipette_fault()?;
        self.position = Some(at);
        self.journal.record(Entry::MoveTo(at));
        Ok(())
    }

    fn mix(&mut self, reps: u8, volume: f32, at: Location) -> Result<(), PipetteError> {
        self.pipette_fault()?;
        self.tip.check_mix(volume)?;
        self.position = Some(at);
        self.journal.record(Entry::Mix { reps, volume, at });
        Ok(())
    }

    fn touch_tip(&mut self) -> Result<(), PipetteError> {
        self.pipette_fault()?;
        self.tip.check_tip()?;
        self.journal.record(Entry::TouchTip);
        Ok(())
    }

    fn home(&mut self) -> Result<(), PipetteError> {
        self.pipette_fault()?;
        self.position = None;
        self.journal.record(Entry::Home);
        Ok(())
    }
}

impl MagneticModule for SimDeck {
    fn engage(&mut self, height_mm: f32) -> Result<(), ModuleError> {
        self.module_fault()?;
        if !(0.0..=self.config.magnet_max_height_mm).contains(&height_mm) {
            return Err(ModuleError::HeightOutOfRange);
        }
        self.magnet = MagnetStatus::Engaged;
        self.magnet_height_mm = height_mm;
        self.journal.record(Entry::Engage(height_mm));
        Ok(())
    }

    fn disengage(&mut self) -> Result<(), ModuleError> {
        self.module_fault()?;
        self.magnet = MagnetStatus::Disengaged;
        self.magnet_height_mm = 0.0;
        self.journal.record(Entry::Disengage);
        Ok(())
    }

    fn status(&self) -> MagnetStatus {
        self.magnet
    }
}

impl Thermocycler for SimDeck {
    fn set_block_temperature(
        &mut self,
        celsius: f32,
        hold: Option<Duration>,
        _ramp_rate: Option<f32>,
    ) -> Result<(), ModuleError> {
        self.module_fault()?;
        self.clock += self.thermocycler.set_block(celsius, hold)?;
        self.journal.record(Entry::Block { celsius, hold });
        Ok(())
    }

    fn set_lid_temperature(&mut self, celsius: f32) -> Result<(), ModuleError> {
        self.module_fault()?;
        self.thermocycler.set_lid(celsius)?;
        self.journal.record(Entry::Lid(celsius));
        Ok(())
    }

    fn deactivate_lid(&mut self) -> Result<(), ModuleError> {
        self.module_fault()?;
        self.thermocycler.deactivate_lid();
        self.journal.record(Entry::LidOff);
        Ok(())
    }

    fn open_lid(&mut self) -> Result<(), ModuleError> {
        self.module_fault()?;
        self.thermocycler.set_lid_open(true);
        self.journal.record(Entry::OpenLid);
        Ok(())
    }

    fn close_lid(&mut self) -> Result<(), ModuleError> {
        self.module_fault()?;
        self.thermocycler.set_lid_open(false);
        self.journal.record(Entry::CloseLid);
        Ok(())
    }
}

impl Operator for SimDeck {
    fn pause(&mut self, text: &str) {
        let text = message(text);
        self.pauses.push(text.clone());
        self.journal.record(Entry::Pause(text));
    }

    fn delay(&mut self, duration: Duration, _message: Option<&str>) {
        self.clock += duration;
        self.journal.record(Entry::Delay(duration));
    }

    fn set_indicator_light(&mut self, on: bool) {
        self.light = on;
        self.journal.record(Entry::Light(on));
    }

    fn comment(&mut self, text: &str) {
        self.journal.record(Entry::Comment(message(text)));
    }
}

impl Workcell for SimDeck {
    type Pipette = Self;
    type Magnet = Self;
    type Thermocycler = Self;
    type Operator = Self;

    fn pipette(&mut self) -> &mut Self {
        self
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

#[cfg(test)]
mod tests {
    use super::*;
    use heapless::Vec as HVec;
    use magwash_core::config::{DeckLayout, TrashConfig};
    use magwash_core::inventory::Ledger;
    use magwash_core::labware::{LabwareId, WellRef};
    use magwash_core::recipe::{Recipe, RecipeRunner, Step};
    use magwash_core::scheduler::{PlanContext, RunError, WashParams};
    use magwash_core::state::{ErrorKind, State};

    const RESERVOIR: LabwareId = LabwareId(5);

    fn layout() -> DeckLayout {
        DeckLayout {
            sample_plate: LabwareId(4),
            elution_plate: Some(LabwareId(7)),
            reservoir: RESERVOIR,
            reservoir_well_capacity_ul: 15_000.0,
            liquid_waste: WellRef::first(LabwareId(9)),
            trash: WellRef::first(LabwareId(12)),
            tip_racks: HVec::from_slice(&[LabwareId(2), LabwareId(3)]).unwrap(),
            secondary_tip_racks: HVec::new(),
            parking_rack: Some(LabwareId(1)),
        }
    }

    #[test]
    fn test_liquid_handling_without_tip_fails() {
        let mut deck = SimDeck::default();
        let at = WellRef::first(LabwareId(4)).bottom(1.0);
        assert_eq!(deck.aspirate(50.0, at, 1.0), Err(PipetteError::NoTip));
        assert!(deck.journal().is_empty());
    }

    #[test]
    fn test_injected_faults_fire_once() {
        let mut deck = SimDeck::default();
        deck.fail_next_module_call(ModuleError::NotConnected);
        assert_eq!(deck.engage(6.5), Err(ModuleError::NotConnected));
        deck.engage(6.5).unwrap();
        assert!(deck.is_engaged());
        assert_eq!(deck.engage(40.0), Err(ModuleError::HeightOutOfRange));
    }

    #[test]
    fn test_clock_counts_delays_and_holds() {
        let mut deck = SimDeck::default();
        deck.delay(Duration::from_secs(60), Some("settle"));
        deck.set_block_temperature(4.0, Some(Duration::from_secs(30)), None)
            .unwrap();
        assert_eq!(deck.elapsed(), Duration::from_secs(90));
    }

    #[test]
    fn test_wash_recipe_end_to_end() {
        let config = RunConfig {
            samples: 24,
            ..Default::default()
        };
        let layout = layout();
        let ctx = PlanContext::new(&config, &layout).unwrap();
        let mut wash = WashParams::new(500.0, &[WellRef::first(RESERVOIR)]).unwrap();
        wash.settle = Some(Duration::from_secs(60));
        let mut recipe = Recipe::new();
        recipe.push("Wash 1", Step::Wash(wash));

        let mut runner = RecipeRunner::new(&recipe, &ctx).unwrap();
        let mut ledger = Ledger::from_config(&config, &layout).unwrap();
        let mut deck = SimDeck::new(SimConfig::for_run(&config));

        assert_eq!(runner.run(&mut deck, &mut ledger), Ok(0));
        assert_eq!(runner.state(), State::RecipeComplete);

        let journal = deck.journal();
        assert_eq!(journal.count(|e| matches!(e, Entry::PickUp(_))), 6);
        assert_eq!(journal.count(|e| matches!(e, Entry::Drop(_))), 6);
        assert_eq!(journal.count(|e| matches!(e, Entry::Engage(h) if *h == 6.5)), 1);
        assert_eq!(deck.elapsed(), Duration::from_secs(60));
        assert_eq!(ledger.tips.count(), 6);
        assert_eq!(ledger.tips.trash().dropped(), 48);
        assert!((ledger.waste.accumulated() - 1500.0).abs() < 1e-2);
        assert!(!deck.tip().attached());
    }

    #[test]
    fn test_full_trash_prompts_operator() {
        let config = RunConfig {
            samples: 24,
            trash: TrashConfig {
                drop_threshold: 16,
                ..Default::default()
            },
            ..Default::default()
        };
        let layout = layout();
        let ctx = PlanContext::new(&config, &layout).unwrap();
        let mut wash = WashParams::new(100.0, &[WellRef::first(RESERVOIR)]).unwrap();
        wash.discard_supernatant = false;
        let mut recipe = Recipe::new();
        recipe.push_step(Step::Wash(wash));

        let mut runner = RecipeRunner::new(&recipe, &ctx).unwrap();
        let mut ledger = Ledger::from_config(&config, &layout).unwrap();
        let mut deck = SimDeck::new(SimConfig::for_run(&config));

        // 8 tips per drop: the second drop reaches 16
        assert_eq!(runner.run(&mut deck, &mut ledger), Ok(1));
        assert_eq!(
            deck.pauses(),
            &[message("Please empty tips from waste before resuming.")]
        );
        let pause = deck
            .journal()
            .position(|e| matches!(e, Entry::Pause(_)))
            .unwrap();
        assert_eq!(deck.journal().entries()[pause - 2], Entry::Home);
        assert_eq!(deck.journal().entries()[pause - 1], Entry::Light(false));
        assert_eq!(deck.journal().entries()[pause + 1], Entry::Light(true));
        assert_eq!(ledger.tips.trash().dropped(), 8);
    }

    #[test]
    fn test_module_fault_stops_recipe() {
        let config = RunConfig::default();
        let layout = layout();
        let ctx = PlanContext::new(&config, &layout).unwrap();
        let mut recipe = Recipe::new();
        recipe.push_step(Step::Engage { height_mm: None });

        let mut runner = RecipeRunner::new(&recipe, &ctx).unwrap();
        let mut ledger = Ledger::from_config(&config, &layout).unwrap();
        let mut deck = SimDeck::default();
        deck.fail_next_module_call(ModuleError::Fault);

        assert_eq!(
            runner.run(&mut deck, &mut ledger),
            Err(RunError::Module(ModuleError::Fault))
        );
        assert_eq!(runner.state(), State::Error(ErrorKind::Module));
    }
}
