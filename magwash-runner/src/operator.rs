//! Bench workcell and console operator
//!
//! The bench is the simulated deck with a person at the keyboard. Pauses
//! wait for Enter on the console unless the run was started with `--yes`.
//! Every operator call is also recorded on the deck, so the journal keeps
//! the full order of events.

use std::io::BufRead;
use std::thread;
use std::time::Duration;

use magwash_core::traits::{Operator, Workcell};
use magwash_drivers::sim::SimDeck;
use tracing::{debug, info, warn};

/// Console side of the operator channel
#[derive(Debug)]
pub struct Console<R> {
    /// Acknowledgement input; `None` acknowledges every pause at once
    input: Option<R>,
    /// Sleep through delays instead of only logging them
    real_time: bool,
    acknowledged: usize,
}

impl<R: BufRead> Console<R> {
    /// Console that waits for a line on `input` at every pause
    pub fn interactive(input: R) -> Self {
        Self {
            input: Some(input),
            real_time: false,
            acknowledged: 0,
        }
    }

    /// Console that acknowledges every pause itself
    pub fn unattended() -> Self {
        Self {
            input: None,
            real_time: false,
            acknowledged: 0,
        }
    }

    /// Sleep for the length of each delay
    pub fn real_time(mut self, on: bool) -> Self {
        self.real_time = on;
        self
    }

    /// Pauses acknowledged so far
    pub fn acknowledged(&self) -> usize {
        self.acknowledged
    }

    fn acknowledge(&mut self, text: &str) {
        match self.input.as_mut() {
            Some(input) => {
                warn!("PAUSED: {} (press Enter to continue)", text);
                let mut line = String::new();
                match input.read_line(&mut line) {
                    Ok(0) => {
                        // Input closed; nobody can answer later prompts either
                        warn!("Operator input closed, continuing unattended");
                        self.input = None;
                    }
                    Ok(_) => {}
                    Err(e) => {
                        warn!(error = %e, "Failed to read operator input, continuing unattended");
                        self.input = None;
                    }
                }
            }
            None => info!("PAUSED: {} (auto-acknowledged)", text),
        }
        self.acknowledged += 1;
    }

    fn wait(&mut self, duration: Duration, text: Option<&str>) {
        info!(
            seconds = duration.as_secs_f32(),
            "Delay{}{}",
            if text.is_some() { ": " } else { "" },
            text.unwrap_or_default()
        );
        if self.real_time {
            thread::sleep(duration);
        }
    }
}

/// Simulated deck driven from the console
#[derive(Debug)]
pub struct Bench<R> {
    pub deck: SimDeck,
    /// Low-volume pipette, simulated on its own
    pub secondary: Option<SimDeck>,
    pub console: Console<R>,
}

impl<R: BufRead> Bench<R> {
    pub fn new(deck: SimDeck, console: Console<R>) -> Self {
        Self {
            deck,
            secondary: None,
            console,
        }
    }

    /// Mount a secondary pipette
    pub fn with_secondary(mut self, pipette: SimDeck) -> Self {
        self.secondary = Some(pipette);
        self
    }
}

impl<R: BufRead> Operator for Bench<R> {
    fn pause(&mut self, text: &str) {
        self.deck.pause(text);
        self.console.acknowledge(text);
    }

    fn delay(&mut self, duration: Duration, text: Option<&str>) {
        self.deck.delay(duration, text);
        self.console.wait(duration, text);
    }

    fn set_indicator_light(&mut self, on: bool) {
        self.deck.set_indicator_light(on);
        debug!(on, "Deck light");
    }

    fn comment(&mut self, text: &str) {
        self.deck.comment(text);
        info!("{}", text);
    }
}

impl<R: BufRead> Workcell for Bench<R> {
    type Pipette = SimDeck;
    type Magnet = SimDeck;
    type Thermocycler = SimDeck;
    type Operator = Self;

    fn pipette(&mut self) -> &mut SimDeck {
        &mut self.deck
    }

    fn secondary_pipette(&mut self) -> Option<&mut SimDeck> {
        self.secondary.as_mut()
    }

    fn magnet(&mut self) -> &mut SimDeck {
        &mut self.deck
    }

    fn thermocycler(&mut self) -> &mut SimDeck {
        &mut self.deck
    }

    fn operator(&mut self) -> &mut Self {
        self
    }
}
