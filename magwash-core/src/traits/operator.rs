//! Operator interaction trait

use core::time::Duration;

/// Trait for the human at the bench
///
/// `pause` and `delay` block the calling thread. Nothing is lost while
/// blocked; execution resumes where it left off.
pub trait Operator {
    /// Show `message` and block until the operator acknowledges
    fn pause(&mut self, message: &str);

    /// Block for `duration`, optionally showing a message
    fn delay(&mut self, duration: Duration, message: Option<&str>);

    /// Switch the deck indicator light
    fn set_indicator_light(&mut self, on: bool);

    /// Record a comment in the run log
    fn comment(&mut self, _text: &str) {}
}
