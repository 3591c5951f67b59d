//! Driver implementations
//!
//! This crate provides concrete implementations of the traits defined
//! in magwash-core:
//!
//! - Simulated deck (pipette, magnetic module, thermocycler, operator)
//!   that keeps a journal of every call and a simulated clock

#![no_std]
#![deny(unsafe_code)]

extern crate alloc;

pub mod sim;
