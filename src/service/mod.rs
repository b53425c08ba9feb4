//! Service layer for the front desk
//!
//! This module contains the state object that owns the configured store,
//! metrics and both scheduling components.

pub mod front_desk;

pub use front_desk::{FrontDesk, FrontDeskStats};
