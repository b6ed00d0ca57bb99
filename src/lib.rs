//! # fastcalc
//!
//! Single-line calculator. [`calc_engine`] turns one expression into a short
//! result string or a typed error. [`history`] and [`config`] hold the state
//! the interactive shells keep between runs, [`localization`] their interface
//! text, and [`session`] is what they do with a submitted line.

pub mod calc_engine;
pub mod config;
pub mod history;
pub mod localization;
pub mod session;

pub use calc_engine::{calculate, evaluate_expression, evaluate_str, EngineError};
