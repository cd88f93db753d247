// src/lib.rs
//! Attendance monitor for the attok.co.kr board.
//!
//! Flow: `poll` asks `extract` for the board, `filter` vets names, `store`
//! consults `detect`, and new events go to `notify`.

pub mod cli;
pub mod config;
pub mod core;
pub mod detect;
pub mod error;
pub mod extract;
pub mod filter;
pub mod gui;
pub mod log;
pub mod model;
pub mod notify;
pub mod poll;
pub mod progress;
pub mod store;

#[cfg(feature = "browser")]
pub mod browser;

pub use error::{Error, Result};
