#![cfg_attr(not(any(test, feature = "std")), no_std)]

#[macro_use]
mod log;

mod error;

pub mod command;
pub mod config;
pub mod device;
pub mod interface;
pub mod params;
pub mod registers;
pub mod sample;

#[cfg(feature = "std")]
pub mod acquisition;
#[cfg(feature = "std")]
pub mod datalog;

#[cfg(test)]
mod sim;

pub use crate::device::{Ldc1101, PollBound};
pub use crate::error::{Error, Result};
