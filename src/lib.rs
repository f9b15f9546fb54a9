//! Frequency-domain bandpass filtering for grayscale images.
//!
//! [`imaging`] holds the computational core; [`session`] runs one request end
//! to end and returns the three output grids. Nothing in the library writes
//! to disk: saving previews is left to the host (see the `rusty-bandpass`
//! binary).

pub mod config;
pub mod error;
pub mod imaging;
pub mod session;

pub use error::{FilterError, Result};
pub use session::{FilterOutputs, FilterSession, NamedImage};
