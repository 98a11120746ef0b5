//! quantmap-io - Point file I/O
//!
//! Reads and writes 3-component points as comma-separated text:
//!
//! - one point per line, three fields
//! - fields written like C's `%.15e` (`1.234500000000000e+03`)
//! - tolerant loading: lines that are not three numbers are skipped

pub mod error;
pub mod points;

pub use error::*;
pub use points::*;
