//! quantmap-queue - Work hand-off between threads
//!
//! A single bounded-wait FIFO, [`GuardedQueue`], used to feed worker
//! threads. Producers deactivate it when done; consumers drain whatever
//! is left and then stop.

pub mod guarded_queue;

pub use guarded_queue::*;
