//! Background Tasks Module
//!
//! Contains background tasks that run for the lifetime of the process.
//!
//! # Tasks
//! - Expiry purge: removes expired in-memory entries at configured
//!   intervals, complementing the store's lazy expiry on read

mod purge;

pub use purge::spawn_purge_task;
