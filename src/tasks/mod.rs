//! Background Tasks Module
//!
//! Contains background tasks that run alongside the cache service.
//!
//! # Tasks
//! - Expiration sweeper: reclaims expired entries after writes and periodically

mod sweeper;

pub use sweeper::spawn_sweep_task;
