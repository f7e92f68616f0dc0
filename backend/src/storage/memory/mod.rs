//! # Memory Storage Module
//!
//! In-process implementation of the storage traits. The record layer of the
//! host application owns real persistence; this backend holds a loaded
//! household snapshot for the CLI and gives the domain tests a store.

pub mod child_repository;
pub mod connection;
pub mod dose_repository;
pub mod schedule_repository;

#[cfg(test)]
pub mod test_utils;

pub use child_repository::ChildRepository;
pub use connection::MemoryConnection;
pub use dose_repository::DoseRepository;
pub use schedule_repository::ScheduleRepository;
