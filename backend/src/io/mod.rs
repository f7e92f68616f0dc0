//! Conversion between domain results and the DTOs of the `shared` crate.

pub mod medication_mapper;

pub use medication_mapper::MedicationMapper;
