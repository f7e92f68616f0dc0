pub mod child;
pub mod dose;
pub mod medication_schedule;
