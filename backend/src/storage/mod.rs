pub mod memory;
pub mod traits;
pub mod yaml;

pub use memory::MemoryConnection;
pub use traits::{ChildStorage, Connection, DoseStorage, MedicationScheduleStorage};
