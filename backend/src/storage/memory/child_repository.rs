use anyhow::Result;
use log::{debug, info};

use super::connection::MemoryConnection;
use crate::domain::models::child::Child as DomainChild;
use crate::storage::traits::ChildStorage;

/// In-memory child repository
#[derive(Clone)]
pub struct ChildRepository {
    connection: MemoryConnection,
}

impl ChildRepository {
    pub fn new(connection: MemoryConnection) -> Self {
        Self { connection }
    }
}

impl ChildStorage for ChildRepository {
    fn store_child(&self, child: &DomainChild) -> Result<()> {
        let mut store = self.connection.write()?;
        store.children.insert(child.id.clone(), child.clone());
        info!("Stored child '{}' ({})", child.name(false), child.id);
        Ok(())
    }

    fn get_child(&self, child_id: &str) -> Result<Option<DomainChild>> {
        let store = self.connection.read()?;
        Ok(store.children.get(child_id).cloned())
    }

    fn list_children(&self) -> Result<Vec<DomainChild>> {
        let store = self.connection.read()?;
        let mut children: Vec<DomainChild> = store.children.values().cloned().collect();
        children.sort_by_key(|c| c.sort_key());
        debug!("Listed {} children", children.len());
        Ok(children)
    }

    fn delete_child(&self, child_id: &str) -> Result<bool> {
        let mut store = self.connection.write()?;
        if store.children.remove(child_id).is_none() {
            debug!("No child found to delete: {}", child_id);
            return Ok(false);
        }

        let schedules_before = store.schedules.len();
        store.schedules.retain(|_, s| s.child_id != child_id);
        let doses_before = store.doses.len();
        store.doses.retain(|d| d.child_id != child_id);

        info!(
            "Deleted child {} with {} schedules and {} doses",
            child_id,
            schedules_before - store.schedules.len(),
            doses_before - store.doses.len()
        );
        Ok(true)
    }
}
