use std::sync::Mutex;

use uuid::Uuid;

use messdesk_db::Database;
use messdesk_types::models::{Mess, Principal, Role};

use crate::storage::FileStore;

pub(crate) fn db() -> Database {
    Database::open_in_memory().unwrap()
}

/// A student principal with no backing row, for pure policy checks.
pub(crate) fn principal_student() -> Principal {
    Principal { id: Uuid::new_v4(), role: Role::Student }
}

/// A student principal backed by a real row, so complaints/issues can
/// reference it.
pub(crate) fn student(db: &Database) -> Principal {
    let id = Uuid::new_v4();
    let roll = format!("n19{}", &id.simple().to_string()[..8]);
    db.create_student(&id.to_string(), "Asha", &roll, "9876543210", "hash", "dh1")
        .unwrap();
    Principal { id, role: Role::Student }
}

pub(crate) fn mr(mess: Mess) -> Principal {
    Principal { id: Uuid::new_v4(), role: Role::Mr { mess } }
}

pub(crate) fn higher() -> Principal {
    Principal { id: Uuid::new_v4(), role: Role::Higher }
}

/// FileStore that records calls instead of touching disk.
#[derive(Default)]
pub(crate) struct RecordingStore {
    pub(crate) deleted: Mutex<Vec<String>>,
}

impl RecordingStore {
    pub(crate) fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }
}

impl FileStore for RecordingStore {
    fn store(&self, _bytes: &[u8]) -> anyhow::Result<String> {
        Ok(Uuid::new_v4().to_string())
    }

    fn delete(&self, path: &str) -> anyhow::Result<()> {
        self.deleted.lock().unwrap().push(path.to_string());
        Ok(())
    }
}
