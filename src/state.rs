use crate::clock::Clock;
use crate::storage::HabitStore;
use std::{path::PathBuf, sync::Arc};

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<HabitStore>,
    pub clock: Arc<dyn Clock>,
}

impl AppState {
    pub fn new(data_path: PathBuf, clock: Arc<dyn Clock>) -> Self {
        Self {
            store: Arc::new(HabitStore::new(data_path)),
            clock,
        }
    }
}
