pub mod app;
pub mod clock;
pub mod completion;
pub mod errors;
pub mod handlers;
pub mod manage;
pub mod models;
pub mod rules;
pub mod schedule;
pub mod state;
pub mod storage;
pub mod streak;
pub mod tasks;
pub mod ui;
pub mod view;

pub use app::router;
pub use clock::{Clock, FixedClock, SystemClock};
pub use state::AppState;
pub use storage::{load_data, resolve_data_path, HabitStore};
