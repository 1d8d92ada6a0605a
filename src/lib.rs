pub mod app;
pub mod calendar;
pub mod config;
pub mod entries;
pub mod errors;
pub mod handlers;
pub mod history;
pub mod models;
pub mod progress;
pub mod state;
pub mod stats;
pub mod storage;
pub mod tracker;

pub use app::router;
pub use config::Config;
pub use state::AppState;
pub use storage::load_data;
