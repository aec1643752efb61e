pub mod app;
pub mod charts;
pub mod config;
pub mod derive;
pub mod dispatch;
pub mod errors;
pub mod fetch;
pub mod handlers;
pub mod models;
pub mod state;
pub mod ui;

pub use app::router;
pub use config::Config;
pub use state::{AppState, Dashboard, DashboardState};
