pub mod app;
pub mod cli;
pub mod constants;
pub mod gateway;
pub mod runtime;
pub mod session;
pub mod tui;
pub mod utils;

pub use app::{load_config, Config};
pub use gateway::{Backend, DocumentHandle, HttpBackend};
pub use session::SessionState;
pub use tui::run_ui;
pub use utils::DocQaError;
