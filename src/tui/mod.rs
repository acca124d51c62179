// Gateway module for TUI - follows the Train Station Pattern
// All external access must go through this gateway

// Private submodules - not directly accessible from outside
mod app;
mod markdown;
mod render;
mod ui;

// Public re-exports - the ONLY way to access TUI functionality
pub use app::{App, BackendEvent, InputMode, Task, UploadPanel};
pub use markdown::parse_markdown;
pub use ui::run_ui;
