pub mod capture_surface;
pub mod conferencing_sdk;
pub mod host_window;
pub mod main_context;
pub mod session_delegate;
pub mod ui_node;
