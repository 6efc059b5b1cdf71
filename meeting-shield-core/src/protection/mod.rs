pub mod capture_guard;
pub mod scheduler;
pub mod view_sanitizer;
