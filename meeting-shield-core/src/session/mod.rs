pub mod binding;
pub mod init_bridge;
pub mod lifecycle;
