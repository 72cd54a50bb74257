pub mod app;
pub mod config;
pub mod feed;
pub mod render;
pub mod shell;
pub mod util;
