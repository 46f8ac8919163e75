pub mod api;
pub mod app;
pub mod config;
pub mod navigation;
pub mod progress;
pub mod shared;
pub mod state;
pub mod storage;
