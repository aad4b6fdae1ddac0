pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod executor;
pub mod fetcher;
pub mod lane;
pub mod output;
pub mod providers;
pub mod surface;
pub mod tab;
pub mod tui;
