pub mod aggregator;
pub mod coinbase;
pub mod config;
pub mod engine;
pub mod error;
pub mod event;
pub mod indicator;
pub mod input;
pub mod model;
pub mod tick_buffer;
pub mod ui;
