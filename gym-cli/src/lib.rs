// Library exports for the gym CLI
// This allows testing of internal modules

pub mod api;
pub mod commands;
pub mod config;
pub mod exercise;
pub mod favorites;
pub mod forms;
pub mod guard;
pub mod models;
pub mod notify;
pub mod routes;
pub mod session;
pub mod storage;
pub mod ui;
