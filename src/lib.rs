pub mod api;
pub mod app;
pub mod config;
pub mod due_date;
pub mod error;
pub mod models;
pub mod parser;
pub mod ui;
