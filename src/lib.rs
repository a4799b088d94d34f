pub mod analytics;
pub mod api;
pub mod cli;
pub mod config;
pub mod dashboard;
pub mod dates;
pub mod model;
pub mod render;
pub mod view;
pub mod web;
