//! Plant records with stage-congruent cultivation dates, lifecycle status and
//! projected harvest, persisted to SQLite with a per-plant change log.

pub mod app;
pub mod cli;
pub mod config;
pub mod db;
pub mod error;
pub mod logic;
pub mod models;
