// Library root: the draft engine, its store and configuration.

pub mod config;
pub mod db;
pub mod draft;
pub mod error;
pub mod pool;
pub mod seed;
pub mod service;
