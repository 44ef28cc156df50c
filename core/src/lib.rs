pub mod db;
pub mod export;
pub mod migrations;
pub mod models;
pub mod service;
