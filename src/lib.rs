pub mod account;
pub mod app;
pub mod config;
pub mod db;
pub mod gateway;
pub mod state;
