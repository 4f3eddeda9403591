pub mod config;
pub mod database;
pub mod error;
pub mod models;
pub mod security;
pub mod services;
pub mod state;
pub mod web;

#[cfg(test)]
mod test_support;
