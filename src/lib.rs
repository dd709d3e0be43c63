//! Library crate for ayahvault-back, exposing modules for the server binary and tests.

pub mod config;
pub mod dao;
pub mod dto;
pub mod error;
pub mod routes;
pub mod services;
pub mod state;
