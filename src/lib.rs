//! # trainer-desk
//!
//! JSON API for fitness trainers: clients, an exercise catalog, plannings
//! (nested week → day → session → exercise → set trees), reusable templates
//! and skeletons.
//!
//! The binary in `main.rs` only wires configuration, the pool and the
//! router; everything else lives here so integration tests can build the
//! same [`app`].

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod response;
pub mod routes;
pub mod services;
pub mod tree;

pub use routes::{app, AppState};
