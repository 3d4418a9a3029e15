//! # Data models
//!
//! Row structs (`sqlx::FromRow`) and request/response bodies per domain:
//! - `user`: accounts, roles, auth payloads
//! - `client`: a trainer's clients
//! - `exercise`: the global exercise catalog
//! - `planning`: plannings (the tree itself lives in `crate::tree`)
//! - `template`: planning templates, assignments, modification log
//! - `skeleton`: esqueletos

pub mod client;
pub mod exercise;
pub mod planning;
pub mod skeleton;
pub mod template;
pub mod user;

pub use client::*;
pub use exercise::*;
pub use planning::*;
pub use skeleton::*;
pub use template::*;
pub use user::*;
