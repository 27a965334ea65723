//! HTTP handlers

pub mod health;
pub mod detect;
pub mod profiles;
pub mod logs;
