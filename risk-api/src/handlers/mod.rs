//! HTTP handlers

pub mod health;
pub mod predict;
pub mod students;
pub mod moods;
pub mod reports;
