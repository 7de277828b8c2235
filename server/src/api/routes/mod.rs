//! API route handlers

pub mod health;
pub mod lesson;
pub mod personalization;
pub mod quiz;
