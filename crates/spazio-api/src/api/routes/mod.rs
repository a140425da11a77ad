//! Route handlers

pub mod assessments;
pub mod health;
pub mod metrics;
pub mod rentals;
