//! API handlers module

pub mod health;
pub mod manuscripts;
pub mod reviews;
pub mod decisions;
pub mod payments;
pub mod dashboard;
pub mod navigation;
