//! Request handlers

pub mod docs;
pub mod health;
pub mod predict;
pub mod train;
