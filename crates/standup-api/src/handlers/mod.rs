//! Route handlers

pub mod commands;
pub mod events;
pub mod health;
