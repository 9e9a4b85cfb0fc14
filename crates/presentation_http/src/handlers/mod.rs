//! HTTP request handlers

pub mod health;
pub mod messages;
pub mod webhook;
