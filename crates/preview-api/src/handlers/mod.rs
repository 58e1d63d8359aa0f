//! HTTP handlers

pub mod admin;
pub mod cache;
pub mod fetch;
pub mod health;
pub mod pages;
pub mod upload;

mod preview;
