//! HTTP client and wire models for the ChMS REST API

pub mod client;
pub mod models;

pub use client::ChmsClient;
