//! Business logic: session, permissions, state mapping and services

pub mod async_state;
pub mod auth;
pub mod cache;
pub mod permissions;
pub mod query_client;
pub mod services;
pub mod session;
