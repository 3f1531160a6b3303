//! Porta API - HTTP client for the admin portal account management API.
//!
//! This crate provides a small blocking JSON client used to drive a 3scale
//! admin portal. It centralizes authentication-header construction, JSON
//! request/response marshaling, verb dispatch, and gated diagnostic logging
//! behind one uniform interface; everything above it is plain orchestration.

pub mod client;

// Re-export key types
pub use client::ApiClient;
