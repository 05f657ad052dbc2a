//! Tollgate library
//!
//! Stateless bearer-token authentication in front of an HTTP API: token
//! issuing and verification, a per-request security context, and the
//! identity store behind login and registration.

pub mod api;
pub mod auth;
pub mod config;
pub mod db;
pub mod user;
