//! Library crate for wall-control, exposing the per-display control plane and the HTTP host.

pub mod clock;
pub mod config;
pub mod control;
pub mod dto;
pub mod error;
pub mod geometry;
pub mod library;
pub mod routes;
pub mod services;
pub mod state;
