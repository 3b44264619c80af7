//! # hellodb API Server Library
//!
//! This library provides the core functionality for the hellodb API server.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `middleware`: Security headers
//! - `page`: Status bundle collection and HTML rendering
//! - `routes`: Route handlers

pub mod app;
pub mod config;
pub mod error;
pub mod middleware;
pub mod page;
pub mod routes;
