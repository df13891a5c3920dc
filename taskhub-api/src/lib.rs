//! # TaskHub API Server Library
//!
//! HTTP surface of TaskHub: per-user task CRUD with an administrator
//! override, plus registration, login, password reset and email
//! verification.
//!
//! ## Modules
//!
//! - `app`: Application state and router builder
//! - `config`: Configuration management
//! - `error`: Error handling and HTTP response mapping
//! - `extract`: Validating request extractors
//! - `managers`: Task service layer
//! - `routes`: API route handlers
//! - `schemas`: Request and response bodies

pub mod app;
pub mod config;
pub mod error;
pub mod extract;
pub mod managers;
pub mod routes;
pub mod schemas;
