//! Core library for keywarden, a client for the KeyWarden credential vault.
//!
//! Provides the building blocks the front end composes:
//!
//! - `api`: typed REST client for credentials, categories, audit logs, export
//! - `auth`: session token lifecycle and its persistence
//! - `router`: static route table and the navigation guard
//! - `models`: wire types shared with the server
//! - `config`: config file handling and base-URL resolution

pub mod api;
pub mod auth;
pub mod config;
pub mod models;
pub mod router;
