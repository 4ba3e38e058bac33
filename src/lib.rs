//! Link safety checker: accepts a link and a phone number over HTTP, classifies
//! the link's host against local allow/block lists or a remote model, and texts
//! the verdict back.

pub mod ai;
pub mod app;
pub mod classify;
pub mod config;
pub mod domain;
pub mod http;
pub mod infrastructure;
pub mod store;
pub mod tasks;
