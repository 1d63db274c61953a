// handlers/mod.rs - HTTP handlers grouped by resource
//
// Identity handlers proxy to the upstream provider, record handlers run
// against the pool chosen by the tenant middleware.

pub mod auth;           // POST /auth/token
pub mod calendar;       // /calendar/*
pub mod followup_notes; // /client-followup-notes
pub mod roles;          // /roles
pub mod root;           // GET /, GET /health
pub mod users;          // /users
pub mod warranties;     // /warranties
