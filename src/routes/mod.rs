// # Routes Module
//
// HTTP route handlers, grouped by concern. Routes are registered in
// `server.rs`.

/// Liveness and readiness endpoints
pub mod health;

/// List, search, create and delete for the electricians collection
pub mod electricians;
