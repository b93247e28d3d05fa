// handlers/protected/mod.rs - Protected handlers (JWT authentication required)
//
// Every handler takes the verified `AuthContext` and never reads a tenant id
// from the request body or query. Role-gated routes are wired in `app.rs`.
pub mod customers;
pub mod leads;
pub mod tasks;
pub mod users;
