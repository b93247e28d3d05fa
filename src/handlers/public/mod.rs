// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Tenant and user registration plus token acquisition. Every input comes
// from an anonymous caller and goes through `ValidatedJson`.
pub mod tenants;
pub mod users;
