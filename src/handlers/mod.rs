// handlers/mod.rs - two handler tiers
//
// Public (no auth) → Protected (JWT auth, optionally role-gated)
pub mod protected;
pub mod public;
