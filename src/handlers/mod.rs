// handlers/mod.rs - Handler tiers
//
// Public (no auth) → Protected (bearer session required)
pub mod protected;
pub mod public;
