// handlers/protected/mod.rs - Handlers that require a bearer session
//
// Every handler here resolves the caller through `middleware::authenticate`
// and answers 401 when the token does not map to a user.

pub mod users;

pub use users::*;
