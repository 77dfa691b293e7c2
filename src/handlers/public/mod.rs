// handlers/public/mod.rs - Handlers open to anonymous callers
//
// Reads of breeds and kittens, account registration and token issuance.

pub mod breeds;
pub mod kittens;
pub mod register;
pub mod service;
pub mod token;
