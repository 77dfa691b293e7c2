// handlers/protected/mod.rs - Handlers that require an access token
//
// Every handler here takes `AuthUser` as its first extractor, so anonymous
// callers get 401 before any lookup or body parsing happens.

pub mod kittens;
pub mod ratings;
