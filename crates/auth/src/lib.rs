//! `posgate-auth` — pure authentication boundary for the gateway.
//!
//! This crate is intentionally decoupled from HTTP and storage: the codec is
//! a pure function of its inputs plus a static secret, and the identity store
//! is a trait implemented by whatever backend hosts the user records.

pub mod bridge;
pub mod claims;
pub mod codec;
pub mod identity;

pub use bridge::{AuthBridge, AuthError, Credential, SignedIn};
pub use claims::{TokenClaims, TokenError, validate_claims};
pub use codec::TokenCodec;
pub use identity::{IdentityError, IdentityStore, InMemoryIdentityStore, Subject};
