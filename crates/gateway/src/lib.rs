//! HTTP gateway for the POS clients: CORS preflight negotiation, credential
//! sign-in issuing signed bearer tokens, and bearer verification attaching a
//! request-scoped identity.

pub mod app;
pub mod config;
pub mod context;
pub mod cors;
pub mod middleware;
