//! Authentication primitives.
//!
//! Users sign in with the external identity provider; the bridge in front
//! of this service exchanges that session for an HS256 access token whose
//! `sub` is the user id. [`jwt`] generates and validates those tokens.

pub mod jwt;
