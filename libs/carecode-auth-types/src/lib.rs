//! Shared claim layout, token codec and wire types for Carecode authentication.
//!
//! This crate provides:
//! - JWT claims (`Claims`) with the explicit access/refresh distinction (`TokenKind`)
//! - The user role enum (`Role`)
//! - `encode_token` / `decode_token`, pure HS256 codec functions
//! - API error codes and response bodies shared by the server and its clients

mod claims;
mod codec;
mod errors;
mod responses;
mod role;

pub use claims::{Claims, TokenKind};
pub use codec::{decode_token, encode_token};
pub use errors::{ErrorCode, JwtError};
pub use responses::{AuthTokenResponse, TokenValidationResponse, UserDetails};
pub use role::Role;
