//! # sidechain-auth
//!
//! Access-token handling for Sidechain. Tokens are issued by the account
//! service; this crate verifies them for the WebSocket handshake and the
//! REST extractor, honours the shared revocation blocklist, and can mint
//! tokens for the CLI and tests.

pub mod jwt;

pub use jwt::{Claims, JwtDecoder, JwtEncoder};
