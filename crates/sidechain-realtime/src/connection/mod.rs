//! WebSocket connection management: registry, handles, auth, rate limiting.

pub mod authenticator;
pub mod handle;
pub mod rate_limit;
pub mod registry;

pub use authenticator::{AuthenticatedConnection, WsAuthenticator};
pub use handle::{ConnectionHandle, ConnectionId, Delivery};
pub use rate_limit::TokenBucket;
pub use registry::{ConnectionRegistry, Registration};
