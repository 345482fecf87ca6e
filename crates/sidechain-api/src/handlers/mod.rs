//! Route handlers organized by domain.

pub mod events;
pub mod health;
pub mod notification;
pub mod presence;
pub mod realtime;
pub mod settings;
pub mod ws;
