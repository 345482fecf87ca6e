//! End-to-end tests against the in-memory backends.

mod helpers;
mod notifications_test;
mod presence_test;
mod ws_test;
