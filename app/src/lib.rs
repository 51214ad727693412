//! Process bootstrap for Tokensmith
//!
//! Builds the token service from configuration and owns the lifecycle of the
//! background cache sweeper. An HTTP layer embeds a [`Runtime`] and calls
//! into [`Runtime::service`].

pub mod logging;
pub mod runtime;

pub use runtime::Runtime;
