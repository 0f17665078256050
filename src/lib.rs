//! flowlink - building blocks for conversational-flow connectors.
//!
//! A connector receives a [`FlowContext`], an optional [`Secret`] and the
//! caller's [`InvocationArgs`], makes one outbound HTTP call through a
//! [`Transport`], and writes the result (or an `{ "error": ... }` object)
//! back into the conversation.
//!
//! ```text
//!   args + secret
//!        ↓ validate
//!   HttpRequest ──→ Transport ──→ HttpResponse
//!                                     ↓ classify
//!                    FlowContext ←── result | { error }
//! ```

// Invocation arguments and truthiness rules
pub mod args;

// Host configuration (TOML + env)
pub mod config;

// Conversation state collaborator
pub mod context;

// Connector error taxonomy
pub mod error;

// Credential bundles and secret resolution
pub mod secret;

// HTTP request model and transports
pub mod transport;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use args::InvocationArgs;
pub use context::{ContextMode, FlowContext, LogLevel, MemoryContext};
pub use error::ConnectorError;
pub use secret::{Secret, SecretProvider, SecretStore};
pub use transport::{HttpRequest, HttpResponse, ReqwestTransport, Transport};
