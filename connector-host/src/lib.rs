//! Flowlink connector host - built-in integration connectors for flows.
//!
//! Each connector takes a flow context and declared arguments, performs one
//! outbound HTTP call against a SaaS API (Jira, ServiceNow, Yext, Azure
//! Cognitive Services, Bing) and writes the result, or an error payload,
//! back into the conversation.
//!
//! # Architecture
//!
//! ```text
//!   Flow engine / HTTP caller
//!          ↓  (connector name, args, secret ref, context)
//! ┌─────────────────────────────────────────┐
//! │       Connector host (api, registry)     │
//! │  - Resolve connector and secret          │
//! │  - Replay context into MemoryContext     │
//! └─────────────────────────────────────────┘
//!          ↓
//! ┌─────────────────────────────────────────┐
//! │       Connector (rest::execute)          │
//! │  - Validate args and secret              │
//! │  - One request through the Transport     │
//! │  - Classify, project, write the store    │
//! └─────────────────────────────────────────┘
//!          ↓
//!     External API
//! ```
//!
//! # Core Types
//!
//! - [`Connector`] - Trait that all connectors implement
//! - [`Invocation`] - Context, secret, args and transport for one call
//! - [`rest::RestOperation`] - Declarative single-request connector
//! - [`types::ConnectorSchema`] - Argument metadata exposed to flow authors

mod connector;
pub mod api;
pub mod connectors;
pub mod registry;
pub mod rest;
pub mod types;

// Re-export public types
pub use connector::{Connector, Invocation};
pub use types::{ArgSpec, ArgType, ConnectorSchema};

// Re-export the flow-facing types from flowlink for convenience
pub use flowlink::{ConnectorError, FlowContext, InvocationArgs, Secret, Transport};
