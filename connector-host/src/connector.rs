use crate::types::ConnectorSchema;
use async_trait::async_trait;
use flowlink::{ConnectorError, FlowContext, InvocationArgs, Secret, Transport};

/// Everything a connector sees during one call.
pub struct Invocation<'a> {
    /// Conversation state; written at most once.
    pub context: &'a mut dyn FlowContext,
    /// Credential bundle resolved by the host, if the connector declares one.
    pub secret: Option<&'a Secret>,
    pub args: &'a InvocationArgs,
    pub transport: &'a dyn Transport,
}

/// Connector interface for flow integrations.
///
/// Connectors are stateless: everything a call needs arrives in the
/// [`Invocation`], and nothing is kept between calls.
///
/// # Lifecycle
/// 1. The host looks the connector up by `name()`
/// 2. The host resolves the secret reference from the caller's arguments
/// 3. `invoke()` validates, calls the external API once, and writes the
///    result into the flow context
///
/// # Example
/// ```no_run
/// use async_trait::async_trait;
/// use connector_host::{Connector, Invocation};
/// use connector_host::types::{ArgSpec, ConnectorSchema};
/// use flowlink::{ContextMode, ConnectorError};
///
/// struct Echo;
///
/// #[async_trait]
/// impl Connector for Echo {
///     fn name(&self) -> &str {
///         "echo"
///     }
///
///     fn schema(&self) -> ConnectorSchema {
///         ConnectorSchema::new("echo", "Echo")
///             .arg(ArgSpec::string("text", "Text").required())
///             .arg(ArgSpec::store("echo"))
///     }
///
///     async fn invoke(&self, inv: Invocation<'_>) -> Result<(), ConnectorError> {
///         let text = inv.args.require_str("text")?;
///         let store = inv.args.store()?;
///         inv.context.add_to_context(store, text.into(), ContextMode::Simple);
///         Ok(())
///     }
/// }
/// ```
#[async_trait]
pub trait Connector: Send + Sync {
    /// Unique identifier, e.g. `jira_create_ticket`.
    fn name(&self) -> &str;

    /// Declared arguments, exposed to flow authors.
    fn schema(&self) -> ConnectorSchema;

    /// Runs the connector once.
    ///
    /// # Returns
    /// * `Ok(())` - result or recorded error written to the store
    /// * `Err(...)` - validation failure, or a call error with
    ///   `stopOnError = true`; nothing was written
    async fn invoke(&self, invocation: Invocation<'_>) -> Result<(), ConnectorError>;
}
