//! Validated REST call - the shape shared by every network connector.
//!
//! ```text
//! validate args → validate secret → build request → send once
//!      → classify → project → write store (or { error } / abort)
//! ```
//!
//! A connector implements [`RestOperation`] (schema, secret fields, request
//! builder, optional classification/projection) and is registered wrapped in
//! [`Rest`]. Connectors that need more than one request reuse [`validate`],
//! [`require_secret`], [`classify_json`] and [`deliver`] directly.

use crate::connector::{Connector, Invocation};
use crate::types::ConnectorSchema;
use async_trait::async_trait;
use flowlink::{
    ConnectorError, ContextMode, FlowContext, HttpRequest, HttpResponse, InvocationArgs,
    LogLevel, Secret,
};
use serde_json::{json, Value};

/// Where a connector writes its result.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputTarget {
    /// `add_to_context(store, value)`.
    Context,
    /// Directly into the input map under `store`.
    Input,
}

/// Per-call output settings taken from the arguments.
#[derive(Clone, Debug, PartialEq)]
pub struct ErrorPolicy {
    pub store: String,
    pub stop_on_error: bool,
}

impl ErrorPolicy {
    pub fn from_args(args: &InvocationArgs) -> Result<Self, ConnectorError> {
        Ok(Self {
            store: args.store()?.to_string(),
            stop_on_error: args.stop_on_error()?,
        })
    }
}

/// A single-request connector declaration.
pub trait RestOperation: Send + Sync {
    fn name(&self) -> &str;

    fn schema(&self) -> ConnectorSchema;

    /// Secret fields that must be present and non-empty.
    fn secret_fields(&self) -> &'static [&'static str];

    fn build_request(
        &self,
        args: &InvocationArgs,
        secret: &Secret,
    ) -> Result<HttpRequest, ConnectorError>;

    /// Turns the raw response into a JSON body or an error.
    fn classify(&self, response: &HttpResponse) -> Result<Value, ConnectorError> {
        classify_json(response)
    }

    /// Maps a successful body to the stored result. Defaults to the raw body.
    fn project(&self, body: Value, _args: &InvocationArgs) -> Result<Value, ConnectorError> {
        Ok(body)
    }

    fn output(&self) -> OutputTarget {
        OutputTarget::Context
    }
}

/// Adapts a [`RestOperation`] into a [`Connector`].
pub struct Rest<O>(pub O);

#[async_trait]
impl<O: RestOperation> Connector for Rest<O> {
    fn name(&self) -> &str {
        self.0.name()
    }

    fn schema(&self) -> ConnectorSchema {
        self.0.schema()
    }

    async fn invoke(&self, invocation: Invocation<'_>) -> Result<(), ConnectorError> {
        execute(&self.0, invocation).await
    }
}

/// Runs one validated REST call.
pub async fn execute<O>(op: &O, inv: Invocation<'_>) -> Result<(), ConnectorError>
where
    O: RestOperation + ?Sized,
{
    validate(&op.schema(), inv.args)?;
    let secret = require_secret(inv.secret, op.secret_fields())?;
    let policy = ErrorPolicy::from_args(inv.args)?;
    let request = op.build_request(inv.args, secret)?;

    tracing::debug!(
        connector = op.name(),
        method = %request.method,
        url = %request.url,
        "Invoking connector"
    );

    let outcome = match inv.transport.send(request).await {
        Ok(response) => op
            .classify(&response)
            .and_then(|body| op.project(body, inv.args)),
        Err(e) => Err(e),
    };

    deliver(inv.context, op.output(), &policy, op.name(), outcome)
}

/// Checks every required argument declared in the schema.
///
/// Boolean arguments must be defined; everything else must be truthy.
pub fn validate(schema: &ConnectorSchema, args: &InvocationArgs) -> Result<(), ConnectorError> {
    for arg in schema.required_args() {
        if arg.is_boolean() {
            args.require_bool(&arg.key)?;
        } else {
            args.require(&[arg.key.as_str()])?;
        }
    }
    Ok(())
}

pub fn require_secret<'a>(
    secret: Option<&'a Secret>,
    fields: &[&str],
) -> Result<&'a Secret, ConnectorError> {
    let secret = secret.ok_or(ConnectorError::MissingSecret)?;
    secret.require(fields)?;
    Ok(secret)
}

/// Writes the outcome according to the error policy.
///
/// Success is written to the store. Errors are either returned
/// (`stopOnError = true`, no write) or written as `{ "error": message }`.
pub fn deliver(
    context: &mut dyn FlowContext,
    target: OutputTarget,
    policy: &ErrorPolicy,
    connector: &str,
    outcome: Result<Value, ConnectorError>,
) -> Result<(), ConnectorError> {
    match outcome {
        Ok(value) => {
            write(context, target, &policy.store, value);
            Ok(())
        }
        Err(err) => {
            if let Some(detail) = err.log_detail() {
                context.log(LogLevel::Error, &format!("{}: {}", connector, detail));
            }
            tracing::warn!(
                connector = connector,
                error = %err,
                stop_on_error = policy.stop_on_error,
                "Connector call failed"
            );
            if policy.stop_on_error {
                Err(err)
            } else {
                write(
                    context,
                    target,
                    &policy.store,
                    json!({ "error": err.to_string() }),
                );
                Ok(())
            }
        }
    }
}

fn write(context: &mut dyn FlowContext, target: OutputTarget, store: &str, value: Value) {
    match target {
        OutputTarget::Context => context.add_to_context(store, value, ContextMode::Simple),
        OutputTarget::Input => {
            context.input_mut().insert(store.to_string(), value);
        }
    }
}

/// Maps non-2xx responses to API or unrecognised errors.
pub fn check_status(response: &HttpResponse) -> Result<(), ConnectorError> {
    if response.is_success() {
        return Ok(());
    }
    let message = response
        .parse_json()
        .ok()
        .and_then(|body| extract_error_message(&body, true));
    Err(match message {
        Some(message) => ConnectorError::Api(message),
        None => ConnectorError::Unrecognized(format!(
            "HTTP {}: {}",
            response.status,
            response.text_snippet(200)
        )),
    })
}

/// Default classification for JSON APIs.
///
/// - non-2xx → [`check_status`]
/// - empty body → empty result
/// - malformed JSON → unrecognised
/// - 2xx carrying an error payload → API error
pub fn classify_json(response: &HttpResponse) -> Result<Value, ConnectorError> {
    check_status(response)?;
    if response.is_empty() {
        return Err(ConnectorError::EmptyResult);
    }
    let body = response.parse_json().map_err(|e| {
        ConnectorError::Unrecognized(format!(
            "Malformed JSON in HTTP {} response: {}",
            response.status, e
        ))
    })?;
    if let Some(message) = extract_error_message(&body, false) {
        return Err(ConnectorError::Api(message));
    }
    Ok(body)
}

/// Fails with [`ConnectorError::EmptyResult`] for null, `{}`, `[]` or `""`.
pub fn non_empty(value: Value) -> Result<Value, ConnectorError> {
    let empty = match &value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::String(s) => s.is_empty(),
        _ => false,
    };
    if empty {
        Err(ConnectorError::EmptyResult)
    } else {
        Ok(value)
    }
}

/// Extracts a human-readable message from a known error payload shape.
///
/// Checked in order: `errorMessages[0]` (Jira), `errors[0]` (Bing, Text
/// Analytics), first value of an `errors` object (Jira field errors),
/// `meta.errors[0].message` (Yext), `error.message` (ServiceNow, Azure),
/// `error` as a string, and, for error responses only, a top-level `message`.
pub fn extract_error_message(body: &Value, include_message: bool) -> Option<String> {
    if let Some(first) = body
        .get("errorMessages")
        .and_then(Value::as_array)
        .and_then(|list| list.first())
    {
        return message_of(first);
    }

    match body.get("errors") {
        Some(Value::Array(list)) if !list.is_empty() => return message_of(&list[0]),
        Some(Value::Object(map)) if !map.is_empty() => {
            return map.values().next().and_then(message_of)
        }
        _ => {}
    }

    if let Some(first) = body
        .pointer("/meta/errors")
        .and_then(Value::as_array)
        .and_then(|list| list.first())
    {
        return message_of(first);
    }

    match body.get("error") {
        Some(Value::Object(error)) => {
            if let Some(message) = error.get("message").and_then(Value::as_str) {
                return Some(message.to_string());
            }
        }
        Some(Value::String(message)) if !message.is_empty() => return Some(message.clone()),
        _ => {}
    }

    if include_message {
        return body
            .get("message")
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .map(str::to_string);
    }
    None
}

fn message_of(entry: &Value) -> Option<String> {
    match entry {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Object(map) => map
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ArgSpec;
    use flowlink::test_utils::MockTransport;
    use flowlink::MemoryContext;

    struct Probe {
        output: OutputTarget,
    }

    impl RestOperation for Probe {
        fn name(&self) -> &str {
            "probe"
        }

        fn schema(&self) -> ConnectorSchema {
            ConnectorSchema::new("probe", "Probe")
                .arg(ArgSpec::secret("probe"))
                .arg(ArgSpec::string("id", "Id").required())
                .with_output("probe")
        }

        fn secret_fields(&self) -> &'static [&'static str] {
            &["key"]
        }

        fn build_request(
            &self,
            args: &InvocationArgs,
            secret: &Secret,
        ) -> Result<HttpRequest, ConnectorError> {
            Ok(HttpRequest::get(format!("https://probe.test/items/{}", args.require_str("id")?))
                .header("X-Key", secret.field("key")?))
        }

        fn output(&self) -> OutputTarget {
            self.output
        }
    }

    fn probe() -> Probe {
        Probe {
            output: OutputTarget::Context,
        }
    }

    fn args(value: Value) -> InvocationArgs {
        InvocationArgs::from_value(value)
    }

    fn secret() -> Secret {
        Secret::new().with("key", "k")
    }

    async fn run(
        op: &Probe,
        transport: &MockTransport,
        ctx: &mut MemoryContext,
        args: &InvocationArgs,
        secret: Option<&Secret>,
    ) -> Result<(), ConnectorError> {
        execute(
            op,
            Invocation {
                context: ctx,
                secret,
                args,
                transport,
            },
        )
        .await
    }

    #[tokio::test]
    async fn test_success_writes_store() {
        let transport = MockTransport::json(200, json!({"id": "1", "name": "x"}));
        let mut ctx = MemoryContext::new();
        let a = args(json!({"id": "1", "store": "probe", "stopOnError": true}));

        run(&probe(), &transport, &mut ctx, &a, Some(&secret())).await.unwrap();

        assert_eq!(ctx.context()["probe"], json!({"id": "1", "name": "x"}));
        let requests = transport.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(requests[0].url, "https://probe.test/items/1");
        assert_eq!(requests[0].header_value("x-key"), Some("k"));
    }

    #[tokio::test]
    async fn test_missing_argument_aborts_without_request() {
        let transport = MockTransport::json(200, json!({}));
        let mut ctx = MemoryContext::new();
        // stopOnError=false must not swallow validation errors
        let a = args(json!({"id": "", "store": "probe", "stopOnError": false}));

        let err = run(&probe(), &transport, &mut ctx, &a, Some(&secret()))
            .await
            .unwrap_err();

        assert_eq!(err, ConnectorError::MissingArgument("id".to_string()));
        assert_eq!(transport.request_count(), 0);
        assert!(ctx.context().is_empty());
    }

    #[tokio::test]
    async fn test_undefined_stop_on_error_is_validation_error() {
        let transport = MockTransport::json(200, json!({}));
        let mut ctx = MemoryContext::new();
        let a = args(json!({"id": "1", "store": "probe"}));

        let err = run(&probe(), &transport, &mut ctx, &a, Some(&secret()))
            .await
            .unwrap_err();

        assert_eq!(err, ConnectorError::MissingArgument("stopOnError".to_string()));
        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_missing_secret_field_aborts_without_request() {
        let transport = MockTransport::json(200, json!({}));
        let mut ctx = MemoryContext::new();
        let a = args(json!({"id": "1", "store": "probe", "stopOnError": false}));

        let err = run(&probe(), &transport, &mut ctx, &a, Some(&Secret::new()))
            .await
            .unwrap_err();
        assert_eq!(err, ConnectorError::MissingSecretField("key".to_string()));

        let err = run(&probe(), &transport, &mut ctx, &a, None)
            .await
            .unwrap_err();
        assert_eq!(err, ConnectorError::MissingSecret);

        assert_eq!(transport.request_count(), 0);
    }

    #[tokio::test]
    async fn test_transport_failure_recorded_when_not_stopping() {
        let transport = MockTransport::failing("connection refused");
        let mut ctx = MemoryContext::new();
        let a = args(json!({"id": "1", "store": "probe", "stopOnError": false}));

        run(&probe(), &transport, &mut ctx, &a, Some(&secret())).await.unwrap();

        assert_eq!(ctx.context()["probe"], json!({"error": "connection refused"}));
    }

    #[tokio::test]
    async fn test_transport_failure_aborts_when_stopping() {
        let transport = MockTransport::failing("connection refused");
        let mut ctx = MemoryContext::new();
        let a = args(json!({"id": "1", "store": "probe", "stopOnError": true}));

        let err = run(&probe(), &transport, &mut ctx, &a, Some(&secret()))
            .await
            .unwrap_err();

        assert_eq!(err, ConnectorError::Transport("connection refused".to_string()));
        assert!(ctx.context().get("probe").is_none());
    }

    #[tokio::test]
    async fn test_unrecognized_error_is_generic_and_logged() {
        let transport = MockTransport::new(vec![Ok(HttpResponse::new(502, "<html>gateway</html>"))]);
        let mut ctx = MemoryContext::new();
        let a = args(json!({"id": "1", "store": "probe", "stopOnError": false}));

        run(&probe(), &transport, &mut ctx, &a, Some(&secret())).await.unwrap();

        assert_eq!(
            ctx.context()["probe"],
            json!({"error": flowlink::error::UNKNOWN_ERROR_MESSAGE})
        );
        assert_eq!(ctx.logs().len(), 1);
        assert_eq!(ctx.logs()[0].level, LogLevel::Error);
        assert!(ctx.logs()[0].message.contains("HTTP 502"));
    }

    #[tokio::test]
    async fn test_api_error_message_surfaces() {
        let transport =
            MockTransport::json(404, json!({"error": {"message": "No Record found", "detail": "x"}}));
        let mut ctx = MemoryContext::new();
        let a = args(json!({"id": "1", "store": "probe", "stopOnError": true}));

        let err = run(&probe(), &transport, &mut ctx, &a, Some(&secret()))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "No Record found");
    }

    #[tokio::test]
    async fn test_input_target() {
        let transport = MockTransport::json(200, json!({"hits": 3}));
        let mut ctx = MemoryContext::new();
        let a = args(json!({"id": "1", "store": "results", "stopOnError": false}));
        let op = Probe {
            output: OutputTarget::Input,
        };

        run(&op, &transport, &mut ctx, &a, Some(&secret())).await.unwrap();

        assert_eq!(ctx.input()["results"], json!({"hits": 3}));
        assert!(ctx.context().is_empty());
    }

    #[tokio::test]
    async fn test_repeated_calls_are_idempotent() {
        let transport = MockTransport::json(200, json!({"id": "1"}));
        let a = args(json!({"id": "1", "store": "probe", "stopOnError": false}));

        let mut first = MemoryContext::new();
        run(&probe(), &transport, &mut first, &a, Some(&secret())).await.unwrap();
        let mut ctx = first.clone();
        run(&probe(), &transport, &mut ctx, &a, Some(&secret())).await.unwrap();

        assert_eq!(first.context(), ctx.context());
        assert_eq!(transport.request_count(), 2);
        assert_eq!(transport.requests()[0], transport.requests()[1]);
    }

    #[test]
    fn test_extract_error_message_shapes() {
        let jira = json!({"errorMessages": ["Issue does not exist"], "errors": {}});
        assert_eq!(extract_error_message(&jira, true).unwrap(), "Issue does not exist");

        let jira_fields = json!({"errorMessages": [], "errors": {"summary": "Field required"}});
        // Empty errorMessages falls through to the field errors
        assert_eq!(
            extract_error_message(&jira_fields, true).unwrap(),
            "Field required"
        );

        let jira_fields_only = json!({"errors": {"summary": "Field required"}});
        assert_eq!(
            extract_error_message(&jira_fields_only, true).unwrap(),
            "Field required"
        );

        let bing = json!({"_type": "ErrorResponse", "errors": [{"code": "InvalidRequest", "message": "Query missing"}]});
        assert_eq!(extract_error_message(&bing, false).unwrap(), "Query missing");

        let yext = json!({"meta": {"errors": [{"code": 2, "message": "Invalid api key"}]}});
        assert_eq!(extract_error_message(&yext, true).unwrap(), "Invalid api key");

        let azure = json!({"error": {"code": "401", "message": "Access denied"}});
        assert_eq!(extract_error_message(&azure, true).unwrap(), "Access denied");

        let plain = json!({"message": "Unauthorized"});
        assert_eq!(extract_error_message(&plain, true).unwrap(), "Unauthorized");
        assert_eq!(extract_error_message(&plain, false), None);

        let ok = json!({"meta": {"errors": []}, "errors": [], "response": {}});
        assert_eq!(extract_error_message(&ok, false), None);
    }

    #[test]
    fn test_classify_json() {
        assert_eq!(
            classify_json(&HttpResponse::new(200, "  ")),
            Err(ConnectorError::EmptyResult)
        );
        assert!(matches!(
            classify_json(&HttpResponse::new(200, "{not json")),
            Err(ConnectorError::Unrecognized(_))
        ));
        assert_eq!(
            classify_json(&HttpResponse::json(
                200,
                &json!({"documents": [], "errors": [{"id": "1", "message": "Invalid language"}]})
            )),
            Err(ConnectorError::Api("Invalid language".to_string()))
        );
        assert_eq!(
            classify_json(&HttpResponse::json(200, &json!([{"a": 1}]))).unwrap(),
            json!([{"a": 1}])
        );
    }

    #[test]
    fn test_non_empty() {
        assert_eq!(non_empty(Value::Null), Err(ConnectorError::EmptyResult));
        assert_eq!(non_empty(json!({})), Err(ConnectorError::EmptyResult));
        assert_eq!(non_empty(json!([1])).unwrap(), json!([1]));
        assert_eq!(non_empty(json!(false)).unwrap(), json!(false));
    }
}
