//! Yext directory listing.

use crate::rest::{non_empty, RestOperation};
use crate::types::{ArgSpec, ConnectorSchema};
use flowlink::config::YEXT_BASE_URL;
use flowlink::transport::{base_url, path_segment};
use flowlink::{ConnectorError, HttpRequest, InvocationArgs, Secret};
use serde_json::Value;

pub const ENTITY_TYPES: &[&str] = &["locations", "entities", "reviews", "folders"];

const SECRET_FIELDS: &[&str] = &["api_key"];

/// `GET {base}/v2/accounts/me/{entity}?api_key=..&v=..`
pub struct GetEntities {
    base_url: String,
}

impl GetEntities {
    pub fn new() -> Self {
        Self::with_base_url(YEXT_BASE_URL)
    }

    pub fn with_base_url(base: &str) -> Self {
        Self {
            base_url: base_url(base),
        }
    }
}

impl Default for GetEntities {
    fn default() -> Self {
        Self::new()
    }
}

impl RestOperation for GetEntities {
    fn name(&self) -> &str {
        "yext_get_entities"
    }

    fn schema(&self) -> ConnectorSchema {
        ConnectorSchema::new("yext_get_entities", "Get entities")
            .describe("Lists one of the account's entity collections")
            .arg(ArgSpec::secret("yext"))
            .arg(ArgSpec::select("entity", "Entity", ENTITY_TYPES).required())
            .arg(
                ArgSpec::string("version", "API version")
                    .describe("Version date, e.g. 20190424")
                    .required(),
            )
            .with_output("yext")
    }

    fn secret_fields(&self) -> &'static [&'static str] {
        SECRET_FIELDS
    }

    fn build_request(
        &self,
        args: &InvocationArgs,
        secret: &Secret,
    ) -> Result<HttpRequest, ConnectorError> {
        let entity = args.require_str("entity")?;
        if !ENTITY_TYPES.contains(&entity) {
            return Err(ConnectorError::invalid_argument(
                "entity",
                format!("expected one of {}", ENTITY_TYPES.join(", ")),
            ));
        }
        let url = format!("{}/v2/accounts/me/{}", self.base_url, path_segment(entity));
        Ok(HttpRequest::get(url)
            .header("Accept", "application/json")
            .query("api_key", secret.field("api_key")?)
            .query("v", args.require_str("version")?))
    }

    fn project(&self, body: Value, _args: &InvocationArgs) -> Result<Value, ConnectorError> {
        non_empty(body.get("response").cloned().unwrap_or(Value::Null))
    }
}
