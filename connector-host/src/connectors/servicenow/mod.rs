//! ServiceNow Table API connectors.
//!
//! All requests use basic auth against `https://{instance}` and JSON in both
//! directions. Successful responses wrap their payload in `result`, which is
//! what gets stored.

pub mod attachments;
pub mod config;

use crate::rest::{check_status, RestOperation};
use crate::types::{ArgSpec, ConnectorSchema};
use flowlink::transport::Method;
use flowlink::{ConnectorError, HttpRequest, HttpResponse, InvocationArgs, Secret};
use serde_json::Value;

use self::config::{encoded_query, record_url, table_url, SECRET_FIELDS};

/// Authenticated JSON request to an instance URL.
fn instance_request(method: Method, url: String, secret: &Secret) -> Result<HttpRequest, ConnectorError> {
    Ok(HttpRequest::new(method, url)
        .header("Accept", "application/json")
        .header("Content-Type", "application/json")
        .basic_auth(secret.field("username")?, secret.field("password")?))
}

/// The `result` member of a ServiceNow response, unmodified.
fn result_of(body: Value) -> Result<Value, ConnectorError> {
    match body {
        Value::Object(mut map) => map.remove("result").ok_or(ConnectorError::EmptyResult),
        _ => Err(ConnectorError::EmptyResult),
    }
}

fn table_arg() -> ArgSpec {
    ArgSpec::string("table", "Table")
        .describe("The table name, e.g. incident")
        .required()
}

fn sys_id_arg() -> ArgSpec {
    ArgSpec::string("sysId", "Sys ID")
        .describe("The sys_id of the record")
        .required()
}

fn data_arg() -> ArgSpec {
    ArgSpec::json("data", "Data")
        .describe("The record fields as JSON")
        .required()
}

/// `GET /api/now/table/{table}`
pub struct GetRecords;

impl RestOperation for GetRecords {
    fn name(&self) -> &str {
        "servicenow_get_records"
    }

    fn schema(&self) -> ConnectorSchema {
        ConnectorSchema::new("servicenow_get_records", "Get records")
            .describe("Lists rows of a ServiceNow table")
            .arg(ArgSpec::secret("servicenow"))
            .arg(table_arg())
            .arg(ArgSpec::number("limit", "Limit").describe("Maximum number of rows"))
            .arg(ArgSpec::string("query", "Filter").describe("Encoded query, e.g. active=true"))
            .arg(ArgSpec::string("orderBy", "Order by").describe("Field to order the rows by"))
            .arg(ArgSpec::string("callerId", "Caller").describe("Filter by caller_id"))
            .arg(ArgSpec::string("assignedTo", "Assigned to").describe("Filter by assigned_to"))
            .with_output("servicenow.records")
    }

    fn secret_fields(&self) -> &'static [&'static str] {
        SECRET_FIELDS
    }

    fn build_request(
        &self,
        args: &InvocationArgs,
        secret: &Secret,
    ) -> Result<HttpRequest, ConnectorError> {
        let url = table_url(secret.field("instance")?, args.require_str("table")?);
        let limit = args.text("limit");
        let query = encoded_query(args.str("query"), args.str("orderBy"));

        Ok(instance_request(Method::GET, url, secret)?
            .query_opt("sysparm_limit", limit.as_deref())
            .query_opt("sysparm_query", query.as_deref())
            .query_opt("caller_id", args.str("callerId"))
            .query_opt("assigned_to", args.str("assignedTo")))
    }

    fn project(&self, body: Value, _args: &InvocationArgs) -> Result<Value, ConnectorError> {
        result_of(body)
    }
}

/// `POST /api/now/table/{table}`
pub struct CreateRecord;

impl RestOperation for CreateRecord {
    fn name(&self) -> &str {
        "servicenow_create_record"
    }

    fn schema(&self) -> ConnectorSchema {
        ConnectorSchema::new("servicenow_create_record", "Create record")
            .describe("Inserts a row into a ServiceNow table")
            .arg(ArgSpec::secret("servicenow"))
            .arg(table_arg())
            .arg(data_arg())
            .with_output("servicenow.record")
    }

    fn secret_fields(&self) -> &'static [&'static str] {
        SECRET_FIELDS
    }

    fn build_request(
        &self,
        args: &InvocationArgs,
        secret: &Secret,
    ) -> Result<HttpRequest, ConnectorError> {
        let url = table_url(secret.field("instance")?, args.require_str("table")?);
        Ok(instance_request(Method::POST, url, secret)?.json(args.json("data")?))
    }

    fn project(&self, body: Value, _args: &InvocationArgs) -> Result<Value, ConnectorError> {
        result_of(body)
    }
}

/// `PATCH /api/now/table/{table}/{sysId}`
pub struct PatchRecord;

impl RestOperation for PatchRecord {
    fn name(&self) -> &str {
        "servicenow_patch_record"
    }

    fn schema(&self) -> ConnectorSchema {
        ConnectorSchema::new("servicenow_patch_record", "Update record")
            .describe("Updates fields of an existing row")
            .arg(ArgSpec::secret("servicenow"))
            .arg(table_arg())
            .arg(sys_id_arg())
            .arg(data_arg())
            .with_output("servicenow.record")
    }

    fn secret_fields(&self) -> &'static [&'static str] {
        SECRET_FIELDS
    }

    fn build_request(
        &self,
        args: &InvocationArgs,
        secret: &Secret,
    ) -> Result<HttpRequest, ConnectorError> {
        let url = record_url(
            secret.field("instance")?,
            args.require_str("table")?,
            args.require_str("sysId")?,
        );
        Ok(instance_request(Method::PATCH, url, secret)?.json(args.json("data")?))
    }

    fn project(&self, body: Value, _args: &InvocationArgs) -> Result<Value, ConnectorError> {
        result_of(body)
    }
}

/// `DELETE /api/now/table/{table}/{sysId}`
pub struct DeleteRecord;

impl RestOperation for DeleteRecord {
    fn name(&self) -> &str {
        "servicenow_delete_record"
    }

    fn schema(&self) -> ConnectorSchema {
        ConnectorSchema::new("servicenow_delete_record", "Delete record")
            .describe("Deletes a row by sys_id")
            .arg(ArgSpec::secret("servicenow"))
            .arg(table_arg())
            .arg(sys_id_arg())
            .with_output("servicenow.deleted")
    }

    fn secret_fields(&self) -> &'static [&'static str] {
        SECRET_FIELDS
    }

    fn build_request(
        &self,
        args: &InvocationArgs,
        secret: &Secret,
    ) -> Result<HttpRequest, ConnectorError> {
        let url = record_url(
            secret.field("instance")?,
            args.require_str("table")?,
            args.require_str("sysId")?,
        );
        instance_request(Method::DELETE, url, secret)
    }

    // 204 No Content on success
    fn classify(&self, response: &HttpResponse) -> Result<Value, ConnectorError> {
        check_status(response).map(|_| Value::Null)
    }

    fn project(&self, _body: Value, args: &InvocationArgs) -> Result<Value, ConnectorError> {
        Ok(Value::String(format!(
            "Successfully deleted record {}.",
            args.require_str("sysId")?
        )))
    }
}
