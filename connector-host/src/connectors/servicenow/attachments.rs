//! ServiceNow Attachment API connectors.

use super::config::{
    attachment_url, attachments_url, ATTACHMENT_PATH, SECRET_FIELDS, UPLOAD_FILE_FIELD,
};
use super::{instance_request, result_of, sys_id_arg};
use crate::connector::{Connector, Invocation};
use crate::rest::{
    check_status, classify_json, deliver, require_secret, validate, ErrorPolicy, OutputTarget,
    RestOperation,
};
use crate::types::{ArgSpec, ConnectorSchema};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use flowlink::transport::{base_url, is_valid_content_type, Method, MultipartUpload};
use flowlink::{ConnectorError, HttpRequest, HttpResponse, InvocationArgs, Secret, Transport};
use serde_json::{json, Value};

const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";
const DEFAULT_FILE_NAME: &str = "attachment";

/// Last path segment of a download URL, used when no file name is given.
fn file_name_from_url(url: &str) -> String {
    let without_scheme = url.split_once("://").map_or(url, |(_, rest)| rest);
    let path = without_scheme.split_once('/').map_or("", |(_, path)| path);
    path.split(|c| c == '?' || c == '#')
        .next()
        .and_then(|path| path.rsplit('/').next())
        .filter(|name| !name.is_empty())
        .map(|name| match urlencoding::decode(name) {
            Ok(decoded) => decoded.into_owned(),
            Err(_) => name.to_string(),
        })
        .unwrap_or_else(|| DEFAULT_FILE_NAME.to_string())
}

/// `GET /api/now/attachment`
pub struct ListAttachments;

impl RestOperation for ListAttachments {
    fn name(&self) -> &str {
        "servicenow_list_attachments"
    }

    fn schema(&self) -> ConnectorSchema {
        ConnectorSchema::new("servicenow_list_attachments", "List attachments")
            .describe("Lists attachment metadata")
            .arg(ArgSpec::secret("servicenow"))
            .arg(
                ArgSpec::string("query", "Filter")
                    .describe("Encoded query, e.g. table_name=incident^table_sys_id=..."),
            )
            .arg(ArgSpec::number("limit", "Limit"))
            .with_output("servicenow.attachments")
    }

    fn secret_fields(&self) -> &'static [&'static str] {
        SECRET_FIELDS
    }

    fn build_request(
        &self,
        args: &InvocationArgs,
        secret: &Secret,
    ) -> Result<HttpRequest, ConnectorError> {
        let limit = args.text("limit");
        Ok(
            instance_request(Method::GET, attachments_url(secret.field("instance")?), secret)?
                .query_opt("sysparm_query", args.str("query"))
                .query_opt("sysparm_limit", limit.as_deref()),
        )
    }

    fn project(&self, body: Value, _args: &InvocationArgs) -> Result<Value, ConnectorError> {
        result_of(body)
    }
}

/// `GET /api/now/attachment/{sysId}`
pub struct GetAttachment;

impl RestOperation for GetAttachment {
    fn name(&self) -> &str {
        "servicenow_get_attachment"
    }

    fn schema(&self) -> ConnectorSchema {
        ConnectorSchema::new("servicenow_get_attachment", "Get attachment")
            .describe("Gets the metadata of one attachment")
            .arg(ArgSpec::secret("servicenow"))
            .arg(sys_id_arg())
            .with_output("servicenow.attachment")
    }

    fn secret_fields(&self) -> &'static [&'static str] {
        SECRET_FIELDS
    }

    fn build_request(
        &self,
        args: &InvocationArgs,
        secret: &Secret,
    ) -> Result<HttpRequest, ConnectorError> {
        let url = attachment_url(secret.field("instance")?, args.require_str("sysId")?);
        instance_request(Method::GET, url, secret)
    }

    fn project(&self, body: Value, _args: &InvocationArgs) -> Result<Value, ConnectorError> {
        result_of(body)
    }
}

/// `GET /api/now/attachment/{sysId}/file`
///
/// The binary content is stored base64-encoded together with its content
/// type and size.
pub struct GetAttachmentFile;

impl RestOperation for GetAttachmentFile {
    fn name(&self) -> &str {
        "servicenow_get_attachment_file"
    }

    fn schema(&self) -> ConnectorSchema {
        ConnectorSchema::new("servicenow_get_attachment_file", "Get attachment file")
            .describe("Downloads the content of one attachment")
            .arg(ArgSpec::secret("servicenow"))
            .arg(sys_id_arg())
            .with_output("servicenow.file")
    }

    fn secret_fields(&self) -> &'static [&'static str] {
        SECRET_FIELDS
    }

    fn build_request(
        &self,
        args: &InvocationArgs,
        secret: &Secret,
    ) -> Result<HttpRequest, ConnectorError> {
        let url = format!(
            "{}/file",
            attachment_url(secret.field("instance")?, args.require_str("sysId")?)
        );
        Ok(HttpRequest::get(url)
            .header("Accept", "*/*")
            .basic_auth(secret.field("username")?, secret.field("password")?))
    }

    fn classify(&self, response: &HttpResponse) -> Result<Value, ConnectorError> {
        check_status(response)?;
        if response.body.is_empty() {
            return Err(ConnectorError::EmptyResult);
        }
        Ok(json!({
            "contentType": response.content_type.as_deref().unwrap_or(DEFAULT_CONTENT_TYPE),
            "size": response.body.len(),
            "data": STANDARD.encode(&response.body),
        }))
    }
}

/// `DELETE /api/now/attachment/{sysId}`
pub struct DeleteAttachment;

impl RestOperation for DeleteAttachment {
    fn name(&self) -> &str {
        "servicenow_delete_attachment"
    }

    fn schema(&self) -> ConnectorSchema {
        ConnectorSchema::new("servicenow_delete_attachment", "Delete attachment")
            .describe("Deletes one attachment")
            .arg(ArgSpec::secret("servicenow"))
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
        let url = attachment_url(secret.field("instance")?, args.require_str("sysId")?);
        instance_request(Method::DELETE, url, secret)
    }

    fn classify(&self, response: &HttpResponse) -> Result<Value, ConnectorError> {
        check_status(response).map(|_| Value::Null)
    }

    fn project(&self, _body: Value, args: &InvocationArgs) -> Result<Value, ConnectorError> {
        Ok(Value::String(format!(
            "Successfully deleted attachment {}.",
            args.require_str("sysId")?
        )))
    }
}

/// Downloads a file from a URL and attaches it to a record.
///
/// Two requests: an unauthenticated `GET fileUrl`, then a multipart
/// `POST /api/now/attachment/upload`. A failure in either is handled by the
/// same error policy as single-request connectors.
pub struct PostAttachment;

impl PostAttachment {
    async fn upload(
        &self,
        args: &InvocationArgs,
        secret: &Secret,
        transport: &dyn Transport,
    ) -> Result<Value, ConnectorError> {
        let file_url = args.require_str("fileUrl")?;
        let download = transport.send(HttpRequest::get(file_url)).await?;
        check_status(&download)?;
        if download.body.is_empty() {
            return Err(ConnectorError::EmptyResult);
        }

        // An unparsable download type is not the caller's fault.
        let content_type = args
            .str("contentType")
            .map(str::to_string)
            .or_else(|| {
                download
                    .content_type
                    .clone()
                    .filter(|ct| is_valid_content_type(ct))
            })
            .unwrap_or_else(|| DEFAULT_CONTENT_TYPE.to_string());
        let file_name = args
            .str("fileName")
            .map(str::to_string)
            .unwrap_or_else(|| file_name_from_url(file_url));

        let upload = MultipartUpload {
            fields: vec![
                ("table_name".to_string(), args.require_str("tableName")?.to_string()),
                ("table_sys_id".to_string(), args.require_str("tableSysId")?.to_string()),
            ],
            file_field: UPLOAD_FILE_FIELD.to_string(),
            file_name,
            content_type: Some(content_type),
            bytes: download.body,
        };
        let url = format!(
            "{}{}/upload",
            base_url(secret.field("instance")?),
            ATTACHMENT_PATH
        );
        let request = HttpRequest::post(url)
            .header("Accept", "application/json")
            .basic_auth(secret.field("username")?, secret.field("password")?)
            .multipart(upload);

        let response = transport.send(request).await?;
        classify_json(&response).and_then(result_of)
    }
}

#[async_trait]
impl Connector for PostAttachment {
    fn name(&self) -> &str {
        "servicenow_post_attachment"
    }

    fn schema(&self) -> ConnectorSchema {
        ConnectorSchema::new("servicenow_post_attachment", "Add attachment")
            .describe("Downloads a file and attaches it to a record")
            .arg(ArgSpec::secret("servicenow"))
            .arg(
                ArgSpec::string("tableName", "Table")
                    .describe("Table of the record, e.g. incident")
                    .required(),
            )
            .arg(
                ArgSpec::string("tableSysId", "Record sys_id")
                    .describe("sys_id of the record to attach to")
                    .required(),
            )
            .arg(
                ArgSpec::string("fileUrl", "File URL")
                    .describe("Where to download the file from")
                    .required(),
            )
            .arg(ArgSpec::string("fileName", "File name").describe("Defaults to the URL's last segment"))
            .arg(ArgSpec::string("contentType", "Content type").describe("Defaults to the download's type"))
            .with_output("servicenow.attachment")
    }

    async fn invoke(&self, inv: Invocation<'_>) -> Result<(), ConnectorError> {
        validate(&self.schema(), inv.args)?;
        let secret = require_secret(inv.secret, SECRET_FIELDS)?;
        let policy = ErrorPolicy::from_args(inv.args)?;
        if let Some(content_type) = inv.args.str("contentType") {
            if !is_valid_content_type(content_type) {
                return Err(ConnectorError::invalid_argument(
                    "contentType",
                    format!("'{}' is not a valid MIME type", content_type),
                ));
            }
        }

        tracing::debug!(
            connector = self.name(),
            table = inv.args.str("tableName"),
            "Uploading attachment"
        );

        let outcome = self.upload(inv.args, secret, inv.transport).await;
        deliver(inv.context, OutputTarget::Context, &policy, self.name(), outcome)
    }
}
