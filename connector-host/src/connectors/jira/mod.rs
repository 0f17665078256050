pub mod config;
pub mod transformer;

use crate::connector::{Connector, Invocation};
use crate::rest::{non_empty, RestOperation};
use crate::types::{ArgSpec, ConnectorSchema};
use async_trait::async_trait;
use flowlink::{ConnectorError, ContextMode, HttpRequest, InvocationArgs, Secret};
use regex::Regex;
use serde_json::Value;

use self::config::{issue_url, issues_url, NO_TICKET_FOUND, SECRET_FIELDS, TICKET_PATTERN};
use self::transformer::{create_issue_body, project_field, summarize, IssueField};

/// Authenticated `GET /rest/api/2/issue/{ticket}`.
fn issue_request(args: &InvocationArgs, secret: &Secret) -> Result<HttpRequest, ConnectorError> {
    let ticket = args.require_str("ticket")?;
    Ok(HttpRequest::get(issue_url(secret.field("domain")?, ticket))
        .header("Accept", "application/json")
        .basic_auth(secret.field("username")?, secret.field("password")?))
}

/// An issue response must be a non-empty document carrying a key.
fn require_issue(body: Value) -> Result<Value, ConnectorError> {
    let issue = non_empty(body)?;
    if issue.get("key").is_none() {
        return Err(ConnectorError::EmptyResult);
    }
    Ok(issue)
}

fn ticket_arg() -> ArgSpec {
    ArgSpec::string("ticket", "Ticket")
        .describe("The Jira ticket key, e.g. ABC-123")
        .required()
}

/// Finds the first ticket key in free text. No network, no secret.
pub struct ExtractTicket {
    pattern: Regex,
}

impl ExtractTicket {
    pub fn new() -> Self {
        Self {
            pattern: Regex::new(TICKET_PATTERN).expect("Invalid ticket pattern"),
        }
    }

    /// First ticket key in `text`, if any.
    pub fn find<'t>(&self, text: &'t str) -> Option<&'t str> {
        self.pattern.find(text).map(|m| m.as_str())
    }
}

impl Default for ExtractTicket {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Connector for ExtractTicket {
    fn name(&self) -> &str {
        "jira_extract_ticket"
    }

    fn schema(&self) -> ConnectorSchema {
        ConnectorSchema::new("jira_extract_ticket", "Extract ticket from text")
            .describe("Finds a ticket key such as ABC-123 in the given text")
            .arg(
                ArgSpec::string("text", "Text")
                    .describe("The text to search")
                    .required(),
            )
            .arg(ArgSpec::store("ticket"))
    }

    async fn invoke(&self, inv: Invocation<'_>) -> Result<(), ConnectorError> {
        crate::rest::validate(&self.schema(), inv.args)?;
        let text = inv.args.require_str("text")?;
        let store = inv.args.store()?;

        let found = self.find(text).unwrap_or(NO_TICKET_FOUND);
        inv.context
            .add_to_context(store, Value::String(found.to_string()), ContextMode::Simple);
        Ok(())
    }
}

/// `POST /rest/api/2/issue`
pub struct CreateTicket;

impl RestOperation for CreateTicket {
    fn name(&self) -> &str {
        "jira_create_ticket"
    }

    fn schema(&self) -> ConnectorSchema {
        ConnectorSchema::new("jira_create_ticket", "Create ticket")
            .describe("Creates a new Jira issue")
            .arg(ArgSpec::secret("jira"))
            .arg(
                ArgSpec::string("projectKey", "Project key")
                    .describe("Key of the project to create the issue in")
                    .required(),
            )
            .arg(ArgSpec::string("summary", "Summary").required())
            .arg(ArgSpec::string("description", "Description").required())
            .arg(
                ArgSpec::string("issueType", "Issue type")
                    .describe("e.g. Bug, Task, Story")
                    .required(),
            )
            .with_output("ticket")
    }

    fn secret_fields(&self) -> &'static [&'static str] {
        SECRET_FIELDS
    }

    fn build_request(
        &self,
        args: &InvocationArgs,
        secret: &Secret,
    ) -> Result<HttpRequest, ConnectorError> {
        let body = create_issue_body(
            args.require_str("projectKey")?,
            args.require_str("summary")?,
            args.require_str("description")?,
            args.require_str("issueType")?,
        );
        Ok(HttpRequest::post(issues_url(secret.field("domain")?))
            .header("Accept", "application/json")
            .basic_auth(secret.field("username")?, secret.field("password")?)
            .json(body))
    }
}

/// Fetches one issue and stores a single field of it.
pub struct GetTicketField {
    field: IssueField,
}

impl GetTicketField {
    pub fn new(field: IssueField) -> Self {
        Self { field }
    }
}

impl RestOperation for GetTicketField {
    fn name(&self) -> &str {
        self.field.connector_name()
    }

    fn schema(&self) -> ConnectorSchema {
        ConnectorSchema::new(
            self.field.connector_name(),
            &format!("Get ticket {}", self.field.label()),
        )
        .describe(&format!("Stores the {} of a Jira issue", self.field.label()))
        .arg(ArgSpec::secret("jira"))
        .arg(ticket_arg())
        .with_output(&format!("ticket.{}", self.field.label()))
    }

    fn secret_fields(&self) -> &'static [&'static str] {
        SECRET_FIELDS
    }

    fn build_request(
        &self,
        args: &InvocationArgs,
        secret: &Secret,
    ) -> Result<HttpRequest, ConnectorError> {
        issue_request(args, secret)
    }

    fn project(&self, body: Value, _args: &InvocationArgs) -> Result<Value, ConnectorError> {
        let issue = require_issue(body)?;
        Ok(project_field(&issue, self.field))
    }
}

/// Fetches one issue and stores the curated summary.
pub struct GetTicketSummary;

impl RestOperation for GetTicketSummary {
    fn name(&self) -> &str {
        "jira_get_ticket_summary"
    }

    fn schema(&self) -> ConnectorSchema {
        ConnectorSchema::new("jira_get_ticket_summary", "Get ticket summary")
            .describe("Stores key, summary, description, status, priority, assignee and reporter")
            .arg(ArgSpec::secret("jira"))
            .arg(ticket_arg())
            .with_output("ticket")
    }

    fn secret_fields(&self) -> &'static [&'static str] {
        SECRET_FIELDS
    }

    fn build_request(
        &self,
        args: &InvocationArgs,
        secret: &Secret,
    ) -> Result<HttpRequest, ConnectorError> {
        issue_request(args, secret)
    }

    fn project(&self, body: Value, _args: &InvocationArgs) -> Result<Value, ConnectorError> {
        let issue = require_issue(body)?;
        Ok(summarize(&issue))
    }
}

/// Fetches one issue and stores it unmodified.
pub struct GetFullTicket;

impl RestOperation for GetFullTicket {
    fn name(&self) -> &str {
        "jira_get_full_ticket"
    }

    fn schema(&self) -> ConnectorSchema {
        ConnectorSchema::new("jira_get_full_ticket", "Get full ticket")
            .describe("Stores the complete Jira issue")
            .arg(ArgSpec::secret("jira"))
            .arg(ticket_arg())
            .with_output("ticket")
    }

    fn secret_fields(&self) -> &'static [&'static str] {
        SECRET_FIELDS
    }

    fn build_request(
        &self,
        args: &InvocationArgs,
        secret: &Secret,
    ) -> Result<HttpRequest, ConnectorError> {
        issue_request(args, secret)
    }

    fn project(&self, body: Value, _args: &InvocationArgs) -> Result<Value, ConnectorError> {
        require_issue(body)
    }
}
