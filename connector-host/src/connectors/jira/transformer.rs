use serde_json::{json, Value};

/// Single issue fields exposed through the field getters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IssueField {
    Status,
    Assignee,
    Priority,
    Resolution,
    Reporter,
    Comments,
    Watchers,
}

impl IssueField {
    pub const ALL: [IssueField; 7] = [
        IssueField::Status,
        IssueField::Assignee,
        IssueField::Priority,
        IssueField::Resolution,
        IssueField::Reporter,
        IssueField::Comments,
        IssueField::Watchers,
    ];

    pub fn label(self) -> &'static str {
        match self {
            IssueField::Status => "status",
            IssueField::Assignee => "assignee",
            IssueField::Priority => "priority",
            IssueField::Resolution => "resolution",
            IssueField::Reporter => "reporter",
            IssueField::Comments => "comments",
            IssueField::Watchers => "watchers",
        }
    }

    pub fn connector_name(self) -> &'static str {
        match self {
            IssueField::Status => "jira_get_ticket_status",
            IssueField::Assignee => "jira_get_ticket_assignee",
            IssueField::Priority => "jira_get_ticket_priority",
            IssueField::Resolution => "jira_get_ticket_resolution",
            IssueField::Reporter => "jira_get_ticket_reporter",
            IssueField::Comments => "jira_get_ticket_comments",
            IssueField::Watchers => "jira_get_ticket_watchers",
        }
    }

    /// JSON pointer into the issue document.
    fn pointer(self) -> &'static str {
        match self {
            IssueField::Status => "/fields/status",
            IssueField::Assignee => "/fields/assignee",
            IssueField::Priority => "/fields/priority",
            IssueField::Resolution => "/fields/resolution",
            IssueField::Reporter => "/fields/reporter",
            IssueField::Comments => "/fields/comment/comments",
            IssueField::Watchers => "/fields/watches",
        }
    }
}

fn at(issue: &Value, pointer: &str) -> Value {
    issue.pointer(pointer).cloned().unwrap_or(Value::Null)
}

/// Projects one field out of an issue. Absent fields map to `null`.
pub fn project_field(issue: &Value, field: IssueField) -> Value {
    at(issue, field.pointer())
}

/// Curated seven-field view of an issue. Absent fields map to `null`.
pub fn summarize(issue: &Value) -> Value {
    json!({
        "ticket": at(issue, "/key"),
        "summary": at(issue, "/fields/summary"),
        "description": at(issue, "/fields/description"),
        "status": at(issue, "/fields/status/name"),
        "priority": at(issue, "/fields/priority/name"),
        "assignedTo": at(issue, "/fields/assignee/emailAddress"),
        "reporter": at(issue, "/fields/reporter/emailAddress"),
    })
}

/// Request body for issue creation.
pub fn create_issue_body(
    project_key: &str,
    summary: &str,
    description: &str,
    issue_type: &str,
) -> Value {
    json!({
        "fields": {
            "project": { "key": project_key },
            "summary": summary,
            "description": description,
            "issuetype": { "name": issue_type },
        }
    })
}
