use flowlink::transport::{base_url, path_segment};

/// Jira REST API v2 issue resource.
pub const ISSUE_PATH: &str = "/rest/api/2/issue";

/// Secret fields: basic-auth credentials plus the site host.
pub const SECRET_FIELDS: &[&str] = &["username", "password", "domain"];

/// Project key, hyphen, issue number (e.g. `ABC-123`).
///
/// Jira project keys start with a letter and may contain digits after it,
/// so `A1B-2` matches whole rather than as `B-2`.
pub const TICKET_PATTERN: &str = r"[A-Z][A-Z0-9]*-[0-9]+";

/// Stored when no ticket key occurs in the text.
pub const NO_TICKET_FOUND: &str = "No ticket found";

/// `https://{domain}/rest/api/2/issue`
pub fn issues_url(domain: &str) -> String {
    format!("{}{}", base_url(domain), ISSUE_PATH)
}

/// `https://{domain}/rest/api/2/issue/{ticket}`
pub fn issue_url(domain: &str, ticket: &str) -> String {
    format!("{}/{}", issues_url(domain), path_segment(ticket))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls() {
        assert_eq!(
            issues_url("acme.atlassian.net"),
            "https://acme.atlassian.net/rest/api/2/issue"
        );
        assert_eq!(
            issue_url("https://jira.acme.com/", "OPS-42"),
            "https://jira.acme.com/rest/api/2/issue/OPS-42"
        );
    }

    #[test]
    fn test_constants() {
        assert_eq!(SECRET_FIELDS, &["username", "password", "domain"]);
        assert_eq!(NO_TICKET_FOUND, "No ticket found");
    }
}
