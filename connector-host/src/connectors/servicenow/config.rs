use flowlink::transport::{base_url, path_segment};

pub const TABLE_PATH: &str = "/api/now/table";
pub const ATTACHMENT_PATH: &str = "/api/now/attachment";

/// Secret fields: basic-auth credentials plus the instance host.
pub const SECRET_FIELDS: &[&str] = &["username", "password", "instance"];

/// Multipart field carrying the uploaded file.
pub const UPLOAD_FILE_FIELD: &str = "uploadFile";

/// `https://{instance}/api/now/table/{table}`
pub fn table_url(instance: &str, table: &str) -> String {
    format!("{}{}/{}", base_url(instance), TABLE_PATH, path_segment(table))
}

/// `https://{instance}/api/now/table/{table}/{sys_id}`
pub fn record_url(instance: &str, table: &str, sys_id: &str) -> String {
    format!("{}/{}", table_url(instance, table), path_segment(sys_id))
}

/// `https://{instance}/api/now/attachment`
pub fn attachments_url(instance: &str) -> String {
    format!("{}{}", base_url(instance), ATTACHMENT_PATH)
}

/// `https://{instance}/api/now/attachment/{sys_id}`
pub fn attachment_url(instance: &str, sys_id: &str) -> String {
    format!("{}/{}", attachments_url(instance), path_segment(sys_id))
}

/// Encoded query for `sysparm_query`: the filter, then `ORDERBY{field}`.
pub fn encoded_query(filter: Option<&str>, order_by: Option<&str>) -> Option<String> {
    match (filter, order_by) {
        (Some(f), Some(o)) => Some(format!("{}^ORDERBY{}", f, o)),
        (Some(f), None) => Some(f.to_string()),
        (None, Some(o)) => Some(format!("ORDERBY{}", o)),
        (None, None) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_urls() {
        assert_eq!(
            table_url("dev1.service-now.com", "incident"),
            "https://dev1.service-now.com/api/now/table/incident"
        );
        assert_eq!(
            record_url("https://dev1.service-now.com", "incident", "abc123"),
            "https://dev1.service-now.com/api/now/table/incident/abc123"
        );
        assert_eq!(
            attachment_url("dev1.service-now.com", "att9"),
            "https://dev1.service-now.com/api/now/attachment/att9"
        );
    }

    #[test]
    fn test_encoded_query() {
        assert_eq!(
            encoded_query(Some("active=true"), Some("number")).as_deref(),
            Some("active=true^ORDERBYnumber")
        );
        assert_eq!(encoded_query(None, Some("sys_created_on")).as_deref(), Some("ORDERBYsys_created_on"));
        assert_eq!(encoded_query(Some("priority=1"), None).as_deref(), Some("priority=1"));
        assert_eq!(encoded_query(None, None), None);
    }
}
