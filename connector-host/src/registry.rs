//! Connector registry - the fixed set of built-in connectors.
//!
//! Fixed-host APIs (Yext, Cognitive Services, Bing) take their base URL from
//! the endpoint configuration; Jira and ServiceNow hosts come from secrets.

use crate::connectors::bing::{Search, SearchKind};
use crate::connectors::cognitive::{AnalyzeText, SpellCheck, TextAnalysis, Translate};
use crate::connectors::jira::transformer::IssueField;
use crate::connectors::jira::{
    CreateTicket, ExtractTicket, GetFullTicket, GetTicketField, GetTicketSummary,
};
use crate::connectors::servicenow::attachments::{
    DeleteAttachment, GetAttachment, GetAttachmentFile, ListAttachments, PostAttachment,
};
use crate::connectors::servicenow::{CreateRecord, DeleteRecord, GetRecords, PatchRecord};
use crate::connectors::yext::GetEntities;
use crate::rest::Rest;
use crate::Connector;
use flowlink::config::EndpointConfig;
use std::sync::Arc;

/// Returns all available connectors.
pub fn get_all_connectors(endpoints: &EndpointConfig) -> Vec<Arc<dyn Connector>> {
    let mut connectors: Vec<Arc<dyn Connector>> = Vec::new();

    connectors.push(Arc::new(ExtractTicket::new()));
    connectors.push(Arc::new(Rest(CreateTicket)));
    for field in IssueField::ALL {
        connectors.push(Arc::new(Rest(GetTicketField::new(field))));
    }
    connectors.push(Arc::new(Rest(GetTicketSummary)));
    connectors.push(Arc::new(Rest(GetFullTicket)));

    connectors.push(Arc::new(Rest(GetRecords)));
    connectors.push(Arc::new(Rest(CreateRecord)));
    connectors.push(Arc::new(Rest(PatchRecord)));
    connectors.push(Arc::new(Rest(DeleteRecord)));
    connectors.push(Arc::new(Rest(ListAttachments)));
    connectors.push(Arc::new(Rest(GetAttachment)));
    connectors.push(Arc::new(Rest(GetAttachmentFile)));
    connectors.push(Arc::new(PostAttachment));
    connectors.push(Arc::new(Rest(DeleteAttachment)));

    connectors.push(Arc::new(Rest(GetEntities::with_base_url(&endpoints.yext))));

    connectors.push(Arc::new(Rest(SpellCheck::with_base_url(&endpoints.cognitive))));
    for analysis in TextAnalysis::ALL {
        connectors.push(Arc::new(Rest(AnalyzeText::with_base_url(
            analysis,
            &endpoints.text_analytics,
        ))));
    }
    connectors.push(Arc::new(Rest(Translate::with_base_url(&endpoints.translator))));

    for kind in SearchKind::ALL {
        connectors.push(Arc::new(Rest(Search::with_base_url(kind, &endpoints.bing))));
    }

    connectors
}

/// Looks a connector up by name.
pub fn find(connectors: &[Arc<dyn Connector>], name: &str) -> Option<Arc<dyn Connector>> {
    connectors.iter().find(|c| c.name() == name).cloned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_get_all_connectors() {
        let connectors = get_all_connectors(&EndpointConfig::default());
        assert_eq!(connectors.len(), 29);

        let names: HashSet<&str> = connectors.iter().map(|c| c.name()).collect();
        assert_eq!(names.len(), connectors.len(), "connector names must be unique");
    }

    #[test]
    fn test_schema_names_match() {
        for connector in get_all_connectors(&EndpointConfig::default()) {
            assert_eq!(connector.schema().name, connector.name());
        }
    }

    #[test]
    fn test_network_connectors_declare_output_args() {
        for connector in get_all_connectors(&EndpointConfig::default()) {
            let schema = connector.schema();
            let keys: Vec<&str> = schema.args.iter().map(|a| a.key.as_str()).collect();
            assert!(keys.contains(&"store"), "{} lacks store", connector.name());
            if connector.name() != "jira_extract_ticket" {
                assert!(keys.contains(&"stopOnError"), "{} lacks stopOnError", connector.name());
                assert!(schema.secret_kind().is_some(), "{} lacks a secret", connector.name());
            }
        }
    }

    #[test]
    fn test_find() {
        let connectors = get_all_connectors(&EndpointConfig::default());
        assert!(find(&connectors, "servicenow_get_records").is_some());
        assert!(find(&connectors, "bing_image_search").is_some());
        assert!(find(&connectors, "nope").is_none());
    }
}
