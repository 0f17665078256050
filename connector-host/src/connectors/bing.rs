//! Bing Search v7. Results land in the input map rather than the context.

use crate::rest::{OutputTarget, RestOperation};
use crate::types::{ArgSpec, ConnectorSchema};
use flowlink::config::COGNITIVE_BASE_URL;
use flowlink::transport::base_url;
use flowlink::{ConnectorError, HttpRequest, InvocationArgs, Secret};

const SECRET_FIELDS: &[&str] = &["key"];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SearchKind {
    Web,
    News,
    Images,
}

impl SearchKind {
    pub const ALL: [SearchKind; 3] = [SearchKind::Web, SearchKind::News, SearchKind::Images];

    fn connector_name(self) -> &'static str {
        match self {
            SearchKind::Web => "bing_web_search",
            SearchKind::News => "bing_news_search",
            SearchKind::Images => "bing_image_search",
        }
    }

    fn path(self) -> &'static str {
        match self {
            SearchKind::Web => "/bing/v7.0/search",
            SearchKind::News => "/bing/v7.0/news/search",
            SearchKind::Images => "/bing/v7.0/images/search",
        }
    }

    fn label(self) -> &'static str {
        match self {
            SearchKind::Web => "Web search",
            SearchKind::News => "News search",
            SearchKind::Images => "Image search",
        }
    }
}

pub struct Search {
    kind: SearchKind,
    base_url: String,
}

impl Search {
    pub fn new(kind: SearchKind) -> Self {
        Self::with_base_url(kind, COGNITIVE_BASE_URL)
    }

    pub fn with_base_url(kind: SearchKind, base: &str) -> Self {
        Self {
            kind,
            base_url: base_url(base),
        }
    }
}

impl RestOperation for Search {
    fn name(&self) -> &str {
        self.kind.connector_name()
    }

    fn schema(&self) -> ConnectorSchema {
        ConnectorSchema::new(self.kind.connector_name(), self.kind.label())
            .describe("Runs a Bing search and stores the results in the input")
            .arg(ArgSpec::secret("bing"))
            .arg(
                ArgSpec::string("query", "Query")
                    .describe("The search terms")
                    .required(),
            )
            .with_output("search")
    }

    fn secret_fields(&self) -> &'static [&'static str] {
        SECRET_FIELDS
    }

    fn build_request(
        &self,
        args: &InvocationArgs,
        secret: &Secret,
    ) -> Result<HttpRequest, ConnectorError> {
        Ok(HttpRequest::get(format!("{}{}", self.base_url, self.kind.path()))
            .header("Accept", "application/json")
            .header("Ocp-Apim-Subscription-Key", secret.field("key")?)
            .query("q", args.require_str("query")?))
    }

    fn output(&self) -> OutputTarget {
        OutputTarget::Input
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::{Connector, Invocation};
    use crate::rest::Rest;
    use flowlink::test_utils::MockTransport;
    use flowlink::{MemoryContext, ReqwestTransport, Transport};
    use mockito::{Matcher, Server};
    use serde_json::{json, Value};

    async fn invoke(
        connector: &dyn Connector,
        transport: &dyn Transport,
        ctx: &mut MemoryContext,
        args: Value,
    ) -> Result<(), ConnectorError> {
        let args = InvocationArgs::from_value(args);
        let secret = Secret::new().with("key", "bing-key");
        connector
            .invoke(Invocation {
                context: ctx,
                secret: Some(&secret),
                args: &args,
                transport,
            })
            .await
    }

    #[tokio::test]
    async fn test_web_search_writes_input() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/bing/v7.0/search")
            .match_query(Matcher::UrlEncoded("q".into(), "rust async".into()))
            .match_header("ocp-apim-subscription-key", "bing-key")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"_type": "SearchResponse", "webPages": {"value": [{"name": "Tokio"}]}}"#)
            .create_async()
            .await;

        let mut ctx = MemoryContext::new();
        invoke(
            &Rest(Search::with_base_url(SearchKind::Web, &server.url())),
            &ReqwestTransport::new(),
            &mut ctx,
            json!({"query": "rust async", "store": "results", "stopOnError": true}),
        )
        .await
        .unwrap();

        assert_eq!(ctx.input()["results"]["webPages"]["value"][0]["name"], "Tokio");
        assert!(ctx.context().is_empty());
    }

    #[tokio::test]
    async fn test_paths() {
        let transport = MockTransport::json(200, json!({"value": []}));
        for kind in SearchKind::ALL {
            let mut ctx = MemoryContext::new();
            invoke(
                &Rest(Search::new(kind)),
                &transport,
                &mut ctx,
                json!({"query": "q", "store": "results", "stopOnError": false}),
            )
            .await
            .unwrap();
        }

        let urls: Vec<String> = transport.requests().into_iter().map(|r| r.url).collect();
        assert_eq!(
            urls,
            vec![
                "https://api.cognitive.microsoft.com/bing/v7.0/search",
                "https://api.cognitive.microsoft.com/bing/v7.0/news/search",
                "https://api.cognitive.microsoft.com/bing/v7.0/images/search",
            ]
        );
    }

    #[tokio::test]
    async fn test_error_written_to_input() {
        let transport = MockTransport::json(
            400,
            json!({"_type": "ErrorResponse", "errors": [{"code": "InvalidRequest", "message": "Required parameter is missing."}]}),
        );
        let mut ctx = MemoryContext::new();
        invoke(
            &Rest(Search::new(SearchKind::News)),
            &transport,
            &mut ctx,
            json!({"query": "q", "store": "news", "stopOnError": false}),
        )
        .await
        .unwrap();

        assert_eq!(ctx.input()["news"], json!({"error": "Required parameter is missing."}));
    }
}
