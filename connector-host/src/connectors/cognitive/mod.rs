//! Azure Cognitive Services text connectors.
//!
//! Every call authenticates with the `Ocp-Apim-Subscription-Key` header taken
//! from the secret's `key` field, sends one text document and stores the
//! parsed JSON response as-is.

pub mod config;

use crate::rest::RestOperation;
use crate::types::{ArgSpec, ConnectorSchema};
use flowlink::config::{COGNITIVE_BASE_URL, TEXT_ANALYTICS_BASE_URL, TRANSLATOR_BASE_URL};
use flowlink::transport::base_url;
use flowlink::{ConnectorError, HttpRequest, InvocationArgs, Secret};

use self::config::{
    text_documents, translate_body, ENTITIES_PATH, KEY_PHRASES_PATH, LANGUAGES_PATH,
    SECRET_FIELDS, SPELL_CHECK_MODES, SPELL_CHECK_PATH, SUBSCRIPTION_KEY_HEADER,
    TRANSLATE_PATH, TRANSLATOR_API_VERSION,
};

fn text_arg() -> ArgSpec {
    ArgSpec::string("text", "Text")
        .describe("The text to analyse")
        .required()
}

fn subscribed_post(url: String, secret: &Secret) -> Result<HttpRequest, ConnectorError> {
    Ok(HttpRequest::post(url)
        .header("Accept", "application/json")
        .header(SUBSCRIPTION_KEY_HEADER, secret.field("key")?))
}

/// Bing spell check, `POST /bing/v7.0/spellcheck` with a form body.
pub struct SpellCheck {
    base_url: String,
}

impl SpellCheck {
    pub fn new() -> Self {
        Self::with_base_url(COGNITIVE_BASE_URL)
    }

    pub fn with_base_url(base: &str) -> Self {
        Self {
            base_url: base_url(base),
        }
    }
}

impl Default for SpellCheck {
    fn default() -> Self {
        Self::new()
    }
}

impl RestOperation for SpellCheck {
    fn name(&self) -> &str {
        "cognitive_spell_check"
    }

    fn schema(&self) -> ConnectorSchema {
        ConnectorSchema::new("cognitive_spell_check", "Spell check")
            .describe("Finds spelling and grammar issues in a text")
            .arg(ArgSpec::secret("cognitive"))
            .arg(text_arg())
            .arg(ArgSpec::select("mode", "Mode", SPELL_CHECK_MODES).required())
            .arg(ArgSpec::string("mkt", "Market").describe("Market code, e.g. en-US"))
            .with_output("spelling")
    }

    fn secret_fields(&self) -> &'static [&'static str] {
        SECRET_FIELDS
    }

    fn build_request(
        &self,
        args: &InvocationArgs,
        secret: &Secret,
    ) -> Result<HttpRequest, ConnectorError> {
        let url = format!("{}{}", self.base_url, SPELL_CHECK_PATH);
        Ok(subscribed_post(url, secret)?
            .query("mode", args.require_str("mode")?)
            .query_opt("mkt", args.str("mkt"))
            .form(vec![("text".to_string(), args.require_str("text")?.to_string())]))
    }
}

/// The Text Analytics operations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TextAnalysis {
    DetectLanguage,
    KeyPhrases,
    Entities,
}

impl TextAnalysis {
    pub const ALL: [TextAnalysis; 3] = [
        TextAnalysis::DetectLanguage,
        TextAnalysis::KeyPhrases,
        TextAnalysis::Entities,
    ];

    fn connector_name(self) -> &'static str {
        match self {
            TextAnalysis::DetectLanguage => "cognitive_detect_language",
            TextAnalysis::KeyPhrases => "cognitive_extract_key_phrases",
            TextAnalysis::Entities => "cognitive_recognize_entities",
        }
    }

    fn path(self) -> &'static str {
        match self {
            TextAnalysis::DetectLanguage => LANGUAGES_PATH,
            TextAnalysis::KeyPhrases => KEY_PHRASES_PATH,
            TextAnalysis::Entities => ENTITIES_PATH,
        }
    }
}

/// `POST /text/analytics/...` with a single-document body.
pub struct AnalyzeText {
    analysis: TextAnalysis,
    base_url: String,
}

impl AnalyzeText {
    pub fn new(analysis: TextAnalysis) -> Self {
        Self::with_base_url(analysis, TEXT_ANALYTICS_BASE_URL)
    }

    pub fn with_base_url(analysis: TextAnalysis, base: &str) -> Self {
        Self {
            analysis,
            base_url: base_url(base),
        }
    }
}

impl RestOperation for AnalyzeText {
    fn name(&self) -> &str {
        self.analysis.connector_name()
    }

    fn schema(&self) -> ConnectorSchema {
        let schema = ConnectorSchema::new(self.analysis.connector_name(), "Text analysis")
            .arg(ArgSpec::secret("cognitive"))
            .arg(text_arg());
        let schema = match self.analysis {
            TextAnalysis::DetectLanguage => schema.describe("Detects the language of a text"),
            TextAnalysis::KeyPhrases => schema
                .describe("Extracts the key phrases of a text")
                .arg(ArgSpec::string("language", "Language").describe("ISO 639-1 code, e.g. en")),
            TextAnalysis::Entities => schema
                .describe("Recognises named entities in a text")
                .arg(ArgSpec::string("language", "Language").describe("ISO 639-1 code, e.g. en")),
        };
        schema.with_output("analysis")
    }

    fn secret_fields(&self) -> &'static [&'static str] {
        SECRET_FIELDS
    }

    fn build_request(
        &self,
        args: &InvocationArgs,
        secret: &Secret,
    ) -> Result<HttpRequest, ConnectorError> {
        let url = format!("{}{}", self.base_url, self.analysis.path());
        let language = match self.analysis {
            TextAnalysis::DetectLanguage => None,
            _ => args.str("language"),
        };
        Ok(subscribed_post(url, secret)?.json(text_documents(args.require_str("text")?, language)))
    }
}

/// Translator v3, `POST /translate?api-version=3.0&to={language}`.
pub struct Translate {
    base_url: String,
}

impl Translate {
    pub fn new() -> Self {
        Self::with_base_url(TRANSLATOR_BASE_URL)
    }

    pub fn with_base_url(base: &str) -> Self {
        Self {
            base_url: base_url(base),
        }
    }
}

impl Default for Translate {
    fn default() -> Self {
        Self::new()
    }
}

impl RestOperation for Translate {
    fn name(&self) -> &str {
        "cognitive_translate"
    }

    fn schema(&self) -> ConnectorSchema {
        ConnectorSchema::new("cognitive_translate", "Translate")
            .describe("Translates a text into another language")
            .arg(ArgSpec::secret("cognitive"))
            .arg(text_arg())
            .arg(
                ArgSpec::string("language", "Target language")
                    .describe("Language code to translate to, e.g. fr")
                    .required(),
            )
            .with_output("translation")
    }

    fn secret_fields(&self) -> &'static [&'static str] {
        SECRET_FIELDS
    }

    fn build_request(
        &self,
        args: &InvocationArgs,
        secret: &Secret,
    ) -> Result<HttpRequest, ConnectorError> {
        let url = format!("{}{}", self.base_url, TRANSLATE_PATH);
        Ok(subscribed_post(url, secret)?
            .query("api-version", TRANSLATOR_API_VERSION)
            .query("to", args.require_str("language")?)
            .json(translate_body(args.require_str("text")?)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::{Connector, Invocation};
    use crate::rest::Rest;
    use flowlink::test_utils::MockTransport;
    use flowlink::transport::RequestBody;
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
        let secret = Secret::new().with("key", "sub-key");
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
    async fn test_spell_check_form_body() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/bing/v7.0/spellcheck")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("mode".into(), "proof".into()),
                Matcher::UrlEncoded("mkt".into(), "en-US".into()),
            ]))
            .match_header("ocp-apim-subscription-key", "sub-key")
            .match_header("content-type", "application/x-www-form-urlencoded")
            .match_body(Matcher::UrlEncoded("text".into(), "helo world".into()))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"_type": "SpellCheck", "flaggedTokens": [{"offset": 0, "token": "helo"}]}"#)
            .create_async()
            .await;

        let mut ctx = MemoryContext::new();
        invoke(
            &Rest(SpellCheck::with_base_url(&server.url())),
            &ReqwestTransport::new(),
            &mut ctx,
            json!({"text": "helo world", "mode": "proof", "mkt": "en-US", "store": "spelling", "stopOnError": true}),
        )
        .await
        .unwrap();

        assert_eq!(ctx.context()["spelling"]["flaggedTokens"][0]["token"], "helo");
    }

    #[tokio::test]
    async fn test_detect_language_ignores_language_arg() {
        let transport = MockTransport::json(
            200,
            json!({"documents": [{"id": "1", "detectedLanguages": [{"name": "English", "iso6391Name": "en"}]}], "errors": []}),
        );
        let mut ctx = MemoryContext::new();
        invoke(
            &Rest(AnalyzeText::new(TextAnalysis::DetectLanguage)),
            &transport,
            &mut ctx,
            json!({"text": "Hello", "language": "de", "store": "lang", "stopOnError": true}),
        )
        .await
        .unwrap();

        assert_eq!(
            ctx.context()["lang"]["documents"][0]["detectedLanguages"][0]["iso6391Name"],
            "en"
        );
        let request = &transport.requests()[0];
        assert_eq!(
            request.url,
            "https://westeurope.api.cognitive.microsoft.com/text/analytics/v2.0/languages"
        );
        assert_eq!(
            request.body,
            RequestBody::Json(json!({"documents": [{"id": "1", "text": "Hello"}]}))
        );
    }

    #[tokio::test]
    async fn test_key_phrases_with_language() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/text/analytics/v2.0/keyPhrases")
            .match_body(Matcher::Json(json!({
                "documents": [{"id": "1", "language": "en", "text": "The hotel was great"}]
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"documents": [{"id": "1", "keyPhrases": ["hotel"]}], "errors": []}"#)
            .create_async()
            .await;

        let mut ctx = MemoryContext::new();
        invoke(
            &Rest(AnalyzeText::with_base_url(TextAnalysis::KeyPhrases, &server.url())),
            &ReqwestTransport::new(),
            &mut ctx,
            json!({"text": "The hotel was great", "language": "en", "store": "phrases", "stopOnError": true}),
        )
        .await
        .unwrap();

        assert_eq!(ctx.context()["phrases"]["documents"][0]["keyPhrases"], json!(["hotel"]));
    }

    #[tokio::test]
    async fn test_document_error_is_api_error() {
        let transport = MockTransport::json(
            200,
            json!({"documents": [], "errors": [{"id": "1", "message": "Invalid language code."}]}),
        );
        let mut ctx = MemoryContext::new();
        invoke(
            &Rest(AnalyzeText::new(TextAnalysis::Entities)),
            &transport,
            &mut ctx,
            json!({"text": "x", "language": "zz", "store": "entities", "stopOnError": false}),
        )
        .await
        .unwrap();

        assert_eq!(ctx.context()["entities"], json!({"error": "Invalid language code."}));
        assert!(transport.requests()[0]
            .url
            .ends_with("/text/analytics/v2.1-preview/entities"));
    }

    #[tokio::test]
    async fn test_translate() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("POST", "/translate")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("api-version".into(), "3.0".into()),
                Matcher::UrlEncoded("to".into(), "fr".into()),
            ]))
            .match_body(Matcher::Json(json!([{"Text": "Hello"}])))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"[{"translations": [{"text": "Bonjour", "to": "fr"}]}]"#)
            .create_async()
            .await;

        let mut ctx = MemoryContext::new();
        invoke(
            &Rest(Translate::with_base_url(&server.url())),
            &ReqwestTransport::new(),
            &mut ctx,
            json!({"text": "Hello", "language": "fr", "store": "translation", "stopOnError": true}),
        )
        .await
        .unwrap();

        assert_eq!(ctx.context()["translation"][0]["translations"][0]["text"], "Bonjour");
    }

    #[tokio::test]
    async fn test_unauthorized_message() {
        let transport = MockTransport::json(
            401,
            json!({"error": {"code": "401", "message": "Access denied due to invalid subscription key."}}),
        );
        let mut ctx = MemoryContext::new();
        let err = invoke(
            &Rest(Translate::new()),
            &transport,
            &mut ctx,
            json!({"text": "Hello", "language": "fr", "store": "translation", "stopOnError": true}),
        )
        .await
        .unwrap_err();

        assert_eq!(err.to_string(), "Access denied due to invalid subscription key.");
        assert!(ctx.context().get("translation").is_none());
    }

    #[test]
    fn test_text_analysis_names() {
        let names: Vec<&str> = TextAnalysis::ALL.iter().map(|a| a.connector_name()).collect();
        assert_eq!(
            names,
            vec![
                "cognitive_detect_language",
                "cognitive_extract_key_phrases",
                "cognitive_recognize_entities"
            ]
        );
    }
}
