use serde_json::{json, Map, Value};

pub const SUBSCRIPTION_KEY_HEADER: &str = "Ocp-Apim-Subscription-Key";

pub const SECRET_FIELDS: &[&str] = &["key"];

pub const SPELL_CHECK_PATH: &str = "/bing/v7.0/spellcheck";
pub const LANGUAGES_PATH: &str = "/text/analytics/v2.0/languages";
pub const KEY_PHRASES_PATH: &str = "/text/analytics/v2.0/keyPhrases";
pub const ENTITIES_PATH: &str = "/text/analytics/v2.1-preview/entities";
pub const TRANSLATE_PATH: &str = "/translate";

pub const TRANSLATOR_API_VERSION: &str = "3.0";

pub const SPELL_CHECK_MODES: &[&str] = &["proof", "spell"];

/// Single-document Text Analytics request body.
pub fn text_documents(text: &str, language: Option<&str>) -> Value {
    let mut document = Map::new();
    document.insert("id".to_string(), json!("1"));
    if let Some(language) = language {
        document.insert("language".to_string(), json!(language));
    }
    document.insert("text".to_string(), json!(text));
    json!({ "documents": [document] })
}

/// Translator request body.
pub fn translate_body(text: &str) -> Value {
    json!([{ "Text": text }])
}
