use flowlink::args::{STOP_ON_ERROR_ARG, STORE_ARG};
use serde::{Deserialize, Serialize};

/// Type of a declared connector argument.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ArgType {
    String,
    Boolean,
    Number,
    /// One of a fixed set of values.
    Select { options: Vec<String> },
    /// Free-form JSON (object, array, or a JSON string).
    Json,
    /// Reference to a named secret of the given kind.
    Secret { kind: String },
}

/// A single flow-author-facing argument declaration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ArgSpec {
    pub key: String,
    pub label: String,
    pub description: String,
    #[serde(flatten)]
    pub arg_type: ArgType,
    pub required: bool,
}

impl ArgSpec {
    pub fn new(key: &str, label: &str, arg_type: ArgType) -> Self {
        Self {
            key: key.to_string(),
            label: label.to_string(),
            description: String::new(),
            arg_type,
            required: false,
        }
    }

    pub fn string(key: &str, label: &str) -> Self {
        Self::new(key, label, ArgType::String)
    }

    pub fn number(key: &str, label: &str) -> Self {
        Self::new(key, label, ArgType::Number)
    }

    pub fn json(key: &str, label: &str) -> Self {
        Self::new(key, label, ArgType::Json)
    }

    pub fn select(key: &str, label: &str, options: &[&str]) -> Self {
        Self::new(
            key,
            label,
            ArgType::Select {
                options: options.iter().map(|o| o.to_string()).collect(),
            },
        )
    }

    pub fn secret(kind: &str) -> Self {
        Self::new(
            "secret",
            "Secret",
            ArgType::Secret {
                kind: kind.to_string(),
            },
        )
        .describe("The secret holding the API credentials")
        .required()
    }

    /// Where the result (or `{ error }`) is written.
    pub fn store(default_hint: &str) -> Self {
        Self::string(STORE_ARG, "Store location")
            .describe(&format!(
                "Where to store the result, e.g. \"{}\"",
                default_hint
            ))
            .required()
    }

    pub fn stop_on_error() -> Self {
        Self::new(STOP_ON_ERROR_ARG, "Stop on error", ArgType::Boolean)
            .describe("Whether to stop the flow on error or store the error and continue")
            .required()
    }

    #[must_use]
    pub fn describe(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    #[must_use]
    pub fn required(mut self) -> Self {
        self.required = true;
        self
    }

    pub fn is_boolean(&self) -> bool {
        self.arg_type == ArgType::Boolean
    }
}

/// Declared argument schema of a connector.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConnectorSchema {
    pub name: String,
    pub label: String,
    pub description: String,
    pub args: Vec<ArgSpec>,
}

impl ConnectorSchema {
    pub fn new(name: &str, label: &str) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            description: String::new(),
            args: Vec::new(),
        }
    }

    #[must_use]
    pub fn describe(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    #[must_use]
    pub fn arg(mut self, arg: ArgSpec) -> Self {
        self.args.push(arg);
        self
    }

    /// Appends the `store` and `stopOnError` arguments shared by every
    /// network connector.
    #[must_use]
    pub fn with_output(self, store_hint: &str) -> Self {
        self.arg(ArgSpec::store(store_hint))
            .arg(ArgSpec::stop_on_error())
    }

    /// Required arguments that are passed in `args` (the secret reference is
    /// resolved by the host before invocation).
    pub fn required_args(&self) -> impl Iterator<Item = &ArgSpec> {
        self.args
            .iter()
            .filter(|a| a.required && !matches!(a.arg_type, ArgType::Secret { .. }))
    }

    pub fn secret_kind(&self) -> Option<&str> {
        self.args.iter().find_map(|a| match &a.arg_type {
            ArgType::Secret { kind } => Some(kind.as_str()),
            _ => None,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ConnectorSchema {
        ConnectorSchema::new("jira_get_ticket_status", "Get ticket status")
            .arg(ArgSpec::secret("jira"))
            .arg(ArgSpec::string("ticket", "Ticket").required())
            .arg(ArgSpec::number("limit", "Limit"))
            .with_output("ticket")
    }

    #[test]
    fn test_required_args_skip_secret() {
        let schema = sample();
        let keys: Vec<&str> = schema.required_args().map(|a| a.key.as_str()).collect();
        assert_eq!(keys, vec!["ticket", "store", "stopOnError"]);
        assert_eq!(schema.secret_kind(), Some("jira"));
    }

    #[test]
    fn test_schema_serialization() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["name"], "jira_get_ticket_status");
        assert_eq!(json["args"][0]["type"], "secret");
        assert_eq!(json["args"][0]["kind"], "jira");
        assert_eq!(json["args"][1]["type"], "string");
        assert_eq!(json["args"][1]["required"], true);
        assert_eq!(json["args"][4]["key"], "stopOnError");
        assert_eq!(json["args"][4]["type"], "boolean");
    }

    #[test]
    fn test_select_options() {
        let arg = ArgSpec::select("entity", "Entity", &["locations", "reviews"]);
        let json = serde_json::to_value(&arg).unwrap();
        assert_eq!(json["type"], "select");
        assert_eq!(json["options"][1], "reviews");
        assert!(!arg.is_boolean());
        assert!(ArgSpec::stop_on_error().is_boolean());
    }
}
