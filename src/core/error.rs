use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    DirectiveMalformed,
    DirectiveMalformedQualifiedReplacement,

    TemplateLoadFailed,
    TemplateRenderFailed,

    ConfigInvalidJson,

    ValidationInvalidArgument,

    InternalIoError,
    InternalJsonError,
    InternalUnexpected,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::DirectiveMalformed => "directive.malformed",
            ErrorCode::DirectiveMalformedQualifiedReplacement => {
                "directive.malformed_qualified_replacement"
            }

            ErrorCode::TemplateLoadFailed => "template.load_failed",
            ErrorCode::TemplateRenderFailed => "template.render_failed",

            ErrorCode::ConfigInvalidJson => "config.invalid_json",

            ErrorCode::ValidationInvalidArgument => "validation.invalid_argument",

            ErrorCode::InternalIoError => "internal.io_error",
            ErrorCode::InternalJsonError => "internal.json_error",
            ErrorCode::InternalUnexpected => "internal.unexpected",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Hint {
    pub message: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MalformedDirectiveDetails {
    pub directive: String,
    pub problem: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directives: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MalformedQualifiedReplacementDetails {
    pub replacement: String,
    pub problem: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateLoadDetails {
    pub template: String,
    pub problem: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TemplateRenderDetails {
    pub action: String,
    pub problem: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InvalidArgumentDetails {
    pub field: String,
    pub problem: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfigInvalidJsonDetails {
    pub path: String,
    pub error: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalIoErrorDetails {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalJsonErrorDetails {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
}

#[derive(Debug, Clone)]
pub struct Error {
    pub code: ErrorCode,
    pub message: String,
    pub details: Value,
    pub hints: Vec<Hint>,
}

pub type Result<T> = std::result::Result<T, Error>;

impl std::fmt::Display for Error {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for Error {}

fn to_details<T: Serialize>(details: T) -> Value {
    serde_json::to_value(details).unwrap_or_else(|_| Value::Object(serde_json::Map::new()))
}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>, details: Value) -> Self {
        Self {
            code,
            message: message.into(),
            details,
            hints: Vec::new(),
        }
    }

    pub fn malformed_directive(directive: impl Into<String>, problem: impl Into<String>) -> Self {
        let directive = directive.into();
        let details = to_details(MalformedDirectiveDetails {
            directive: directive.clone(),
            problem: problem.into(),
            directives: None,
        });

        Self::new(
            ErrorCode::DirectiveMalformed,
            format!("Invalid directive {:?}", directive),
            details,
        )
        .with_hint("Directives use the form [scope:]search=>replace")
    }

    pub fn malformed_qualified_replacement(
        replacement: impl Into<String>,
        problem: impl Into<String>,
    ) -> Self {
        let replacement = replacement.into();
        let details = to_details(MalformedQualifiedReplacementDetails {
            replacement: replacement.clone(),
            problem: problem.into(),
        });

        Self::new(
            ErrorCode::DirectiveMalformedQualifiedReplacement,
            format!("Invalid qualified replacement {:?}", replacement),
            details,
        )
        .with_hint("Qualified replacements use the form import/path.Type")
    }

    pub fn template_load(
        template: impl Into<String>,
        problem: impl Into<String>,
        file: Option<String>,
    ) -> Self {
        let details = to_details(TemplateLoadDetails {
            template: template.into(),
            problem: problem.into(),
            file,
        });

        Self::new(
            ErrorCode::TemplateLoadFailed,
            "Failed to load template package",
            details,
        )
    }

    pub fn template_render(
        action: impl Into<String>,
        problem: impl Into<String>,
        file: Option<String>,
    ) -> Self {
        let details = to_details(TemplateRenderDetails {
            action: action.into(),
            problem: problem.into(),
            file,
        });

        Self::new(
            ErrorCode::TemplateRenderFailed,
            "Failed to render generated output",
            details,
        )
    }

    pub fn validation_invalid_argument(
        field: impl Into<String>,
        problem: impl Into<String>,
    ) -> Self {
        let details = to_details(InvalidArgumentDetails {
            field: field.into(),
            problem: problem.into(),
        });

        Self::new(
            ErrorCode::ValidationInvalidArgument,
            "Invalid argument",
            details,
        )
    }

    pub fn config_invalid_json(path: impl Into<String>, err: serde_json::Error) -> Self {
        let details = to_details(ConfigInvalidJsonDetails {
            path: path.into(),
            error: err.to_string(),
        });

        Self::new(
            ErrorCode::ConfigInvalidJson,
            "Invalid JSON in configuration",
            details,
        )
    }

    pub fn internal_io(error: impl Into<String>, context: Option<String>) -> Self {
        let details = to_details(InternalIoErrorDetails {
            error: error.into(),
            context,
        });

        Self::new(ErrorCode::InternalIoError, "IO error", details)
    }

    pub fn internal_json(error: impl Into<String>, context: Option<String>) -> Self {
        let details = to_details(InternalJsonErrorDetails {
            error: error.into(),
            context,
        });

        Self::new(ErrorCode::InternalJsonError, "JSON error", details)
    }

    pub fn internal_unexpected(error: impl Into<String>) -> Self {
        Self::new(
            ErrorCode::InternalUnexpected,
            "Unexpected error",
            serde_json::json!({ "error": error.into() }),
        )
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::internal_unexpected(message)
    }

    /// Attach the full directive list to a directive error, so the envelope shows
    /// which argument the bad directive came from.
    pub fn with_directives(mut self, directives: impl Into<String>) -> Self {
        if let Value::Object(map) = &mut self.details {
            map.insert("directives".to_string(), Value::String(directives.into()));
        }
        self
    }

    pub fn with_hint(mut self, message: impl Into<String>) -> Self {
        self.hints.push(Hint {
            message: message.into(),
        });
        self
    }
}
