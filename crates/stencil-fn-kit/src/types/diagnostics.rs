use std::fmt::{self, Display};

use serde::{Deserialize, Serialize};

/// Engine-facing error report produced by function implementations and by
/// the binding layer.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Diagnostic {
    pub message: String,
    pub context: Option<String>,
}

impl Diagnostic {
    pub fn error_from_string(message: String) -> Diagnostic {
        Diagnostic { message, context: None }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::error_from_string(message.into())
    }

    pub fn with_context(mut self, context: impl Into<String>) -> Self {
        self.context = Some(context.into());
        self
    }
}

impl Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "error: {}", self.message)?;
        if let Some(context) = &self.context {
            write!(f, " ({})", context)?;
        }
        Ok(())
    }
}

impl std::error::Error for Diagnostic {}
