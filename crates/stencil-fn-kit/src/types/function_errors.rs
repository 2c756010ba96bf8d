use super::conversion::ConversionError;
use super::diagnostics::Diagnostic;

/// Errors raised while binding a call's arguments to a function contract,
/// plus the pass-through of errors raised by the implementation itself.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum FunctionError {
    #[error("function '{function}' missing required argument #{position} ({name})")]
    MissingParameter { function: String, position: usize, name: String },

    #[error("function '{function}' argument #{position} ({name}): {source}")]
    Conversion { function: String, position: usize, name: String, source: ConversionError },

    #[error("function '{function}' accepts at most {expected} argument(s), {provided} provided")]
    SurplusArguments { function: String, expected: usize, provided: usize },

    #[error("function '{function}': {diagnostic}")]
    Implementation { function: String, diagnostic: Diagnostic },
}

impl FunctionError {
    pub fn function(&self) -> &str {
        match self {
            FunctionError::MissingParameter { function, .. }
            | FunctionError::Conversion { function, .. }
            | FunctionError::SurplusArguments { function, .. }
            | FunctionError::Implementation { function, .. } => function,
        }
    }

    /// True for failures raised by the binding layer rather than by the function body.
    pub fn is_binding_error(&self) -> bool {
        !matches!(self, FunctionError::Implementation { .. })
    }
}

/// Errors raised while declaring contracts and enumerations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ContractError {
    #[error("{0} must be provided")]
    NullArgument(&'static str),

    #[error("function '{function}' declares parameter '{name}' more than once")]
    DuplicateParameter { function: String, name: String },

    #[error("enum '{name}' must declare at least one member")]
    EmptyEnum { name: String },

    #[error("enum '{name}' declares member '{member}' more than once")]
    DuplicateEnumMember { name: String, member: String },
}

impl From<FunctionError> for Diagnostic {
    fn from(err: FunctionError) -> Self {
        match err {
            FunctionError::Implementation { function, diagnostic } => {
                diagnostic.with_context(format!("in function '{}'", function))
            }
            err => Diagnostic::error_from_string(err.to_string()),
        }
    }
}

impl From<ContractError> for Diagnostic {
    fn from(err: ContractError) -> Self {
        Diagnostic::error_from_string(err.to_string())
    }
}

impl From<ConversionError> for Diagnostic {
    fn from(err: ConversionError) -> Self {
        Diagnostic::error_from_string(err.to_string())
    }
}
