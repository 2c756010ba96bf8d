#[macro_use]
extern crate serde_derive;

#[macro_use]
mod macros;
pub mod constants;

pub use chrono;
pub use indexmap;
pub use indoc::indoc;
pub use log;
pub use rust_decimal;
pub use serde;
pub use serde_json;

pub mod types;

pub use types::conversion::{ConversionError, ConversionErrorKind, ValueConverter};
pub use types::diagnostics::Diagnostic;
pub use types::function_errors::{ContractError, FunctionError};
pub use types::functions::{
    BoundArguments, FunctionContract, FunctionImplementation, FunctionInvoker,
    ParameterDefinition, RawArgument, SurplusPolicy,
};
pub use types::type_compatibility::{ConvertibilityChecker, TypeChecker};
pub use types::types::{Type, Value};
pub use types::ExecutionContext;
