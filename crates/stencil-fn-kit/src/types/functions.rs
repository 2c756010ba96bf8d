use chrono::NaiveDateTime;
use log::debug;
use rust_decimal::Decimal;
use serde_json::{json, Value as JsonValue};

use super::{
    conversion::ValueConverter,
    diagnostics::Diagnostic,
    function_errors::{ContractError, FunctionError},
    types::{EnumMember, Type, Value},
    ExecutionContext,
};

/// One declared, typed, named function parameter.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ParameterDefinition {
    name: String,
    documentation: String,
    typing: Type,
    required: bool,
}

impl ParameterDefinition {
    pub fn new(
        name: &str,
        documentation: &str,
        typing: Type,
        required: bool,
    ) -> Result<Self, ContractError> {
        if name.is_empty() {
            return Err(ContractError::NullArgument("parameter name"));
        }
        Ok(ParameterDefinition {
            name: name.to_string(),
            documentation: documentation.to_string(),
            typing,
            required,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn documentation(&self) -> &str {
        &self.documentation
    }
    pub fn typing(&self) -> &Type {
        &self.typing
    }
    pub fn is_required(&self) -> bool {
        self.required
    }
    pub fn is_optional(&self) -> bool {
        !self.required
    }
}

/// What happens to arguments supplied beyond the declared parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "policy", rename_all = "snake_case")]
pub enum SurplusPolicy {
    /// Surplus arguments fail the call.
    Reject,
    /// Surplus arguments are dropped without being converted.
    Ignore,
    /// Surplus arguments are converted to the tail type and handed over in order.
    Variadic(VariadicTail),
}

impl Default for SurplusPolicy {
    fn default() -> Self {
        SurplusPolicy::Reject
    }
}

impl SurplusPolicy {
    pub fn variadic(name: &str, documentation: &str, typing: Type) -> SurplusPolicy {
        SurplusPolicy::Variadic(VariadicTail {
            name: name.to_string(),
            documentation: documentation.to_string(),
            typing,
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct VariadicTail {
    pub name: String,
    pub documentation: String,
    pub typing: Type,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct FunctionOutput {
    pub documentation: String,
    pub typing: Type,
}

pub type FunctionRunner =
    fn(&FunctionContract, &ExecutionContext, &BoundArguments) -> Result<Value, Diagnostic>;

pub trait FunctionImplementation {
    fn run(
        _contract: &FunctionContract,
        _ctx: &ExecutionContext,
        _args: &BoundArguments,
    ) -> Result<Value, Diagnostic>;
}

/// Full, ordered parameter declaration of one function, with its implementation.
///
/// Contracts are assembled once at registration time through the consuming
/// builder methods below and are never mutated afterwards; they can be shared
/// freely between threads.
#[derive(Clone, Debug)]
pub struct FunctionContract {
    name: String,
    documentation: String,
    parameters: Vec<ParameterDefinition>,
    surplus: SurplusPolicy,
    output: FunctionOutput,
    example: String,
    runner: FunctionRunner,
}

impl FunctionContract {
    pub fn new(
        name: &str,
        documentation: &str,
        runner: FunctionRunner,
    ) -> Result<Self, ContractError> {
        if name.is_empty() {
            return Err(ContractError::NullArgument("function name"));
        }
        Ok(FunctionContract {
            name: name.to_string(),
            documentation: documentation.to_string(),
            parameters: vec![],
            surplus: SurplusPolicy::default(),
            output: FunctionOutput { documentation: String::new(), typing: Type::any() },
            example: String::new(),
            runner,
        })
    }

    /// Appends a parameter; declaration order is positional binding order.
    pub fn define_parameter(
        mut self,
        name: &str,
        documentation: &str,
        typing: Type,
        required: bool,
    ) -> Result<Self, ContractError> {
        let parameter = ParameterDefinition::new(name, documentation, typing, required)?;
        self.ensure_unique(name)?;
        self.parameters.push(parameter);
        Ok(self)
    }

    pub fn with_surplus(mut self, surplus: SurplusPolicy) -> Result<Self, ContractError> {
        if let SurplusPolicy::Variadic(tail) = &surplus {
            if tail.name.is_empty() {
                return Err(ContractError::NullArgument("variadic parameter name"));
            }
            self.ensure_unique(&tail.name)?;
        }
        self.surplus = surplus;
        Ok(self)
    }

    pub fn with_output(mut self, documentation: &str, typing: Type) -> Self {
        self.output = FunctionOutput { documentation: documentation.to_string(), typing };
        self
    }

    pub fn with_example(mut self, example: &str) -> Self {
        self.example = example.to_string();
        self
    }

    fn ensure_unique(&self, name: &str) -> Result<(), ContractError> {
        let variadic = match &self.surplus {
            SurplusPolicy::Variadic(tail) => Some(tail.name.as_str()),
            _ => None,
        };
        if self.parameters.iter().any(|p| p.name == name) || variadic == Some(name) {
            return Err(ContractError::DuplicateParameter {
                function: self.name.clone(),
                name: name.to_string(),
            });
        }
        Ok(())
    }

    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn documentation(&self) -> &str {
        &self.documentation
    }
    pub fn parameters(&self) -> &[ParameterDefinition] {
        &self.parameters
    }
    pub fn parameter(&self, name: &str) -> Option<&ParameterDefinition> {
        self.parameters.iter().find(|p| p.name == name)
    }
    pub fn surplus(&self) -> &SurplusPolicy {
        &self.surplus
    }
    pub fn output(&self) -> &FunctionOutput {
        &self.output
    }
    pub fn example(&self) -> &str {
        &self.example
    }
    pub fn runner(&self) -> FunctionRunner {
        self.runner
    }

    pub fn required_count(&self) -> usize {
        self.parameters.iter().filter(|p| p.required).count()
    }

    /// Accepted argument counts: at least the first value, at most the second
    /// (`None` when a variadic tail lifts the upper bound).
    pub fn arity(&self) -> (usize, Option<usize>) {
        let max = match self.surplus {
            SurplusPolicy::Variadic(_) => None,
            SurplusPolicy::Reject | SurplusPolicy::Ignore => Some(self.parameters.len()),
        };
        (self.required_count(), max)
    }

    pub fn describe(&self) -> JsonValue {
        let (min, max) = self.arity();
        json!({
            "name": self.name,
            "documentation": self.documentation,
            "parameters": self.parameters,
            "surplus": self.surplus,
            "output": self.output,
            "example": self.example,
            "arity": { "min": min, "max": max },
        })
    }
}

/// An unconverted argument and its zero-based call position.
#[derive(Clone, Debug, PartialEq)]
pub struct RawArgument {
    pub position: usize,
    pub value: Value,
}

impl RawArgument {
    pub fn new(position: usize, value: Value) -> Self {
        RawArgument { position, value }
    }

    pub fn from_values(values: &[Value]) -> Vec<RawArgument> {
        values.iter().cloned().enumerate().map(|(position, value)| Self::new(position, value)).collect()
    }
}

/// Fully typed arguments handed to a function implementation.
#[derive(Clone, Debug, PartialEq)]
pub struct BoundArguments {
    values: Vec<Value>,
    rest: Vec<Value>,
    provided: usize,
}

impl BoundArguments {
    pub fn new(values: Vec<Value>, rest: Vec<Value>, provided: usize) -> Self {
        BoundArguments { values, rest, provided }
    }

    /// One value per declared parameter, absent optional ones holding their default.
    pub fn values(&self) -> &[Value] {
        &self.values
    }

    /// Converted variadic tail.
    pub fn rest(&self) -> &[Value] {
        &self.rest
    }

    /// Number of raw arguments supplied by the caller.
    pub fn provided(&self) -> usize {
        self.provided
    }

    pub fn is_provided(&self, position: usize) -> bool {
        position < self.provided
    }

    pub fn get(&self, position: usize) -> Option<&Value> {
        self.values.get(position)
    }

    pub fn get_expected_value(&self, position: usize) -> Result<&Value, Diagnostic> {
        self.get(position).ok_or_else(|| {
            Diagnostic::error_from_string(format!("no argument bound at position {}", position))
        })
    }

    fn get_expected<'a, T>(
        &'a self,
        position: usize,
        expected: &str,
        extract: impl FnOnce(&'a Value) -> Option<T>,
    ) -> Result<T, Diagnostic> {
        let value = self.get_expected_value(position)?;
        extract(value).ok_or_else(|| {
            Diagnostic::error_from_string(format!(
                "argument at position {} expected to be {}, found {}",
                position,
                expected,
                value.type_name()
            ))
        })
    }

    pub fn get_expected_string(&self, position: usize) -> Result<&str, Diagnostic> {
        self.get_expected(position, "a string", |v| v.as_string())
    }

    pub fn get_expected_integer(&self, position: usize) -> Result<i64, Diagnostic> {
        self.get_expected(position, "an integer", |v| v.as_integer())
    }

    pub fn get_expected_decimal(&self, position: usize) -> Result<Decimal, Diagnostic> {
        self.get_expected(position, "a decimal", |v| v.as_decimal())
    }

    pub fn get_expected_bool(&self, position: usize) -> Result<bool, Diagnostic> {
        self.get_expected(position, "a bool", |v| v.as_bool())
    }

    pub fn get_expected_datetime(&self, position: usize) -> Result<&NaiveDateTime, Diagnostic> {
        self.get_expected(position, "a datetime", |v| v.as_datetime())
    }

    pub fn get_expected_char(&self, position: usize) -> Result<char, Diagnostic> {
        self.get_expected(position, "a char", |v| v.as_char())
    }

    pub fn get_expected_byte(&self, position: usize) -> Result<u8, Diagnostic> {
        self.get_expected(position, "a byte", |v| v.as_byte())
    }

    pub fn get_expected_enum(&self, position: usize) -> Result<&EnumMember, Diagnostic> {
        self.get_expected(position, "an enum member", |v| v.as_enum())
    }
}

/// Binds raw call arguments to a contract and runs the implementation.
///
/// Holds no state: every call builds its own argument list.
#[derive(Clone, Copy, Debug, Default)]
pub struct FunctionInvoker;

impl FunctionInvoker {
    pub fn new() -> Self {
        FunctionInvoker
    }

    /// Validates the argument count against the contract, then converts each
    /// argument positionally. Fails on the first error.
    pub fn bind(
        &self,
        contract: &FunctionContract,
        values: &[Value],
    ) -> Result<BoundArguments, FunctionError> {
        let raw_arguments = RawArgument::from_values(values);
        let provided = raw_arguments.len();
        let declared = contract.parameters();

        if let Some((position, missing)) =
            declared.iter().enumerate().skip(provided).find(|(_, p)| p.is_required())
        {
            debug!("{}: missing required argument '{}'", contract.name(), missing.name());
            return Err(FunctionError::MissingParameter {
                function: contract.name().to_string(),
                position,
                name: missing.name().to_string(),
            });
        }

        if provided > declared.len() && matches!(contract.surplus(), SurplusPolicy::Reject) {
            debug!("{}: rejected {} surplus argument(s)", contract.name(), provided - declared.len());
            return Err(FunctionError::SurplusArguments {
                function: contract.name().to_string(),
                expected: declared.len(),
                provided,
            });
        }

        let mut values = Vec::with_capacity(declared.len());
        for (position, parameter) in declared.iter().enumerate() {
            let value = match raw_arguments.get(position) {
                Some(argument) => {
                    Self::convert_argument(contract, parameter.name(), parameter.typing(), argument)?
                }
                None => parameter.typing().default_value(),
            };
            values.push(value);
        }

        let surplus = raw_arguments.get(declared.len()..).unwrap_or_default();
        let rest = match contract.surplus() {
            SurplusPolicy::Variadic(tail) => surplus
                .iter()
                .map(|argument| Self::convert_argument(contract, &tail.name, &tail.typing, argument))
                .collect::<Result<Vec<_>, _>>()?,
            SurplusPolicy::Ignore if !surplus.is_empty() => {
                debug!("{}: ignored {} surplus argument(s)", contract.name(), surplus.len());
                vec![]
            }
            SurplusPolicy::Ignore | SurplusPolicy::Reject => vec![],
        };

        Ok(BoundArguments::new(values, rest, provided))
    }

    /// Binds `values` and delegates to the contract's implementation.
    ///
    /// The execution context is handed to the implementation untouched, and
    /// whatever the implementation returns, `Value::Null` included, is returned
    /// as is. Errors raised by the implementation come back as
    /// [`FunctionError::Implementation`].
    pub fn invoke(
        &self,
        contract: &FunctionContract,
        values: &[Value],
        ctx: &ExecutionContext,
    ) -> Result<Value, FunctionError> {
        debug!("invoking '{}' with {} argument(s)", contract.name(), values.len());
        let args = self.bind(contract, values)?;
        (contract.runner())(contract, ctx, &args).map_err(|diagnostic| {
            FunctionError::Implementation { function: contract.name().to_string(), diagnostic }
        })
    }

    fn convert_argument(
        contract: &FunctionContract,
        name: &str,
        typing: &Type,
        argument: &RawArgument,
    ) -> Result<Value, FunctionError> {
        ValueConverter::convert(&argument.value, typing).map_err(|source| {
            debug!("{}: argument '{}' rejected: {}", contract.name(), name, source);
            FunctionError::Conversion {
                function: contract.name().to_string(),
                position: argument.position,
                name: name.to_string(),
                source,
            }
        })
    }
}
