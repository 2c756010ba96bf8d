use super::conversion::{parse_numeric, try_convert};
use super::types::{Type, Value};

/// Type compatibility checking for stencil values
pub struct TypeChecker;

impl TypeChecker {
    /// Check if a value already satisfies a type without conversion.
    ///
    /// Widening only: an object matches its own class and every ancestor, any
    /// value matches `Any`, and a nullable accepts null or its inner type.
    pub fn matches(value: &Value, expected_type: &Type) -> bool {
        match (value, expected_type) {
            (_, Type::Any) => true,
            (Value::Null, Type::Nullable(_)) => true,
            (_, Type::Nullable(inner)) => Self::matches(value, inner),

            (Value::Bool(_), Type::Bool)
            | (Value::Integer(_), Type::Integer)
            | (Value::Float(_), Type::Float)
            | (Value::Decimal(_), Type::Decimal)
            | (Value::String(_), Type::String)
            | (Value::DateTime(_), Type::DateTime)
            | (Value::Char(_), Type::Char)
            | (Value::Byte(_), Type::Byte) => true,

            (Value::Enum(member), Type::Enum(definition)) => definition.contains(member),
            (Value::Object(object), Type::Object(class)) => object.class.is_a(class),

            _ => false,
        }
    }
}

/// Side-effect free probe answering whether a value could be converted.
pub struct ConvertibilityChecker;

impl ConvertibilityChecker {
    /// Whether `sample`, a value of type `source`, converts to `destination`.
    ///
    /// Text probed against a numeric family is checked with the culture-invariant
    /// numeric grammar of that family; every other pair performs one throwaway
    /// conversion through the built-in table. Never panics, never errors: any
    /// failed trial is reported as `false`, as is a sample that is not of type
    /// `source`.
    pub fn is_convertible(source: &Type, destination: &Type, sample: &Value) -> bool {
        if !TypeChecker::matches(sample, source) {
            return false;
        }
        Self::is_value_convertible(sample, destination)
    }

    /// Same probe, with the source type taken from the sample itself.
    pub fn is_value_convertible(sample: &Value, destination: &Type) -> bool {
        let destination = destination.underlying();
        match sample {
            Value::String(text) if destination.is_numeric() => {
                parse_numeric(text, destination).is_some()
            }
            _ => try_convert(sample, destination).is_some(),
        }
    }
}
