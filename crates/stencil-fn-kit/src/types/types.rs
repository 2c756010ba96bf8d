use chrono::NaiveDateTime;
use indexmap::IndexMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

use crate::constants::DATETIME_DISPLAY_FORMAT;

use super::function_errors::ContractError;

#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Value {
    Null,
    Bool(bool),
    Integer(i64),
    Float(f64),
    Decimal(Decimal),
    String(String),
    DateTime(NaiveDateTime),
    Char(char),
    Byte(u8),
    Enum(EnumMember),
    Object(ObjectData),
}

impl Value {
    pub fn null() -> Value {
        Value::Null
    }
    pub fn bool(value: bool) -> Value {
        Value::Bool(value)
    }
    pub fn integer(value: i64) -> Value {
        Value::Integer(value)
    }
    pub fn float(value: f64) -> Value {
        Value::Float(value)
    }
    pub fn decimal(value: Decimal) -> Value {
        Value::Decimal(value)
    }
    pub fn string(value: impl Into<String>) -> Value {
        Value::String(value.into())
    }
    pub fn datetime(value: NaiveDateTime) -> Value {
        Value::DateTime(value)
    }
    pub fn char(value: char) -> Value {
        Value::Char(value)
    }
    pub fn byte(value: u8) -> Value {
        Value::Byte(value)
    }
    pub fn object(class: ObjectClass, fields: IndexMap<String, Value>) -> Value {
        Value::Object(ObjectData { class, fields })
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_bool(&self) -> Option<bool> {
        match &self {
            Value::Bool(value) => Some(*value),
            _ => None,
        }
    }
    pub fn as_integer(&self) -> Option<i64> {
        match &self {
            Value::Integer(value) => Some(*value),
            _ => None,
        }
    }
    pub fn as_float(&self) -> Option<f64> {
        match &self {
            Value::Float(value) => Some(*value),
            _ => None,
        }
    }
    pub fn as_decimal(&self) -> Option<Decimal> {
        match &self {
            Value::Decimal(value) => Some(*value),
            _ => None,
        }
    }
    pub fn as_string(&self) -> Option<&str> {
        match &self {
            Value::String(value) => Some(value),
            _ => None,
        }
    }
    pub fn as_datetime(&self) -> Option<&NaiveDateTime> {
        match &self {
            Value::DateTime(value) => Some(value),
            _ => None,
        }
    }
    pub fn as_char(&self) -> Option<char> {
        match &self {
            Value::Char(value) => Some(*value),
            _ => None,
        }
    }
    pub fn as_byte(&self) -> Option<u8> {
        match &self {
            Value::Byte(value) => Some(*value),
            _ => None,
        }
    }
    pub fn as_enum(&self) -> Option<&EnumMember> {
        match &self {
            Value::Enum(value) => Some(value),
            _ => None,
        }
    }
    pub fn as_object(&self) -> Option<&ObjectData> {
        match &self {
            Value::Object(value) => Some(value),
            _ => None,
        }
    }

    /// Name of the runtime type carried by this value, used in diagnostics.
    pub fn type_name(&self) -> String {
        match self {
            Value::Null => "null".into(),
            Value::Bool(_) => "bool".into(),
            Value::Integer(_) => "integer".into(),
            Value::Float(_) => "float".into(),
            Value::Decimal(_) => "decimal".into(),
            Value::String(_) => "string".into(),
            Value::DateTime(_) => "datetime".into(),
            Value::Char(_) => "char".into(),
            Value::Byte(_) => "byte".into(),
            Value::Enum(member) => format!("enum({})", member.enum_name),
            Value::Object(object) => format!("object({})", object.class.name()),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(value) => write!(f, "{}", value),
            Value::Integer(value) => write!(f, "{}", value),
            Value::Float(value) => write!(f, "{}", value),
            Value::Decimal(value) => write!(f, "{}", value),
            Value::String(value) => write!(f, "{}", value),
            Value::DateTime(value) => write!(f, "{}", value.format(DATETIME_DISPLAY_FORMAT)),
            Value::Char(value) => write!(f, "{}", value),
            Value::Byte(value) => write!(f, "{}", value),
            Value::Enum(member) => write!(f, "{}", member.member),
            Value::Object(object) => write!(f, "<{}>", object.class.name()),
        }
    }
}

/// A member of a declared enumeration, carrying its declaration ordinal.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct EnumMember {
    pub enum_name: String,
    pub member: String,
    pub ordinal: usize,
}

/// A closed, statically declared enumeration.
///
/// Members are ordered and unique, and there is always at least one of them:
/// the first member doubles as the enumeration's default value.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct EnumDefinition {
    name: String,
    members: Vec<String>,
}

impl EnumDefinition {
    pub fn new<S: AsRef<str>>(name: &str, members: &[S]) -> Result<Self, ContractError> {
        if name.is_empty() {
            return Err(ContractError::NullArgument("enum name"));
        }
        if members.is_empty() {
            return Err(ContractError::EmptyEnum { name: name.to_string() });
        }
        let mut declared: Vec<String> = Vec::with_capacity(members.len());
        for member in members.iter().map(|m| m.as_ref()) {
            if member.is_empty() {
                return Err(ContractError::NullArgument("enum member"));
            }
            if declared.iter().any(|d| d == member) {
                return Err(ContractError::DuplicateEnumMember {
                    name: name.to_string(),
                    member: member.to_string(),
                });
            }
            declared.push(member.to_string());
        }
        Ok(EnumDefinition { name: name.to_string(), members: declared })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn members(&self) -> &[String] {
        &self.members
    }

    /// Exact, case-sensitive lookup of a member by name.
    pub fn member(&self, name: &str) -> Option<EnumMember> {
        self.members.iter().position(|m| m == name).map(|ordinal| self.member_unchecked(ordinal))
    }

    pub fn default_member(&self) -> EnumMember {
        self.member_unchecked(0)
    }

    pub fn contains(&self, member: &EnumMember) -> bool {
        member.enum_name == self.name
            && self.members.get(member.ordinal).map_or(false, |m| *m == member.member)
    }

    fn member_unchecked(&self, ordinal: usize) -> EnumMember {
        EnumMember {
            enum_name: self.name.clone(),
            member: self.members[ordinal].clone(),
            ordinal,
        }
    }
}

/// Lineage of an object class, base first and most-derived last.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct ObjectClass {
    lineage: Vec<String>,
}

impl ObjectClass {
    pub fn new(name: &str) -> Self {
        ObjectClass { lineage: vec![name.to_string()] }
    }

    /// Returns a class derived from `self`.
    pub fn derive(&self, name: &str) -> Self {
        let mut lineage = self.lineage.clone();
        lineage.push(name.to_string());
        ObjectClass { lineage }
    }

    pub fn name(&self) -> &str {
        self.lineage.last().map(|s| s.as_str()).unwrap_or_default()
    }

    pub fn lineage(&self) -> &[String] {
        &self.lineage
    }

    /// True when `name` is this class or one of its ancestors.
    pub fn is_a(&self, name: &str) -> bool {
        self.lineage.iter().any(|c| c == name)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ObjectData {
    pub class: ObjectClass,
    pub fields: IndexMap<String, Value>,
}

impl ObjectData {
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub enum Type {
    Bool,
    Integer,
    Float,
    Decimal,
    String,
    DateTime,
    Char,
    Byte,
    Enum(EnumDefinition),
    Nullable(Box<Type>),
    Object(String),
    Any,
}

impl Type {
    pub fn bool() -> Type {
        Type::Bool
    }
    pub fn integer() -> Type {
        Type::Integer
    }
    pub fn float() -> Type {
        Type::Float
    }
    pub fn decimal() -> Type {
        Type::Decimal
    }
    pub fn string() -> Type {
        Type::String
    }
    pub fn datetime() -> Type {
        Type::DateTime
    }
    pub fn char() -> Type {
        Type::Char
    }
    pub fn byte() -> Type {
        Type::Byte
    }
    pub fn enumeration(definition: EnumDefinition) -> Type {
        Type::Enum(definition)
    }
    pub fn nullable(inner: Type) -> Type {
        match inner {
            Type::Nullable(_) => inner,
            inner => Type::Nullable(Box::new(inner)),
        }
    }
    pub fn object(class: &str) -> Type {
        Type::Object(class.to_string())
    }
    pub fn any() -> Type {
        Type::Any
    }

    pub fn is_nullable(&self) -> bool {
        matches!(self, Type::Nullable(_))
    }

    /// Integer, Float, Decimal and Byte.
    pub fn is_numeric(&self) -> bool {
        matches!(self, Type::Integer | Type::Float | Type::Decimal | Type::Byte)
    }

    /// The wrapped type of a nullable, or `self`.
    pub fn underlying(&self) -> &Type {
        match self {
            Type::Nullable(inner) => inner.underlying(),
            other => other,
        }
    }

    pub fn as_enum(&self) -> Option<&EnumDefinition> {
        match self.underlying() {
            Type::Enum(definition) => Some(definition),
            _ => None,
        }
    }

    /// The value a null or an absent optional argument resolves to.
    pub fn default_value(&self) -> Value {
        match self {
            Type::Bool => Value::Bool(false),
            Type::Integer => Value::Integer(0),
            Type::Float => Value::Float(0.0),
            Type::Decimal => Value::Decimal(Decimal::ZERO),
            Type::String => Value::String(String::new()),
            Type::DateTime => Value::DateTime(NaiveDateTime::default()),
            Type::Char => Value::Char('\0'),
            Type::Byte => Value::Byte(0),
            Type::Enum(definition) => Value::Enum(definition.default_member()),
            Type::Nullable(_) | Type::Object(_) | Type::Any => Value::Null,
        }
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Type::Bool => write!(f, "bool"),
            Type::Integer => write!(f, "integer"),
            Type::Float => write!(f, "float"),
            Type::Decimal => write!(f, "decimal"),
            Type::String => write!(f, "string"),
            Type::DateTime => write!(f, "datetime"),
            Type::Char => write!(f, "char"),
            Type::Byte => write!(f, "byte"),
            Type::Enum(definition) => write!(f, "enum({})", definition.name()),
            Type::Nullable(inner) => write!(f, "nullable({})", inner),
            Type::Object(class) => write!(f, "object({})", class),
            Type::Any => write!(f, "any"),
        }
    }
}

impl Default for Type {
    fn default() -> Self {
        Type::string()
    }
}

impl TryFrom<String> for Type {
    type Error = String;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        Type::try_from(value.as_str())
    }
}

impl TryFrom<&str> for Type {
    type Error = String;
    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let val = match value.trim() {
            "bool" => Type::Bool,
            "integer" => Type::Integer,
            "float" => Type::Float,
            "decimal" => Type::Decimal,
            "string" => Type::String,
            "datetime" => Type::DateTime,
            "char" => Type::Char,
            "byte" => Type::Byte,
            "any" => Type::Any,
            other => {
                if let Some(inner) = wrapped(other, "nullable") {
                    Type::nullable(Type::try_from(inner)?)
                } else if let Some(class) = wrapped(other, "object") {
                    if class.is_empty() {
                        return Err(format!("invalid type: {}", other));
                    }
                    Type::object(class)
                } else if wrapped(other, "enum").is_some() {
                    return Err(format!(
                        "invalid type: {} (enumerations must be declared with their members)",
                        other
                    ));
                } else {
                    return Err(format!("invalid type: {}", other));
                }
            }
        };
        Ok(val)
    }
}

fn wrapped<'a>(tag: &'a str, wrapper: &str) -> Option<&'a str> {
    tag.strip_prefix(wrapper)?.strip_prefix('(')?.strip_suffix(')')
}

impl Serialize for Type {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Type {
    fn deserialize<D>(deserializer: D) -> Result<Type, D::Error>
    where
        D: Deserializer<'de>,
    {
        let type_str: String = serde::Deserialize::deserialize(deserializer)?;
        let t = Type::try_from(type_str).map_err(serde::de::Error::custom)?;
        Ok(t)
    }
}
