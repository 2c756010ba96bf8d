use std::str::FromStr;

use kit::{
    define_function, indoc,
    types::{
        diagnostics::Diagnostic,
        functions::{BoundArguments, FunctionContract, FunctionImplementation, SurplusPolicy},
        types::{EnumDefinition, Type, Value},
        ExecutionContext,
    },
};
use strum::VariantNames;

use super::collect_contracts;

/// Upper bound on the width `pad_left` will pad to.
const MAX_PAD_WIDTH: i64 = 65_536;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::EnumString, strum::VariantNames, strum::Display)]
pub enum TextCase {
    Upper,
    Lower,
    Title,
}

impl TextCase {
    pub fn apply(&self, text: &str) -> String {
        match self {
            TextCase::Upper => text.to_uppercase(),
            TextCase::Lower => text.to_lowercase(),
            TextCase::Title => {
                let mut out = String::with_capacity(text.len());
                let mut at_word_start = true;
                for c in text.chars() {
                    if at_word_start {
                        out.extend(c.to_uppercase());
                    } else {
                        out.extend(c.to_lowercase());
                    }
                    at_word_start = c.is_whitespace();
                }
                out
            }
        }
    }
}

lazy_static! {
    pub static ref TEXT_CASE: EnumDefinition = EnumDefinition::new("TextCase", TextCase::VARIANTS)
        .unwrap_or_else(|e| panic!("invalid TextCase enumeration: {}", e));
    pub static ref FUNCTIONS: Vec<FunctionContract> = collect_contracts(vec![
        define_function! {
            PadLeft => {
                name: "pad_left",
                documentation: "`pad_left` pads text on the left until it is `width` characters long.",
                example: indoc! {r#"
                {{ pad_left("42", 5, "0") }}
                > 00042
                "#},
                inputs: [
                    text: {
                        documentation: "The text to pad.",
                        typing: Type::string()
                    },
                    width: {
                        documentation: "The minimum width of the result, in characters.",
                        typing: Type::integer()
                    },
                    fill: {
                        documentation: "The padding character. Defaults to a space.",
                        typing: Type::char(),
                        optional: true
                    }
                ],
                output: {
                    documentation: "The padded text.",
                    typing: Type::string()
                },
            }
        },
        define_function! {
            ChangeCase => {
                name: "change_case",
                documentation: "`change_case` converts text to `Upper`, `Lower` or `Title` case.",
                example: indoc! {r#"
                {{ change_case("hello world", "Title") }}
                > Hello World
                "#},
                inputs: [
                    text: {
                        documentation: "The text to convert.",
                        typing: Type::string()
                    },
                    case: {
                        documentation: "The target case, matched case-sensitively.",
                        typing: Type::enumeration(TEXT_CASE.clone())
                    }
                ],
                output: {
                    documentation: "The converted text.",
                    typing: Type::string()
                },
            }
        },
        define_function! {
            DefaultIfEmpty => {
                name: "default_if_empty",
                documentation: "`default_if_empty` returns `fallback` when `value` is null or blank. Extra arguments are ignored.",
                example: indoc! {r#"
                {{ default_if_empty(customer.nickname, "n/a") }}
                > n/a
                "#},
                inputs: [
                    value: {
                        documentation: "The text to check.",
                        typing: Type::nullable(Type::string())
                    },
                    fallback: {
                        documentation: "The text returned when `value` is null or blank.",
                        typing: Type::string()
                    }
                ],
                surplus: SurplusPolicy::Ignore,
                output: {
                    documentation: "`value`, or `fallback`.",
                    typing: Type::string()
                },
            }
        },
    ]);
}

pub struct PadLeft;
impl FunctionImplementation for PadLeft {
    fn run(
        _contract: &FunctionContract,
        _ctx: &ExecutionContext,
        args: &BoundArguments,
    ) -> Result<Value, Diagnostic> {
        let text = args.get_expected_string(0)?;
        let width = args.get_expected_integer(1)?;
        let fill = if args.is_provided(2) { args.get_expected_char(2)? } else { ' ' };
        if !(0..=MAX_PAD_WIDTH).contains(&width) {
            return Err(diagnosed_error!(
                "pad width must be between 0 and {}, got {}",
                MAX_PAD_WIDTH,
                width
            ));
        }
        let missing = (width as usize).saturating_sub(text.chars().count());
        let mut padded: String = std::iter::repeat(fill).take(missing).collect();
        padded.push_str(text);
        Ok(Value::string(padded))
    }
}

pub struct ChangeCase;
impl FunctionImplementation for ChangeCase {
    fn run(
        _contract: &FunctionContract,
        _ctx: &ExecutionContext,
        args: &BoundArguments,
    ) -> Result<Value, Diagnostic> {
        let text = args.get_expected_string(0)?;
        let member = args.get_expected_enum(1)?;
        let case = TextCase::from_str(&member.member)
            .map_err(|e| diagnosed_error!("unknown text case '{}': {}", member.member, e))?;
        Ok(Value::string(case.apply(text)))
    }
}

pub struct DefaultIfEmpty;
impl FunctionImplementation for DefaultIfEmpty {
    fn run(
        _contract: &FunctionContract,
        _ctx: &ExecutionContext,
        args: &BoundArguments,
    ) -> Result<Value, Diagnostic> {
        let fallback = args.get_expected_string(1)?;
        match args.get_expected_value(0)? {
            Value::String(value) if !value.trim().is_empty() => Ok(Value::string(value.as_str())),
            _ => Ok(Value::string(fallback)),
        }
    }
}
