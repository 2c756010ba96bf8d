use kit::{
    define_function, indoc,
    types::{
        diagnostics::Diagnostic,
        functions::{BoundArguments, FunctionContract, FunctionImplementation, SurplusPolicy},
        types::{Type, Value},
        ExecutionContext,
    },
};

use super::collect_contracts;

lazy_static! {
    pub static ref FUNCTIONS: Vec<FunctionContract> = collect_contracts(vec![
        define_function! {
            IfElse => {
                name: "if_else",
                documentation: "`if_else` returns `then` when `condition` holds and `otherwise` when it does not.",
                example: indoc! {r#"
                {{ if_else(order.paid, "Paid", "Due") }}
                > Paid
                "#},
                inputs: [
                    condition: {
                        documentation: "The condition to test.",
                        typing: Type::bool()
                    },
                    then: {
                        documentation: "The value returned when the condition holds.",
                        typing: Type::any()
                    },
                    otherwise: {
                        documentation: "The value returned when the condition does not hold. Defaults to null.",
                        typing: Type::any(),
                        optional: true
                    }
                ],
                output: {
                    documentation: "One of the two branches, unchanged.",
                    typing: Type::any()
                },
            }
        },
        define_function! {
            Coalesce => {
                name: "coalesce",
                documentation: "`coalesce` returns the first of its arguments that is not null.",
                example: indoc! {r#"
                {{ coalesce(customer.nickname, customer.name, "guest") }}
                > Ada
                "#},
                inputs: [],
                surplus: SurplusPolicy::variadic("candidates", "The values to pick from, in order.", Type::any()),
                output: {
                    documentation: "The first non-null argument, or null.",
                    typing: Type::any()
                },
            }
        },
    ]);
}

pub struct IfElse;
impl FunctionImplementation for IfElse {
    fn run(
        _contract: &FunctionContract,
        _ctx: &ExecutionContext,
        args: &BoundArguments,
    ) -> Result<Value, Diagnostic> {
        let branch = if args.get_expected_bool(0)? { 1 } else { 2 };
        Ok(args.get_expected_value(branch)?.clone())
    }
}

pub struct Coalesce;
impl FunctionImplementation for Coalesce {
    fn run(
        _contract: &FunctionContract,
        _ctx: &ExecutionContext,
        args: &BoundArguments,
    ) -> Result<Value, Diagnostic> {
        Ok(args.rest().iter().find(|v| !v.is_null()).cloned().unwrap_or(Value::Null))
    }
}
