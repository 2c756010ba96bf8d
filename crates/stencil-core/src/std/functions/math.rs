use kit::{
    define_function, indoc,
    types::{
        diagnostics::Diagnostic,
        functions::{BoundArguments, FunctionContract, FunctionImplementation, SurplusPolicy},
        types::{Type, Value},
        ExecutionContext,
    },
};

use rust_decimal::{Decimal, RoundingStrategy};

use super::collect_contracts;

/// Largest scale a decimal can carry.
const MAX_DECIMAL_PLACES: u8 = 28;

lazy_static! {
    pub static ref FUNCTIONS: Vec<FunctionContract> = collect_contracts(vec![
        define_function! {
            Round => {
                name: "round",
                documentation: "`round` rounds a number to a number of decimal places, sending midpoints to the even neighbour.",
                example: indoc! {r#"
                {{ round(order.total, 2) }}
                > 10.24
                "#},
                inputs: [
                    value: {
                        documentation: "The number to round.",
                        typing: Type::decimal()
                    },
                    places: {
                        documentation: "The number of decimal places to keep. Defaults to 0.",
                        typing: Type::byte(),
                        optional: true
                    }
                ],
                output: {
                    documentation: "The rounded number.",
                    typing: Type::decimal()
                },
            }
        },
        define_function! {
            Sum => {
                name: "sum",
                documentation: "`sum` adds up any number of numeric arguments.",
                example: indoc! {r#"
                {{ sum(1, "2.5", 3) }}
                > 6.5
                "#},
                inputs: [],
                surplus: SurplusPolicy::variadic("values", "The numbers to add.", Type::decimal()),
                output: {
                    documentation: "The total, or 0 when called without arguments.",
                    typing: Type::decimal()
                },
            }
        },
    ]);
}

pub struct Round;
impl FunctionImplementation for Round {
    fn run(
        _contract: &FunctionContract,
        _ctx: &ExecutionContext,
        args: &BoundArguments,
    ) -> Result<Value, Diagnostic> {
        let value = args.get_expected_decimal(0)?;
        let places = args.get_expected_byte(1)?;
        if places > MAX_DECIMAL_PLACES {
            return Err(diagnosed_error!(
                "cannot round to {} places, at most {} are supported",
                places,
                MAX_DECIMAL_PLACES
            ));
        }
        let rounded =
            value.round_dp_with_strategy(places as u32, RoundingStrategy::MidpointNearestEven);
        Ok(Value::decimal(rounded))
    }
}

pub struct Sum;
impl FunctionImplementation for Sum {
    fn run(
        _contract: &FunctionContract,
        _ctx: &ExecutionContext,
        args: &BoundArguments,
    ) -> Result<Value, Diagnostic> {
        let mut total = Decimal::ZERO;
        for (index, value) in args.rest().iter().enumerate() {
            let Some(operand) = value.as_decimal() else {
                return Err(diagnosed_error!(
                    "sum operand #{} expected to be a decimal, found {}",
                    index,
                    value.type_name()
                ));
            };
            total = total
                .checked_add(operand)
                .ok_or_else(|| diagnosed_error!("sum overflowed after operand #{}", index))?;
        }
        Ok(Value::decimal(total))
    }
}
