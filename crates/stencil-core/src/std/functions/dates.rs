use std::fmt::Write;

use chrono::format::{Item, StrftimeItems};
use chrono::TimeDelta;
use kit::{
    define_function, indoc,
    types::{
        diagnostics::Diagnostic,
        functions::{BoundArguments, FunctionContract, FunctionImplementation},
        types::{Type, Value},
        ExecutionContext,
    },
};

use super::collect_contracts;

const DEFAULT_DATE_FORMAT: &str = "%Y-%m-%d";

lazy_static! {
    pub static ref FUNCTIONS: Vec<FunctionContract> = collect_contracts(vec![
        define_function! {
            FormatDate => {
                name: "format_date",
                documentation: "`format_date` renders a date-time using a strftime-style format.",
                example: indoc! {r#"
                {{ format_date("2024-02-29T13:45:00", "%d %B %Y") }}
                > 29 February 2024
                "#},
                inputs: [
                    date: {
                        documentation: "The date-time to render.",
                        typing: Type::datetime()
                    },
                    format: {
                        documentation: "The format to render with. Defaults to `%Y-%m-%d`.",
                        typing: Type::string(),
                        optional: true
                    }
                ],
                output: {
                    documentation: "The rendered date-time.",
                    typing: Type::string()
                },
            }
        },
        define_function! {
            AddDays => {
                name: "add_days",
                documentation: "`add_days` shifts a date-time by a whole number of days.",
                example: indoc! {r#"
                {{ add_days("2024-02-28", 1) }}
                > 2024-02-29T00:00:00
                "#},
                inputs: [
                    date: {
                        documentation: "The date-time to shift.",
                        typing: Type::datetime()
                    },
                    days: {
                        documentation: "The number of days to add, negative to go back in time.",
                        typing: Type::integer()
                    }
                ],
                output: {
                    documentation: "The shifted date-time.",
                    typing: Type::datetime()
                },
            }
        },
    ]);
}

pub struct FormatDate;
impl FunctionImplementation for FormatDate {
    fn run(
        _contract: &FunctionContract,
        _ctx: &ExecutionContext,
        args: &BoundArguments,
    ) -> Result<Value, Diagnostic> {
        let date = args.get_expected_datetime(0)?;
        let format = match args.get_expected_string(1)? {
            "" => DEFAULT_DATE_FORMAT,
            format => format,
        };
        if StrftimeItems::new(format).any(|item| matches!(item, Item::Error)) {
            return Err(diagnosed_error!("invalid date format '{}'", format));
        }
        // offset items such as %z parse but cannot render without a timezone
        let mut rendered = String::new();
        write!(&mut rendered, "{}", date.format(format)).map_err(|_| {
            diagnosed_error!("invalid date format '{}': it needs a timezone offset", format)
        })?;
        Ok(Value::string(rendered))
    }
}

pub struct AddDays;
impl FunctionImplementation for AddDays {
    fn run(
        _contract: &FunctionContract,
        _ctx: &ExecutionContext,
        args: &BoundArguments,
    ) -> Result<Value, Diagnostic> {
        let date = args.get_expected_datetime(0)?;
        let days = args.get_expected_integer(1)?;
        TimeDelta::try_days(days)
            .and_then(|delta| date.checked_add_signed(delta))
            .map(Value::datetime)
            .ok_or_else(|| diagnosed_error!("adding {} days to {} is out of range", days, date))
    }
}
