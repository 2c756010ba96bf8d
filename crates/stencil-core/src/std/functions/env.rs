use kit::{
    define_function, indoc,
    types::{
        diagnostics::Diagnostic,
        functions::{BoundArguments, FunctionContract, FunctionImplementation},
        types::{Type, Value},
        ExecutionContext,
    },
};

use log::debug;

use super::collect_contracts;

lazy_static! {
    pub static ref FUNCTIONS: Vec<FunctionContract> = collect_contracts(vec![define_function! {
        EnvLookup => {
            name: "env",
            documentation: "`env` returns an entry of the environment store attached to the current render.",
            example: indoc! {r#"
            {{ env("DEPLOY_TARGET", "staging") }}
            > production
            "#},
            inputs: [
                name: {
                    documentation: "The name of the entry to look up.",
                    typing: Type::string()
                },
                default: {
                    documentation: "The value returned when the entry is missing.",
                    typing: Type::nullable(Type::string()),
                    optional: true
                }
            ],
            output: {
                documentation: "The entry, the default when the entry is missing, or null.",
                typing: Type::nullable(Type::string())
            },
        }
    }]);
}

pub struct EnvLookup;
impl FunctionImplementation for EnvLookup {
    fn run(
        _contract: &FunctionContract,
        ctx: &ExecutionContext,
        args: &BoundArguments,
    ) -> Result<Value, Diagnostic> {
        let Some(store) = ctx.environment() else {
            return Err(diagnosed_error!("no environment store is attached to this render"));
        };
        let name = args.get_expected_string(0)?;
        match store.get(name) {
            Some(value) => Ok(Value::string(value)),
            None => {
                debug!("environment entry '{}' is not set, using the default", name);
                Ok(args.get_expected_value(1)?.clone())
            }
        }
    }
}
