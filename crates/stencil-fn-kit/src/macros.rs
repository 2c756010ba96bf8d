#[macro_export]
macro_rules! diagnosed_error {
    ($($arg:tt)*) => {{
        use $crate::types::diagnostics::Diagnostic;

        let res = format_args!($($arg)*).to_string();
        Diagnostic::error_from_string(res)
    }};
}

/// Declares a [`FunctionContract`](crate::types::functions::FunctionContract)
/// backed by a [`FunctionImplementation`](crate::types::functions::FunctionImplementation).
///
/// Inputs are required unless marked `optional: true`. Without a `surplus`
/// clause, surplus arguments are rejected. Expands to a
/// `Result<FunctionContract, ContractError>`.
#[macro_export]
macro_rules! define_function {
    ($func_key:ident => {
        name: $fn_name:expr,
        documentation: $doc:expr,
        example: $example:expr,
        inputs: [$($input_name:ident: { documentation: $input_doc:expr, typing: $input_ts:expr $(, optional: $input_opt:expr)? }),*],
        $(surplus: $surplus:expr,)?
        output: { documentation: $output_doc:expr, typing: $output_ts:expr },
    }) => {{
        use $crate::types::functions::{FunctionContract, FunctionImplementation};
        #[allow(unused_mut)]
        let mut contract = FunctionContract::new($fn_name, $doc, $func_key::run);
        $(
            contract = contract.and_then(|c| {
                #[allow(unused_mut, unused_assignments)]
                let mut is_required = true;
                $(
                    is_required = !$input_opt;
                )?
                c.define_parameter(stringify!($input_name), $input_doc, $input_ts, is_required)
            });
        )*
        $(
            contract = contract.and_then(|c| c.with_surplus($surplus));
        )?
        contract.map(|c| c.with_output($output_doc, $output_ts).with_example($example))
    }};
}
