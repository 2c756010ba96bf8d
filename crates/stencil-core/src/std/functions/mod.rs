pub mod dates;
pub mod env;
pub mod logic;
pub mod math;
pub mod text;

use kit::types::{function_errors::ContractError, functions::FunctionContract};

/// Contracts declared in this crate are static; a malformed one is a
/// programming error surfaced the first time the table is touched.
pub(crate) fn collect_contracts(
    contracts: Vec<Result<FunctionContract, ContractError>>,
) -> Vec<FunctionContract> {
    contracts
        .into_iter()
        .collect::<Result<Vec<_>, _>>()
        .unwrap_or_else(|e| panic!("invalid standard function contract: {}", e))
}

lazy_static! {
    pub static ref FUNCTIONS: Vec<FunctionContract> = {
        let mut functions = vec![];
        functions.extend(env::FUNCTIONS.clone());
        functions.extend(dates::FUNCTIONS.clone());
        functions.extend(text::FUNCTIONS.clone());
        functions.extend(math::FUNCTIONS.clone());
        functions.extend(logic::FUNCTIONS.clone());
        functions
    };
}

pub fn get_function(name: &str) -> Option<&'static FunctionContract> {
    FUNCTIONS.iter().find(|f| f.name() == name)
}
