use std::sync::Arc;
use std::thread;

use chrono::NaiveDate;
use indexmap::IndexMap;
use rust_decimal::Decimal;
use test_case::test_case;

use super::conversion::{ConversionErrorKind, ValueConverter};
use super::diagnostics::Diagnostic;
use super::function_errors::{ContractError, FunctionError};
use super::functions::{
    BoundArguments, FunctionContract, FunctionImplementation, FunctionInvoker, SurplusPolicy,
};
use super::stores::EnvironmentStore;
use super::types::{EnumDefinition, ObjectClass, Type, Value};
use super::{CancellationToken, ExecutionContext};

lazy_static::lazy_static! {
    static ref SORT_ORDER: EnumDefinition =
        EnumDefinition::new("SortOrder", &["Ascending", "Descending", "Unsorted"]).unwrap();
}

fn sort_order() -> Type {
    Type::enumeration(SORT_ORDER.clone())
}

#[test_case(Value::string("Test"), Type::string())]
#[test_case(Value::integer(-10), Type::integer())]
#[test_case(Value::float(1.25), Type::float())]
#[test_case(Value::decimal(Decimal::new(1999, 2)), Type::decimal())]
#[test_case(Value::bool(true), Type::bool())]
#[test_case(Value::char('x'), Type::char())]
#[test_case(Value::byte(255), Type::byte())]
#[test_case(Value::datetime(NaiveDate::from_ymd_opt(2020, 1, 2).unwrap().and_hms_opt(3, 4, 5).unwrap()), Type::datetime())]
#[test_case(Value::Enum(SORT_ORDER.member("Descending").unwrap()), sort_order())]
#[test_case(Value::object(ObjectClass::new("Grid"), IndexMap::new()), Type::object("Grid"))]
fn it_passes_values_of_the_destination_type_through(value: Value, destination: Type) {
    assert_eq!(ValueConverter::convert(&value, &destination), Ok(value));
}

#[test_case(Type::string(), Value::string(""))]
#[test_case(Type::integer(), Value::integer(0))]
#[test_case(Type::float(), Value::float(0.0))]
#[test_case(Type::decimal(), Value::decimal(Decimal::ZERO))]
#[test_case(Type::bool(), Value::bool(false))]
#[test_case(Type::char(), Value::char('\0'))]
#[test_case(Type::byte(), Value::byte(0))]
#[test_case(Type::datetime(), Value::datetime(Default::default()))]
#[test_case(sort_order(), Value::Enum(SORT_ORDER.member("Ascending").unwrap()))]
#[test_case(Type::nullable(Type::integer()), Value::null())]
#[test_case(Type::object("Grid"), Value::null())]
#[test_case(Type::any(), Value::null())]
fn it_resolves_null_to_the_type_default(destination: Type, expected: Value) {
    assert_eq!(ValueConverter::convert(&Value::null(), &destination), Ok(expected));
}

#[test]
fn it_parses_numeric_text() {
    assert_eq!(ValueConverter::convert(&Value::string("123"), &Type::integer()), Ok(Value::integer(123)));

    let err = ValueConverter::convert(&Value::string("123.5"), &Type::integer()).unwrap_err();
    assert_eq!(err.kind, ConversionErrorKind::ParseFailure);
    assert_eq!(err.value, Value::string("123.5"));
    assert_eq!(err.destination, Type::integer());
}

#[test_case("true", true)]
#[test_case("TRUE", true)]
#[test_case("False", false)]
#[test_case(" false ", false)]
fn it_parses_bools_case_insensitively(text: &str, expected: bool) {
    assert_eq!(ValueConverter::convert(&Value::string(text), &Type::bool()), Ok(Value::bool(expected)));
}

#[test]
fn it_rejects_non_canonical_bool_tokens() {
    let err = ValueConverter::convert(&Value::string("yes"), &Type::bool()).unwrap_err();
    assert_eq!(err.kind, ConversionErrorKind::ParseFailure);
}

#[test_case(""; "empty")]
#[test_case("   "; "whitespace only")]
fn it_maps_blank_text_to_null_for_nullable_destinations(text: &str) {
    let nullable = Type::nullable(Type::decimal());
    assert_eq!(ValueConverter::convert(&Value::string(text), &nullable), Ok(Value::null()));

    let err = ValueConverter::convert(&Value::string(text), &Type::decimal()).unwrap_err();
    assert_eq!(err.kind, ConversionErrorKind::ParseFailure);
}

#[test]
fn it_unwraps_nullable_destinations_before_converting() {
    let nullable = Type::nullable(Type::decimal());
    assert_eq!(
        ValueConverter::convert(&Value::string("12.50"), &nullable),
        Ok(Value::decimal(Decimal::new(1250, 2)))
    );
    assert_eq!(ValueConverter::convert(&Value::integer(4), &nullable), Ok(Value::decimal(4.into())));

    let err = ValueConverter::convert(&Value::string("abc"), &nullable).unwrap_err();
    assert_eq!(err.kind, ConversionErrorKind::ParseFailure);
    assert_eq!(err.destination, Type::decimal());
}

#[test]
fn it_round_trips_every_enum_member() {
    for member in SORT_ORDER.members() {
        let converted = ValueConverter::convert(&Value::string(member.as_str()), &sort_order());
        assert_eq!(converted, Ok(Value::Enum(SORT_ORDER.member(member).unwrap())));
    }
}

#[test]
fn it_matches_enum_members_case_sensitively() {
    let err = ValueConverter::convert(&Value::string("ascending"), &sort_order()).unwrap_err();
    assert_eq!(err.kind, ConversionErrorKind::ParseFailure);
    assert_eq!(err.to_string(), "unable to parse 'ascending' as enum(SortOrder)");
}

#[test]
fn it_parses_single_characters() {
    assert_eq!(ValueConverter::convert(&Value::string("é"), &Type::char()), Ok(Value::char('é')));
    assert_eq!(ValueConverter::convert(&Value::string(" "), &Type::char()), Ok(Value::char(' ')));
    let err = ValueConverter::convert(&Value::string("ab"), &Type::char()).unwrap_err();
    assert_eq!(err.kind, ConversionErrorKind::ParseFailure);
}

#[test]
fn it_keeps_whitespace_characters_for_nullable_chars() {
    let nullable = Type::nullable(Type::char());
    assert_eq!(ValueConverter::convert(&Value::string(" "), &nullable), Ok(Value::char(' ')));
    assert_eq!(ValueConverter::convert(&Value::string("\t"), &nullable), Ok(Value::char('\t')));
    assert_eq!(ValueConverter::convert(&Value::string(""), &nullable), Ok(Value::null()));
    assert_eq!(ValueConverter::convert(&Value::string("  "), &nullable), Ok(Value::null()));
}

#[test]
fn it_parses_bytes_within_range() {
    assert_eq!(ValueConverter::convert(&Value::string("200"), &Type::byte()), Ok(Value::byte(200)));
    let err = ValueConverter::convert(&Value::string("256"), &Type::byte()).unwrap_err();
    assert_eq!(err.kind, ConversionErrorKind::ParseFailure);
}

#[test]
fn it_parses_calendar_dates() {
    let expected = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap().and_hms_opt(0, 0, 0).unwrap();
    assert_eq!(
        ValueConverter::convert(&Value::string("2024-02-29"), &Type::datetime()),
        Ok(Value::datetime(expected))
    );
    let err = ValueConverter::convert(&Value::string("2023-02-29"), &Type::datetime()).unwrap_err();
    assert_eq!(err.kind, ConversionErrorKind::ParseFailure);
}

#[test]
fn it_never_narrows_objects() {
    let grid = Value::object(ObjectClass::new("Grid"), IndexMap::new());
    let err = ValueConverter::convert(&grid, &Type::object("CsvGrid")).unwrap_err();
    assert_eq!(err.kind, ConversionErrorKind::Unconvertible);

    let csv = Value::object(ObjectClass::new("Grid").derive("CsvGrid"), IndexMap::new());
    assert_eq!(ValueConverter::convert(&csv, &Type::object("Grid")), Ok(csv.clone()));
}

#[test]
fn it_reports_pairs_without_a_rule_as_unconvertible() {
    let date = Value::datetime(Default::default());
    let err = ValueConverter::convert(&date, &Type::integer()).unwrap_err();
    assert_eq!(err.kind, ConversionErrorKind::Unconvertible);
    assert_eq!(err.value, date);
}

#[test]
fn it_converts_values_to_text() {
    assert_eq!(ValueConverter::convert(&Value::integer(42), &Type::string()), Ok(Value::string("42")));
    assert_eq!(ValueConverter::convert(&Value::bool(true), &Type::string()), Ok(Value::string("true")));
    assert_eq!(
        ValueConverter::convert(&Value::Enum(SORT_ORDER.member("Unsorted").unwrap()), &Type::string()),
        Ok(Value::string("Unsorted"))
    );
}

#[test]
fn it_is_usable_from_many_threads() {
    let handles: Vec<_> = (0..8)
        .map(|i| {
            thread::spawn(move || {
                ValueConverter::convert(&Value::string(i.to_string()), &Type::integer())
            })
        })
        .collect();
    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join().unwrap(), Ok(Value::integer(i as i64)));
    }
}

pub struct Concat;
impl FunctionImplementation for Concat {
    fn run(
        _contract: &FunctionContract,
        _ctx: &ExecutionContext,
        args: &BoundArguments,
    ) -> Result<Value, Diagnostic> {
        let mut out = String::new();
        for value in args.values().iter().chain(args.rest()) {
            out.push_str(&value.to_string());
        }
        Ok(Value::string(out))
    }
}

pub struct Nothing;
impl FunctionImplementation for Nothing {
    fn run(
        _contract: &FunctionContract,
        _ctx: &ExecutionContext,
        _args: &BoundArguments,
    ) -> Result<Value, Diagnostic> {
        Ok(Value::null())
    }
}

pub struct Failing;
impl FunctionImplementation for Failing {
    fn run(
        _contract: &FunctionContract,
        _ctx: &ExecutionContext,
        _args: &BoundArguments,
    ) -> Result<Value, Diagnostic> {
        Err(Diagnostic::error("query failed"))
    }
}

pub struct Cancelled;
impl FunctionImplementation for Cancelled {
    fn run(
        _contract: &FunctionContract,
        ctx: &ExecutionContext,
        _args: &BoundArguments,
    ) -> Result<Value, Diagnostic> {
        Ok(Value::bool(ctx.is_cancelled()))
    }
}

fn two_required() -> FunctionContract {
    FunctionContract::new("pair", "Joins two values.", Concat::run)
        .and_then(|c| c.define_parameter("A", "first", Type::string(), true))
        .and_then(|c| c.define_parameter("B", "second", Type::integer(), true))
        .unwrap()
}

#[test]
fn it_reports_the_missing_required_parameter() {
    let contract = two_required();
    let invoker = FunctionInvoker::new();
    let ctx = ExecutionContext::new();

    let first = invoker.invoke(&contract, &[Value::string("a")], &ctx);
    let expected = Err(FunctionError::MissingParameter {
        function: "pair".into(),
        position: 1,
        name: "B".into(),
    });
    assert_eq!(first, expected);

    // no hidden state between calls
    let second = invoker.invoke(&contract, &[Value::string("a")], &ctx);
    assert_eq!(first, second);
}

#[test]
fn it_binds_and_delegates() {
    let contract = two_required();
    let result = FunctionInvoker::new().invoke(
        &contract,
        &[Value::string("a"), Value::string("7")],
        &ExecutionContext::new(),
    );
    assert_eq!(result, Ok(Value::string("a7")));
}

#[test]
fn it_fails_fast_on_the_first_conversion_error() {
    let contract = two_required();
    let err = FunctionInvoker::new()
        .bind(&contract, &[Value::string("a"), Value::string("seven")])
        .unwrap_err();
    match err {
        FunctionError::Conversion { position, name, source, .. } => {
            assert_eq!(position, 1);
            assert_eq!(name, "B");
            assert_eq!(source.kind, ConversionErrorKind::ParseFailure);
        }
        other => panic!("unexpected error {other:?}"),
    }
}

#[test]
fn it_fills_absent_optional_parameters_with_defaults() {
    let contract = FunctionContract::new("opt", "", Concat::run)
        .and_then(|c| c.define_parameter("text", "", Type::string(), true))
        .and_then(|c| c.define_parameter("count", "", Type::integer(), false))
        .and_then(|c| c.define_parameter("label", "", Type::nullable(Type::string()), false))
        .unwrap();
    let bound = FunctionInvoker::new().bind(&contract, &[Value::string("x")]).unwrap();
    assert_eq!(bound.values(), &[Value::string("x"), Value::integer(0), Value::null()]);
    assert_eq!(bound.provided(), 1);
    assert!(bound.is_provided(0));
    assert!(!bound.is_provided(1));
}

#[test]
fn it_finds_required_parameters_declared_after_optional_ones() {
    let contract = FunctionContract::new("odd", "", Concat::run)
        .and_then(|c| c.define_parameter("prefix", "", Type::string(), false))
        .and_then(|c| c.define_parameter("body", "", Type::string(), true))
        .unwrap();
    let err = FunctionInvoker::new().bind(&contract, &[]).unwrap_err();
    assert_eq!(
        err,
        FunctionError::MissingParameter { function: "odd".into(), position: 1, name: "body".into() }
    );
}

#[test_case(SurplusPolicy::Reject, Err(FunctionError::SurplusArguments { function: "pair".into(), expected: 2, provided: 3 }); "reject")]
#[test_case(SurplusPolicy::Ignore, Ok(Value::string("a1")); "ignore")]
#[test_case(SurplusPolicy::variadic("more", "", Type::string()), Ok(Value::string("a1not a number")); "variadic")]
fn it_applies_the_surplus_policy(policy: SurplusPolicy, expected: Result<Value, FunctionError>) {
    let contract = two_required().with_surplus(policy).unwrap();
    let result = FunctionInvoker::new().invoke(
        &contract,
        &[Value::string("a"), Value::integer(1), Value::string("not a number")],
        &ExecutionContext::new(),
    );
    assert_eq!(result, expected);
}

#[test]
fn it_converts_each_variadic_argument() {
    let contract = FunctionContract::new("ints", "", Concat::run)
        .and_then(|c| c.with_surplus(SurplusPolicy::variadic("values", "", Type::integer())))
        .unwrap();
    let invoker = FunctionInvoker::new();
    let bound = invoker.bind(&contract, &[Value::string("1"), Value::float(2.0)]).unwrap();
    assert_eq!(bound.rest(), &[Value::integer(1), Value::integer(2)]);

    let err = invoker.bind(&contract, &[Value::string("1"), Value::string("x")]).unwrap_err();
    assert!(matches!(err, FunctionError::Conversion { position: 1, .. }));
    assert_eq!(contract.arity(), (0, None));
}

#[test]
fn it_returns_null_results_unchanged() {
    let contract = FunctionContract::new("nothing", "", Nothing::run).unwrap();
    let result = FunctionInvoker::new().invoke(&contract, &[], &ExecutionContext::new());
    assert_eq!(result, Ok(Value::null()));
}

#[test]
fn it_passes_implementation_errors_through() {
    let contract = FunctionContract::new("query", "", Failing::run).unwrap();
    let err = FunctionInvoker::new().invoke(&contract, &[], &ExecutionContext::new()).unwrap_err();
    assert!(!err.is_binding_error());
    assert_eq!(
        err,
        FunctionError::Implementation {
            function: "query".into(),
            diagnostic: Diagnostic::error("query failed")
        }
    );
}

#[test]
fn it_hands_the_context_to_the_implementation() {
    let contract = FunctionContract::new("cancelled", "", Cancelled::run).unwrap();
    let token = CancellationToken::new();
    let ctx = ExecutionContext::new()
        .with_cancellation(token.clone())
        .with_environment(Arc::new(EnvironmentStore::new()));
    let invoker = FunctionInvoker::new();

    assert_eq!(invoker.invoke(&contract, &[], &ctx), Ok(Value::bool(false)));
    token.cancel();
    assert_eq!(invoker.invoke(&contract, &[], &ctx), Ok(Value::bool(true)));
}

#[test]
fn it_rejects_duplicate_parameter_names() {
    let err = FunctionContract::new("dup", "", Concat::run)
        .and_then(|c| c.define_parameter("x", "", Type::string(), true))
        .and_then(|c| c.define_parameter("x", "", Type::integer(), false))
        .unwrap_err();
    assert_eq!(err, ContractError::DuplicateParameter { function: "dup".into(), name: "x".into() });

    let err = FunctionContract::new("dup", "", Concat::run)
        .and_then(|c| c.define_parameter("x", "", Type::string(), true))
        .and_then(|c| c.with_surplus(SurplusPolicy::variadic("x", "", Type::any())))
        .unwrap_err();
    assert!(matches!(err, ContractError::DuplicateParameter { .. }));

    // names are case-sensitive
    assert!(FunctionContract::new("dup", "", Concat::run)
        .and_then(|c| c.define_parameter("x", "", Type::string(), true))
        .and_then(|c| c.define_parameter("X", "", Type::string(), true))
        .is_ok());
}

#[test]
fn it_rejects_missing_names() {
    assert_eq!(
        FunctionContract::new("", "", Concat::run).unwrap_err(),
        ContractError::NullArgument("function name")
    );
    let err = FunctionContract::new("f", "", Concat::run)
        .and_then(|c| c.define_parameter("", "", Type::string(), true))
        .unwrap_err();
    assert_eq!(err, ContractError::NullArgument("parameter name"));
    assert!(matches!(
        EnumDefinition::new::<&str>("Empty", &[]),
        Err(ContractError::EmptyEnum { .. })
    ));
    assert!(matches!(
        EnumDefinition::new("Twice", &["A", "A"]),
        Err(ContractError::DuplicateEnumMember { .. })
    ));
}

#[test]
fn it_shares_contracts_across_threads() {
    let contract = Arc::new(two_required());
    let handles: Vec<_> = (0..4)
        .map(|i| {
            let contract = contract.clone();
            thread::spawn(move || {
                FunctionInvoker::new().invoke(
                    &contract,
                    &[Value::string("n"), Value::integer(i)],
                    &ExecutionContext::new(),
                )
            })
        })
        .collect();
    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join().unwrap(), Ok(Value::string(format!("n{}", i))));
    }
}

#[test]
fn it_describes_contracts() {
    let contract = two_required().with_output("The joined text.", Type::string());
    let description = contract.describe();
    assert_eq!(description["name"], "pair");
    assert_eq!(description["parameters"][1]["typing"], "integer");
    assert_eq!(description["parameters"][1]["required"], true);
    assert_eq!(description["surplus"]["policy"], "reject");
    assert_eq!(description["arity"]["max"], 2);
}

#[test]
fn it_serdes_type_tags() {
    for tag in ["string", "nullable(decimal)", "object(Grid)", "any", "byte"] {
        let typing = Type::try_from(tag).unwrap();
        assert_eq!(typing.to_string(), tag);
        let json = serde_json::to_string(&typing).unwrap();
        let back: Type = serde_json::from_str(&json).unwrap();
        assert_eq!(back, typing);
    }
    assert!(Type::try_from("enum(SortOrder)").is_err());
    assert!(Type::try_from("strin").is_err());
}

#[test]
fn it_deserializes_surplus_policies() {
    let policy: SurplusPolicy = serde_json::from_str(
        r#"{"policy":"variadic","name":"values","documentation":"","typing":"nullable(integer)"}"#,
    )
    .unwrap();
    assert_eq!(policy, SurplusPolicy::variadic("values", "", Type::nullable(Type::integer())));
    let policy: SurplusPolicy = serde_json::from_str(r#"{"policy":"ignore"}"#).unwrap();
    assert_eq!(policy, SurplusPolicy::Ignore);
}
