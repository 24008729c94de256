use eveapi::binder::{self, CallArgs, EndpointSpec, ParamDefault, ParamSource, ParamSpec};
use eveapi::{ArgumentError, Error, ParamValue};

use crate::common::test_helpers::{TestApi, param, success_body};

static STARBASE_DETAIL: EndpointSpec = EndpointSpec {
    path: "corp/StarbaseDetail",
    params: &[
        ParamSpec::required("starbase_id"),
        ParamSpec::with_default("version", ParamDefault::Int(2)),
        ParamSpec::with_default("flavour", ParamDefault::Str("full")),
    ],
    map_params: &[
        ("starbase_id", "itemID"),
        ("version", "version"),
        ("flavour", "flavour"),
        ("owner", "ownerID"),
    ],
    prop_to_param: &["owner"],
};

struct Owner(i64);

impl ParamSource for Owner {
    fn param(&self, name: &str) -> Option<ParamValue> {
        (name == "owner").then_some(ParamValue::Int(self.0))
    }
}

#[test]
fn test_defaults_and_keywords() {
    let params = binder::bind(
        &STARBASE_DETAIL,
        &Owner(7),
        CallArgs::new().arg(100i64).kwarg("flavour", "lite"),
    )
    .unwrap();

    assert_eq!(
        params.normalize().unwrap(),
        vec![
            ("flavour".to_string(), "lite".to_string()),
            ("itemID".to_string(), "100".to_string()),
            ("ownerID".to_string(), "7".to_string()),
            ("version".to_string(), "2".to_string()),
        ]
    );
}

#[test]
fn test_keyword_only_call() {
    let params = binder::bind(
        &STARBASE_DETAIL,
        &Owner(7),
        CallArgs::new().kwarg("starbase_id", 5i64),
    )
    .unwrap();
    assert_eq!(params.get("itemID"), Some(&ParamValue::Int(5)));
}

#[test]
fn test_property_is_not_a_caller_keyword() {
    let result = binder::bind(
        &STARBASE_DETAIL,
        &Owner(7),
        CallArgs::new().arg(1i64).kwarg("owner", 99i64),
    );
    assert!(matches!(
        result,
        Err(Error::Argument(ArgumentError::UnexpectedKeyword { .. }))
    ));
}

#[test]
fn test_call_sends_bound_parameters() {
    let harness = TestApi::new();
    harness
        .transport
        .respond("corp/StarbaseDetail", success_body("<state>4</state>"));

    let state = binder::call(
        &harness.api,
        &STARBASE_DETAIL,
        &Owner(7),
        CallArgs::positional([ParamValue::Int(100), ParamValue::None]),
        None,
        |env| Ok(env.map(|r| r.child_text("state").map(str::to_string))),
    )
    .unwrap();
    assert_eq!(state.result.as_deref(), Some("4"));

    let request = harness.transport.only_request();
    // An explicit `None` drops the parameter even though it has a default
    assert_eq!(param(&request.params, "version"), None);
    assert_eq!(param(&request.params, "itemID"), Some("100"));
    assert_eq!(param(&request.params, "flavour"), Some("full"));
}

#[test]
fn test_argument_errors_do_not_reach_network() {
    let harness = TestApi::new();
    let result = binder::call(
        &harness.api,
        &STARBASE_DETAIL,
        &Owner(7),
        CallArgs::new(),
        None,
        Ok,
    );
    assert!(matches!(
        result,
        Err(Error::Argument(ArgumentError::MissingArgument { .. }))
    ));
    assert_eq!(harness.transport.request_count(), 0);
}
