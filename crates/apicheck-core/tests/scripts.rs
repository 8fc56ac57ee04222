//! Scripts written the way collection authors use the helpers

use apicheck_core::{
    Case, CheckError, Config, Hook, HookKind, MemorySink, NextStep, Response, Session, Test,
    TraceLevel, property, shape,
};
use serde_json::json;

fn session(config: Config) -> (Session, MemorySink) {
    let sink = MemorySink::new();
    (Session::new(config).with_sink(sink.clone()), sink)
}

#[test]
fn folder_setup_then_positive_checks() {
    let (mut session, _) = session(Config::default());

    for request in ["List orders", "Get order"] {
        session.set_request_name(request);
        let passed = session.run_once(
            "orders-folder",
            Hook::new(|s| {
                s.variables_mut().set("customerId", "c-1");
                Ok(())
            }),
        );
        assert!(passed);
    }

    let list = Response::new(200)
        .with_body(r#"[{"id":1,"customerId":"c-1"},{"id":2,"customerId":"c-1"}]"#);
    session.set_request_name("List orders");
    let listed = session.positive(
        &list,
        Test::new().validate(|resp, _| shape::many(resp, 1, 10)),
    );
    assert!(listed.passed);

    let one = Response::new(200).with_body(r#"{"id":1,"customerId":"c-1","status":"OPEN"}"#);
    session.set_request_name("Get order");
    let got = session.positive(
        &one,
        Test::new().validate(|resp, s| {
            shape::one(resp)?;
            let body = resp.json()?;
            let customer = s.variables().get("customerId").cloned();
            property::equal(&body, "customerId", customer.as_ref())?;
            property::exact(&body, "status", "open", Case::Insensitive)?;
            property::not_exist(&body, "deletedAt")
        }),
    );
    assert!(got.passed, "{:?}", got.message);
    assert_eq!(session.results().len(), 2);
}

#[test]
fn negative_with_configured_property_and_status() {
    let config = Config {
        negative_status: 422,
        service_code_property: "errorCode".into(),
        ..Config::default()
    };
    let (mut session, _) = session(config);
    session.set_request_name("Create order without items");

    let body = json!({
        "type": "about:blank",
        "title": "Unprocessable",
        "detail": "items must not be empty",
        "errorCode": "ORDER_EMPTY"
    });
    let resp = Response::new(422).with_body(body.to_string());
    let result = session.negative(&resp, Test::new().service_value("ORDER_EMPTY"));
    assert!(result.passed);

    let result = session.negative(&resp, Test::new().service_value("ORDER_LIMIT"));
    assert_eq!(
        result.message.as_deref(),
        Some("Expected errorCode to be 'ORDER_LIMIT' but got 'ORDER_EMPTY'")
    );
}

#[test]
fn failing_check_stops_run_from_error_callback() {
    let (mut session, sink) = session(Config::default());
    session.set_request_name("Login");

    let result = session.positive(
        &Response::new(401).with_body(r#"{"title":"Unauthorized"}"#),
        Test::new().on_error(|_, s| {
            s.stop();
            Ok(())
        }),
    );

    assert_eq!(
        result.message.as_deref(),
        Some("Expected status 200 but got 401: Unauthorized")
    );
    assert_eq!(session.next_step(), &NextStep::Stop);
    assert!(sink.contains("Stopping run after Login"));
}

#[test]
fn pre_request_hook_and_trace_levels() {
    let (mut session, sink) = session(Config::default());
    session.set_request_name("Search");
    session.trace().set_minimal();

    session.run_always(
        HookKind::PreRequest,
        Hook::new(|s| {
            s.log("building query", TraceLevel::MINIMAL);
            s.log("query detail", TraceLevel::DEFAULT);
            Ok(())
        }),
    );

    assert_eq!(sink.lines(), vec!["building query".to_string()]);
}

#[test]
fn neutral_groups_independent_assertions() {
    let (mut session, _) = session(Config::default());
    session.set_request_name("Get profile");
    let resp = Response::new(200)
        .with_header("Content-Type", "application/json")
        .with_body(r#"{"email":"ada@example.com"}"#);

    let header = session.neutral(&resp, Test::new().suffix("content type"), |resp, _| {
        match resp.header("content-type") {
            Some(ct) if ct.starts_with("application/json") => Ok(()),
            other => Err(CheckError::custom(format!(
                "Expected JSON content type but got {other:?}"
            ))),
        }
    });
    let email = session.neutral(&resp, Test::new().suffix("email"), |resp, _| {
        property::matches(&resp.json()?, "email", r"^[^@]+@example\.com$", Case::Sensitive)
    });

    assert!(header.passed);
    assert!(email.passed);
    assert_eq!(email.name, "Get profile - email");
}

#[test]
fn schema_check_inside_positive() {
    let (mut session, _) = session(Config::default());
    let schema = json!({
        "type": "array",
        "items": { "type": "object", "required": ["id"] }
    });
    let resp = Response::new(200).with_body(r#"[{"id":1},{"name":"x"}]"#);

    let result = session.positive(
        &resp,
        Test::named("List schema").validate(|resp, _| shape::schema(resp, &schema)),
    );
    assert!(!result.passed);
    assert!(result.message.unwrap().contains("does not match schema"));
}
