use std::cell::RefCell;
use std::io::Write;
use std::sync::Once;

use apicheck_core::{Case, Hook, HookKind, Response, Session, Test, property, shape};
use apicheck_runner::{Collection, CollectionRunner, RequestSpec, Step, Transport, TransportError};
use serde_json::json;

static INIT: Once = Once::new();

fn init_logger() {
    INIT.call_once(|| {
        let _ = env_logger::builder()
            .is_test(true)
            .format(|buf, record| writeln!(buf, "{}: {}", record.level(), record.args()))
            .try_init();
    });
}

/// Minimal order service: login hands out a token, orders need it.
#[derive(Default)]
struct OrderService {
    log: RefCell<Vec<String>>,
}

impl Transport for OrderService {
    fn send(&self, request: &RequestSpec) -> Result<Response, TransportError> {
        self.log
            .borrow_mut()
            .push(format!("{} {}", request.method, request.url));
        let authorized = request.headers.get("Authorization").map(String::as_str)
            == Some("Bearer t-42");

        let response = match (request.method.as_str(), request.url.as_str()) {
            ("POST", "/login") => Response::new(200).with_body(r#"{"token":"t-42"}"#),
            (_, _) if !authorized => Response::new(401)
                .with_header("Content-Type", "application/problem+json")
                .with_body(r#"{"title":"Unauthorized","serviceCode":"AUTH_REQUIRED"}"#),
            ("GET", "/orders") => Response::new(200)
                .with_body(r#"[{"id":1,"status":"OPEN"},{"id":2,"status":"SHIPPED"}]"#),
            ("GET", "/orders/1") => Response::new(200)
                .with_body(r#"{"id":1,"status":"OPEN","customer":"ACME Corp"}"#),
            _ => Response::new(404)
                .with_body(r#"{"title":"Not Found","detail":"no such order"}"#),
        };
        Ok(response)
    }
}

fn authorized(name: &str, url: &str) -> RequestSpec {
    RequestSpec::get(name, url).with_header("Authorization", "Bearer {{token}}")
}

#[test]
fn order_collection_end_to_end() {
    init_logger();
    let service = OrderService::default();
    let mut session = Session::default();

    let mut collection = Collection::new()
        .step(
            Step::new(RequestSpec::post("Login", "/login")).tests(|resp, s| {
                s.positive(resp, Test::new());
                let token = resp.json()?["token"].clone();
                s.variables_mut().set("token", token);
                Ok(())
            }),
        )
        .step(
            Step::new(RequestSpec::get("Anonymous orders", "/orders")).tests(|resp, s| {
                s.negative(
                    resp,
                    Test::new().status(401).service_code_spec("serviceCode:AUTH_REQUIRED"),
                );
                Ok(())
            }),
        )
        .step(
            Step::new(authorized("List orders", "/orders"))
                .pre_request(|s| {
                    s.run_always(
                        HookKind::PreRequest,
                        Hook::new(|s| {
                            let token = s.variables().get_str("token").unwrap_or_default();
                            apicheck_core::ensure(!token.is_empty(), "no token")
                        }),
                    );
                    Ok(())
                })
                .tests(|resp, s| {
                    s.positive(
                        resp,
                        Test::new()
                            .suffix("two orders")
                            .validate(|r, _| shape::many(r, 2, 2)),
                    );
                    Ok(())
                }),
        )
        .step(
            Step::new(authorized("Get order", "/orders/1")).tests(|resp, s| {
                s.neutral(resp, Test::new().suffix("fields"), |r, _| {
                    let body = r.json()?;
                    property::exact(&body, "status", "open", Case::Insensitive)?;
                    property::partial(&body, "customer", "ACME", Case::Sensitive)?;
                    property::not_exist(&body, "deletedAt")
                });
                Ok(())
            }),
        )
        .step(
            Step::new(authorized("Missing order", "/orders/9")).tests(|resp, s| {
                let result = s.positive(resp, Test::new());
                s.stop_if(!result.passed);
                Ok(())
            }),
        )
        .step(Step::new(authorized("Never sent", "/orders")));

    let report = CollectionRunner::new(&service)
        .run(&mut collection, &mut session)
        .unwrap();

    assert_eq!(
        service.log.borrow().as_slice(),
        ["POST /login", "GET /orders", "GET /orders", "GET /orders/1", "GET /orders/9"]
    );
    assert!(report.stopped_early);
    assert_eq!(report.total_tests, 5);
    assert_eq!(report.failed_tests, 1);

    let failure = &report.steps[4].tests[0];
    assert_eq!(failure.name, "Missing order");
    assert_eq!(
        failure.message.as_deref(),
        Some("Expected status 200 but got 404: no such order")
    );

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(
        json["steps"][1]["tests"][0],
        json!({"name": "Anonymous orders", "passed": true})
    );
    assert_eq!(json["steps"][2]["tests"][0]["name"], "List orders - two orders");
}
