//! End-to-end routing behavior: registration, dispatch, conversion,
//! middleware ordering and reverse resolution.

use http::Method;
use micro_router::router::{any, get, on, post};
use micro_router::{
    ConvertError, Converter, DispatchOutcome, Next, NoReverseMatch, PathValue, Request, Response, Router, handler_fn,
    middleware_fn,
};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

fn dispatch(router: &Router, method: Method, path: &str) -> (DispatchOutcome, Request, Response) {
    let mut req = Request::new(method, path.parse().unwrap());
    let mut resp = Response::new();
    let outcome = router.dispatch(&mut req, &mut resp).unwrap();
    (outcome, req, resp)
}

#[test]
fn typed_arguments_reach_the_handler() {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let seen_in_handler = Arc::clone(&seen);

    let router = Router::builder()
        .route(
            "/hello/<name>/<int:age>/",
            get(handler_fn(move |_req: &mut Request, resp: &mut Response, name: String, age: i64| {
                seen_in_handler.lock().unwrap().push((name.clone(), age));
                resp.write(format!("hello {name}"));
            })),
        )
        .build()
        .unwrap();

    let (outcome, _, resp) = dispatch(&router, Method::GET, "/hello/Sam/30/");

    assert_eq!(outcome, DispatchOutcome::Handled);
    assert_eq!(resp.body(), b"hello Sam");
    assert_eq!(seen.lock().unwrap().as_slice(), [("Sam".to_string(), 30)]);
}

#[test]
fn registration_order_beats_specificity() {
    let fired = Arc::new(Mutex::new(Vec::new()));
    let tag = |label: &'static str, log: &Arc<Mutex<Vec<&'static str>>>| {
        let log = Arc::clone(log);
        move |_req: &mut Request, _resp: &mut Response, _model: String, _make: i64| {
            log.lock().unwrap().push(label);
        }
    };

    let single = {
        let log = Arc::clone(&fired);
        move |_req: &mut Request, _resp: &mut Response, _value: i64| {
            log.lock().unwrap().push("single");
        }
    };

    let router = Router::builder()
        .route("/make/<string:model>/model/<int:make>/", get(handler_fn(tag("make-model", &fired))))
        .route("/<int:value>/", get(handler_fn(single)))
        .build()
        .unwrap();

    let (outcome, _, _) = dispatch(&router, Method::GET, "/make/porsche/model/911/");
    assert_eq!(outcome, DispatchOutcome::Handled);
    assert_eq!(fired.lock().unwrap().as_slice(), ["make-model"]);
}

#[test]
fn duplicate_registrations_only_first_fires() {
    let fired = Arc::new(Mutex::new(Vec::new()));
    let tag = |label: &'static str| {
        let log = Arc::clone(&fired);
        move |_req: &mut Request, _resp: &mut Response, _id: i64| {
            log.lock().unwrap().push(label);
        }
    };

    let router = Router::builder()
        .route("/a/<int:id>/", get(handler_fn(tag("first"))))
        .route("/a/<int:id>/", get(handler_fn(tag("second"))))
        .build()
        .unwrap();

    let (_, _, _) = dispatch(&router, Method::GET, "/a/1/");
    assert_eq!(fired.lock().unwrap().as_slice(), ["first"]);
}

#[test]
fn trailing_slash_is_significant() {
    let fired = Arc::new(Mutex::new(Vec::new()));
    let tag = |label: &'static str| {
        let log = Arc::clone(&fired);
        move |_req: &mut Request, _resp: &mut Response, _value: i64| {
            log.lock().unwrap().push(label);
        }
    };

    let router = Router::builder()
        .route("/<int:value>/", get(handler_fn(tag("slash"))))
        .route("/<int:value>", get(handler_fn(tag("bare"))))
        .build()
        .unwrap();

    let (outcome, _, _) = dispatch(&router, Method::GET, "/1");
    assert_eq!(outcome, DispatchOutcome::Handled);
    let (outcome, _, _) = dispatch(&router, Method::GET, "/1/");
    assert_eq!(outcome, DispatchOutcome::Handled);

    assert_eq!(fired.lock().unwrap().as_slice(), ["bare", "slash"]);
}

#[test]
fn int_fragment_rejects_non_digits() {
    let router = Router::builder()
        .route("/n/<int:value>/", get(handler_fn(|_req: &mut Request, _resp: &mut Response, _value: i64| {})))
        .build()
        .unwrap();

    let (outcome, _, _) = dispatch(&router, Method::GET, "/n/12a/");
    assert_eq!(outcome, DispatchOutcome::Unmatched);
    let (outcome, _, _) = dispatch(&router, Method::GET, "/n/-12/");
    assert_eq!(outcome, DispatchOutcome::Unmatched);
}

#[test]
fn uuid_fragment_rejects_non_canonical_form() {
    let router = Router::builder()
        .route("/u/<uuid:key>/", get(handler_fn(|_req: &mut Request, resp: &mut Response, key: Uuid| {
            resp.write(key.to_string());
        })))
        .build()
        .unwrap();

    let canonical = "075194d3-6885-417e-a8a8-6c931e272f00";
    let (outcome, _, resp) = dispatch(&router, Method::GET, &format!("/u/{canonical}/"));
    assert_eq!(outcome, DispatchOutcome::Handled);
    assert_eq!(resp.body(), canonical.as_bytes());

    // uppercase hex is not canonical
    let (outcome, _, _) = dispatch(&router, Method::GET, "/u/075194D3-6885-417E-A8A8-6C931E272F00/");
    assert_eq!(outcome, DispatchOutcome::Unmatched);
    // unhyphenated form
    let (outcome, _, _) = dispatch(&router, Method::GET, "/u/075194d36885417ea8a86c931e272f00/");
    assert_eq!(outcome, DispatchOutcome::Unmatched);
}

#[test]
fn path_converter_captures_across_segments() {
    let router = Router::builder()
        .route("/files/<path:rest>", get(handler_fn(|_req: &mut Request, resp: &mut Response, rest: String| {
            resp.write(rest);
        })))
        .build()
        .unwrap();

    let (outcome, req, resp) = dispatch(&router, Method::GET, "/files/css/styles/main.css");
    assert_eq!(outcome, DispatchOutcome::Handled);
    assert_eq!(resp.body(), b"css/styles/main.css");
    assert_eq!(req.params().get("rest").map(String::as_str), Some("css/styles/main.css"));
}

#[test]
fn captured_params_are_observable_on_the_request() {
    let router = Router::builder()
        .route(
            "/make/<string:model>/model/<int:make>/",
            get(handler_fn(|req: &mut Request, resp: &mut Response, _model: String, _make: i64| {
                // raw strings, before conversion
                resp.write(req.params().get("model").cloned().unwrap_or_default());
            })),
        )
        .build()
        .unwrap();

    let (_, req, resp) = dispatch(&router, Method::GET, "/make/porsche/model/911/");
    assert_eq!(resp.body(), b"porsche");
    assert_eq!(req.params().get("make").map(String::as_str), Some("911"));
}

#[test]
fn middleware_wraps_dispatch_first_registered_outermost() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let layer = |tag: &'static str, log: &Arc<Mutex<Vec<String>>>| {
        let log = Arc::clone(log);
        middleware_fn(move |req: &mut Request, resp: &mut Response, next: &dyn Next| {
            log.lock().unwrap().push(format!("{tag}:before"));
            let outcome = next.run(req, resp)?;
            log.lock().unwrap().push(format!("{tag}:after:{outcome:?}"));
            Ok(outcome)
        })
    };

    let handler_log = Arc::clone(&log);
    let router = Router::builder()
        .route(
            "/x/",
            get(handler_fn(move |_req: &mut Request, _resp: &mut Response| {
                handler_log.lock().unwrap().push("handler".to_string());
            })),
        )
        .middleware(layer("outer", &log))
        .middleware(layer("inner", &log))
        .build()
        .unwrap();

    let (outcome, _, _) = dispatch(&router, Method::GET, "/x/");
    assert_eq!(outcome, DispatchOutcome::Handled);
    assert_eq!(
        log.lock().unwrap().as_slice(),
        ["outer:before", "inner:before", "handler", "inner:after:Handled", "outer:after:Handled"]
    );
}

#[test]
fn middleware_observes_unmatched_requests() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let seen = Arc::clone(&log);

    let router = Router::builder()
        .route("/x/", get(handler_fn(|_req: &mut Request, _resp: &mut Response| {})))
        .middleware(middleware_fn(move |req: &mut Request, resp: &mut Response, next: &dyn Next| {
            let outcome = next.run(req, resp)?;
            seen.lock().unwrap().push(outcome);
            Ok(outcome)
        }))
        .build()
        .unwrap();

    let (outcome, _, resp) = dispatch(&router, Method::GET, "/missing/");
    assert_eq!(outcome, DispatchOutcome::Unmatched);
    // the engine wrote nothing
    assert!(resp.body().is_empty());
    assert_eq!(log.lock().unwrap().as_slice(), [DispatchOutcome::Unmatched]);
}

#[test]
fn method_specific_registration_with_on() {
    let router = Router::builder()
        .route("/jobs/", on(Method::PUT, handler_fn(|_req: &mut Request, resp: &mut Response| {
            resp.write("put");
        })))
        .route("/jobs/", post(handler_fn(|_req: &mut Request, resp: &mut Response| {
            resp.write("post");
        })))
        .build()
        .unwrap();

    let (_, _, resp) = dispatch(&router, Method::PUT, "/jobs/");
    assert_eq!(resp.body(), b"put");
    let (_, _, resp) = dispatch(&router, Method::POST, "/jobs/");
    assert_eq!(resp.body(), b"post");
    let (outcome, _, _) = dispatch(&router, Method::GET, "/jobs/");
    assert_eq!(outcome, DispatchOutcome::Unmatched);
}

#[test]
fn any_shares_one_handler_across_methods() {
    let hits = Arc::new(Mutex::new(0usize));
    let counter = Arc::clone(&hits);

    let router = Router::builder()
        .route(
            "/ping/",
            any(handler_fn(move |_req: &mut Request, resp: &mut Response| {
                *counter.lock().unwrap() += 1;
                resp.write("pong");
            })),
        )
        .build()
        .unwrap();

    for method in [Method::GET, Method::POST, Method::DELETE, Method::HEAD] {
        let (outcome, _, _) = dispatch(&router, method, "/ping/");
        assert_eq!(outcome, DispatchOutcome::Handled);
    }
    assert_eq!(*hits.lock().unwrap(), 4);
}

#[test]
fn reverse_named_route() {
    let router = Router::builder()
        .route("/a/<int:id>/", get(handler_fn(|_req: &mut Request, _resp: &mut Response, _id: i64| {})).named("a"))
        .build()
        .unwrap();

    assert_eq!(router.reverse("a", &[123456.into()]).unwrap(), "/a/123456/");
}

#[test]
fn reverse_unknown_name_fails() {
    let router = Router::builder().build().unwrap();
    assert!(matches!(router.reverse("unknown", &[1.into()]), Err(NoReverseMatch::UnknownName { .. })));
}

#[test]
fn reverse_then_match_extracts_the_same_values() {
    let observed = Arc::new(Mutex::new(None));
    let sink = Arc::clone(&observed);

    let router = Router::builder()
        .route(
            "/make/<string:model>/model/<int:make>/",
            get(handler_fn(move |_req: &mut Request, _resp: &mut Response, model: String, make: i64| {
                *sink.lock().unwrap() = Some((model, make));
            }))
            .named("detail"),
        )
        .build()
        .unwrap();

    let url = router.reverse("detail", &["porsche".into(), 911.into()]).unwrap();
    assert_eq!(url, "/make/porsche/model/911/");

    let (outcome, _, _) = dispatch(&router, Method::GET, &url);
    assert_eq!(outcome, DispatchOutcome::Handled);
    assert_eq!(observed.lock().unwrap().take(), Some(("porsche".to_string(), 911)));
}

#[test]
fn user_converter_end_to_end() {
    let yes_no = Converter::new(
        "bool",
        "(?:yes|no)",
        |raw| Ok(PathValue::Str(raw.to_string())),
        |value| value.as_str().map(str::to_string),
    );

    let router = Router::builder()
        .converters([yes_no])
        .route(
            "/flag/<bool:answer>/",
            get(handler_fn(|_req: &mut Request, resp: &mut Response, answer: String| {
                resp.write(answer);
            }))
            .named("flag"),
        )
        .build()
        .unwrap();

    let (outcome, _, resp) = dispatch(&router, Method::GET, "/flag/yes/");
    assert_eq!(outcome, DispatchOutcome::Handled);
    assert_eq!(resp.body(), b"yes");

    let (outcome, _, _) = dispatch(&router, Method::GET, "/flag/maybe/");
    assert_eq!(outcome, DispatchOutcome::Unmatched);

    assert_eq!(router.reverse("flag", &["no".into()]).unwrap(), "/flag/no/");
}

#[test]
fn conversion_failure_propagates_out_of_dispatch() {
    // a permissive converter whose parse is stricter than its fragment, so
    // dispatch itself has to surface the mismatch
    let loose_int = Converter::new(
        "loose",
        "[^/]+",
        |raw| raw.parse::<i64>().map(PathValue::Int).map_err(|e| ConvertError::invalid_int(raw, e)),
        |value| value.as_int().map(|i| i.to_string()),
    );

    let router = Router::builder()
        .converters([loose_int])
        .route("/n/<loose:value>/", get(handler_fn(|_req: &mut Request, _resp: &mut Response, _value: i64| {})))
        .build()
        .unwrap();

    let mut req = Request::new(Method::GET, "/n/abc/".parse().unwrap());
    let mut resp = Response::new();
    let result = router.dispatch(&mut req, &mut resp);
    assert!(matches!(result, Err(ConvertError::InvalidInt { .. })));
}

#[test]
fn compile_match_round_trip_for_valid_substitutions() {
    let cases: &[(&str, &str, &[(&str, &str)])] = &[
        ("/hello/<name>/<int:age>/", "/hello/Sam/30/", &[("name", "Sam"), ("age", "30")]),
        ("/s/<slug:tag>/", "/s/rust-1_0/", &[("tag", "rust-1_0")]),
        ("/f/<path:rest>", "/f/a/b/c", &[("rest", "a/b/c")]),
    ];

    for (pattern, path, expected) in cases {
        // capture count fixes the handler shape, so build per-case
        let router = match expected.len() {
            1 => Router::builder()
                .route(*pattern, get(handler_fn(|_req: &mut Request, _resp: &mut Response, _a: String| {})))
                .build()
                .unwrap(),
            2 => Router::builder()
                .route(*pattern, get(handler_fn(|_req: &mut Request, _resp: &mut Response, _a: String, _b: i64| {})))
                .build()
                .unwrap(),
            n => unreachable!("unexpected capture count {n}"),
        };

        let (outcome, req, _) = dispatch(&router, Method::GET, path);
        assert_eq!(outcome, DispatchOutcome::Handled, "pattern {pattern} should match {path}");
        for (name, value) in *expected {
            assert_eq!(req.params().get(*name).map(String::as_str), Some(*value), "capture {name} of {pattern}");
        }
    }
}
