//! Request lifecycle behavior through `Gateway::handle`.

use std::sync::Arc;
use std::time::Duration;

use axum::http::{header, Method, StatusCode};
use rpc_gateway::error::{GatewayError, HookError};
use rpc_gateway::http::{ResponseSink, RpcRequest};
use rpc_gateway::marshal::MarshalOptions;
use rpc_gateway::pipeline::{Gateway, Interceptor, RequestHooks};

mod common;

use common::{entries, gateway, log, user_switcher, Recorder};

fn get_user(id: &str) -> RpcRequest {
    RpcRequest::new(Method::GET, "/users/get")
        .with_form_value("user_id", id)
        .with_form_value("name", "ada")
}

#[tokio::test]
async fn test_success_writes_json_and_one_newline() {
    let resp = gateway().handle("GetUser", get_user("42")).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.headers()[header::CONTENT_TYPE], "application/json");
    let text = resp.text();
    assert!(text.ends_with("}\n"));
    assert_eq!(text.matches('\n').count(), 1);
    let json: serde_json::Value = serde_json::from_slice(resp.body()).unwrap();
    assert_eq!(json, serde_json::json!({ "user_id": 42, "name": "ada", "verbose": false }));
}

#[tokio::test]
async fn test_malformed_field_defaults_and_request_succeeds() {
    let resp = gateway().handle("GetUser", get_user("notanumber")).await;

    assert_eq!(resp.status(), StatusCode::OK);
    let json: serde_json::Value = serde_json::from_slice(resp.body()).unwrap();
    assert_eq!(json["user_id"], 0);
    assert_eq!(json["name"], "ada");
}

#[tokio::test]
async fn test_unknown_operation_literal() {
    let resp = gateway().handle("Missing", get_user("1")).await;

    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(resp.body(), b"No such grpc method[Missing]");
}

#[tokio::test]
async fn test_after_runs_in_reverse_on_success() {
    let log = log();
    let gateway = Gateway::builder(Arc::new(user_switcher()))
        .interceptor(Recorder::new("a", &log))
        .interceptor(Recorder::new("b", &log))
        .build();

    gateway.handle("GetUser", get_user("1")).await;
    assert_eq!(entries(&log), ["before:a", "before:b", "after:b", "after:a"]);
}

#[tokio::test]
async fn test_after_runs_in_reverse_when_dispatch_fails() {
    let log = log();
    let gateway = Gateway::builder(Arc::new(user_switcher()))
        .interceptor(Recorder::new("a", &log))
        .interceptor(Recorder::new("b", &log))
        .build();

    let resp = gateway.handle("Fail", RpcRequest::new(Method::GET, "/users/fail")).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(resp.text(), "user backend unavailable\n");
    assert_eq!(entries(&log), ["before:a", "before:b", "after:b", "after:a"]);
}

#[tokio::test]
async fn test_first_before_failure_skips_dispatch_and_after() {
    let log = log();
    let gateway = Gateway::builder(Arc::new(user_switcher()))
        .interceptor(Recorder::failing("a", &log))
        .interceptor(Recorder::new("b", &log))
        .build();

    let resp = gateway.handle("GetUser", get_user("1")).await;
    assert_eq!(entries(&log), ["before:a"]);
    assert_eq!(resp.text(), "a refused");
}

#[tokio::test]
async fn test_last_before_failure_unwinds_survivors() {
    let log = log();
    let gateway = Gateway::builder(Arc::new(user_switcher()))
        .interceptor(Recorder::new("a", &log))
        .interceptor(Recorder::new("b", &log))
        .interceptor(Recorder::failing("c", &log))
        .build();

    let resp = gateway.handle("GetUser", get_user("1")).await;
    assert_eq!(
        entries(&log),
        ["before:a", "before:b", "before:c", "after:b", "after:a"]
    );
    assert!(!resp.text().contains("ada"));
}

#[tokio::test]
async fn test_request_scoped_interceptors_replace_common() {
    let log = log();
    let gateway = Gateway::builder(Arc::new(user_switcher()))
        .interceptor(Recorder::new("common", &log))
        .build();

    let hooks = RequestHooks::default().interceptor(Recorder::new("scoped", &log));
    gateway.handle("GetUser", get_user("1").with_hooks(hooks)).await;
    assert_eq!(entries(&log), ["before:scoped", "after:scoped"]);
}

#[tokio::test]
async fn test_interceptor_added_at_runtime() {
    let log = log();
    let gateway = gateway();
    gateway.handle("GetUser", get_user("1")).await;
    assert!(entries(&log).is_empty());

    gateway.add_interceptor(Recorder::new("late", &log));
    assert_eq!(gateway.interceptor_count(), 1);
    gateway.handle("GetUser", get_user("1")).await;
    assert_eq!(entries(&log), ["before:late", "after:late"]);
}

#[tokio::test]
async fn test_hijacker_bypasses_dispatch_but_not_after() {
    let log = log();
    let gateway = Gateway::builder(Arc::new(user_switcher()))
        .interceptor(Recorder::new("a", &log))
        .build();

    let hooks = RequestHooks::default()
        .hijacker(|resp: &mut ResponseSink, _req: &RpcRequest| {
            resp.set_status(StatusCode::ACCEPTED);
            resp.write("hijacked");
        })
        .preprocessor(|_resp: &mut ResponseSink, _req: &RpcRequest| {
            Err(HookError::new("never called"))
        });

    let resp = gateway.handle("Fail", get_user("1").with_hooks(hooks)).await;
    assert_eq!(resp.status(), StatusCode::ACCEPTED);
    assert_eq!(resp.text(), "hijacked");
    assert_eq!(entries(&log), ["before:a", "after:a"]);
}

#[tokio::test]
async fn test_preprocessor_rejection_goes_to_error_handler() {
    let hooks = RequestHooks::default().preprocessor(|_resp: &mut ResponseSink, req: &RpcRequest| {
        if req.form.get("name").is_some_and(|name| name.len() < 5) {
            return Err(HookError::new("name too short"));
        }
        Ok(())
    });

    let resp = gateway().handle("GetUser", get_user("1").with_hooks(hooks)).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(resp.text(), "preprocessor rejected request: name too short\n");
}

#[tokio::test]
async fn test_custom_error_handler() {
    let gateway = Gateway::builder(Arc::new(user_switcher()))
        .error_handler(Arc::new(
            |resp: &mut ResponseSink, _req: &RpcRequest, err: &GatewayError| {
                resp.set_status(StatusCode::SERVICE_UNAVAILABLE);
                resp.write(format!("custom: {err}"));
            },
        ))
        .build();

    let resp = gateway.handle("Fail", RpcRequest::new(Method::GET, "/users/fail")).await;
    assert_eq!(resp.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(resp.text(), "custom: user backend unavailable");
}

#[tokio::test]
async fn test_postprocessor_replaces_marshal() {
    let hooks = RequestHooks::default().postprocessor(
        |resp: &mut ResponseSink, _req: &RpcRequest, reply: &rpc_gateway::binding::Message| {
            resp.write(format!("type={}", reply.type_name()));
        },
    );

    let resp = gateway().handle("GetUser", get_user("1").with_hooks(hooks)).await;
    assert_eq!(resp.text(), "type=GetUserReply");
    assert!(resp.headers().get(header::CONTENT_TYPE).is_none());
}

#[tokio::test]
async fn test_dispatch_timeout_routes_to_error_handler() {
    let log = log();
    let gateway = Gateway::builder(Arc::new(user_switcher()))
        .interceptor(Recorder::new("a", &log))
        .dispatch_timeout(Duration::from_millis(20))
        .build();

    let resp = gateway.handle("Slow", RpcRequest::new(Method::GET, "/users/slow")).await;
    assert_eq!(resp.status(), StatusCode::GATEWAY_TIMEOUT);
    assert!(resp.text().starts_with("dispatch timed out"));
    assert_eq!(entries(&log), ["before:a", "after:a"]);
}

#[tokio::test]
async fn test_marshal_options_apply() {
    let gateway = Gateway::builder(Arc::new(user_switcher()))
        .marshal_options(MarshalOptions {
            filter_proto_json: true,
            emit_zero_values: false,
            int64_as_number: false,
        })
        .build();

    let resp = gateway.handle("GetUser", get_user("42")).await;
    let json: serde_json::Value = serde_json::from_slice(resp.body()).unwrap();
    assert_eq!(json, serde_json::json!({ "user_id": "42", "name": "ada" }));
}

struct ContextSetter;

impl Interceptor for ContextSetter {
    fn before(&self, _resp: &mut ResponseSink, req: &mut RpcRequest) -> Result<(), HookError> {
        req.context.insert("Name", "from-context");
        Ok(())
    }
}

#[tokio::test]
async fn test_interceptor_context_feeds_binding() {
    let gateway = Gateway::builder(Arc::new(user_switcher()))
        .interceptor(Arc::new(ContextSetter))
        .build();

    let req = RpcRequest::new(Method::GET, "/users/get").with_form_value("user_id", "7");
    let resp = gateway.handle("GetUser", req).await;
    let json: serde_json::Value = serde_json::from_slice(resp.body()).unwrap();
    assert_eq!(json["name"], "from-context");
    assert_eq!(json["user_id"], 7);
}
