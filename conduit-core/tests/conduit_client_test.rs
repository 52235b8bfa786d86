use conduit_core::catalog::{Catalog, parse_catalog};
use conduit_core::client::{
    CallError, ConduitClient, ConduitConfig, Credentials, Params, ValidationError,
};
use conduit_core::http::{ProtocolError, TransportError};
use conduit_core::serde_json::{Value, json};
use mock_transport::{MockTransport, form_field, params_of};


const HOST: &str = "https://phabricator.example.com/api/";

fn token_client(transport: MockTransport) -> ConduitClient<MockTransport> {
    let config = ConduitConfig::new(HOST, Credentials::Token("api-token".to_string())).unwrap();
    ConduitClient::from_transport(config, transport)
}

fn params(value: Value) -> Params {
    match value {
        Value::Object(map) => map,
        _ => panic!("test params must be an object"),
    }
}

#[tokio::test]
async fn test_resolves_flat_and_dotted_methods() {
    let mut client = token_client(MockTransport::new());

    let whoami = client.resource("user").resource("whoami");
    assert_eq!(whoami.method(), Some("user"));
    assert_eq!(whoami.endpoint(), Some("whoami"));

    let edit = client
        .resource("diffusion")
        .resource("repository")
        .resource("edit");
    assert_eq!(edit.method(), Some("diffusion"));
    assert_eq!(edit.endpoint(), Some("repository.edit"));
}

#[tokio::test]
async fn test_resolution_is_idempotent() {
    let mut client = token_client(MockTransport::new());

    let resolve = |client: &mut ConduitClient<MockTransport>| {
        client
            .resource("diffusion")
            .resource("repository")
            .resource("edit")
            .path()
            .clone()
    };

    let first = resolve(&mut client);
    let second = resolve(&mut client);

    assert_eq!(first, second);
}

#[tokio::test]
async fn test_unknown_method_reaches_transport() {
    let transport = MockTransport::new().reply_result(json!({"ok": true}));
    let mut client = token_client(transport);

    let result = client.call("brandnew.method", Params::new()).await.unwrap();

    assert_eq!(result["ok"], true);
    let requests = client.transport().requests();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        requests[0].url.as_str(),
        "https://phabricator.example.com/api/brandnew.method"
    );
    assert!(client.schema().method("brandnew", "method").is_some());
}

#[tokio::test]
async fn test_missing_required_argument_is_caught_locally() {
    let catalog = Catalog::from_value(json!({
        "differential.find": {"params": {"query": "required string", "guids": "optional list<guids>"}}
    }))
    .unwrap();
    let mut client = token_client(MockTransport::new()).with_schema(parse_catalog(&catalog));

    let err = client
        .call("differential.find", Params::new())
        .await
        .unwrap_err();

    match err {
        CallError::Validation(ValidationError::MissingArgument(name)) => assert_eq!(name, "query"),
        other => panic!("expected a validation error, got {other:?}"),
    }
    assert!(client.transport().requests().is_empty());
}

#[tokio::test]
async fn test_wrong_argument_shape() {
    let mut client = token_client(MockTransport::new());

    let err = client
        .call("maniphest.find", params(json!({"ids": ["one"]})))
        .await
        .unwrap_err();

    assert_eq!(
        err.to_string(),
        "Wrong argument type: ids is not a list of integer"
    );

    let err = client
        .call("maniphest.find", params(json!({"fullText": ["a", "b"]})))
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Wrong argument type: fullText is not a list");
}

#[tokio::test]
async fn test_request_wire_format() {
    let transport = MockTransport::new().reply_result(json!({"userName": "testaccount"}));
    let mut client = token_client(transport);

    client
        .call(
            "user.query",
            params(json!({"usernames:list": ["testaccount"], "limit": 1})),
        )
        .await
        .unwrap();

    let requests = client.transport().requests();
    let request = &requests[0];
    assert_eq!(
        request.url.as_str(),
        "https://phabricator.example.com/api/user.query"
    );
    assert_eq!(request.headers["user-agent"], "conduit-rs/1");
    assert_eq!(
        request.headers["content-type"],
        "application/x-www-form-urlencoded"
    );
    assert_eq!(form_field(request, "output").as_deref(), Some("json"));
    assert_eq!(
        params_of(request),
        json!({
            "usernames": ["testaccount"],
            "limit": 1,
            "__conduit__": {"token": "api-token"},
        })
    );
}

#[tokio::test]
async fn test_bad_status_is_transport_error() {
    let body = r#"{"result":{"userName":"testaccount"},"error_code":null,"error_info":null}"#;
    let mut client = token_client(MockTransport::new().reply(400, body));

    let err = client.call("user.whoami", Params::new()).await.unwrap_err();

    assert!(matches!(
        err,
        CallError::Transport(TransportError::BadStatus(status)) if status.as_u16() == 400
    ));
}

#[tokio::test]
async fn test_list_result_is_a_container() {
    let transport = MockTransport::new().reply_result(json!({
        "PHID-TASK-4cgpskv6zzys6rp5rvrc": {
            "status": "3",
            "priority": "Needs Triage",
            "title": "Titled"
        }
    }));
    let mut client = token_client(transport);

    let result = client
        .call(
            "maniphest.find",
            params(json!({"ownerphids": ["PHID-USER-5022a9389121884ab9db"]})),
        )
        .await
        .unwrap();

    assert_eq!(result.len(), 1);
    assert_eq!(result["PHID-TASK-4cgpskv6zzys6rp5rvrc"]["status"], "3");
    let keys: Vec<_> = result.keys().collect();
    assert_eq!(keys, vec!["PHID-TASK-4cgpskv6zzys6rp5rvrc"]);
}

#[tokio::test]
async fn test_remote_error_is_surfaced() {
    let body = r#"{"result":null,"error_code":"ERR-INVALID-AUTH","error_info":"API token is invalid."}"#;
    let mut client = token_client(MockTransport::new().reply(200, body));

    let err = client.call("user.whoami", Params::new()).await.unwrap_err();

    match err {
        CallError::Api(api) => {
            assert_eq!(api.code, "ERR-INVALID-AUTH");
            assert_eq!(api.info.as_deref(), Some("API token is invalid."));
        }
        other => panic!("expected a remote API error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_guarded_response() {
    let body = r#"for(;;);{"result":"pong","error_code":null,"error_info":null}"#;
    let mut client = token_client(MockTransport::new().reply(200, body));

    let result = client.call("conduit.ping", Params::new()).await.unwrap();

    assert_eq!(result.as_value(), &json!("pong"));
}

#[tokio::test]
async fn test_garbage_response_is_protocol_error() {
    let transport = MockTransport::new().reply(200, "<html>Service Unavailable</html>");
    let mut client = token_client(transport);

    let err = client.call("conduit.ping", Params::new()).await.unwrap_err();

    assert!(matches!(err, CallError::Protocol(_)));
}

#[tokio::test]
async fn test_object_without_envelope_fields_is_protocol_error() {
    let transport = MockTransport::new().reply(200, r#"{"foo":1}"#);
    let mut client = token_client(transport);

    let err = client.call("conduit.ping", Params::new()).await.unwrap_err();

    assert!(matches!(err, CallError::Protocol(ProtocolError::NotAnEnvelope(_))));
}

#[tokio::test]
async fn test_incomplete_paths_are_not_callable() {
    let mut client = token_client(MockTransport::new());

    let err = client
        .resource("user")
        .call(Params::new())
        .await
        .unwrap_err();
    assert!(matches!(err, CallError::MissingResource(ref name) if name == "user"));

    let err = client.call("", Params::new()).await.unwrap_err();
    assert!(matches!(err, CallError::MissingResource(_)));

    assert!(client.transport().requests().is_empty());
}

#[tokio::test]
async fn test_refresh_catalog() {
    let transport = MockTransport::new().reply_result(json!({
        "widget.spin": {"params": {"speed": "required int"}},
        "widget.stop": {"params": []},
    }));
    let mut client = token_client(transport);

    let methods = client.refresh_catalog().await.unwrap();

    assert_eq!(methods, 2);
    assert_eq!(client.schema().apps().collect::<Vec<_>>(), vec!["widget"]);

    let err = client.call("widget.spin", Params::new()).await.unwrap_err();
    assert!(matches!(
        err,
        CallError::Validation(ValidationError::MissingArgument(ref name)) if name == "speed"
    ));

    let requests = client.transport().requests();
    let request = &requests[0];
    assert_eq!(
        request.url.as_str(),
        "https://phabricator.example.com/api/conduit.query"
    );
}
