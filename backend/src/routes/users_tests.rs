//! Router tests for registration, login and the authentication gate
//!
//! Runs the full middleware stack against the in-memory store.

#[cfg(test)]
mod tests {
    use crate::auth::{TokenCodec, AUTH_HEADER};
    use crate::config::AppConfig;
    use crate::routes::create_router;
    use crate::state::AppState;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
        Router,
    };
    use proptest::prelude::*;
    use secrecy::Secret;
    use serde_json::{json, Value};
    use todo_api_shared::TokenPurpose;
    use tower::ServiceExt;

    struct TestResponse {
        status: StatusCode,
        token: Option<String>,
        body: Vec<u8>,
    }

    impl TestResponse {
        fn json(&self) -> Value {
            serde_json::from_slice(&self.body).unwrap()
        }
    }

    fn test_state() -> AppState {
        let mut config = AppConfig::default();
        config.auth.bcrypt_cost = 4;
        AppState::in_memory(config)
    }

    async fn send(app: &Router, method: &str, uri: &str, token: Option<&str>, body: Option<Value>) -> TestResponse {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(AUTH_HEADER, token);
        }
        let request = match body {
            Some(body) => builder
                .header("Content-Type", "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let token = response
            .headers()
            .get(AUTH_HEADER)
            .map(|value| value.to_str().unwrap().to_string());
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap()
            .to_vec();

        TestResponse { status, token, body }
    }

    async fn register(app: &Router, email: &str, password: &str) -> TestResponse {
        send(
            app,
            "POST",
            "/users",
            None,
            Some(json!({ "email": email, "password": password })),
        )
        .await
    }

    #[tokio::test]
    async fn test_register_returns_user_and_token() {
        let app = create_router(test_state());
        let response = register(&app, "a@x.com", "secret1").await;

        assert_eq!(response.status, StatusCode::OK);
        assert!(response.token.is_some());

        let body = response.json();
        assert_eq!(body["email"], "a@x.com");
        assert!(body["id"].as_str().is_some());
        assert_eq!(body.as_object().unwrap().len(), 2);
        assert!(body.get("password").is_none());
    }

    #[tokio::test]
    async fn test_register_invalid_request() {
        let app = create_router(test_state());
        let response = register(&app, "invalidEmail", "123").await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert!(response.token.is_none());
    }

    #[tokio::test]
    async fn test_register_missing_fields_is_400() {
        let app = create_router(test_state());
        let response = send(&app, "POST", "/users", None, Some(json!({}))).await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_register_wrongly_typed_field_is_400() {
        let app = create_router(test_state());
        let response = send(
            &app,
            "POST",
            "/users",
            None,
            Some(json!({ "email": 123, "password": "secret1" })),
        )
        .await;

        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert_eq!(response.json()["error"]["code"], "BAD_REQUEST");
        assert!(response.token.is_none());
    }

    #[tokio::test]
    async fn test_body_without_content_type_is_400() {
        let app = create_router(test_state());
        let body = json!({ "email": "a@x.com", "password": "secret1" }).to_string();

        for uri in ["/users", "/users/login"] {
            let request = Request::builder()
                .method("POST")
                .uri(uri)
                .body(Body::from(body.clone()))
                .unwrap();
            let response = app.clone().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{}", uri);

            let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
                .await
                .unwrap();
            let error: Value = serde_json::from_slice(&bytes).unwrap();
            assert_eq!(error["error"]["code"], "BAD_REQUEST");
        }
    }

    #[tokio::test]
    async fn test_malformed_json_is_400() {
        let app = create_router(test_state());
        let request = Request::builder()
            .method("POST")
            .uri("/users/login")
            .header("Content-Type", "application/json")
            .body(Body::from("{\"email\": "))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_register_duplicate_email() {
        let app = create_router(test_state());
        assert_eq!(register(&app, "a@x.com", "secret1").await.status, StatusCode::OK);

        let response = register(&app, "a@x.com", "password123").await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
        assert!(response.token.is_none());
    }

    #[tokio::test]
    async fn test_login_issues_additional_token() {
        let state = test_state();
        let app = create_router(state.clone());
        let registered = register(&app, "a@x.com", "secret1").await;

        let response = send(
            &app,
            "POST",
            "/users/login",
            None,
            Some(json!({ "email": "a@x.com", "password": "secret1" })),
        )
        .await;

        assert_eq!(response.status, StatusCode::OK);
        let login_token = response.token.clone().unwrap();
        assert_ne!(Some(login_token.clone()), registered.token);
        assert_eq!(response.json()["email"], "a@x.com");

        let user = state.users().resolve_token(&login_token).await.unwrap();
        assert_eq!(user.tokens.len(), 2);
        assert_eq!(user.tokens[1].purpose, TokenPurpose::Auth);
        assert_eq!(user.tokens[1].token, login_token);
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let state = test_state();
        let app = create_router(state.clone());
        let registered = register(&app, "a@x.com", "secret1").await;

        let wrong_password = send(
            &app,
            "POST",
            "/users/login",
            None,
            Some(json!({ "email": "a@x.com", "password": "invalidPassword" })),
        )
        .await;
        let unknown_email = send(
            &app,
            "POST",
            "/users/login",
            None,
            Some(json!({ "email": "nobody@x.com", "password": "secret1" })),
        )
        .await;

        assert_eq!(wrong_password.status, StatusCode::BAD_REQUEST);
        assert!(wrong_password.token.is_none());
        assert_eq!(wrong_password.status, unknown_email.status);
        assert_eq!(wrong_password.body, unknown_email.body);

        // No token was added by the failed attempt
        let user = state
            .users()
            .resolve_token(registered.token.as_deref().unwrap())
            .await
            .unwrap();
        assert_eq!(user.tokens.len(), 1);
    }

    #[tokio::test]
    async fn test_me_returns_caller() {
        let app = create_router(test_state());
        let registered = register(&app, "a@x.com", "secret1").await;

        let response = send(&app, "GET", "/users/me", registered.token.as_deref(), None).await;

        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.json(), registered.json());
    }

    #[tokio::test]
    async fn test_me_without_token_is_empty_401() {
        let app = create_router(test_state());
        let response = send(&app, "GET", "/users/me", None, None).await;

        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
        assert!(response.body.is_empty());
    }

    #[tokio::test]
    async fn test_token_with_wrong_secret_returns_401() {
        let state = test_state();
        let app = create_router(state.clone());
        let registered = register(&app, "a@x.com", "secret1").await;
        let user_id = registered.json()["id"].as_str().unwrap().parse().unwrap();

        let forger = TokenCodec::new(&Secret::new("wrong-secret-key".to_string()));
        let forged = forger.issue(user_id, TokenPurpose::Auth).unwrap();

        let response = send(&app, "GET", "/users/me", Some(&forged), None).await;
        assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_logout_revokes_only_presented_token() {
        let app = create_router(test_state());
        let first = register(&app, "a@x.com", "secret1").await.token.unwrap();
        let second = send(
            &app,
            "POST",
            "/users/login",
            None,
            Some(json!({ "email": "a@x.com", "password": "secret1" })),
        )
        .await
        .token
        .unwrap();

        let response = send(&app, "DELETE", "/users/me/token", Some(&first), None).await;
        assert_eq!(response.status, StatusCode::OK);
        assert!(response.body.is_empty());

        assert_eq!(
            send(&app, "GET", "/users/me", Some(&first), None).await.status,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            send(&app, "GET", "/users/me", Some(&second), None).await.status,
            StatusCode::OK
        );
    }

    #[tokio::test]
    async fn test_logout_with_reused_token_is_rejected_by_gate() {
        let app = create_router(test_state());
        let token = register(&app, "a@x.com", "secret1").await.token.unwrap();

        let first = send(&app, "DELETE", "/users/me/token", Some(&token), None).await;
        let second = send(&app, "DELETE", "/users/me/token", Some(&token), None).await;

        assert_eq!(first.status, StatusCode::OK);
        assert_eq!(second.status, StatusCode::UNAUTHORIZED);
        assert!(second.body.is_empty());
    }

    #[tokio::test]
    async fn test_auth_header_is_exposed_to_browsers() {
        let app = create_router(test_state());
        let request = Request::builder()
            .method("POST")
            .uri("/users")
            .header("Origin", "http://localhost:8080")
            .header("Content-Type", "application/json")
            .body(Body::from(json!({ "email": "a@x.com", "password": "secret1" }).to_string()))
            .unwrap();

        let response = app.oneshot(request).await.unwrap();
        let exposed = response
            .headers()
            .get("access-control-expose-headers")
            .unwrap()
            .to_str()
            .unwrap();
        assert!(exposed.contains(AUTH_HEADER));
    }

    /// Generate random invalid tokens
    fn invalid_token_strategy() -> impl Strategy<Value = String> {
        prop_oneof![
            // Empty token
            Just("".to_string()),
            // Random string (not a JWT)
            "[a-zA-Z0-9]{10,50}",
            // Malformed JWT (wrong number of parts)
            "[a-zA-Z0-9]{10}\\.[a-zA-Z0-9]{10}",
            // Valid shape but invalid signature
            "[a-zA-Z0-9_-]{20}\\.[a-zA-Z0-9_-]{20}\\.[a-zA-Z0-9_-]{20}",
        ]
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        /// Property: protected endpoints reject every invalid token with an empty 401
        #[test]
        fn prop_invalid_tokens_return_empty_401(token in invalid_token_strategy()) {
            let rt = tokio::runtime::Runtime::new().unwrap();
            rt.block_on(async {
                let app = create_router(test_state());
                let response = send(&app, "GET", "/users/me", Some(&token), None).await;

                prop_assert_eq!(response.status, StatusCode::UNAUTHORIZED);
                prop_assert!(response.body.is_empty());
                Ok(())
            })?;
        }
    }
}
