use serde_json::json;

use crate::common::{PASSWORD, TestApp, routes};

mod sign_up {
    use super::*;

    #[tokio::test]
    async fn new_user_can_sign_up_with_valid_credentials() {
        let app = TestApp::spawn().await;

        let res = app
            .post_json(
                routes::SIGN_UP,
                &json!({"username": "alice", "password": PASSWORD}),
            )
            .await;

        assert_eq!(res.status, 201);
        assert!(res.body["id"].is_number());
        assert_eq!(res.body["username"], "alice");
        assert!(res.body.get("password").is_none());
    }

    #[tokio::test]
    async fn cannot_take_an_existing_username() {
        let app = TestApp::spawn().await;
        let body = json!({"username": "alice", "password": PASSWORD});

        let first = app.post_json(routes::SIGN_UP, &body).await;
        assert_eq!(first.status, 201);

        let second = app.post_json(routes::SIGN_UP, &body).await;
        assert_eq!(second.status, 409);
        assert_eq!(second.body["code"], "USERNAME_TAKEN");
    }

    #[tokio::test]
    async fn rejects_malformed_usernames_and_short_passwords() {
        let app = TestApp::spawn().await;

        let bad_name = app
            .post_json(
                routes::SIGN_UP,
                &json!({"username": "no spaces!", "password": PASSWORD}),
            )
            .await;
        assert_eq!(bad_name.status, 400);
        assert_eq!(bad_name.body["code"], "VALIDATION_ERROR");

        let short = app
            .post_json(
                routes::SIGN_UP,
                &json!({"username": "alice", "password": "short"}),
            )
            .await;
        assert_eq!(short.status, 400);
    }

    #[tokio::test]
    async fn malformed_json_is_a_validation_error() {
        let app = TestApp::spawn().await;

        let res = app
            .post_json(routes::SIGN_UP, &json!({"username": "alice"}))
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

mod sign_in {
    use super::*;

    #[tokio::test]
    async fn valid_credentials_start_a_session() {
        let app = TestApp::spawn().await;
        let body = json!({"username": "alice", "password": PASSWORD});
        app.post_json(routes::SIGN_UP, &body).await;

        let res = app.post_json(routes::SIGN_IN, &body).await;

        assert_eq!(res.status, 200);
        assert!(res.body["token"].as_str().is_some_and(|t| !t.is_empty()));
        assert_eq!(res.body["username"], "alice");

        let cookie = res
            .set_cookies
            .iter()
            .find(|c| c.starts_with("session="))
            .expect("sign-in should set the session cookie");
        assert!(cookie.contains("HttpOnly"));
        assert!(cookie.contains("Path=/"));
    }

    #[tokio::test]
    async fn wrong_password_is_refused() {
        let app = TestApp::spawn().await;
        app.post_json(
            routes::SIGN_UP,
            &json!({"username": "alice", "password": PASSWORD}),
        )
        .await;

        let res = app
            .post_json(
                routes::SIGN_IN,
                &json!({"username": "alice", "password": "wrongpassword"}),
            )
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "INVALID_CREDENTIALS");
        assert!(res.set_cookies.is_empty());
    }

    #[tokio::test]
    async fn unknown_user_is_refused() {
        let app = TestApp::spawn().await;

        let res = app
            .post_json(
                routes::SIGN_IN,
                &json!({"username": "ghost", "password": PASSWORD}),
            )
            .await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "INVALID_CREDENTIALS");
    }

    #[tokio::test]
    async fn sign_in_page_reports_the_current_session() {
        let app = TestApp::spawn().await;
        let token = app.create_user("alice").await;

        let anonymous = app.get_without_session(routes::SIGN_IN).await;
        assert_eq!(anonymous.status, 200);
        assert!(anonymous.body["signed_in_as"].is_null());

        let signed_in = app.get_with_session(routes::SIGN_IN, &token).await;
        assert_eq!(signed_in.body["signed_in_as"], "alice");
    }

    #[tokio::test]
    async fn tampered_session_is_anonymous() {
        let app = TestApp::spawn().await;
        let token = app.create_user("alice").await;
        let tampered = format!("{token}x");

        let res = app.get_with_session(routes::NEW_GRAM, &tampered).await;

        assert!(res.is_sign_in_redirect());
    }

    #[tokio::test]
    async fn bearer_token_is_accepted() {
        let app = TestApp::spawn().await;
        let token = app.create_user("alice").await;
        let bearer = format!("Bearer {token}");

        let res = app
            .get_with_headers(routes::NEW_GRAM, &[("Authorization", bearer.as_str())])
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["form"], "new");
    }
}

mod sign_out {
    use super::*;

    #[tokio::test]
    async fn clears_the_session_cookie_and_goes_home() {
        let app = TestApp::spawn().await;
        let token = app.create_user("alice").await;

        let res = app.delete_with_session(routes::SIGN_OUT, &token).await;

        assert_eq!(res.status, 303);
        assert_eq!(res.location.as_deref(), Some(routes::HOME));
        let cookie = res
            .set_cookies
            .iter()
            .find(|c| c.starts_with("session="))
            .expect("sign-out should expire the session cookie");
        assert!(cookie.contains("Max-Age=0"));
    }
}

mod docs {
    use super::*;

    #[tokio::test]
    async fn openapi_document_lists_the_gram_routes() {
        let app = TestApp::spawn().await;

        let res = app.get_without_session(routes::OPENAPI).await;

        assert_eq!(res.status, 200);
        assert!(res.body["paths"]["/grams"].is_object());
        assert!(res.body["paths"]["/grams/{id}"]["patch"].is_object());
        assert!(res.body["paths"]["/users/sign_in"]["post"].is_object());
        assert!(res.body["components"]["securitySchemes"]["session"].is_object());
    }
}
