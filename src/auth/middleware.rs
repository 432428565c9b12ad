//! Authentication middleware that verifies session tokens and rejects anonymous requests.

use axum::{
    extract::{FromRef, Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use axum_extra::{
    extract::CookieJar,
    headers::{Authorization, HeaderMapExt, authorization::Bearer},
};
use maud::{Markup, html};

use crate::{
    AppState, Error,
    api_error::json_error,
    auth::{SESSION_COOKIE, TokenVerifier, UserId},
    html::{LINK_STYLE, PAGE_CONTAINER_STYLE, base},
};

/// The message sent to API clients without a valid session.
pub const AUTHENTICATION_REQUIRED: &str = "Authentication required.";

/// The state needed for the auth middleware
#[derive(Debug, Clone)]
pub struct AuthState {
    /// Verifies the session tokens issued by the identity provider.
    pub token_verifier: TokenVerifier,
    /// Where the identity provider's sign-in page lives, if configured.
    pub sign_in_url: Option<String>,
}

impl FromRef<AppState> for AuthState {
    fn from_ref(state: &AppState) -> Self {
        Self {
            token_verifier: state.token_verifier.clone(),
            sign_in_url: state.sign_in_url.clone(),
        }
    }
}

/// Find the session token, preferring a bearer `Authorization` header over the
/// session cookie, and verify it.
///
/// Other authorization schemes are ignored so that the cookie still applies.
fn get_session_user(
    state: &AuthState,
    headers: &HeaderMap,
    jar: &CookieJar,
) -> Result<UserId, Error> {
    let token = match headers.typed_get::<Authorization<Bearer>>() {
        Some(Authorization(bearer)) => bearer.token().to_owned(),
        None => jar
            .get(SESSION_COOKIE)
            .map(|cookie| cookie.value().to_owned())
            .ok_or(Error::MissingSessionToken)?,
    };

    state.token_verifier.verify(&token)
}

/// Middleware function that checks for a valid session token on API routes.
///
/// The user ID is placed into the request extensions and the request executed
/// normally if the token is valid, otherwise a 401 JSON error is returned.
///
/// **Note**: Route handlers can use the function argument `Extension(user_id): Extension<UserId>` to receive the user ID.
pub async fn api_auth_guard(
    State(state): State<AuthState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let session_user = get_session_user(&state, request.headers(), &jar);

    match session_user {
        Ok(user_id) => {
            request.extensions_mut().insert(user_id);
            next.run(request).await
        }
        Err(error) => {
            tracing::warn!("Rejected API request to {}: {error}", request.uri().path());
            json_error(StatusCode::UNAUTHORIZED, AUTHENTICATION_REQUIRED)
        }
    }
}

/// Middleware function that checks for a valid session token on pages.
///
/// Works like [api_auth_guard], but anonymous users get a page asking them to
/// sign in instead of a JSON error.
pub async fn page_auth_guard(
    State(state): State<AuthState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Response {
    let session_user = get_session_user(&state, request.headers(), &jar);

    match session_user {
        Ok(user_id) => {
            request.extensions_mut().insert(user_id);
            next.run(request).await
        }
        Err(error) => {
            tracing::info!("Showing sign in page for {}: {error}", request.uri().path());
            (
                StatusCode::UNAUTHORIZED,
                sign_in_required_view(state.sign_in_url.as_deref()),
            )
                .into_response()
        }
    }
}

fn sign_in_required_view(sign_in_url: Option<&str>) -> Markup {
    let content = html! {
        div class=(PAGE_CONTAINER_STYLE)
        {
            h1 class="text-3xl font-bold mb-4" { "Welcome to Shawlet" }

            p id="sign-in-prompt" class="text-xl mb-4"
            {
                "Please sign in to access your dashboard."
            }

            @if let Some(url) = sign_in_url {
                a href=(url) class=(LINK_STYLE) { "Sign in" }
            }
        }
    };

    base("Sign In", &[], &content)
}

#[cfg(test)]
mod auth_guard_tests {
    use axum::{Extension, Router, http::StatusCode, middleware, routing::get};
    use axum_test::TestServer;
    use scraper::{Html, Selector};

    use crate::{
        auth::{
            AUTHENTICATION_REQUIRED, AuthState, SESSION_COOKIE, TokenVerifier, UserId,
            api_auth_guard, page_auth_guard,
        },
        test_utils::{TEST_AUTH_SECRET, issue_session_token},
    };

    async fn echo_user(Extension(user_id): Extension<UserId>) -> String {
        user_id.to_string()
    }

    const TEST_API_ROUTE: &str = "/api/protected";
    const TEST_PAGE_ROUTE: &str = "/protected";

    fn get_test_server(sign_in_url: Option<&str>) -> TestServer {
        let state = AuthState {
            token_verifier: TokenVerifier::from_secret(TEST_AUTH_SECRET),
            sign_in_url: sign_in_url.map(ToOwned::to_owned),
        };

        let api = Router::new()
            .route(TEST_API_ROUTE, get(echo_user))
            .route_layer(middleware::from_fn_with_state(state.clone(), api_auth_guard));
        let pages = Router::new()
            .route(TEST_PAGE_ROUTE, get(echo_user))
            .route_layer(middleware::from_fn_with_state(state.clone(), page_auth_guard));

        let app = api.merge(pages).with_state(state);

        TestServer::try_new(app).expect("Could not create test server.")
    }

    #[tokio::test]
    async fn bearer_token_grants_access() {
        let server = get_test_server(None);
        let token = issue_session_token("user_1");

        let response = server
            .get(TEST_API_ROUTE)
            .add_header("authorization", format!("Bearer {token}"))
            .await;

        response.assert_status_ok();
        assert_eq!(response.text(), "user_1");
    }

    #[tokio::test]
    async fn session_cookie_grants_access() {
        let server = get_test_server(None);
        let token = issue_session_token("user_1");

        let response = server
            .get(TEST_PAGE_ROUTE)
            .add_header("cookie", format!("{SESSION_COOKIE}={token}"))
            .await;

        response.assert_status_ok();
        assert_eq!(response.text(), "user_1");
    }

    #[tokio::test]
    async fn bearer_token_takes_precedence_over_cookie() {
        let server = get_test_server(None);
        let bearer = issue_session_token("user_1");
        let cookie = issue_session_token("user_2");

        let response = server
            .get(TEST_API_ROUTE)
            .add_header("authorization", format!("Bearer {bearer}"))
            .add_header("cookie", format!("{SESSION_COOKIE}={cookie}"))
            .await;

        assert_eq!(response.text(), "user_1");
    }

    #[tokio::test]
    async fn other_authorization_scheme_falls_back_to_cookie() {
        let server = get_test_server(None);
        let token = issue_session_token("user_1");

        let response = server
            .get(TEST_API_ROUTE)
            .add_header("authorization", "Basic dXNlcjpwYXNz")
            .add_header("cookie", format!("{SESSION_COOKIE}={token}"))
            .await;

        response.assert_status_ok();
        assert_eq!(response.text(), "user_1");
    }

    #[tokio::test]
    async fn other_authorization_scheme_without_cookie_returns_json_401() {
        let server = get_test_server(None);

        let response = server
            .get(TEST_API_ROUTE)
            .add_header("authorization", "Basic dXNlcjpwYXNz")
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        let body: serde_json::Value = response.json();
        assert_eq!(body["error"], AUTHENTICATION_REQUIRED);
    }

    #[tokio::test]
    async fn malformed_authorization_on_page_shows_sign_in_prompt() {
        let server = get_test_server(None);

        let response = server
            .get(TEST_PAGE_ROUTE)
            .add_header("authorization", "Bearer")
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        let html = Html::parse_document(&response.text());
        let prompt = html
            .select(&Selector::parse("#sign-in-prompt").unwrap())
            .next();
        assert!(prompt.is_some(), "Could not find sign in prompt");
    }

    #[tokio::test]
    async fn api_without_token_returns_json_401() {
        let server = get_test_server(None);

        let response = server.get(TEST_API_ROUTE).await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        let body: serde_json::Value = response.json();
        assert_eq!(body["error"], AUTHENTICATION_REQUIRED);
    }

    #[tokio::test]
    async fn api_with_invalid_token_returns_json_401() {
        let server = get_test_server(None);

        let response = server
            .get(TEST_API_ROUTE)
            .add_header("authorization", "Bearer FOOBAR")
            .await;

        response.assert_status(StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn page_without_token_shows_sign_in_prompt() {
        let server = get_test_server(Some("https://accounts.example.com/sign-in"));

        let response = server.get(TEST_PAGE_ROUTE).await;

        response.assert_status(StatusCode::UNAUTHORIZED);
        let html = Html::parse_document(&response.text());
        let prompt = html
            .select(&Selector::parse("#sign-in-prompt").unwrap())
            .next()
            .expect("Could not find sign in prompt");
        assert_eq!(
            prompt.text().collect::<String>().trim(),
            "Please sign in to access your dashboard."
        );
        let link = html
            .select(&Selector::parse("a[href='https://accounts.example.com/sign-in']").unwrap())
            .next();
        assert!(link.is_some(), "Could not find sign in link");
    }
}
