#![allow(missing_docs)]

pub(crate) mod auth;
pub(crate) mod form;
pub(crate) mod html;
pub(crate) mod http;
pub(crate) mod server;

pub(crate) use auth::{TEST_AUTH_SECRET, bearer, issue_session_token, test_app_state};
pub(crate) use form::{assert_form_input, assert_form_select, must_get_form};
pub(crate) use html::{assert_valid_html, parse_html_document, parse_html_fragment};
pub(crate) use http::{assert_hx_redirect, parse_json, parse_text};
pub(crate) use server::spawn_test_server;
