use rusqlite::Connection;
use tokio::net::TcpListener;

use crate::{build_router, record::EmptyListPolicy, test_utils::test_app_state};

/// Serve the app on a random local port and return its base URL, e.g. "http://127.0.0.1:41234".
pub(crate) async fn spawn_test_server(empty_list_policy: EmptyListPolicy) -> String {
    let conn = Connection::open_in_memory().expect("Could not open database");
    let state = test_app_state(conn).with_empty_list_policy(empty_list_policy);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Could not bind test listener");
    let address = listener
        .local_addr()
        .expect("Could not get test listener address");

    tokio::spawn(async move {
        axum::serve(listener, build_router(state))
            .await
            .expect("Test server stopped unexpectedly");
    });

    format!("http://{address}")
}
