//! Local mock provider for HTTP tests
//!
//! The client is blocking, so the mock runs on its own tokio runtime in a
//! background thread and tests stay plain `#[test]` functions.

use std::net::SocketAddr;
use std::time::Duration;

use crate::client::{Endpoints, OAuthClient};

/// Serve `app` on an ephemeral localhost port and return its base URL.
///
/// The server thread lives until the test process exits.
pub(crate) fn serve(app: axum::Router) -> String {
    let (tx, rx) = std::sync::mpsc::channel::<SocketAddr>();
    std::thread::spawn(move || {
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        runtime.block_on(async move {
            let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
            tx.send(listener.local_addr().unwrap()).unwrap();
            axum::serve(listener, app).await.unwrap();
        });
    });
    let addr = rx.recv().unwrap();
    format!("http://{addr}")
}

/// A server that accepts connections and never answers.
pub(crate) fn hanging_server() -> String {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();
    std::thread::spawn(move || {
        let mut held = Vec::new();
        for stream in listener.incoming() {
            match stream {
                Ok(stream) => held.push(stream),
                Err(_) => break,
            }
        }
    });
    format!("http://{addr}")
}

/// Provider endpoint paths rooted at `base`.
pub(crate) fn endpoints_at(base: &str) -> Endpoints {
    Endpoints {
        authorize: format!("{base}/oauth2.0/authorize"),
        token: format!("{base}/oauth2.0/token"),
        user_info: format!("{base}/2/users/show.json"),
    }
}

/// Client with test credentials pointed at a mock provider.
pub(crate) fn client_against(base: &str) -> OAuthClient {
    OAuthClient::builder(
        "101234567",
        "qq-app-secret",
        "https://example.com/oauth/callback",
    )
    .endpoints(endpoints_at(base))
    .timeout(Duration::from_secs(5))
    .build()
    .unwrap()
}
