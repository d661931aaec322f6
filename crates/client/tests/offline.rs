//! End-to-end worker tests over real HTTP against wiremock servers.

use std::sync::Arc;
use std::time::Duration;

use transit_client::{FetchClient, FetchConfig, LifecycleState, Network, Worker, WorkerConfig};
use transit_core::{CacheDb, CacheStorage, CacheVersion, Error, Request, ResponseSource, ShellManifest};
use url::Url;
use wiremock::matchers::{body_string, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn mount_shell(server: &MockServer) {
    for (route, body) in [
        ("/", "<html>root</html>"),
        ("/index.html", "<html><script src=\"/app.js\"></script></html>"),
        ("/manifest.json", r#"{"name":"Chat Transit","start_url":"/"}"#),
    ] {
        Mock::given(method("GET"))
            .and(path(route))
            .respond_with(ResponseTemplate::new(200).set_body_string(body))
            .mount(server)
            .await;
    }
}

/// Shut a mock server down and wait until its port refuses connections.
async fn take_offline(server: MockServer) {
    let addr = *server.address();
    drop(server);
    for _ in 0..100 {
        if tokio::net::TcpStream::connect(addr).await.is_err() {
            // let the server runtime close connections it already accepted
            tokio::time::sleep(Duration::from_millis(50)).await;
            return;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    panic!("{addr} still accepting connections");
}

fn worker(origin: &str, version: &str, storage: Arc<dyn CacheStorage>) -> Worker {
    let config = WorkerConfig {
        origin: Url::parse(origin).expect("origin"),
        version: CacheVersion::new("transit", version),
        shell: ShellManifest::new(["/", "/index.html", "/manifest.json"]),
        network_only_routes: vec!["/api/*".into(), "/health".into()],
        refresh_shell_in_background: false,
    };
    let network = FetchClient::new(FetchConfig::default()).expect("client");
    Worker::new(config, storage, Arc::new(network)).expect("worker")
}

#[tokio::test]
async fn test_install_activate_and_passthrough() {
    let server = MockServer::start().await;
    mount_shell(&server).await;
    Mock::given(method("GET"))
        .and(path("/health"))
        .respond_with(ResponseTemplate::new(200).set_body_string("ok"))
        .expect(2)
        .mount(&server)
        .await;

    let storage: Arc<dyn CacheStorage> = Arc::new(CacheDb::open_in_memory().await.expect("db"));

    let old = worker(&server.uri(), "v0", storage.clone());
    old.on_install().await.expect("install v0");
    old.on_activate().await.expect("activate v0");

    let current = worker(&server.uri(), "v1", storage.clone());
    let installed = current.on_install().await.expect("install v1");
    assert_eq!(installed.namespace, "transit-v1");

    let mut urls: Vec<String> =
        current.store().identities().await.expect("identities").into_iter().map(|i| i.url).collect();
    urls.sort();
    let base = server.uri();
    assert_eq!(urls, vec![format!("{base}/"), format!("{base}/index.html"), format!("{base}/manifest.json")]);

    let activated = current.on_activate().await.expect("activate v1");
    assert_eq!(activated.deleted, vec!["transit-v0".to_string()]);
    let names: Vec<String> = storage.namespaces().await.expect("namespaces").into_iter().map(|n| n.name).collect();
    assert_eq!(names, vec!["transit-v1".to_string()]);

    for _ in 0..2 {
        let response = current.request("GET", "/health").await.expect("health");
        assert_eq!(response.text(), "ok");
        assert_eq!(response.source, ResponseSource::Network);
    }
    current.flush().await;
    assert_eq!(current.store().identities().await.expect("identities").len(), 3);
}

#[tokio::test]
async fn test_shell_served_after_origin_goes_away() {
    let server = MockServer::builder().start().await;
    mount_shell(&server).await;
    let origin = server.uri();

    let storage: Arc<dyn CacheStorage> = Arc::new(CacheDb::open_in_memory().await.expect("db"));
    let worker = worker(&origin, "v1", storage);
    worker.boot().await.expect("boot");
    assert_eq!(worker.state().await, LifecycleState::Active);

    take_offline(server).await;

    let response = worker.request("GET", "/index.html").await.expect("cached shell");
    assert_eq!(response.status, 200);
    assert_eq!(response.text(), "<html><script src=\"/app.js\"></script></html>");
    assert_eq!(response.source, ResponseSource::Cache);

    let err = worker.request("GET", "/api/status").await.unwrap_err();
    assert!(err.is_network_failure(), "unexpected error: {err}");
}

#[tokio::test]
async fn test_cross_origin_fallback_over_http() {
    let app = MockServer::start().await;
    mount_shell(&app).await;
    let cdn = MockServer::builder().start().await;
    Mock::given(method("GET"))
        .and(path("/font.woff2"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0u8, 1, 2, 3]))
        .mount(&cdn)
        .await;
    let font = format!("{}/font.woff2", cdn.uri());

    let storage: Arc<dyn CacheStorage> = Arc::new(CacheDb::open_in_memory().await.expect("db"));
    let worker = worker(&app.uri(), "v1", storage);
    worker.boot().await.expect("boot");

    let live = worker.request("GET", &font).await.expect("live");
    assert_eq!(live.source, ResponseSource::Network);
    worker.flush().await;

    take_offline(cdn).await;

    let cached = worker.request("GET", &font).await.expect("fallback");
    assert_eq!(cached.source, ResponseSource::Cache);
    assert_eq!(&cached.body[..], &[0u8, 1, 2, 3]);
}

#[tokio::test]
async fn test_malformed_header_is_not_masked_by_cache() {
    let app = MockServer::start().await;
    mount_shell(&app).await;
    let cdn = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/lib.js"))
        .respond_with(ResponseTemplate::new(200).set_body_string("lib"))
        .mount(&cdn)
        .await;
    let lib = Url::parse(&format!("{}/lib.js", cdn.uri())).expect("url");

    let storage: Arc<dyn CacheStorage> = Arc::new(CacheDb::open_in_memory().await.expect("db"));
    let worker = worker(&app.uri(), "v1", storage);
    worker.boot().await.expect("boot");

    worker.on_request(Request::get(lib.clone())).await.expect("warm");
    worker.flush().await;

    let err = worker
        .on_request(Request::get(lib.clone()).with_header("bad header\n", "v"))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)), "unexpected error: {err}");

    let api = worker.resolve("/api/status").expect("url");
    let err = worker.on_request(Request::get(api).with_header("x-id", "a\rb")).await.unwrap_err();
    assert!(matches!(err, Error::InvalidInput(_)), "unexpected error: {err}");
}

#[tokio::test]
async fn test_post_forwarded_verbatim() {
    let server = MockServer::start().await;
    mount_shell(&server).await;
    let payload = r#"{"url":"https://chat.example/share/abc"}"#;
    Mock::given(method("POST"))
        .and(path("/api/convert"))
        .and(header("content-type", "application/json"))
        .and(body_string(payload))
        .respond_with(ResponseTemplate::new(200).set_body_string("converted"))
        .expect(1)
        .mount(&server)
        .await;

    let storage: Arc<dyn CacheStorage> = Arc::new(CacheDb::open_in_memory().await.expect("db"));
    let worker = worker(&server.uri(), "v1", storage);
    worker.boot().await.expect("boot");

    let url = worker.resolve("/api/convert").expect("url");
    let request = Request::new("POST", url).with_header("content-type", "application/json").with_body(payload);
    let response = worker.on_request(request).await.expect("convert");

    assert_eq!(response.text(), "converted");
    assert_eq!(worker.store().identities().await.expect("identities").len(), 3);
}

#[tokio::test]
async fn test_fetch_client_limits() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/big"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![b'x'; 2048]))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(ResponseTemplate::new(200).set_delay(Duration::from_secs(2)))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(410))
        .mount(&server)
        .await;

    let client = FetchClient::new(FetchConfig {
        max_bytes: 1024,
        timeout: Duration::from_millis(200),
        ..FetchConfig::default()
    })
    .expect("client");
    let url = |p: &str| Url::parse(&format!("{}{p}", server.uri())).expect("url");

    let err = client.fetch(&Request::get(url("/big"))).await.unwrap_err();
    assert!(matches!(err, Error::FetchTooLarge(_)), "unexpected error: {err}");

    let err = client.fetch(&Request::get(url("/slow"))).await.unwrap_err();
    assert!(matches!(err, Error::FetchTimeout(_)), "unexpected error: {err}");

    let response = client.fetch(&Request::get(url("/gone"))).await.expect("status is a response");
    assert_eq!(response.status, 410);
}
