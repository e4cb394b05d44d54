//! Shared integration-test server bootstrap helpers.

use axum_test::TestServer;
use burnpaste_server::{create_app, AppState, Config, MemoryStore, PasteService, PasteStore};
use std::sync::Arc;

pub(crate) fn test_config() -> Config {
    Config {
        port: 0,
        max_paste_size: 64 * 1024,
        purge_interval_secs: 0,
        test_mode: true,
        ..Config::default()
    }
}

pub(crate) fn test_server_for_store(config: Config, store: Arc<dyn PasteStore>) -> TestServer {
    let service = PasteService::new(store).with_max_paste_size(config.max_paste_size);
    let app = create_app(AppState::new(config, service));
    TestServer::new(app).expect("server")
}

pub(crate) fn setup_test_server() -> (TestServer, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::default());
    let server = test_server_for_store(test_config(), store.clone());
    (server, store)
}
