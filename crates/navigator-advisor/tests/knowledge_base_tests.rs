use std::fs;

use navigator_advisor::KnowledgeBase;
use navigator_core::settings::Settings;
use navigator_embed::FakeEmbedder;
use navigator_vector::VectorStore;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

async fn serve_page(title: &'static str, body: &'static str) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else { return };
            let mut buf = [0u8; 4096];
            let _ = socket.read(&mut buf).await;
            let html = format!("<html><head><title>{title}</title></head><body><p>{body}</p></body></html>");
            let response = format!(
                "HTTP/1.1 200 OK\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{html}",
                html.len()
            );
            let _ = socket.write_all(response.as_bytes()).await;
        }
    });
    format!("http://{addr}/docker")
}

fn settings_in(dir: &TempDir) -> Settings {
    let mut settings = Settings::default();
    settings.store.path = dir.path().join("store").to_string_lossy().to_string();
    settings.embedding.batch_size = 2;
    settings
}

#[tokio::test]
async fn first_start_builds_and_saves_then_reuses() {
    let tmp = TempDir::new().unwrap();
    let url = serve_page("Docker", "Контейнеры, образы и docker compose для аналитиков").await;
    let mut settings = settings_in(&tmp);
    settings.courses.urls = vec![url];
    let embedder = FakeEmbedder::new(32);

    let built = KnowledgeBase::new(&settings, &embedder).open_or_build().await.expect("build");
    assert_eq!(built.len(), 1);
    assert!(built.texts()[0].starts_with("Page name:\nDocker\n"));
    assert!(VectorStore::exists(settings.store.path_prefix()));

    // Second start must not touch the network.
    settings.courses.urls = vec!["http://127.0.0.1:9/unreachable".into()];
    let reopened = KnowledgeBase::new(&settings, &embedder).open_or_build().await.expect("reopen");
    assert_eq!(reopened.texts(), built.texts());
}

#[tokio::test]
async fn nothing_loaded_is_an_error_and_nothing_is_saved() {
    let tmp = TempDir::new().unwrap();
    let mut settings = settings_in(&tmp);
    settings.courses.urls = vec!["http://127.0.0.1:9/unreachable".into()];
    settings.processor.timeout_secs = 2;
    let embedder = FakeEmbedder::new(8);

    let err = KnowledgeBase::new(&settings, &embedder).open_or_build().await.expect_err("no pages");
    assert!(err.to_string().contains("no course content"));
    assert!(!VectorStore::exists(settings.store.path_prefix()));
}

#[test]
fn chunks_are_embedded_in_batches() {
    let tmp = TempDir::new().unwrap();
    let settings = settings_in(&tmp);
    let embedder = FakeEmbedder::new(16);
    let chunks: Vec<String> = (0..5).map(|i| format!("chunk number {i}")).collect();

    let mut seen = Vec::new();
    let store = KnowledgeBase::new(&settings, &embedder)
        .build_from_chunks(&chunks, |done, total| seen.push((done, total)))
        .expect("build");

    assert_eq!(store.texts(), chunks.as_slice());
    assert_eq!(seen, vec![(2, 5), (4, 5), (5, 5)]);
}

#[test]
fn saved_pages_build_a_store() {
    let tmp = TempDir::new().unwrap();
    let pages = tmp.path().join("pages");
    fs::create_dir(&pages).unwrap();
    fs::write(pages.join("sql.html"), "<title>SQL</title><p>Симулятор SQL</p>").unwrap();
    let settings = settings_in(&tmp);
    let embedder = FakeEmbedder::new(16);

    let kb = KnowledgeBase::new(&settings, &embedder);
    let store = kb.build_from_dir(&pages, |_, _| {}).expect("build");
    kb.save(&store).expect("save");

    let loaded = VectorStore::open(settings.store.path_prefix(), 16).expect("open");
    assert_eq!(loaded.texts(), store.texts());
    assert!(loaded.texts()[0].contains("Page content:\nСимулятор SQL\n"));
}

#[tokio::test]
async fn batches_embed_on_a_current_thread_runtime() {
    let tmp = TempDir::new().unwrap();
    let settings = settings_in(&tmp);
    let embedder = FakeEmbedder::new(8);
    let chunks: Vec<String> = (0..3).map(|i| format!("chunk {i}")).collect();

    let store = KnowledgeBase::new(&settings, &embedder).build_from_chunks(&chunks, |_, _| {}).expect("build");
    assert_eq!(store.len(), 3);
}
