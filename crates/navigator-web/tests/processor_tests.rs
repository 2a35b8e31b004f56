use std::fs;

use navigator_core::settings::ProcessorSettings;
use navigator_web::WebPageProcessor;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

/// Serve `routes` (path, status, body) over plain HTTP/1.1 until the test ends.
async fn serve(routes: Vec<(&'static str, u16, String)>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        loop {
            let Ok((mut socket, _)) = listener.accept().await else { return };
            let routes = routes.clone();
            tokio::spawn(async move {
                let mut buf = vec![0u8; 8192];
                let n = socket.read(&mut buf).await.unwrap_or(0);
                let request = String::from_utf8_lossy(&buf[..n]);
                let path = request.split_whitespace().nth(1).unwrap_or("/").to_string();
                let (status, body) = routes
                    .iter()
                    .find(|(p, _, _)| *p == path)
                    .map(|(_, s, b)| (*s, b.clone()))
                    .unwrap_or((404, "missing".to_string()));
                let response = format!(
                    "HTTP/1.1 {status} X\r\nContent-Type: text/html; charset=utf-8\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                    body.len()
                );
                let _ = socket.write_all(response.as_bytes()).await;
            });
        }
    });
    format!("http://{addr}")
}

fn page(title: &str, body: &str) -> String {
    format!("<html><head><title>{title}</title></head><body><p>{body}</p></body></html>")
}

#[tokio::test]
async fn fetched_pages_are_chunked_in_url_order() {
    let long_body = (0..200).map(|i| format!("навык{i}")).collect::<Vec<_>>().join(" ");
    let base = serve(vec![
        ("/analytics", 200, page("Аналитик данных", &long_body)),
        ("/docker", 200, page("Docker", "Контейнеры и оркестрация")),
    ])
    .await;

    let processor = WebPageProcessor::new(&ProcessorSettings::default()).expect("processor");
    let urls = vec![format!("{base}/analytics"), format!("{base}/docker")];
    let chunks = processor.process(&urls).await.expect("process");

    assert!(chunks.len() >= 3, "long page splits into several chunks");
    let last = chunks.last().unwrap();
    assert!(last.starts_with("Page name:\nDocker\n"));
    assert!(last.contains(&format!("Page source:\n{base}/docker\n")));
    assert!(chunks[..chunks.len() - 1].iter().all(|c| c.starts_with("Page name:\nАналитик данных\n")));
    assert!(chunks[0].contains("Page content:\nнавык0 "));
}

#[tokio::test]
async fn failing_pages_are_skipped() {
    let base = serve(vec![("/ok", 200, page("OK", "fine")), ("/broken", 500, "boom".to_string())]).await;
    let processor = WebPageProcessor::new(&ProcessorSettings::default()).expect("processor");
    let urls = vec![format!("{base}/broken"), format!("{base}/gone"), format!("{base}/ok")];

    let chunks = processor.process(&urls).await.expect("process");
    assert_eq!(chunks.len(), 1);
    assert!(chunks[0].contains("Page content:\nfine\n"));
}

#[tokio::test]
async fn no_urls_means_no_chunks() {
    let processor = WebPageProcessor::new(&ProcessorSettings::default()).expect("processor");
    assert!(processor.process(&[]).await.expect("process").is_empty());
}

#[test]
fn saved_pages_are_read_from_disk() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("a_ml.html"), page("ML Start", "Машинное обучение с нуля")).unwrap();
    fs::write(tmp.path().join("b_notes.txt"), "plain notes").unwrap();
    fs::write(tmp.path().join("c_image.png"), [0u8, 1, 2]).unwrap();

    let processor = WebPageProcessor::new(&ProcessorSettings::default()).expect("processor");
    let chunks = processor.process_dir(tmp.path()).expect("process_dir");

    assert_eq!(chunks.len(), 2);
    assert!(chunks[0].starts_with("Page name:\nML Start\n"));
    assert!(chunks[0].ends_with("Page content:\nМашинное обучение с нуля\n"));
    assert!(chunks[1].starts_with("Page name:\nb_notes\n"));
}
