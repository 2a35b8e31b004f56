use std::fs;

use figment::Jail;
use tempfile::TempDir;

use navigator_core::config::{expand_path, Config};
use navigator_core::data_processor::{list_files_with_extensions, ChunkingConfig, DataProcessor};
use navigator_core::types::PageDocument;

fn long_text(words: usize) -> String {
    (0..words).map(|i| format!("word{i}")).collect::<Vec<_>>().join(" ")
}

#[test]
fn split_respects_chunk_size_and_keeps_every_word() {
    let processor = DataProcessor::new().expect("processor");
    let text = long_text(300);
    let chunks = processor.split_text(&text);

    assert!(chunks.len() >= 3, "~2.4k characters need several 500-char chunks, got {}", chunks.len());
    for c in &chunks {
        assert!(c.chars().count() <= 500, "chunk longer than 500 chars: {}", c.chars().count());
    }
    for i in 0..300 {
        let w = format!("word{i}");
        assert!(chunks.iter().any(|c| c.split_whitespace().any(|t| t == w)), "{w} lost during split");
    }
    // split order follows document order
    assert!(chunks[0].starts_with("word0"));
}

#[test]
fn short_document_becomes_one_labelled_chunk() {
    let processor = DataProcessor::with_config(ChunkingConfig { chunk_size: 200, chunk_overlap: 20 })
        .expect("processor");
    let doc = PageDocument {
        title: Some("Аналитик данных".into()),
        source: "https://karpov.courses/analytics".into(),
        content: "Short text".into(),
    };
    let chunks = processor.chunk_document(&doc);
    assert_eq!(chunks.len(), 1);
    assert_eq!(
        chunks[0],
        "Page name:\nАналитик данных\nPage source:\nhttps://karpov.courses/analytics\nPage content:\nShort text\n"
    );
}

#[test]
fn chunk_documents_preserves_document_order() {
    let processor = DataProcessor::new().expect("processor");
    let docs = vec![
        PageDocument { title: Some("A".into()), source: "a".into(), content: "alpha bravo".into() },
        PageDocument { title: Some("B".into()), source: "b".into(), content: "charlie delta".into() },
    ];
    let chunks = processor.chunk_documents(&docs);
    assert_eq!(chunks.len(), 2);
    assert!(chunks[0].contains("alpha bravo"));
    assert!(chunks[1].contains("charlie delta"));
}

#[test]
fn list_files_filters_and_sorts() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    fs::create_dir(dir.join("nested")).unwrap();
    fs::write(dir.join("b.html"), "<p>b</p>").unwrap();
    fs::write(dir.join("nested").join("a.TXT"), "a").unwrap();
    fs::write(dir.join("c.pdf"), "skip").unwrap();

    let files = list_files_with_extensions(dir, &["html", "txt"]).expect("list");
    assert_eq!(files.len(), 2);
    assert!(files[0].ends_with("b.html"));
    assert!(files[1].ends_with("nested/a.TXT"));

    assert!(list_files_with_extensions(&dir.join("missing"), &["txt"]).is_err());
}

#[test]
fn plain_paths_are_left_alone() {
    assert_eq!(expand_path("plain/path"), std::path::PathBuf::from("plain/path"));
}

#[test]
fn config_merges_toml_and_app_env() {
    Jail::expect_with(|jail| {
        jail.create_file(
            "config.toml",
            r#"
            [store]
            path = "var/store"

            [retrieval]
            top_k = 3

            [courses]
            urls = ["https://karpov.courses/analytics"]
            "#,
        )?;
        jail.create_file("config.test.toml", "[llm]\nmodel = \"test-model\"\n")?;
        jail.set_env("APP_RETRIEVAL__TOP_K", "7");

        let config = Config::load_for_env("test").map_err(|e| e.to_string())?;
        let settings = config.settings().map_err(|e| e.to_string())?;
        assert_eq!(settings.store.path, "var/store");
        assert_eq!(settings.retrieval.top_k, 7);
        assert_eq!(settings.llm.model, "test-model");
        assert_eq!(settings.courses.urls, vec!["https://karpov.courses/analytics".to_string()]);
        // untouched sections keep their defaults
        assert_eq!(settings.processor.chunk_size, 500);

        let top_k: usize = config.get("retrieval.top_k").map_err(|e| e.to_string())?;
        assert_eq!(top_k, 7);
        Ok(())
    });
}

#[test]
fn legacy_openai_variables_are_honoured() {
    Jail::expect_with(|jail| {
        jail.set_env("OPENAI_API_KEY", "sk-test");
        jail.set_env("OPENAI_BASE_URL", "http://localhost:9999/v1");
        jail.set_env("OPENAI_MODEL", "local-model");
        jail.set_env("VECTOR_STORE_PATH", "legacy/store");

        let settings = Config::load_for_env("test")
            .and_then(|c| c.settings())
            .map_err(|e| e.to_string())?;
        assert_eq!(settings.llm.api_key.as_deref(), Some("sk-test"));
        assert_eq!(settings.llm.base_url, "http://localhost:9999/v1");
        assert_eq!(settings.llm.model, "local-model");
        assert_eq!(settings.store.path, "legacy/store");
        Ok(())
    });
}

#[test]
fn invalid_values_fail_settings_extraction() {
    Jail::expect_with(|jail| {
        jail.create_file("config.toml", "[processor]\nchunk_size = 100\nchunk_overlap = 150\n")?;
        let config = Config::load_for_env("dev").map_err(|e| e.to_string())?;
        assert!(config.settings().is_err(), "overlap larger than chunk size must be rejected");
        Ok(())
    });
}

#[test]
fn production_refuses_fake_embeddings() {
    Jail::expect_with(|jail| {
        jail.create_file("config.prod.toml", "[embedding]\nfake = true\n")?;
        assert!(Config::load_for_env("prod").is_err());
        assert!(Config::load_for_env("dev").is_ok());
        Ok(())
    });
}
