use std::fs;
use std::sync::Arc;
use std::thread;

use figment::providers::{Format, Serialized, Toml};
use figment::{Figment, Jail};
use tempfile::TempDir;

use webqa_core::config::{expand_path, AppConfig, Config};
use webqa_core::store::ContentStore;

#[test]
fn empty_figment_yields_defaults() {
    let config = Config::from_figment(Figment::new());
    let app = config.app().expect("defaults");
    assert_eq!(app, AppConfig::default());
    assert_eq!(app.default.max_chunk_chars, 5000);
    assert_eq!(app.universal_encoder.chunk_sentences, 3);
    assert_eq!(app.sentence_transformer.chunk_sentences, 5);
    assert_eq!(app.distilbert.max_chunk_words, 512);
}

#[test]
fn toml_file_overrides_selected_keys() {
    let tmp = TempDir::new().unwrap();
    let path = tmp.path().join("config.toml");
    fs::write(
        &path,
        "use_fake_embeddings = true\n[default]\nmax_chunk_chars = 800\n[models]\nspan_model_dir = \"/opt/qa\"\n",
    )
    .unwrap();

    let figment = Figment::from(Serialized::defaults(AppConfig::default())).merge(Toml::file(&path));
    let app = Config::from_figment(figment).app().expect("config");
    assert!(app.use_fake_embeddings);
    assert_eq!(app.default.max_chunk_chars, 800);
    assert_eq!(app.default.min_sentence_chars, 5, "untouched keys keep defaults");
    assert_eq!(app.models.span_model_path(), std::path::PathBuf::from("/opt/qa"));
}

#[test]
fn zero_bounds_are_rejected() {
    let figment = Figment::new().merge(Toml::string("[universal_encoder]\ntop_chunks = 0\n"));
    let err = Config::from_figment(figment).app().unwrap_err();
    assert!(err.to_string().contains("top_chunks"), "{err}");
}

#[test]
fn get_reads_nested_keys() {
    let figment = Figment::new().merge(Toml::string("[summary]\nmax_sentences = 2\n"));
    let config = Config::from_figment(figment);
    let n: usize = config.get("summary.max_sentences").expect("key");
    assert_eq!(n, 2);
    assert!(config.get::<usize>("summary.missing").is_err());
}

#[test]
fn load_layers_env_vars_over_config_file() {
    Jail::expect_with(|jail| {
        jail.set_env("RUST_ENV", "dev");
        jail.create_file("config.toml", "[default]\nmax_chunk_chars = 800\n[summary]\nmax_sentences = 2\n")?;
        jail.set_env("APP_USE_FAKE_EMBEDDINGS", "1");
        jail.set_env("APP_SUMMARY__MAX_SENTENCES", "7");
        jail.set_env("APP_MODELS__SPAN_MODEL_DIR", "/opt/qa");

        let config = Config::load().map_err(|e| e.to_string())?;
        let app = config.app().map_err(|e| e.to_string())?;
        assert!(app.use_fake_embeddings);
        assert_eq!(app.default.max_chunk_chars, 800);
        assert_eq!(app.summary.max_sentences, 7);
        assert_eq!(app.models.span_model_dir, "/opt/qa");
        assert!(config.get::<bool>("use_fake_embeddings").map_err(|e| e.to_string())?);
        Ok(())
    });
}

#[test]
fn fake_embeddings_from_env_are_refused_in_production() {
    Jail::expect_with(|jail| {
        jail.set_env("RUST_ENV", "production");
        jail.set_env("APP_USE_FAKE_EMBEDDINGS", "true");
        let err = Config::load().err().ok_or("production config with fake embeddings loaded")?;
        assert!(err.to_string().contains("production"), "{err}");
        Ok(())
    });
}

#[test]
fn expand_path_leaves_plain_paths_alone() {
    assert_eq!(expand_path("models/bert"), std::path::PathBuf::from("models/bert"));
}

#[test]
fn content_store_last_write_wins() {
    let store = Arc::new(ContentStore::new());
    store.insert("https://a.example", "first");
    store.insert("https://a.example", "second");
    assert_eq!(store.get("https://a.example").as_deref(), Some("second"));
    assert_eq!(store.len(), 1);

    let handles: Vec<_> = (0..4)
        .map(|i| {
            let store = Arc::clone(&store);
            thread::spawn(move || store.insert(format!("https://{i}.example"), format!("page {i}")))
        })
        .collect();
    for h in handles { h.join().unwrap(); }

    assert_eq!(store.len(), 5);
    assert!(store.contains("https://3.example"));
    assert_eq!(store.urls().first().map(String::as_str), Some("https://0.example"));
}
