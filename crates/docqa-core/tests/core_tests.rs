use std::fs;
use std::io::Write;
use tempfile::TempDir;

use docqa_core::chunking::RecursiveSplitter;
use docqa_core::config::{expand_path, Config, Metric, Settings, Tokenization};
use docqa_core::data_processor::DataProcessor;
use docqa_core::types::ChunkStore;
use docqa_core::Error;
use figment::providers::{Format, Serialized, Toml};
use figment::Figment;

fn processor() -> DataProcessor { DataProcessor::new(RecursiveSplitter::new(1000, 150).expect("splitter")) }

#[test]
fn chunk_store_indexes_and_canonical_positions() {
    let store = ChunkStore::new(["alpha", "beta", "alpha", "gamma"]);
    assert_eq!(store.size(), 4);
    assert_eq!(store.get(1), Some("beta"));
    assert_eq!(store.get(4), None);
    assert_eq!(store.canonical(2), 0, "duplicate text maps to its first position");
    assert_eq!(store.canonical(3), 3);
    assert_eq!(store.first_index_of("gamma"), Some(3));
    assert_eq!(store.first_index_of("delta"), None);
    assert_eq!(store.distinct(), 3);
    let indices: Vec<usize> = store.iter().map(|c| c.index).collect();
    assert_eq!(indices, vec![0, 1, 2, 3]);
}

#[test]
fn splitter_merges_words_up_to_chunk_size() {
    let splitter = RecursiveSplitter::new(10, 3).expect("splitter");
    assert_eq!(splitter.split_text("aaaa bbbb cccc dddd"), vec!["aaaa bbbb", "cccc dddd"]);
}

#[test]
fn splitter_carries_overlap_into_next_chunk() {
    let splitter = RecursiveSplitter::new(10, 5).expect("splitter");
    assert_eq!(splitter.split_text("aaaa bbbb cccc dddd"), vec!["aaaa bbbb", "bbbb cccc", "cccc dddd"]);
}

#[test]
fn splitter_prefers_paragraph_breaks() {
    let splitter = RecursiveSplitter::new(12, 0).expect("splitter");
    let chunks = splitter.split_text("first para\n\nsecond one\n\nthird");
    assert_eq!(chunks, vec!["first para", "second one", "third"]);
}

#[test]
fn splitter_falls_back_to_characters_for_long_words() {
    let splitter = RecursiveSplitter::new(4, 0).expect("splitter");
    assert_eq!(splitter.split_text("abcdefghij"), vec!["abcd", "efgh", "ij"]);
}

#[test]
fn splitter_counts_characters_not_bytes() {
    let splitter = RecursiveSplitter::new(3, 0).expect("splitter");
    assert_eq!(splitter.split_text("ééé"), vec!["ééé"]);
}

#[test]
fn splitter_rejects_overlap_larger_than_size() {
    assert!(matches!(RecursiveSplitter::new(10, 11), Err(Error::InvalidConfig(_))));
    assert!(matches!(RecursiveSplitter::new(0, 0), Err(Error::InvalidConfig(_))));
}

#[test]
fn process_directory_single_small_file() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    let mut f = fs::File::create(dir.join("a.txt")).unwrap();
    writeln!(f, "Short text").unwrap();

    let store = processor().process_directory(dir).expect("process");

    assert_eq!(store.size(), 1, "one small document becomes one chunk");
    assert_eq!(store.get(0), Some("Short text"));
}

#[test]
fn process_directory_skips_blank_and_unsupported_files() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    fs::write(dir.join("a.txt"), "alpha bravo").unwrap();
    fs::write(dir.join("b.txt"), "   \n  ").unwrap();
    fs::write(dir.join("c.bin"), "charlie delta").unwrap();
    fs::write(dir.join("d.MD"), "echo foxtrot").unwrap();

    let docs = processor().load_directory(dir).expect("load");
    let names: Vec<String> = docs.iter().map(|d| d.path.file_name().unwrap().to_string_lossy().to_string()).collect();
    assert_eq!(names, vec!["a.txt", "d.MD"]);

    let store = processor().process_directory(dir).expect("process");
    assert_eq!(store.texts(), vec!["alpha bravo\n\necho foxtrot".to_string()]);
}

#[test]
fn process_directory_without_text_is_an_ingestion_error() {
    let tmp = TempDir::new().unwrap();
    fs::write(tmp.path().join("empty.txt"), "").unwrap();
    assert!(matches!(processor().process_directory(tmp.path()), Err(Error::Ingestion(_))));
    assert!(matches!(processor().process_directory(&tmp.path().join("missing")), Err(Error::Ingestion(_))));
}

#[test]
fn process_texts_rejects_whitespace_only_batches() {
    let texts = vec![" ".to_string(), "\n\n".to_string()];
    assert!(matches!(processor().process_texts(&texts), Err(Error::Ingestion(_))));
}

#[test]
fn settings_defaults_match_reference_deployment() {
    let settings = Settings::default();
    assert_eq!(settings.chunking.chunk_size, 1000);
    assert_eq!(settings.chunking.chunk_overlap, 150);
    assert_eq!(settings.retrieval.k, 3);
    assert_eq!(settings.lexical.tokenization, Tokenization::Whitespace);
    assert_eq!(settings.dense.metric, Metric::L2);
    assert_eq!(settings.embedding.dim, 384);
}

#[test]
fn settings_merge_toml_over_defaults() {
    let figment = Figment::from(Serialized::defaults(Settings::default())).merge(Toml::string(
        r#"
        [retrieval]
        k = 5

        [lexical]
        tokenization = "analyzed"

        [dense]
        metric = "cosine"
        "#,
    ));
    let settings = Config::from_figment(figment).settings().expect("settings");
    assert_eq!(settings.retrieval.k, 5);
    assert_eq!(settings.retrieval.cache_capacity, 256);
    assert_eq!(settings.lexical.tokenization, Tokenization::Analyzed);
    assert_eq!(settings.dense.metric, Metric::Cosine);
    assert_eq!(settings.chunking.chunk_size, 1000);
}

#[test]
fn config_get_reads_single_keys() {
    let figment = Figment::from(Serialized::defaults(Settings::default())).merge(Toml::string("[storage]\nupload_dir = \"docs\"\n"));
    let config = Config::from_figment(figment);
    assert_eq!(config.get::<String>("storage.upload_dir").expect("key"), "docs");
    assert_eq!(config.get::<usize>("retrieval.k").expect("key"), 3);
    assert!(config.get::<usize>("retrieval.missing").is_err());
}

#[test]
fn expand_path_substitutes_environment_variables() {
    std::env::set_var("DOCQA_TEST_ROOT", "/srv/docqa");
    assert_eq!(expand_path("${DOCQA_TEST_ROOT}/uploads"), std::path::PathBuf::from("/srv/docqa/uploads"));
    assert_eq!(expand_path("plain/dir"), std::path::PathBuf::from("plain/dir"));
}

#[test]
fn settings_validation_rejects_bad_chunking() {
    let figment = Figment::from(Serialized::defaults(Settings::default())).merge(Toml::string(
        r#"
        [chunking]
        chunk_size = 100
        chunk_overlap = 200
        "#,
    ));
    assert!(matches!(Config::from_figment(figment).settings(), Err(Error::InvalidConfig(_))));
}

#[test]
fn empty_snapshot_path_disables_persistence() {
    let mut settings = Settings::default();
    assert!(settings.storage.snapshot_path().is_some());
    settings.storage.snapshot_path = "  ".into();
    assert!(settings.storage.snapshot_path().is_none());
}
