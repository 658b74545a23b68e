use std::{fs, path::Path};

use serde_json::{json, Value};

use crate::{
    config::{Config, ConfigError},
    edition::{Corpus, EditionError, EditionMetadata, TOTAL_WORD_FREQUENCIES},
    metric::MetricKind,
    test_support::prelude::*,
};

fn write_json(dir: &Path, name: &str, value: &Value) {
    fs::write(dir.join(name), serde_json::to_string_pretty(value).unwrap()).unwrap();
}

/// Two editions of the same work in different shapes, plus files the loader must ignore.
fn write_input(dir: &Path) {
    write_json(
        dir,
        "2021-HuckFinn-A.json",
        &json!({
            "source": "first printing",
            "components": {
                "title": ["Huck"],
                "chapter_1": ["The raft and the river."],
            },
        }),
    );
    write_json(
        dir,
        "2021-HuckFinn-B.json",
        &json!({
            "source": "ocr scan",
            "components": {
                "title": ["Huck"],
                "body": {
                    "chapter_1": ["The raft, the raft, the raft!"],
                },
            },
        }),
    );
    write_json(dir, "2021-TomSawyer.json", &edition_document(json!({ "chapter_1": ["Tom!"] })));
    // left over from a previous run; never parsed
    fs::write(dir.join("2021-HuckFinn-A_cleaned.json"), "{ not json").unwrap();
    fs::write(dir.join("notes.txt"), "not an edition").unwrap();
}

fn write_config(dir: &Path) -> Config {
    let stopwords = dir.join("voyant.txt");
    fs::write(&stopwords, "the, and\nA\n").unwrap();
    let config = format!(
        "tokenization = \"aolm\"\nstopwords = \"voyant\"\ntop_words = 2\n\n[stopwords_sources]\nvoyant = {:?}\n",
        stopwords.display().to_string()
    );
    Config::from_toml_str(&config).unwrap()
}

#[test]
fn test_clean_and_compare_corpus() {
    let input = tempfile::tempdir().unwrap();
    let output = tempfile::tempdir().unwrap();
    write_input(input.path());
    let config = write_config(input.path());
    let cleaner_config = config.resolve().unwrap();

    let mut corpus = Corpus::load_dir(input.path(), Some("HuckFinn")).unwrap();
    let keys: Vec<_> = corpus.iter().map(|(key, _)| key.as_str()).collect();
    assert_eq!(keys, vec!["2021-HuckFinn-A", "2021-HuckFinn-B"]);

    corpus.analyse_all(&cleaner_config, config.top_words).unwrap();
    let written = corpus.write_cleaned(output.path()).unwrap();
    assert_eq!(
        written,
        vec![
            output.path().join("2021-HuckFinn-A_cleaned.json"),
            output.path().join("2021-HuckFinn-B_cleaned.json"),
        ]
    );

    let a = EditionMetadata::load(&written[0]).unwrap();
    let b = EditionMetadata::load(&written[1]).unwrap();
    assert!(a.is_analysed() && b.is_analysed());

    // raw fields survive untouched
    assert_eq!(a.document()["source"], json!("first printing"));
    assert_eq!(
        b.document()["components"]["body"]["chapter_1"],
        json!(["The raft, the raft, the raft!"])
    );

    assert_eq!(
        a.document()[TOTAL_WORD_FREQUENCIES],
        json!({ "huck": 1, "raft": 1, "river": 1 })
    );
    assert_eq!(
        b.document()[TOTAL_WORD_FREQUENCIES],
        json!({ "huck": 1, "raft": 3 })
    );
    assert_eq!(b.document()["cumulative_word_counts"]["body"], json!({ "raft": 3 }));
    assert_eq!(b.document()["top_words"], json!(["raft", "huck"]));

    let metric: MetricKind = "IntrinsicOverallMatch".parse().unwrap();
    assert_eq!(metric.run(&a, &b).unwrap().result, json!(1));
    assert_eq!(metric.run(&b, &a).unwrap().result, json!(-2));
    assert_eq!(metric.run(&a, &a).unwrap().result, json!(0));

    // cleaned documents are never picked up as inputs
    let rerun = Corpus::load_dir(output.path(), None).unwrap();
    assert!(rerun.is_empty());
}

#[test]
fn test_reanalysing_cleaned_output_is_stable() {
    let input = tempfile::tempdir().unwrap();
    write_input(input.path());
    let config = write_config(input.path());
    let cleaner_config = config.resolve().unwrap();

    let mut corpus = Corpus::load_dir(input.path(), Some("HuckFinn-B")).unwrap();
    corpus.analyse_all(&cleaner_config, config.top_words).unwrap();
    let written = corpus.write_cleaned(input.path()).unwrap();
    let first = fs::read_to_string(&written[0]).unwrap();

    let mut reloaded = EditionMetadata::load(&written[0]).unwrap();
    reloaded.analyse(&cleaner_config, config.top_words).unwrap();
    assert_eq!(reloaded.to_json_pretty().unwrap(), first);
}

#[test]
fn test_invalid_config_fails_before_reading_editions() {
    let config = Config {
        stopwords: "nltk".to_string(),
        ..Config::default()
    };
    assert!(matches!(
        config.resolve(),
        Err(ConfigError::MissingStopwordSource(name)) if name == "nltk"
    ));

    let config = Config {
        tokenization: "sentencepiece".to_string(),
        stopwords: "nltk".to_string(),
        ..Config::default()
    };
    assert!(matches!(
        config.resolve(),
        Err(ConfigError::UnknownTokenization(name)) if name == "sentencepiece"
    ));
}

#[cfg(not(feature = "strict"))]
#[test]
fn test_malformed_edition_is_skipped() {
    let input = tempfile::tempdir().unwrap();
    write_input(input.path());
    fs::write(input.path().join("2021-HuckFinn-C.json"), "{ not json").unwrap();
    write_json(
        input.path(),
        "2021-HuckFinn-D.json",
        &edition_document(json!({ "body": {} })),
    );

    let corpus = Corpus::load_dir(input.path(), Some("HuckFinn")).unwrap();
    assert_eq!(corpus.len(), 2);
    assert!(corpus.get("2021-HuckFinn-C").is_none());
    assert!(corpus.get("2021-HuckFinn-D").is_none());
}

#[cfg(feature = "strict")]
#[test]
fn test_malformed_edition_aborts_loading() {
    let input = tempfile::tempdir().unwrap();
    write_input(input.path());
    fs::write(input.path().join("2021-HuckFinn-C.json"), "{ not json").unwrap();

    let error = Corpus::load_dir(input.path(), Some("HuckFinn")).unwrap_err();
    assert!(matches!(error, EditionError::Json(_)));
}

#[test]
fn test_missing_input_dir() {
    let error = Corpus::load_dir(Path::new("/does/not/exist"), None).unwrap_err();
    assert!(matches!(error, EditionError::Io { .. }));
}

proptest! {
    #![proptest_config(ProptestConfig {
        cases: 64,
        ..ProptestConfig::default()
    })]
    #[test]
    fn corpus_metric_matches_document_totals(reference in arb_component(), candidate in arb_component()) {
        let cleaner_config = Config::default().resolve().unwrap();
        let mut corpus = Corpus::new();
        for (key, components) in [("reference", &reference), ("candidate", &candidate)] {
            let document = edition_document(serde_json::to_value(components).unwrap());
            corpus.insert(key.to_string(), EditionMetadata::from_value(document).unwrap());
        }
        corpus.analyse_all(&cleaner_config, 5).unwrap();

        let reference = corpus.get("reference").unwrap();
        let candidate = corpus.get("candidate").unwrap();
        let reference_total = reference.total_word_frequencies().unwrap();
        let candidate_total = candidate.total_word_frequencies().unwrap();

        let expected: i64 = reference_total
            .iter()
            .map(|(token, count)| candidate_total.get(token).unwrap_or(0) as i64 - count as i64)
            .sum();
        let output = MetricKind::IntrinsicOverallMatch.run(reference, candidate).unwrap();
        prop_assert_eq!(output.result, json!(expected));
    }
}
