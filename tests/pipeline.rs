use std::cell::Cell;
use std::fs;
use std::path::Path;

use patent_topics::{
    cache::artifact::{TFIDF_MATRIX_FILE, TOPIC_DOC_FILE},
    compute_weighted_matrix, document_counts_per_topic, factorize_cached, rank_and_render,
    top_terms_per_topic, vectorize_cached, with_cache, Corpus, FactorizeParams, KeyPolicy, Method,
    PipelineConfig, TextBarChart, TopicError,
};

fn patents() -> Corpus {
    [
        ("US001", "A solar panel with a photovoltaic cell array and solar tracking."),
        ("US002", "Photovoltaic cell coating improves solar panel efficiency."),
        ("US003", "An engine piston with a cooling ring for the combustion engine."),
        ("US004", "Combustion engine cooling system with piston oil jets."),
        ("US005", "Solar powered engine cooling fan."),
    ]
    .into_iter()
    .collect()
}

fn cache_entries(root: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(root)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

#[test]
fn five_documents_two_svd_topics() {
    let root = tempfile::tempdir().unwrap();
    let corpus = patents();

    let tfidf = vectorize_cached(&corpus, 10, None, root.path(), KeyPolicy::Fingerprinted).unwrap();
    assert_eq!(tfidf.vocabulary.len(), 10);
    assert_eq!(tfidf.shape(), (10, 5));
    for j in 0..5 {
        assert!((tfidf.matrix.column_norm(j) - 1.0).abs() < 1e-9);
    }

    let params = FactorizeParams::new(2, Method::Svd);
    let lsa = factorize_cached(&tfidf.matrix, &params, root.path(), KeyPolicy::Fingerprinted).unwrap();
    assert_eq!(lsa.word_topic.dim(), (10, 2));
    assert_eq!(lsa.topic_document.dim(), (2, 5));

    let counts = document_counts_per_topic(&lsa.topic_document);
    assert_eq!(counts.len(), 2);
    assert_eq!(counts.iter().sum::<usize>(), 5);

    let terms = top_terms_per_topic(&lsa.word_topic, &tfidf.vocabulary, 3).unwrap();
    assert!(terms.iter().all(|t| t.len() == 3));

    let mut chart = Vec::new();
    let ranked = rank_and_render(&terms, &counts, None, &TextBarChart::default(), &mut chart).unwrap();
    assert_eq!(ranked.len(), 2);
    assert_eq!(String::from_utf8(chart).unwrap().lines().count(), 3);

    let names = cache_entries(root.path());
    assert_eq!(names.len(), 2);
    assert!(names.iter().any(|n| n.starts_with("LSA_SVD_")));
    assert!(names.iter().any(|n| n.starts_with("TFIDF_")));
}

#[test]
fn cached_stage_computes_once_and_recomputes_after_deletion() {
    let root = tempfile::tempdir().unwrap();
    let corpus = patents();
    let calls = Cell::new(0);
    let compute = || {
        calls.set(calls.get() + 1);
        compute_weighted_matrix(&corpus, 10, None)
    };

    let first = with_cache(compute, "TFIDF", root.path()).unwrap();
    let second = with_cache(compute, "TFIDF", root.path()).unwrap();
    assert_eq!(calls.get(), 1);
    assert_eq!(first, second);

    fs::remove_dir_all(root.path().join("TFIDF")).unwrap();
    let third = with_cache(compute, "TFIDF", root.path()).unwrap();
    assert_eq!(calls.get(), 2);
    assert_eq!(first, third);
}

#[test]
fn damaged_entries_fail_fast() {
    let root = tempfile::tempdir().unwrap();
    let corpus = patents();
    let tfidf = vectorize_cached(&corpus, 10, None, root.path(), KeyPolicy::Legacy).unwrap();
    let params = FactorizeParams::new(2, Method::Nmf);
    factorize_cached(&tfidf.matrix, &params, root.path(), KeyPolicy::Legacy).unwrap();

    fs::remove_file(root.path().join("LSA_NMF").join(TOPIC_DOC_FILE)).unwrap();
    let err = factorize_cached(&tfidf.matrix, &params, root.path(), KeyPolicy::Legacy).unwrap_err();
    assert!(matches!(err, TopicError::CacheCorruption { .. }));

    fs::write(root.path().join("TFIDF").join(TFIDF_MATRIX_FILE), b"\x00\x01").unwrap();
    let err = vectorize_cached(&corpus, 10, None, root.path(), KeyPolicy::Legacy).unwrap_err();
    assert!(matches!(err, TopicError::CacheCorruption { .. }));
}

#[test]
fn unknown_method_leaves_no_cache_entry() {
    let root = tempfile::tempdir().unwrap();
    let corpus = patents();
    let tfidf = compute_weighted_matrix(&corpus, 10, None).unwrap();

    let run = |tag: &str| -> patent_topics::Result<()> {
        let method: Method = tag.parse()?;
        factorize_cached(&tfidf.matrix, &FactorizeParams::new(2, method), root.path(), KeyPolicy::Legacy)?;
        Ok(())
    };
    let err = run("KMEANS").unwrap_err();
    assert!(matches!(err, TopicError::UnsupportedMethod(ref m) if m == "KMEANS"));
    assert!(cache_entries(root.path()).is_empty());

    run("nmf").unwrap();
    assert_eq!(cache_entries(root.path()), vec!["LSA_NMF"]);
}

#[test]
fn nmf_topics_are_non_negative() {
    let corpus = patents();
    let tfidf = compute_weighted_matrix(&corpus, 10, None).unwrap();
    let out = patent_topics::factorize(&tfidf.matrix, 3, Method::Nmf, 10).unwrap();
    assert_eq!(out.word_topic.dim(), (10, 3));
    assert_eq!(out.topic_document.dim(), (3, 5));
    assert!(out.word_topic.iter().chain(out.topic_document.iter()).all(|&x| x >= 0.0));
}

#[test]
fn end_to_end_from_text_directory() {
    let txts = tempfile::tempdir().unwrap();
    let cache = tempfile::tempdir().unwrap();
    for doc in patents().iter() {
        fs::write(txts.path().join(format!("{}.txt", doc.id)), doc.text).unwrap();
    }

    let config = PipelineConfig::from_toml_str(&format!(
        "[paths]\ntxt_dir = {:?}\n[cache]\nroot = {:?}\n[tfidf]\nvocab_size = 10\n[lsa]\nn_topics = 2\n",
        txts.path().display().to_string(),
        cache.path().display().to_string(),
    ))
    .unwrap();

    let corpus = patent_topics::pipeline::load_corpus(&config).unwrap();
    assert_eq!(corpus, patents());

    let model = patent_topics::pipeline::run_lsa(&corpus, &config).unwrap();
    let report = model.report(&config.report).unwrap();
    assert_eq!(report.documents, 5);
    assert_eq!(report.topics.iter().map(|t| t.count).sum::<usize>(), 5);

    // the second run is served from the cache
    let again = patent_topics::pipeline::run_lsa(&corpus, &config).unwrap();
    assert_eq!(model, again);
    assert_eq!(cache_entries(cache.path()).len(), 3);
}
