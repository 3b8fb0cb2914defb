use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use patent_topics::{compute_weighted_matrix, factorize, Corpus, Method};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

/// Synthetic corpus: each document draws most words from one of a few
/// themed pools and some from a shared pool.
fn synthetic_corpus(docs: usize, words_per_doc: usize) -> Corpus {
    let themes: Vec<Vec<String>> = (0..8)
        .map(|t| (0..60).map(|w| format!("theme{t}word{w}")).collect())
        .collect();
    let shared: Vec<String> = (0..200).map(|w| format!("common{w}")).collect();

    let mut rng = ChaCha8Rng::seed_from_u64(42);
    (0..docs)
        .map(|d| {
            let theme = &themes[d % themes.len()];
            let text: Vec<&str> = (0..words_per_doc)
                .map(|_| {
                    if rng.gen_bool(0.7) {
                        theme[rng.gen_range(0..theme.len())].as_str()
                    } else {
                        shared[rng.gen_range(0..shared.len())].as_str()
                    }
                })
                .collect();
            (format!("US{d:06}"), text.join(" "))
        })
        .collect()
}

fn tfidf_benchmark(c: &mut Criterion) {
    let mut group = c.benchmark_group("tfidf");
    for docs in [200, 1000] {
        let corpus = synthetic_corpus(docs, 300);
        group.bench_with_input(BenchmarkId::from_parameter(docs), &corpus, |b, corpus| {
            b.iter(|| compute_weighted_matrix(corpus, 1000, None).unwrap())
        });
    }
    group.finish();
}

fn factorize_benchmark(c: &mut Criterion) {
    let corpus = synthetic_corpus(1000, 300);
    let tfidf = compute_weighted_matrix(&corpus, 1000, None).unwrap();

    let mut group = c.benchmark_group("factorize");
    group.sample_size(10);
    for method in Method::ALL {
        for k in [8, 32] {
            group.bench_with_input(BenchmarkId::new(method.as_str(), k), &k, |b, &k| {
                b.iter(|| factorize(&tfidf.matrix, k, method, 10).unwrap())
            });
        }
    }
    group.finish();
}

criterion_group!(benches, tfidf_benchmark, factorize_benchmark);
criterion_main!(benches);
