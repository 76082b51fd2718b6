use docqa_core::config::{EmbeddingProvider, EmbeddingSettings};
use docqa_embed::{get_default_embedder, HashEmbedder};
use docqa_core::traits::Embedder;

fn cosine(a: &[f32], b: &[f32]) -> f32 { a.iter().zip(b).map(|(x, y)| x * y).sum() }

#[test]
fn hash_embedder_shapes_and_determinism() {
    let settings = EmbeddingSettings { provider: EmbeddingProvider::Hash, dim: 384, ..EmbeddingSettings::default() };
    let embedder = get_default_embedder(&settings).expect("embedder");
    let texts = vec!["hello world".to_string(), "hello world".to_string()];
    let embs = embedder.embed_batch(&texts).expect("embed_batch");
    let v1 = &embs[0];
    let v2 = &embs[1];

    assert_eq!(v1.len(), 384, "embedding dim follows settings");
    assert_eq!(embedder.dim(), 384);
    assert_eq!(embedder.id(), "hash:d384");

    let norm: f32 = v1.iter().map(|x| x * x).sum::<f32>().sqrt();
    assert!((norm - 1.0).abs() <= 1e-3, "vector is L2-normalized (norm={norm})");

    for (a, b) in v1.iter().zip(v2.iter()) { assert!((a - b).abs() <= 1e-6); }
}

#[test]
fn hash_embedder_rewards_shared_tokens() {
    let e = HashEmbedder::new(384);
    let q = e.embed_text("how many vacation days");
    let close = e.embed_text("vacation policy allows 20 days");
    let far = e.embed_text("sick leave requires a doctor's note");
    assert!(cosine(&q, &close) > cosine(&q, &far));
    assert!(cosine(&q, &close) > 0.0);
}

#[test]
fn empty_text_embeds_to_zero_vector() {
    let e = HashEmbedder::new(8);
    assert!(e.embed_text("   ").iter().all(|x| *x == 0.0));
}

#[test]
#[should_panic(expected = "dimension must be positive")]
fn zero_dimension_hash_embedder_is_rejected() {
    HashEmbedder::new(0);
}

#[test]
fn default_embedder_refuses_zero_dimension() {
    let settings = EmbeddingSettings { provider: EmbeddingProvider::Hash, dim: 0, ..EmbeddingSettings::default() };
    assert!(get_default_embedder(&settings).is_err());
}
