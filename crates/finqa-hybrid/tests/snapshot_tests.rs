use std::collections::BTreeMap;
use std::sync::Arc;

use finqa_core::config::{FusionConfig, RetrievalConfig};
use finqa_core::segment::WhitespaceSegmenter;
use finqa_core::store::ChunkStore;
use finqa_core::types::{Fragment, FragmentType, Intent, QueryIntent, SubIntent};
use finqa_hybrid::{EngineConfig, HybridEngine, KnowledgeIndex};
use finqa_lexical::Bm25Params;
use finqa_semantic::{HashEmbedder, SemanticChannel};

fn fragment(id: &str, ordinal: usize, text: &str) -> Fragment {
    Fragment {
        fragment_id: id.to_string(),
        source_document_id: "loan".to_string(),
        source_title: "贷款办法".to_string(),
        section_title: Some("一、总则".to_string()),
        text: text.to_string(),
        fragment_type: FragmentType::Paragraph,
        ordinal,
        keywords: vec!["贷款".to_string()],
        entities: vec![],
        importance_score: 1.1,
        length: text.chars().count(),
    }
}

fn store() -> ChunkStore {
    ChunkStore::from_fragments(vec![
        fragment("loan:0", 0, "贷款 申请 流程 指引"),
        fragment("loan:1", 1, "贷款 利率 按 LPR 执行"),
        fragment("loan:2", 2, "贷款 条件 与 标准 说明"),
    ])
}

fn build() -> KnowledgeIndex {
    KnowledgeIndex::from_store(
        store(),
        Arc::new(WhitespaceSegmenter),
        Bm25Params::default(),
        SemanticChannel::in_process(Arc::new(HashEmbedder::default())),
    )
    .expect("build")
}

fn engine_over(index: KnowledgeIndex) -> HybridEngine {
    let config = EngineConfig {
        retrieval: RetrievalConfig { top_k: 3, similarity_threshold: 0.0, max_content_len: 1_500 },
        fusion: FusionConfig::default(),
    };
    let engine = HybridEngine::new(config);
    engine.publish(Arc::new(index)).expect("publish");
    engine
}

fn detail_intent(query: &str) -> QueryIntent {
    QueryIntent {
        main_intent: Intent::Detail,
        sub_intents: vec![SubIntent::Detail],
        entities: BTreeMap::new(),
        keywords: vec![],
        decomposed_queries: vec![query.to_string()],
        original_question: query.to_string(),
    }
}

#[test]
fn snapshot_round_trip_preserves_fragments_and_scores() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let path = tmp.path().join("index.json");

    let original = build();
    let original_stats = original.lexical_stats();
    original.save(&path).expect("save");

    let reloaded = KnowledgeIndex::load(
        &path,
        Arc::new(WhitespaceSegmenter),
        SemanticChannel::in_process(Arc::new(HashEmbedder::default())),
    )
    .expect("load");

    // Every fragment field survives the round trip, in order.
    assert_eq!(reloaded.store().fragments(), store().fragments());
    // The rebuilt lexical index reproduces the persisted statistics.
    assert_eq!(reloaded.lexical_stats(), original_stats);

    // And therefore identical retrieval scores.
    let before = engine_over(build());
    let after = engine_over(reloaded);
    for query in ["贷款 流程", "利率", "条件 标准"] {
        let a = before.retrieve(&detail_intent(query), 3).expect("before");
        let b = after.retrieve(&detail_intent(query), 3).expect("after");
        assert_eq!(a.len(), b.len(), "result count differs for {query:?}");
        for (x, y) in a.iter().zip(b.iter()) {
            assert_eq!(x.fragment_id, y.fragment_id);
            assert!((x.total_score - y.total_score).abs() < 1e-12);
            assert!((x.lexical_component - y.lexical_component).abs() < 1e-12);
            assert!((x.semantic_component - y.semantic_component).abs() < 1e-12);
        }
    }
}

#[test]
fn missing_snapshot_is_an_error() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let result = KnowledgeIndex::load(
        &tmp.path().join("absent.json"),
        Arc::new(WhitespaceSegmenter),
        SemanticChannel::in_process(Arc::new(HashEmbedder::default())),
    );
    assert!(result.is_err());
}
