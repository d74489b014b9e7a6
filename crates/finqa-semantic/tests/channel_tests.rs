use std::sync::Arc;

use finqa_core::store::ChunkStore;
use finqa_core::types::{Fragment, FragmentType};
use finqa_semantic::{HashEmbedder, SemanticChannel};

fn fragment(id: &str, text: &str) -> Fragment {
    Fragment {
        fragment_id: id.to_string(),
        source_document_id: "doc".to_string(),
        source_title: "doc".to_string(),
        section_title: None,
        text: text.to_string(),
        fragment_type: FragmentType::Paragraph,
        ordinal: 0,
        keywords: vec![],
        entities: vec![],
        importance_score: 0.0,
        length: text.chars().count(),
    }
}

#[test]
fn build_then_search_ranks_token_overlap_first() {
    let store = ChunkStore::from_fragments(vec![
        fragment("a:0", "住房贷款 申请 流程 与 材料"),
        fragment("b:0", "手机银行 开通 指引"),
        fragment("c:0", "住房贷款 利率 说明"),
    ]);

    let mut channel = SemanticChannel::in_process(Arc::new(HashEmbedder::default()));
    channel.build(&store).expect("build");

    let hits = channel.search("住房贷款 申请 流程", 3).expect("search");
    assert_eq!(hits.len(), 3);
    assert_eq!(hits[0].id, "a:0", "full token overlap ranks first");
    assert!(hits[0].score > hits[1].score);
    for hit in &hits {
        assert!(hit.score <= 1.0 + 1e-5, "cosine over unit vectors stays <= 1");
    }
}

#[test]
fn search_is_deterministic() {
    let store = ChunkStore::from_fragments(vec![
        fragment("a:0", "alpha beta gamma"),
        fragment("b:0", "delta epsilon"),
    ]);
    let mut channel = SemanticChannel::in_process(Arc::new(HashEmbedder::default()));
    channel.build(&store).expect("build");

    let first = channel.search("alpha beta", 2).expect("search");
    let second = channel.search("alpha beta", 2).expect("search");
    assert_eq!(first.len(), second.len());
    for (a, b) in first.iter().zip(second.iter()) {
        assert_eq!(a.id, b.id);
        assert!((a.score - b.score).abs() < 1e-12);
    }
}

#[test]
fn empty_store_builds_and_searches_cleanly() {
    let store = ChunkStore::new();
    let mut channel = SemanticChannel::in_process(Arc::new(HashEmbedder::default()));
    channel.build(&store).expect("build");
    assert!(channel.search("anything", 5).expect("search").is_empty());
}
