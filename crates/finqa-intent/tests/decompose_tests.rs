use std::sync::Arc;

use finqa_core::segment::WhitespaceSegmenter;
use finqa_core::text::char_len;
use finqa_core::types::{EntityKind, Intent, SubIntent};
use finqa_intent::Decomposer;

fn decomposer() -> Decomposer {
    Decomposer::new(Arc::new(WhitespaceSegmenter))
}

#[test]
fn detail_question_yields_question_and_optional_keyword_query() {
    let intent = decomposer().decompose("如何开通手机银行？");
    assert_eq!(intent.main_intent, Intent::Detail);
    assert!(matches!(intent.decomposed_queries.len(), 1 | 2));
    assert_eq!(intent.decomposed_queries[0], "如何开通手机银行?");
    assert_eq!(intent.original_question, "如何开通手机银行？");
}

#[test]
fn multi_intent_question_splits_on_connectors() {
    let intent = decomposer().decompose("个人住房贷款流程和最新LPR利率");
    assert_eq!(intent.main_intent, Intent::MultiIntent);
    assert!(intent.decomposed_queries.len() >= 2);
    for q in &intent.decomposed_queries {
        assert!(char_len(q) >= 5, "short part survived: {q:?}");
    }
    assert_eq!(intent.decomposed_queries[0], "个人住房贷款流程");
    assert_eq!(intent.decomposed_queries[1], "最新LPR利率");
}

#[test]
fn multi_intent_with_incidental_connector_falls_back_to_one_query() {
    // Splitting "和" here leaves one part under 5 chars, so the question
    // stays whole.
    let intent = decomposer().decompose("和田网点营业时间查询办法");
    assert_eq!(intent.main_intent, Intent::MultiIntent);
    assert_eq!(intent.decomposed_queries.len(), 1);
    assert_eq!(intent.sub_intents, vec![SubIntent::MultiIntent]);
}

#[test]
fn reasoning_question_emits_requirements_query_first() {
    let intent = decomposer().decompose("月收入8000元，申请50万元信用贷款是否合规");
    assert_eq!(intent.main_intent, Intent::Reasoning);
    assert_eq!(intent.decomposed_queries.len(), 2);
    assert!(
        intent.decomposed_queries[0].ends_with("条件 标准 要求"),
        "requirements query missing suffix: {:?}",
        intent.decomposed_queries[0]
    );
    assert!(!intent.decomposed_queries[0].contains("是否"));
    assert_eq!(intent.sub_intents[0], SubIntent::Rule);
    assert_eq!(intent.sub_intents[1], SubIntent::Reasoning);

    let money = intent.entities.get(&EntityKind::Money).expect("money entities");
    assert!(money.contains(&"8000元".to_string()));
    assert!(money.contains(&"50万元".to_string()));
}

#[test]
fn reasoning_without_modal_marker_keeps_question_whole() {
    let intent = decomposer().decompose("该客户资质符合规定");
    assert_eq!(intent.main_intent, Intent::Reasoning);
    assert_eq!(intent.decomposed_queries.len(), 1);
    assert_eq!(intent.sub_intents, vec![SubIntent::Reasoning]);
}

#[test]
fn multi_hop_question_splits_on_commas() {
    let intent = decomposer().decompose("根据监管政策对理财产品风险评级的要求，我行对应产品有哪些");
    assert_eq!(intent.main_intent, Intent::MultiHop);
    assert_eq!(intent.decomposed_queries.len(), 2);
    assert_eq!(intent.decomposed_queries[1], "我行对应产品有哪些");
}

#[test]
fn summary_question_adds_keyword_query() {
    let intent = decomposer().decompose("总结 企业网银 主要功能");
    assert_eq!(intent.main_intent, Intent::Summary);
    assert_eq!(intent.decomposed_queries.len(), 2);
    assert_eq!(intent.sub_intents, vec![SubIntent::Summary, SubIntent::Summary]);
    assert_eq!(intent.decomposed_queries[0], "总结 企业网银 主要功能");
}

#[test]
fn comparison_question_queries_both_objects_then_whole() {
    let intent = decomposer().decompose("对比个人网银和企业网银的区别");
    assert_eq!(intent.main_intent, Intent::Comparison);
    assert_eq!(intent.decomposed_queries.len(), 3);
    assert!(intent.decomposed_queries[1].contains("企业网银"));
    assert_eq!(intent.decomposed_queries[2], "对比个人网银和企业网银的区别");
}

#[test]
fn long_questions_bypass_trigger_scoring() {
    let question = format!("请详细说明{}", "办理细节".repeat(30));
    let intent = decomposer().decompose(&question);
    assert_eq!(intent.main_intent, Intent::LongText);
    assert!(!intent.decomposed_queries.is_empty());
}

#[test]
fn keywords_are_capped_at_five() {
    let intent = decomposer().decompose("贷款 利率 期限 担保 抵押 审批 放款 征信");
    assert!(intent.keywords.len() <= 5);
}

#[test]
fn decomposition_is_never_empty_and_lengths_agree() {
    for question in [
        "",
        "？",
        "贷款",
        "如何开通手机银行？",
        "个人住房贷款流程和最新LPR利率",
        "月收入8000元，申请50万元信用贷款是否合规",
        "总结一下企业网银的主要功能",
        "对比个人网银和企业网银的区别",
    ] {
        let intent = decomposer().decompose(question);
        assert!(
            !intent.decomposed_queries.is_empty(),
            "empty decomposition for {question:?}"
        );
        assert_eq!(
            intent.sub_intents.len(),
            intent.decomposed_queries.len(),
            "length mismatch for {question:?}"
        );
    }
}
