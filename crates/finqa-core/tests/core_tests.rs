use std::fs;
use tempfile::TempDir;

use finqa_core::ingest::DocumentLoader;
use finqa_core::types::{Entity, EntityKind, Fragment, FragmentType};

#[test]
fn load_directory_maps_stem_and_parent_dir() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    fs::create_dir(dir.join("loans")).unwrap();
    fs::write(dir.join("loans/housing.txt"), "个人住房贷款办理流程说明").unwrap();

    let loader = DocumentLoader::new();
    let docs = loader.load_directory(dir).expect("load");

    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].id, "housing");
    assert_eq!(docs[0].title, "housing");
    assert_eq!(docs[0].doc_type, "loans");
    assert!(docs[0].raw_text.contains("住房贷款"));
}

#[test]
fn load_directory_limited_respects_file_cap() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    fs::write(dir.join("a.txt"), "alpha bravo").unwrap();
    fs::write(dir.join("b.txt"), "charlie delta").unwrap();

    let loader = DocumentLoader::new();
    let docs = loader.load_directory_limited(dir, 1).expect("load limited");

    assert_eq!(docs.len(), 1);
    assert_eq!(docs[0].id, "a", "sorted order makes the cut stable");
}

#[test]
fn non_txt_files_are_ignored() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path();
    fs::write(dir.join("doc.txt"), "text").unwrap();
    fs::write(dir.join("doc.pdf"), "binary").unwrap();

    let docs = DocumentLoader::new().load_directory(dir).expect("load");
    assert_eq!(docs.len(), 1);
}

#[test]
fn fragment_round_trips_through_json_with_every_field() {
    let fragment = Fragment {
        fragment_id: "housing:2".to_string(),
        source_document_id: "housing".to_string(),
        source_title: "housing".to_string(),
        section_title: Some("一、申请条件".to_string()),
        text: "借款人须年满18周岁，月收入不低于8000元。".to_string(),
        fragment_type: FragmentType::TitleSection,
        ordinal: 2,
        keywords: vec!["借款人".to_string(), "月收入".to_string()],
        entities: vec![Entity { kind: EntityKind::Money, text: "8000元".to_string() }],
        importance_score: 1.4,
        length: 20,
    };

    let json = serde_json::to_string(&fragment).expect("serialize");
    let back: Fragment = serde_json::from_str(&json).expect("deserialize");
    assert_eq!(back, fragment);
}
