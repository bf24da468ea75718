use chrono::{TimeZone, Utc};
use frontmatter_transform::core::{
    transform_frontmatter, FrontmatterTransformer, Frontmatter, Instruction, TransformConfig,
    Value,
};

fn post() -> Frontmatter {
    let mut tree = Frontmatter::new();
    tree.insert("title".into(), "Test Title".into());
    tree.insert("categories".into(), vec!["PAPER", "AI"].into());
    tree.insert("tags".into(), vec!["LLM", "Google"].into());
    tree
}

fn push_tag(tree: &mut Frontmatter, tag: &str) {
    if let Some(tags) = tree.get_mut("tags").and_then(Value::as_sequence_mut) {
        tags.push(tag.into());
    }
}

#[tokio::test]
async fn test_transform_with_function() {
    let date = Utc.with_ymd_and_hms(2023, 1, 1, 12, 0, 0).unwrap();
    let original = post();

    let result = transform_frontmatter(
        &original,
        Instruction::function(move |mut tree| {
            tree.insert("title".into(), "Updated Title".into());
            tree.insert("date".into(), date.into());
            tree.shift_remove("categories");
            push_tag(&mut tree, "Transformer");
            tree
        }),
    )
    .await
    .unwrap();

    let mut expected = Frontmatter::new();
    expected.insert("title".into(), "Updated Title".into());
    expected.insert("tags".into(), vec!["LLM", "Google", "Transformer"].into());
    expected.insert("date".into(), date.into());
    assert_eq!(result, expected);
}

#[tokio::test]
async fn test_caller_tree_is_never_mutated() {
    let original = post();
    let snapshot = original.clone();
    let transformer = FrontmatterTransformer::default();

    for _ in 0..2 {
        let result = transformer
            .transform(
                &original,
                Instruction::function(|mut tree| {
                    push_tag(&mut tree, "Transformer");
                    tree.clear();
                    tree
                }),
            )
            .await
            .unwrap();
        assert!(result.is_empty());
    }

    let result = transformer
        .transform(&original, "#{ tags: tags + [\"x\"], title: () }")
        .await
        .unwrap();
    assert!(!result.contains_key("title"));
    assert_eq!(original, snapshot);
}

#[tokio::test]
async fn test_failed_query_leaves_tree_unchanged() {
    let original = post();
    let snapshot = original.clone();
    let err = transform_frontmatter(&original, "[1, 2, 3]").await.unwrap_err();
    assert_eq!(err.code, "FM-QUERY-003");
    assert_eq!(original, snapshot);
}

#[tokio::test]
async fn test_query_receives_dates_as_text() {
    let mut tree = Frontmatter::new();
    tree.insert(
        "date".into(),
        Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap().into(),
    );
    let result = transform_frontmatter(&tree, r#"#{ year: date.sub_string(0, 4) }"#)
        .await
        .unwrap();
    assert_eq!(result["year"], Value::from("2023"));
    assert!(result["date"].as_date().is_some());
}

#[tokio::test]
async fn test_operation_limit_from_config() {
    let mut config = TransformConfig::default();
    config.query.max_operations = 50;
    let transformer = FrontmatterTransformer::from_config(&config);

    let err = transformer
        .transform(&post(), "let n = 0; loop { n += 1; } #{}")
        .await
        .unwrap_err();
    assert_eq!(err.code, "FM-QUERY-002");
}
