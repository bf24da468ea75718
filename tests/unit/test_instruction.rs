use frontmatter_transform::core::{
    compile, Apply, AppError, CompiledQuery, ErrorCategory, Frontmatter, Instruction,
    QueryEngine, Value,
};
use std::sync::Arc;

fn post() -> Frontmatter {
    let mut tree = Frontmatter::new();
    tree.insert("title".into(), "Test Title".into());
    tree.insert("categories".into(), vec!["PAPER", "AI"].into());
    tree.insert("tags".into(), vec!["LLM", "Google"].into());
    tree
}

fn engine() -> Arc<QueryEngine> {
    Arc::new(QueryEngine::default())
}

#[tokio::test]
async fn test_query_patch_overwrites_adds_and_deletes() {
    let compiled = compile(
        Instruction::query(
            r#"#{
                title: "Updated Title",
                abbrlink: 100,
                categories: (),
                tags: tags + ["Transformer"]
            }"#,
        ),
        &engine(),
    )
    .unwrap();

    let result = compiled.apply(post()).await.unwrap();

    let mut expected = Frontmatter::new();
    expected.insert("title".into(), "Updated Title".into());
    expected.insert("tags".into(), vec!["LLM", "Google", "Transformer"].into());
    expected.insert("abbrlink".into(), 100.into());
    assert_eq!(result, expected);
}

#[tokio::test]
async fn test_compiled_query_matches_source_query() {
    let source = r#"#{ title: (), categories: ["BLOG", "FUWARI"] }"#;
    let from_source = compile(Instruction::query(source), &engine())
        .unwrap()
        .apply(post())
        .await
        .unwrap();
    let from_compiled = compile(
        Instruction::compiled(CompiledQuery::compile(source).unwrap()),
        &engine(),
    )
    .unwrap()
    .apply(post())
    .await
    .unwrap();

    assert_eq!(from_source, from_compiled);
    assert!(!from_source.contains_key("title"));
    assert_eq!(from_source["categories"], Value::from(vec!["BLOG", "FUWARI"]));
}

#[tokio::test]
async fn test_untouched_keys_survive_merge() {
    let compiled = compile(Instruction::from("#{ draft: true }"), &engine()).unwrap();
    let result = compiled.apply(post()).await.unwrap();
    assert_eq!(result["title"], Value::from("Test Title"));
    assert_eq!(result["categories"], Value::from(vec!["PAPER", "AI"]));
    assert_eq!(result["draft"], Value::from(true));
}

#[tokio::test]
async fn test_non_mapping_results_are_rejected() {
    for source in ["[1, 2, 3]", "()", "42", r#""text""#] {
        let compiled = compile(Instruction::query(source), &engine()).unwrap();
        let err = compiled.apply(post()).await.unwrap_err();
        assert_eq!(err.category, ErrorCategory::ValidationError, "{}", source);
        assert_eq!(err.code, "FM-QUERY-003");
    }
}

#[tokio::test]
async fn test_shape_error_message_includes_value() {
    let compiled = compile(Instruction::query("42"), &engine()).unwrap();
    let err = compiled.apply(post()).await.unwrap_err();
    assert!(err.message.contains("42"), "{}", err.message);
}

#[tokio::test]
async fn test_function_result_replaces_tree() {
    let compiled = compile(
        Instruction::function(|_| {
            let mut tree = Frontmatter::new();
            tree.insert("categories".into(), vec!["BLOG", "FUWARI"].into());
            tree
        }),
        &engine(),
    )
    .unwrap();

    let result = compiled.apply(post()).await.unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(result["categories"], Value::from(vec!["BLOG", "FUWARI"]));
}

#[tokio::test]
async fn test_async_function_is_awaited() {
    let compiled = compile(
        Instruction::async_function(|mut tree: Frontmatter| async move {
            tokio::task::yield_now().await;
            tree.insert("checked".into(), true.into());
            Ok::<_, AppError>(tree)
        }),
        &engine(),
    )
    .unwrap();

    let result = compiled.apply(post()).await.unwrap();
    assert_eq!(result["checked"], Value::from(true));
}

#[tokio::test]
async fn test_runtime_error_propagates() {
    let compiled = compile(Instruction::query("no_such_key.len()"), &engine()).unwrap();
    let err = compiled.apply(post()).await.unwrap_err();
    assert_eq!(err.category, ErrorCategory::QueryError);
    assert_eq!(err.code, "FM-QUERY-002");
}

#[test]
fn test_compile_error_is_reported_at_compile_time() {
    let err = compile(Instruction::query("#{ title: "), &engine()).unwrap_err();
    assert_eq!(err.code, "FM-QUERY-001");
}

#[test]
fn test_instruction_kind() {
    assert_eq!(Instruction::from("#{}").kind(), "query source");
    assert_eq!(Instruction::function(|tree| tree).kind(), "function");
}
