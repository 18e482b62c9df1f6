use lexdown::config::ProcessingConfig;
use lexdown::core::LexdownError;
use lexdown::markdown::parse_metadata;
use lexdown::pipeline::{BatchInput, process_batch};
use lexdown::test_utils::DocumentFixture;

#[tokio::test]
async fn test_batch_runs_are_isolated() {
    let inputs: Vec<BatchInput> = (0..40)
        .map(|i| {
            let raw = format!("---\nid: {i}\n---\nl. Doc {i}\n{{{{id}}}} {{{{missing_{i}}}}}\n");
            BatchInput::new(format!("doc-{i}.md"), raw)
        })
        .collect();

    let outputs = process_batch(inputs, &ProcessingConfig::default(), 4).await;
    assert_eq!(outputs.len(), 40);

    for (i, output) in outputs.iter().enumerate() {
        assert_eq!(output.name, format!("doc-{i}.md"));
        let doc = output.result.as_ref().expect("document should render");
        assert!(doc.content.contains(&format!("Article 1. Doc {i}")));
        assert!(doc.content.contains(&format!("{i} {{{{missing_{i}}}}}")));

        // each ledger only sees its own document
        let names: Vec<&str> = doc.field_report.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, vec!["id".to_string(), format!("missing_{i}")]);
    }
}

#[tokio::test]
async fn test_batch_shares_imports_per_document() {
    let import = parse_metadata("provider: Shared LLP\n").unwrap();
    let inputs = vec![
        BatchInput::new("a", "{{provider}} A").with_imports(vec![import.clone()]),
        BatchInput::new("b", "---\nprovider: Own Ltd\n---\n{{provider}} B").with_imports(vec![import]),
    ];

    let outputs = process_batch(inputs, &ProcessingConfig::default(), 2).await;
    assert_eq!(outputs[0].result.as_ref().unwrap().content, "Shared LLP A");
    assert_eq!(outputs[1].result.as_ref().unwrap().content.trim(), "Own Ltd B");
}

#[tokio::test]
async fn test_batch_strict_failures_are_per_document() {
    let strict = ProcessingConfig {
        strict: true,
        ..ProcessingConfig::default()
    };
    let inputs = vec![
        BatchInput::new("ok-1", DocumentFixture::unfilled("a").content),
        BatchInput::new("broken", DocumentFixture::malformed("b").content),
        BatchInput::new("ok-2", DocumentFixture::services_agreement("c").content),
    ];

    let outputs = process_batch(inputs, &strict, 1).await;
    assert!(outputs[0].result.is_ok());
    assert!(matches!(outputs[1].result, Err(LexdownError::MalformedMetadata { .. })));
    assert!(outputs[2].result.is_ok());
}
