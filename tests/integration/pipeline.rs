use anyhow::Result;
use lexdown::config::{FieldPattern, ProcessingConfig};
use lexdown::core::{DiagnosticKind, LexdownError, RunContext};
use lexdown::pipeline::{process_document, process_document_with};
use lexdown::test_utils::{DocumentFixture, init_test_logging};
use lexdown::tracking::FieldStatus;

#[test]
fn test_services_agreement_end_to_end() -> Result<()> {
    init_test_logging(None);
    let fixture = DocumentFixture::services_agreement("msa");
    let doc = process_document(&fixture.content, &[], &ProcessingConfig::default())?;

    let expected = "\
Article 1. Definitions
  Section 1. Parties
This agreement is made between Acme Ltd and Example Services LLP on 1st March 2024.
Article 2. Services
Terms used here are defined in Article 1..
- 1. Discovery report (2 weeks)
- 2. Implementation (6 weeks)
Article 3. Fees
The fee is £1,500.00, governed by the laws of England.";
    assert_eq!(doc.content.trim(), expected);

    assert_eq!(doc.headers.len(), 4);
    assert_eq!(doc.headers[0].reference.as_deref(), Some("defs"));
    assert_eq!(doc.headers[3].label, "Article 3.");

    let report = &doc.field_report;
    assert_eq!(report.empty, 0);
    assert_eq!(report.total, report.filled + report.logic);
    assert!(doc.diagnostics.is_empty(), "unexpected diagnostics: {:?}", doc.diagnostics);
    Ok(())
}

#[test]
fn test_unfilled_document_keeps_placeholders() -> Result<()> {
    let fixture = DocumentFixture::unfilled("draft");
    let doc = process_document(&fixture.content, &[], &ProcessingConfig::default())?;

    assert_eq!(doc.content.trim(), "Article 1. Parties\nBetween {{client.name}} and {{provider}}.");
    assert_eq!(doc.field_report.empty, 2);
    let missing: Vec<&str> = doc.field_report.missing().map(|f| f.name.as_str()).collect();
    assert_eq!(missing, vec!["client.name", "provider"]);
    assert!(doc.diagnostics.iter().all(|d| d.kind == DiagnosticKind::MissingField));
    Ok(())
}

#[test]
fn test_malformed_metadata_strict_and_lenient() -> Result<()> {
    let fixture = DocumentFixture::malformed("broken");

    let lenient = process_document(&fixture.content, &[], &ProcessingConfig::default())?;
    assert!(lenient.metadata.is_empty());
    assert!(lenient.content.contains("Hello {{client}}"));

    let strict = ProcessingConfig {
        strict: true,
        ..ProcessingConfig::default()
    };
    let err = process_document(&fixture.content, &[], &strict).unwrap_err();
    assert!(matches!(err, LexdownError::MalformedMetadata { .. }));
    Ok(())
}

#[test]
fn test_document_layout_keys_override_config() -> Result<()> {
    let raw = "---\nlevel-one: 'Part %R.'\nlevel-two: '%n.%s'\nno-indent: true\n---\nl. One\nll. Sub\n";
    let config = ProcessingConfig {
        level_one: Some("Chapter %n".to_string()),
        ..ProcessingConfig::default()
    };
    let doc = process_document(raw, &[], &config)?;
    // `%R` is not a token and stays literal
    assert_eq!(doc.content.trim(), "Part %R. One\n1.1 Sub");
    Ok(())
}

#[test]
fn test_custom_field_patterns() -> Result<()> {
    let config = ProcessingConfig {
        field_patterns: vec![FieldPattern::new("<<", ">>"), FieldPattern::new("", "")],
        ..ProcessingConfig::default()
    };
    let doc = process_document("---\nclient: Acme\nfee: 10\n---\n<<client>> pays {{fee}}", &[], &config)?;
    assert_eq!(doc.content.trim(), "Acme pays 10");
    assert!(doc.diagnostics.iter().any(|d| d.kind == DiagnosticKind::InvalidFieldPattern));
    Ok(())
}

#[test]
fn test_highlight_wraps_every_status() -> Result<()> {
    let config = ProcessingConfig {
        highlight: true,
        ..ProcessingConfig::default()
    };
    let raw = "---\nclient: Acme\n---\nl. Scope |scope|\n{{client}} {{missing}} |scope|";
    let doc = process_document(raw, &[], &config)?;

    assert!(doc.content.contains(r#"<span class="legal-field imported-value" data-field="client">Acme</span>"#));
    assert!(doc.content.contains(r#"<span class="legal-field missing-value" data-field="missing">{{missing}}</span>"#));
    assert!(doc.content.contains(r#"<span class="legal-field highlight" data-field="crossref.scope">Article 1.</span>"#));
    Ok(())
}

#[test]
fn test_reused_context_starts_clean() -> Result<()> {
    let config = ProcessingConfig::default();
    let mut ctx = RunContext::new(true, false);

    process_document_with("{{first}}", &[], &config, &mut ctx)?;
    assert_eq!(ctx.tracker().get("first").map(|f| f.status), Some(FieldStatus::Empty));

    let doc = process_document_with("---\nsecond: 2\n---\n{{second}}", &[], &config, &mut ctx)?;
    assert!(ctx.tracker().get("first").is_none());
    assert_eq!(doc.field_report.total, 1);
    assert!(doc.diagnostics.is_empty());
    Ok(())
}

#[test]
fn test_crlf_line_endings_are_preserved() -> Result<()> {
    let doc = process_document("l. One\r\nll. Two\r\n{{x}}\r\n", &[], &ProcessingConfig::default())?;
    assert_eq!(doc.content, "Article 1. One\r\n  Section 1. Two\r\n{{x}}\r\n");
    Ok(())
}

#[test]
fn test_empty_metadata_block_is_removed() -> Result<()> {
    let doc = process_document("---\n---\nHello", &[], &ProcessingConfig::default())?;
    assert_eq!(doc.content.trim(), "Hello");
    assert!(doc.diagnostics.is_empty());
    Ok(())
}
