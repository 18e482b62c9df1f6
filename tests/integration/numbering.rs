use anyhow::Result;
use lexdown::config::ProcessingConfig;
use lexdown::core::DiagnosticKind;
use lexdown::numbering::NumberingMode;
use lexdown::pipeline::process_document;

fn flat_config() -> ProcessingConfig {
    ProcessingConfig {
        no_indent: true,
        ..ProcessingConfig::default()
    }
}

#[test]
fn test_article_template_example() -> Result<()> {
    let config = ProcessingConfig {
        level_one: Some("Article %n.".to_string()),
        ..flat_config()
    };
    let doc = process_document("l. Intro\nl. Terms", &[], &config)?;
    assert_eq!(doc.content, "Article 1. Intro\nArticle 2. Terms");
    Ok(())
}

#[test]
fn test_all_five_default_levels() -> Result<()> {
    let body = "l. A\nll. B\nlll. C\nllll. D\nlllll. E\nlllll. F\nllll. G\nlllll. H";
    let doc = process_document(body, &[], &flat_config())?;
    assert_eq!(
        doc.content,
        "Article 1. A\nSection 1. B\n(1) C\n(a) D\n(i) E\n(ii) F\n(b) G\n(i) H"
    );
    Ok(())
}

#[test]
fn test_numbered_header_syntax() -> Result<()> {
    let doc = process_document("l1. A\nl2. B\nl2. C\nl1. D", &[], &flat_config())?;
    assert_eq!(doc.content, "Article 1. A\nSection 1. B\nSection 2. C\nArticle 2. D");
    Ok(())
}

#[test]
fn test_hierarchical_templates_from_metadata() -> Result<()> {
    let raw = "---\nlevel-one: '%n.'\nlevel-two: '%n.%s.'\nlevel-three: '%n.%s.%t'\nno-indent: true\n---\nl. A\nll. B\nlll. C\nll. D\nl. E\nll. F\n";
    let doc = process_document(raw, &[], &ProcessingConfig::default())?;
    assert_eq!(doc.content.trim(), "1. A\n1.1. B\n1.1.1 C\n1.2. D\n2. E\n2.1. F");
    Ok(())
}

#[test]
fn test_explicit_numbering_mode() -> Result<()> {
    let config = ProcessingConfig {
        level_one: Some("%n".to_string()),
        level_two: Some("%n-%s".to_string()),
        numbering_mode: NumberingMode::Hierarchical,
        ..flat_config()
    };
    let doc = process_document("l. A\nll. B\nll. C\nl. D\nll. E", &[], &config)?;
    assert_eq!(doc.content, "1 A\n1-1 B\n1-2 C\n2 D\n2-1 E");
    Ok(())
}

#[test]
fn test_continuous_numbering() -> Result<()> {
    let config = ProcessingConfig {
        no_reset: true,
        ..flat_config()
    };
    let doc = process_document("l. A\nll. B\nll. C\nl. D\nll. E", &[], &config)?;
    assert_eq!(doc.content, "Article 1. A\nSection 1. B\nSection 2. C\nArticle 2. D\nSection 3. E");
    Ok(())
}

#[test]
fn test_zero_padded_and_escaped_tokens() -> Result<()> {
    let config = ProcessingConfig {
        level_one: Some("§%02n (100%%)".to_string()),
        ..flat_config()
    };
    let doc = process_document("l. A", &[], &config)?;
    assert_eq!(doc.content, "§01 (100%) A");
    Ok(())
}

#[test]
fn test_headers_in_code_fences_are_untouched() -> Result<()> {
    let body = "l. A\n```\nl. not a header |a|\n```\nSee |a|.";
    let doc = process_document(body, &[], &flat_config())?;
    assert_eq!(doc.content, "Article 1. A\n```\nl. not a header |a|\n```\nSee |a|.");
    Ok(())
}

#[test]
fn test_cross_references_resolve_to_labels() -> Result<()> {
    let body = "l. Definitions |defs|\nll. Fees |fees|\nAs set out in |fees| and |defs|; see also |unknown|.";
    let doc = process_document(body, &[], &flat_config())?;
    let last = doc.content.lines().last().unwrap_or_default();
    assert_eq!(last, "As set out in Section 1. and Article 1.; see also |unknown|.");

    let logic: Vec<&str> = doc
        .field_report
        .fields
        .iter()
        .map(|f| f.name.as_str())
        .collect();
    assert_eq!(logic, vec!["crossref.fees", "crossref.defs"]);
    assert_eq!(doc.field_report.logic, 2);
    Ok(())
}

#[test]
fn test_forward_references_resolve() -> Result<()> {
    let doc = process_document("See |later|.\nl. First\nl. Later |later|", &[], &flat_config())?;
    assert_eq!(doc.content.lines().next(), Some("See Article 2.."));
    Ok(())
}

#[test]
fn test_duplicate_reference_uses_last_label() -> Result<()> {
    let doc = process_document("l. A |x|\nl. B |x|\n|x|", &[], &flat_config())?;
    assert!(doc.content.ends_with("Article 2."));
    assert_eq!(
        doc.diagnostics.iter().filter(|d| d.kind == DiagnosticKind::DuplicateReference).count(),
        1
    );
    Ok(())
}

#[test]
fn test_empty_template_falls_back_with_diagnostic() -> Result<()> {
    let config = ProcessingConfig {
        level_one: Some("   ".to_string()),
        ..flat_config()
    };
    let doc = process_document("l. A", &[], &config)?;
    assert_eq!(doc.content, "Article 1. A");
    assert!(doc.diagnostics.iter().any(|d| d.kind == DiagnosticKind::InvalidTemplate));
    Ok(())
}
