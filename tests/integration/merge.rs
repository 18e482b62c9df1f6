use anyhow::Result;
use lexdown::config::ProcessingConfig;
use lexdown::core::{DiagnosticKind, RunContext};
use lexdown::markdown::{import_metadata, parse_metadata};
use lexdown::merge::MergeAction;
use lexdown::metadata::{RESERVED_KEYS, Value};
use lexdown::pipeline::process_document;

#[test]
fn test_main_document_wins() -> Result<()> {
    let raw = "---\ncap: 500\n---\nCap: {{cap}}, client: {{client}}";
    let import = parse_metadata("cap: 2000\nclient: X\n")?;
    let doc = process_document(raw, &[import], &ProcessingConfig::default())?;

    assert_eq!(doc.metadata.get("cap"), Some(&Value::Integer(500)));
    assert_eq!(doc.metadata.get("client"), Some(&Value::from("X")));
    assert_eq!(doc.content.trim(), "Cap: 500, client: X");
    Ok(())
}

#[test]
fn test_earlier_imports_win_and_nested_keys_merge() -> Result<()> {
    let raw = "---\nclient:\n  name: Acme\n---\n{{client.name}} / {{client.city}} / {{term}}";
    let first = parse_metadata("client:\n  city: Paris\nterm: 12\n")?;
    let second = parse_metadata("client:\n  city: Berlin\n  name: Other\nterm: 24\n")?;
    let doc = process_document(raw, &[first, second], &ProcessingConfig::default())?;
    assert_eq!(doc.content.trim(), "Acme / Paris / 12");
    Ok(())
}

#[test]
fn test_reserved_keys_never_survive() -> Result<()> {
    let hostile: String = RESERVED_KEYS.iter().map(|key| format!("{key}: injected\n")).collect();
    let imports = vec![parse_metadata(&hostile)?, parse_metadata(&hostile)?];
    let config = ProcessingConfig {
        log_imports: true,
        ..ProcessingConfig::default()
    };
    let doc = process_document("l. Title", &imports, &config)?;

    for key in RESERVED_KEYS {
        assert!(doc.metadata.get(key).is_none(), "{key} leaked into merged metadata");
    }
    assert!(doc.content.starts_with("Article 1. Title"));
    assert_eq!(doc.merge_log.keys(MergeAction::Filtered).count(), RESERVED_KEYS.len() * 2);
    Ok(())
}

#[test]
fn test_type_mismatch_diagnostics_follow_config() -> Result<()> {
    let raw = "---\nfee: 100\n---\n{{fee}}";
    let import = parse_metadata("fee: one hundred\n")?;

    let doc = process_document(raw, &[import.clone()], &ProcessingConfig::default())?;
    assert_eq!(doc.content.trim(), "100");
    assert!(doc.diagnostics.iter().any(|d| d.kind == DiagnosticKind::TypeMismatch));

    let quiet = ProcessingConfig {
        validate_types: false,
        ..ProcessingConfig::default()
    };
    let doc = process_document(raw, &[import], &quiet)?;
    assert!(doc.diagnostics.iter().all(|d| d.kind != DiagnosticKind::TypeMismatch));
    Ok(())
}

#[test]
fn test_operation_log_only_when_enabled() -> Result<()> {
    let raw = "---\na: 1\n---\n";
    let import = parse_metadata("a: 2\nb: 3\n")?;

    let silent = process_document(raw, &[import.clone()], &ProcessingConfig::default())?;
    assert!(silent.merge_log.is_empty());

    let config = ProcessingConfig {
        log_imports: true,
        ..ProcessingConfig::default()
    };
    let logged = process_document(raw, &[import], &config)?;
    assert_eq!(logged.merge_log.keys(MergeAction::Added).collect::<Vec<_>>(), vec!["b"]);
    assert_eq!(logged.merge_log.keys(MergeAction::Overridden).collect::<Vec<_>>(), vec!["a"]);
    Ok(())
}

#[test]
fn test_import_documents_contribute_only_metadata() -> Result<()> {
    let mut ctx = RunContext::new(false, false);
    let import = import_metadata("---\nprovider: Imported LLP\n---\nl. This body is ignored\n", &mut ctx);
    let doc = process_document("{{provider}}", &[import], &ProcessingConfig::default())?;
    assert_eq!(doc.content, "Imported LLP");
    Ok(())
}
