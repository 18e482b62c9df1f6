use anyhow::Result;
use lexdown::config::ProcessingConfig;
use lexdown::core::DiagnosticKind;
use lexdown::pipeline::process_document;
use lexdown::tracking::FieldStatus;

fn render(raw: &str) -> Result<lexdown::pipeline::ProcessedDocument> {
    Ok(process_document(raw, &[], &ProcessingConfig::default())?)
}

#[test]
fn test_hello_example() -> Result<()> {
    let doc = render("---\nname: Acme\n---\nHello {{name}}!")?;
    assert_eq!(doc.content.trim(), "Hello Acme!");
    let field = &doc.field_report.fields[0];
    assert_eq!(field.name, "name");
    assert_eq!(field.status, FieldStatus::Filled);
    assert_eq!(field.original_value, "{{name}}");
    Ok(())
}

#[test]
fn test_missing_example() -> Result<()> {
    let doc = render("Hello {{missing}}!")?;
    assert_eq!(doc.content, "Hello {{missing}}!");
    assert_eq!(doc.field_report.fields[0].status, FieldStatus::Empty);
    Ok(())
}

#[test]
fn test_loop_example_has_independent_scopes() -> Result<()> {
    let doc = render("---\nname: Outer\nitems:\n  - name: A\n  - name: B\n---\n{{#items}}{{name}}{{/items}} {{name}}")?;
    assert_eq!(doc.content.trim(), "AB Outer");
    Ok(())
}

#[test]
fn test_ternary_and_helpers() -> Result<()> {
    let raw = r#"---
client:
  name: acme holdings
  is_llc: true
fee: 12500.5
start: 2024-01-31
---
{{titleCase client.name}} {{client.is_llc ? "LLC" : "Inc."}}
Fee: {{formatCurrency fee "EUR"}} ({{numberToWords 42}})
Due: {{formatDate (addMonths start 1) "YYYY-MM-DD"}}
"#;
    let doc = render(raw)?;
    let lines: Vec<&str> = doc.content.trim().lines().collect();
    assert_eq!(lines[0], "Acme Holdings LLC");
    assert_eq!(lines[1], "Fee: €12,500.50 (forty-two)");
    assert_eq!(lines[2], "Due: 2024-02-29");

    let logic = doc.field_report.fields.iter().filter(|f| f.status == FieldStatus::Logic).count();
    assert_eq!(logic, doc.field_report.logic);
    assert!(logic >= 4);
    Ok(())
}

#[test]
fn test_unknown_helper_and_division_by_zero_stay_visible() -> Result<()> {
    let doc = render("---\nfee: 10\n---\n{{shout fee}} {{divide fee 0}}")?;
    assert_eq!(doc.content.trim(), "{{shout fee}} {{divide fee 0}}");
    assert!(doc.diagnostics.iter().any(|d| d.kind == DiagnosticKind::UnknownHelper));
    assert!(doc.diagnostics.iter().any(|d| d.kind == DiagnosticKind::HelperFailed));
    assert_eq!(doc.field_report.empty, 2);
    Ok(())
}

#[test]
fn test_conditionals_and_loop_variables() -> Result<()> {
    let raw = "---\nparties: [Acme, Beta, Gamma]\npaid: false\n---\n{{#each parties}}{{@number}}. {{this}}{{#if @last}}.{{else}}; {{/if}}{{/each}}\n{{#unless paid}}Payment outstanding{{/unless}}\n";
    let doc = render(raw)?;
    assert_eq!(doc.content.trim(), "1. Acme; 2. Beta; 3. Gamma.\nPayment outstanding");
    Ok(())
}

#[test]
fn test_standalone_block_lines_leave_no_gaps() -> Result<()> {
    let raw = "---\nitems: [a, b]\n---\nBefore\n{{#each items}}\n* {{this}}\n{{/each}}\nAfter\n";
    let doc = render(raw)?;
    assert_eq!(doc.content.trim(), "Before\n* a\n* b\nAfter");
    Ok(())
}

#[test]
fn test_unbalanced_block_is_reported_and_kept() -> Result<()> {
    let doc = render("---\nx: 1\n---\n{{/x}} and {{x}}")?;
    assert_eq!(doc.content.trim(), "{{/x}} and 1");
    assert!(doc.diagnostics.iter().any(|d| d.kind == DiagnosticKind::UnbalancedBlock));
    Ok(())
}

#[test]
fn test_missing_field_suggests_close_names() -> Result<()> {
    let doc = render("---\nclient_name: Acme\n---\n{{clent_name}}")?;
    let diagnostic = doc
        .diagnostics
        .iter()
        .find(|d| d.kind == DiagnosticKind::MissingField)
        .expect("missing field diagnostic");
    assert!(diagnostic.message.contains("client_name"));
    Ok(())
}

#[test]
fn test_field_report_serializes_camel_case() -> Result<()> {
    let doc = render("---\na: 1\n---\n{{a}} {{b}}")?;
    let json = serde_json::to_value(&doc.field_report)?;
    assert_eq!(json["total"], 2);
    assert_eq!(json["filled"], 1);
    assert_eq!(json["empty"], 1);
    assert_eq!(json["fields"][1]["originalValue"], "{{b}}");
    assert_eq!(json["fields"][0]["occurrences"], 1);
    assert_eq!(json["fields"][0]["hasLogic"], false);
    Ok(())
}
