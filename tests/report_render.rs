use layout_check::{detect::DetectedFormat, engine::OutputFormat, report::AnalysisReport};

#[test]
fn report_lists_requested_and_detected() {
    let content = "# Title\n\n**bold** and *it*\n";
    let r = AnalysisReport::new("docs/a.pdf", content, OutputFormat::Markdown, 500);
    assert_eq!(r.detected.format, DetectedFormat::Markdown);
    let text = r.render_text();
    assert!(text.contains("File: docs/a.pdf"));
    assert!(text.contains("Requested format: markdown"));
    assert!(text.contains("Detected format: Markdown (indicators: 3)"));
    assert!(text.contains("RESULT: service returned Markdown"));
    assert!(text.contains("Check the complete file to confirm the format."));
}

#[test]
fn plain_text_report() {
    let r = AnalysisReport::new("a.pdf", "just words", OutputFormat::Default, 500);
    let text = r.render_text();
    assert!(text.contains("Detected format: Plain text"));
    assert!(text.contains("RESULT: Plain text or unidentified format"));
    assert!(text.contains("Content length: 10 characters"));
}

#[test]
fn excerpts_are_bounded_by_characters() {
    let content = format!("{}{}", "é".repeat(600), "z".repeat(10));
    let r = AnalysisReport::new("a.pdf", &content, OutputFormat::Text, 500);
    assert_eq!(r.content_chars, 610);
    assert_eq!(r.head.chars().count(), 500);
    assert!(r.head.chars().all(|c| c == 'é'));
    assert_eq!(r.tail.chars().count(), 500);
    assert!(r.tail.ends_with("zzzzzzzzzz"));
    let text = r.render_text();
    assert!(text.contains("FIRST 500 CHARACTERS:"));
    assert!(text.contains("LAST 500 CHARACTERS:\n..."));
}

#[test]
fn report_serializes_to_json() {
    let r = AnalysisReport::new("a.pdf", "<p>hi</p>", OutputFormat::Html, 500);
    let v = serde_json::to_value(&r).unwrap();
    assert_eq!(v["requested"], "html");
    assert_eq!(v["detected"]["format"], "Html");
    assert_eq!(v["counts"]["html"], 1);
}

#[test]
fn fallback_note_only_when_fell_back() {
    let mut r = AnalysisReport::new("a.pdf", "words", OutputFormat::Html, 500);
    assert!(!r.render_text().contains("requested format was rejected"));
    r.fell_back = true;
    let text = r.render_text();
    assert!(text.contains(
        "Content length: 5 characters\nNote: requested format was rejected; default parameters were used\n\n=== CONTENT ANALYSIS ==="
    ));
}

#[test]
fn rendered_layout_is_stable() {
    let mut r = AnalysisReport::new("a.pdf", "{\"a\":[\"b\", 1]}", OutputFormat::Default, 3);
    r.date = "2026-01-01T00:00:00Z".into();
    let expected = "=== ANALYSIS REPORT ===
File: a.pdf
Date: 2026-01-01T00:00:00Z
Requested format: default
Detected format: JSON (indicators: 4)
Content length: 14 characters

=== CONTENT ANALYSIS ===
RESULT: service returned JSON
   - JSON structure found

=== CONTENT SAMPLE ===
FIRST 3 CHARACTERS:
{\"a...

LAST 3 CHARACTERS:
...1]}

=== MANUAL VERIFICATION ===
Check the complete file to confirm the format.
";
    assert_eq!(r.render_text(), expected);
}
