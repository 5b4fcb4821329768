use anyhow::{anyhow, Result};
use layout_check::{
    config::Config,
    detect::DetectedFormat,
    engine::{AnalyzeOut, Engine, OutputFormat},
    pipeline::{render_comparison, Analyzer},
};
use std::path::Path;

struct FakeEngine;

impl Engine for FakeEngine {
    fn analyze(&self, _input: &Path, format: OutputFormat) -> Result<AnalyzeOut> {
        let content = match format {
            OutputFormat::Default | OutputFormat::Text => "plain words only",
            OutputFormat::Markdown => "# Title\n\n**bold** text\n",
            OutputFormat::Html => return Err(anyhow!("400 Bad Request: unsupported format")),
        };
        Ok(AnalyzeOut {
            content: content.to_string(),
            model_id: "prebuilt-layout".into(),
            api_version: "2024-11-30".into(),
            fell_back: false,
        })
    }
}

fn write_input(dir: &Path, name: &str) -> std::path::PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, b"%PDF-1.7").unwrap();
    path
}

#[test]
fn analyze_writes_content_and_report() {
    let tmp = tempfile::tempdir().unwrap();
    let input = write_input(tmp.path(), "Azure AI Agents.pdf");
    let out_dir = tmp.path().join("results");

    let analyzer = Analyzer::new(&Config::default(), FakeEngine);
    let out = analyzer
        .analyze_document(&input, OutputFormat::Markdown, &out_dir)
        .unwrap();

    assert_eq!(out.report.detected.format, DetectedFormat::Markdown);
    assert_eq!(
        out.content_path,
        out_dir.join("Azure AI Agents_markdown_content.md")
    );
    assert_eq!(
        std::fs::read_to_string(&out.content_path).unwrap(),
        "# Title\n\n**bold** text\n"
    );
    let report = std::fs::read_to_string(out_dir.join("Azure AI Agents_markdown_report.md")).unwrap();
    assert!(report.contains("Requested format: markdown"));
    assert!(!out_dir.join("Azure AI Agents_markdown_report.json").exists());
}

#[test]
fn json_report_written_when_enabled() {
    let tmp = tempfile::tempdir().unwrap();
    let input = write_input(tmp.path(), "doc.pdf");
    let mut cfg = Config::default();
    cfg.report.write_report_json = true;

    let analyzer = Analyzer::new(&cfg, FakeEngine);
    analyzer
        .analyze_document(&input, OutputFormat::Default, tmp.path())
        .unwrap();
    assert!(tmp.path().join("doc_default_report.json").exists());
}

#[test]
fn missing_input_is_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    let analyzer = Analyzer::new(&Config::default(), FakeEngine);
    let err = analyzer
        .analyze_document(&tmp.path().join("nope.pdf"), OutputFormat::Default, tmp.path())
        .err()
        .unwrap();
    assert!(err.to_string().contains("does not exist"));
}

#[test]
fn url_input_is_rejected() {
    let tmp = tempfile::tempdir().unwrap();
    let analyzer = Analyzer::new(&Config::default(), FakeEngine);
    let err = analyzer
        .analyze_document(Path::new("https://example.com/a.pdf"), OutputFormat::Default, tmp.path())
        .err()
        .unwrap();
    assert!(err.to_string().contains("URL inputs are disabled"));
}

#[test]
fn comparison_records_failures_and_continues() {
    let tmp = tempfile::tempdir().unwrap();
    let input = write_input(tmp.path(), "doc.pdf");
    let cfg = Config::default();
    let analyzer = Analyzer::new(&cfg, FakeEngine);

    let rows = analyzer.compare_formats(&input, &cfg.compare.formats, tmp.path());
    assert_eq!(rows.len(), 4);
    assert!(rows[0].detected.is_some());
    assert_eq!(
        rows[1].detected.map(|d| d.format),
        Some(DetectedFormat::Markdown)
    );
    assert!(rows[3].detected.is_none());

    let summary = render_comparison(&rows);
    assert!(summary.contains("default    -> Plain text\n"));
    assert!(summary.contains("markdown   -> Markdown (indicators: 3)\n"));
    assert!(summary.contains("html       -> ERROR\n"));
}

#[test]
fn batch_skips_missing_documents() {
    let tmp = tempfile::tempdir().unwrap();
    let present = write_input(tmp.path(), "one.pdf");
    let missing = tmp.path().join("two.pdf");
    let docs = vec![
        missing.display().to_string(),
        present.display().to_string(),
    ];

    let analyzer = Analyzer::new(&Config::default(), FakeEngine);
    let summary = analyzer.run_batch(&docs, &tmp.path().join("out"));

    assert_eq!(summary.missing, vec![missing.display().to_string()]);
    assert_eq!(summary.compared.as_deref(), Some(docs[1].as_str()));
    assert_eq!(summary.comparison.len(), 4);
    assert_eq!(summary.analyzed.len(), 1);
    assert!(tmp.path().join("out").join("one_default_content.md").exists());
}

#[test]
fn batch_with_no_documents_does_nothing() {
    let tmp = tempfile::tempdir().unwrap();
    let analyzer = Analyzer::new(&Config::default(), FakeEngine);
    let summary = analyzer.run_batch(&[], tmp.path());
    assert!(summary.compared.is_none());
    assert!(summary.analyzed.is_empty());
}

struct FallbackEngine;

impl Engine for FallbackEngine {
    fn analyze(&self, _input: &Path, _format: OutputFormat) -> Result<AnalyzeOut> {
        Ok(AnalyzeOut {
            content: "plain words only".to_string(),
            model_id: "prebuilt-layout".into(),
            api_version: "2024-11-30".into(),
            fell_back: true,
        })
    }
}

#[test]
fn fallback_is_noted_in_report() {
    let tmp = tempfile::tempdir().unwrap();
    let input = write_input(tmp.path(), "doc.pdf");

    let analyzer = Analyzer::new(&Config::default(), FallbackEngine);
    let out = analyzer
        .analyze_document(&input, OutputFormat::Html, tmp.path())
        .unwrap();

    assert!(out.report.fell_back);
    let report = std::fs::read_to_string(tmp.path().join("doc_html_report.md")).unwrap();
    assert!(report.contains("Requested format: html"));
    assert!(report.contains("Note: requested format was rejected; default parameters were used"));
}

#[test]
fn dotfile_input_gets_empty_stem() {
    let tmp = tempfile::tempdir().unwrap();
    let input = write_input(tmp.path(), ".scan.pdf");

    let analyzer = Analyzer::new(&Config::default(), FakeEngine);
    let out = analyzer
        .analyze_document(&input, OutputFormat::Default, tmp.path())
        .unwrap();
    assert_eq!(out.content_path, tmp.path().join("_default_content.md"));
}
