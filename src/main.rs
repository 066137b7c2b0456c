// src/main.rs
// =============================================================================
// This is the entry point of our CLI application.
//
// What happens here:
// 1. Parse command-line arguments using clap
// 2. Set up logging (stderr, so stdout stays a clean report)
// 3. Run the audit over the site directory
// 4. Print the report as text or JSON
// 5. Exit with the audit's code (0 = clean, 2 = internal, 3 = external)
//
// Exit code 1 is reserved for the tool itself failing.
// =============================================================================

// Module declarations - tells Rust about our other source files
mod checker; // src/checker/ - extraction, classification, checks
mod cli; // src/cli.rs - command-line parsing
mod site; // src/site/ - the audit driver

use anyhow::Result;
use checker::{Finding, FindingKind};
use clap::Parser; // Parser trait enables the parse() method
use cli::Cli;
use serde::Serialize;
use simple_logger::SimpleLogger;
use site::AuditReport;

// The #[tokio::main] attribute transforms our async main into a real main function
#[tokio::main]
async fn main() {
    let exit_code = match run().await {
        Ok(code) => code,
        Err(e) => {
            // Anything reaching here is a tool failure, not a broken link
            eprintln!("Error: {:#}", e);
            1
        }
    };

    std::process::exit(exit_code);
}

// This is the main application logic
// Returns the exit code of the audit, or an error if we couldn't run it
async fn run() -> Result<i32> {
    let cli = Cli::parse();

    // A second logger can't be installed; that's harmless, keep going
    let _ = SimpleLogger::new().with_level(cli.log_level()).env().init();

    let report = site::audit(&cli.root, &cli.audit_options()).await?;

    if cli.json {
        print_json(&report)?;
    } else {
        print_text(&report);
    }

    Ok(report.exit_code())
}

// Prints the human-readable report:
//   counts first, then one section per non-empty group of findings
fn print_text(report: &AuditReport) {
    println!("Checked internal refs: {}", report.internal_checked);
    println!("Broken internal links: {}", report.internal_broken());
    if let Some(checked) = report.external_checked {
        println!("Checked external URLs (unique): {}", checked);
        println!("Broken external links: {}", report.external_broken());
    }

    print_group(report, "Broken internal links", FindingKind::Internal);
    print_group(report, "Broken external links", FindingKind::External);
}

fn print_group(report: &AuditReport, title: &str, kind: FindingKind) {
    let findings: Vec<&Finding> = report.findings_of(kind).collect();
    if findings.is_empty() {
        return;
    }

    println!("\n{}", title);
    println!("{}", "-".repeat(title.len()));
    for finding in findings {
        let link = &finding.link;
        println!(
            "{}: <{} {}>=\"{}\" -> {}",
            report.relative(&link.source_file).display(),
            link.tag,
            link.attribute,
            link.raw_url,
            finding.message
        );
    }
}

// JSON shape of the report
#[derive(Serialize)]
struct JsonReport<'a> {
    internal_checked: usize,
    internal_broken: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    external_checked: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    external_broken: Option<usize>,
    findings: Vec<JsonFinding<'a>>,
}

#[derive(Serialize)]
struct JsonFinding<'a> {
    kind: FindingKind,
    source_file: String,
    tag: &'a str,
    attribute: &'a str,
    raw_url: &'a str,
    message: &'a str,
}

fn print_json(report: &AuditReport) -> Result<()> {
    let findings = report
        .findings
        .iter()
        .map(|f| JsonFinding {
            kind: f.kind,
            source_file: report.relative(&f.link.source_file).display().to_string(),
            tag: &f.link.tag,
            attribute: &f.link.attribute,
            raw_url: &f.link.raw_url,
            message: &f.message,
        })
        .collect();

    let json = JsonReport {
        internal_checked: report.internal_checked,
        internal_broken: report.internal_broken(),
        external_checked: report.external_checked,
        external_broken: report.external_checked.map(|_| report.external_broken()),
        findings,
    };

    println!("{}", serde_json::to_string_pretty(&json)?);
    Ok(())
}
