// Colored terminal output for verdicts, batches and service status.
//
// main.rs delegates all CLI rendering here.

use colored::Colorize;

use crate::decision::ModerationStatus;
use crate::moderation::{BatchReport, ModerationReport, ServiceStatus};

/// Display a single moderation report.
pub fn display_report(text: &str, report: &ModerationReport) {
    let verdict = &report.verdict;
    println!("\n{}", "=== Moderation Result ===".bold());
    println!("  Text: {}", super::truncate_chars(text, 80).dimmed());
    println!(
        "  Verdict: {}  (confidence {:.3})",
        colorize_status(verdict.status()),
        verdict.confidence_score
    );

    match &report.sentiment {
        Some(s) => println!(
            "  Sentiment: positive {:.3}  negative {:.3}  neutral {:.3}",
            s.positive, s.negative, s.neutral
        ),
        None => println!("  Sentiment: {}", "not evaluated".dimmed()),
    }

    if !report.negative_words.is_empty() {
        println!(
            "  Negative words: {}",
            report.negative_words.join(", ").red()
        );
    }

    if !verdict.rejection_reasons.is_empty() {
        let label = if verdict.approved { "Notes" } else { "Reasons" };
        println!("  {label}:");
        for reason in &verdict.rejection_reasons {
            println!("    - {reason}");
        }
    }
    println!("  {}", format!("({:.1} ms)", report.processing_time_ms).dimmed());
}

/// Display a batch as one line per text plus totals.
pub fn display_batch(texts: &[String], batch: &BatchReport) {
    println!(
        "\n{}",
        format!("=== Batch Moderation ({} texts) ===", batch.total_count).bold()
    );
    println!();

    for (i, (text, report)) in texts.iter().zip(&batch.results).enumerate() {
        let reason = report
            .verdict
            .rejection_reasons
            .first()
            .map(String::as_str)
            .unwrap_or("");
        println!(
            "  {:>4}. {:<10} {:>5.2}  {}  {}",
            i + 1,
            colorize_status(report.verdict.status()),
            report.verdict.confidence_score,
            super::truncate_chars(text, 40),
            reason.dimmed(),
        );
    }

    println!();
    println!(
        "  {} approved, {} rejected ({:.1} ms total)",
        batch.approved_count.to_string().green(),
        batch.rejected_count.to_string().red(),
        batch.total_processing_time_ms
    );
}

/// Display the service status snapshot.
pub fn display_status(status: &ServiceStatus) {
    let ready = if status.classifier_ready {
        "ready".green()
    } else {
        "not loaded".red()
    };
    println!("Classifier: {} (device: {})", ready, status.compute_device);
    println!(
        "Thresholds: sentiment approval {:.2}, confidence {:.2}",
        status.thresholds.sentiment_approval_threshold, status.thresholds.confidence_threshold
    );
    println!("Lexicon: {} terms", status.lexicon_size);
    if !status.classifier_ready {
        println!(
            "  {}",
            "Texts that pass the lexicon will be rejected with a system error until a model is loaded."
                .yellow()
        );
    }
}

fn colorize_status(status: ModerationStatus) -> colored::ColoredString {
    match status {
        ModerationStatus::Approved => "APPROVED".green().bold(),
        ModerationStatus::Rejected => "REJECTED".red().bold(),
    }
}
