use colored::Colorize;
use reconcile::{ApplyOutcome, ApplyStatus, ApplySummary, DiffSummary, ResourceKey};

/// Print an info message
pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue(), msg);
}

/// Print a success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green(), msg);
}

/// Print a warning message
pub fn warn(msg: &str) {
    println!("{} {}", "⚠".yellow(), msg);
}

/// Print an error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red(), msg);
}

/// Print a dim/muted message
pub fn dim(msg: &str) {
    println!("  {}", msg.dimmed());
}

/// Print a header/title
pub fn header(title: &str) {
    println!();
    println!("{}", title.bold());
    println!("{}", "─".repeat(title.chars().count()).dimmed());
}

/// Print a key-value pair
pub fn kv(key: &str, value: &str) {
    println!("  {}: {}", key.dimmed(), value);
}

// ============================================================================
// Reconcile Output
// ============================================================================

/// Print one line per applied resource
pub fn apply_status(key: &ResourceKey, status: &ApplyStatus) {
    match status {
        ApplyStatus::Done(ApplyOutcome::Added) => {
            println!("  {} {} {}", "+".green(), key, "added".green());
        }
        ApplyStatus::Done(ApplyOutcome::Updated) => {
            println!("  {} {} {}", "~".yellow(), key, "updated".yellow());
        }
        ApplyStatus::Done(ApplyOutcome::Unchanged) => {
            println!("  {} {} {}", "=".dimmed(), key, "unchanged".dimmed());
        }
        ApplyStatus::Failed(err) => {
            eprintln!("  {} {} {}", "✗".red(), key, err.to_string().red());
        }
        ApplyStatus::Skipped { reason } => {
            println!("  {} {} {}", "-".dimmed(), key, format!("skipped: {reason}").dimmed());
        }
    }
}

/// Print an apply summary line
pub fn apply_summary(summary: &ApplySummary) {
    let line = format!(
        "{} added, {} updated, {} unchanged, {} failed, {} skipped",
        summary.added, summary.updated, summary.unchanged, summary.failed, summary.skipped
    );
    println!();
    if summary.is_success() {
        success(&line);
    } else {
        error(&line);
    }
}

/// Print a unified diff with added/removed lines colored
pub fn unified_diff(text: &str) {
    for line in text.lines() {
        if line.starts_with("+++") || line.starts_with("---") {
            println!("{}", line.bold());
        } else if line.starts_with("@@") {
            println!("{}", line.cyan());
        } else if line.starts_with('+') {
            println!("{}", line.green());
        } else if line.starts_with('-') {
            println!("{}", line.red());
        } else {
            println!("{line}");
        }
    }
}

/// Print a diff summary line
pub fn diff_summary(summary: &DiffSummary) {
    println!();
    let line = format!(
        "{} to add, {} to update, {} unchanged",
        summary.additions, summary.modifications, summary.unchanged
    );
    if summary.errors > 0 {
        error(&format!("{line}, {} errors", summary.errors));
    } else if !summary.has_changes() {
        success(&line);
    } else {
        info(&line);
    }
}
