//! Plain-text rendering of the view model.
use statuscheck_core::{AppViewModel, RunStatus};

/// Queued companies, one per line, with ids for `remove`.
pub fn queue_lines(view: &AppViewModel) -> Vec<String> {
    if view.queue.is_empty() {
        return vec!["No companies queued.".to_string()];
    }
    let mut lines = vec![format!("Companies to Analyze ({})", view.queue.len())];
    for row in &view.queue {
        let website = if row.website.is_empty() {
            String::new()
        } else {
            format!(" <{}>", row.website)
        };
        lines.push(format!(
            "  {}  {} ({}){}",
            row.id, row.name, row.location, website
        ));
    }
    if let Some(label) = &view.analyze_label {
        lines.push(format!("Next: {label}"));
    }
    lines
}

/// Field and upload errors from the last queue edit.
pub fn input_error_lines(view: &AppViewModel) -> Vec<String> {
    [
        view.form_errors.name,
        view.form_errors.location,
        view.upload_error.as_deref(),
    ]
    .into_iter()
    .flatten()
    .map(str::to_string)
    .collect()
}

pub fn progress_line(view: &AppViewModel) -> Option<String> {
    if view.run == RunStatus::Running && !view.progress.is_empty() {
        Some(view.progress.clone())
    } else {
        None
    }
}

/// Results table, run outcome and numbered sources.
pub fn results_lines(view: &AppViewModel) -> Vec<String> {
    let mut lines = Vec::new();
    match view.run {
        RunStatus::Completed => lines.push("Analysis complete.".to_string()),
        RunStatus::Cancelled => lines.push("Analysis cancelled.".to_string()),
        RunStatus::Failed | RunStatus::Idle | RunStatus::Running => {}
    }
    if let Some(error) = &view.error {
        lines.push(format!("Error: {error}"));
    }
    if !view.show_results {
        return lines;
    }
    if view.results.is_empty() {
        lines.push("No results.".to_string());
        return lines;
    }

    lines.push(String::new());
    lines.push(format!("Analysis Results ({})", view.results.len()));
    for result in &view.results {
        lines.push(format!(
            "- {} | {} | {} | {}",
            result.company_name, result.status, result.confidence_level, result.summary
        ));
        for link in result.link_list() {
            lines.push(format!("    {link}"));
        }
    }

    if !view.citations.is_empty() {
        lines.push(String::new());
        lines.push("Sources".to_string());
        for (i, citation) in view.citations.iter().enumerate() {
            let title = if citation.title.is_empty() {
                citation.uri.as_str()
            } else {
                citation.title.as_str()
            };
            lines.push(format!("  [{}] {} - {}", i + 1, title, citation.uri));
        }
    }
    lines
}
