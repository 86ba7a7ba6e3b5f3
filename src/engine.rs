// src/engine.rs
use anyhow::{Context, Result};
use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use std::collections::HashSet;

use crate::notify::Notifier;
use crate::sources::Source;
use crate::store::SeenStore;

/// One-time metrics registration.
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("monitor_cycles_total", "Polling cycles run.");
        describe_counter!("monitor_items_listed_total", "Items returned by source listings.");
        describe_counter!("monitor_matches_total", "Items that passed the keyword filter.");
        describe_counter!("monitor_notified_total", "Notifications delivered.");
        describe_counter!(
            "monitor_body_errors_total",
            "Enrichment fetches that failed (notified degraded)."
        );
        describe_counter!("monitor_notify_errors_total", "Notification deliveries that failed.");
        describe_counter!("monitor_cycle_errors_total", "Cycles aborted by a listing/store error.");
    });
}

/// Outcome of one polling cycle over one source.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleReport {
    pub listed: usize,
    pub matched: usize,
    pub notified: usize,
    pub body_errors: usize,
    pub notify_errors: usize,
}

/// True if any keyword is a substring of `title`. Case-sensitive, OR
/// semantics. An empty keyword set matches nothing.
pub fn title_matches(title: &str, keywords: &[String]) -> bool {
    keywords.iter().any(|k| title.contains(k.as_str()))
}

/// Plain-text notification body: title, optional summary excerpt,
/// optional link. Empty sections are omitted.
pub fn compose_body(title: &str, summary: Option<&str>, link: Option<&str>) -> String {
    let mut text = format!("Title: {title}\n\n");
    if let Some(s) = summary.filter(|s| !s.is_empty()) {
        text.push_str(&format!("Summary:\n{s}\n\n"));
    }
    if let Some(l) = link.filter(|l| !l.is_empty()) {
        text.push_str(&format!("Link: {l}\n"));
    }
    text
}

/// Run one polling cycle: load seen ids, list the source, notify new
/// keyword matches, persist the updated seen set.
///
/// Listing and store failures abort the cycle and surface to the
/// caller; nothing is persisted. Per-item failures do not: a failed
/// enrichment still notifies with title/link only, and a failed
/// delivery still records the id as seen (at-most-once).
pub async fn run_cycle(
    source: &dyn Source,
    store: &dyn SeenStore,
    notifier: &dyn Notifier,
) -> Result<CycleReport> {
    ensure_metrics_described();
    counter!("monitor_cycles_total").increment(1);

    let seen = store
        .load(source.name())
        .with_context(|| format!("loading seen ids for {}", source.name()))?;
    let seen_set: HashSet<&str> = seen.iter().map(|s| s.as_str()).collect();

    let items = source
        .list_items()
        .await
        .with_context(|| format!("listing {}", source.name()))?;

    let mut report = CycleReport {
        listed: items.len(),
        ..Default::default()
    };
    counter!("monitor_items_listed_total").increment(items.len() as u64);

    // Matched ids this cycle, in match order (newest first by listing
    // convention). Also guards a source returning one item twice, e.g.
    // across pages.
    let mut new_ids: Vec<String> = Vec::new();
    let mut cycle_ids: HashSet<String> = HashSet::new();

    for item in &items {
        if seen_set.contains(item.id.as_str()) || cycle_ids.contains(&item.id) {
            continue;
        }
        if !title_matches(&item.title, source.keywords()) {
            // Unmatched items are never recorded; they are re-evaluated
            // on every future cycle.
            continue;
        }
        report.matched += 1;
        counter!("monitor_matches_total").increment(1);

        let body = match source.fetch_body(item).await {
            Ok(b) => b,
            Err(e) => {
                report.body_errors += 1;
                counter!("monitor_body_errors_total").increment(1);
                tracing::warn!(error = ?e, source = source.name(), id = %item.id, "body fetch failed, notifying without summary");
                None
            }
        };

        let subject = format!("{} {}", source.name(), item.title);
        let text = compose_body(&item.title, body.as_deref(), item.link.as_deref());

        match notifier.notify(&subject, &text).await {
            Ok(()) => {
                report.notified += 1;
                counter!("monitor_notified_total").increment(1);
            }
            Err(e) => {
                report.notify_errors += 1;
                counter!("monitor_notify_errors_total").increment(1);
                tracing::warn!(error = ?e, source = source.name(), id = %item.id, "notification failed");
            }
        }

        // Recorded regardless of delivery outcome: at-most-once.
        cycle_ids.insert(item.id.clone());
        new_ids.push(item.id.clone());
    }

    let merged: Vec<String> = new_ids.into_iter().chain(seen.into_iter()).collect();
    store
        .save(source.name(), &merged, source.max_retained())
        .with_context(|| format!("saving seen ids for {}", source.name()))?;

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_matches_is_case_sensitive_or() {
        let kw = vec!["前端".to_string(), "Rust".to_string()];
        assert!(title_matches("招聘前端工程师", &kw));
        assert!(title_matches("Senior Rust engineer", &kw));
        assert!(!title_matches("senior rust engineer", &kw));
        assert!(!title_matches("后端工程师", &kw));
        assert!(!title_matches("anything", &[]));
    }

    #[test]
    fn compose_body_omits_empty_sections() {
        let full = compose_body("t", Some("s"), Some("l"));
        assert_eq!(full, "Title: t\n\nSummary:\ns\n\nLink: l\n");

        let bare = compose_body("t", None, None);
        assert_eq!(bare, "Title: t\n\n");

        let empty_summary = compose_body("t", Some(""), Some("l"));
        assert!(!empty_summary.contains("Summary"));
    }
}
