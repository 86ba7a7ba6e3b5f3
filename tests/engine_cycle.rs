// tests/engine_cycle.rs
use anyhow::Result;
use async_trait::async_trait;
use jobwatch::{run_cycle, Item, MemoryNotifier, MemoryStore, Notifier, SeenStore, Source};

struct ScriptedSource {
    keywords: Vec<String>,
    max_retained: usize,
    items: Vec<Item>,
}

impl ScriptedSource {
    fn new(keywords: &[&str], max_retained: usize, items: Vec<Item>) -> Self {
        Self {
            keywords: keywords.iter().map(|s| s.to_string()).collect(),
            max_retained,
            items,
        }
    }
}

#[async_trait]
impl Source for ScriptedSource {
    fn name(&self) -> &str {
        "Scripted"
    }
    fn keywords(&self) -> &[String] {
        &self.keywords
    }
    fn max_retained(&self) -> usize {
        self.max_retained
    }
    async fn list_items(&self) -> Result<Vec<Item>> {
        Ok(self.items.clone())
    }
}

fn item(id: &str, title: &str) -> Item {
    Item {
        id: id.to_string(),
        title: title.to_string(),
        link: Some(format!("https://example.com/{id}")),
        summary: None,
    }
}

#[tokio::test]
async fn first_cycle_notifies_only_keyword_matches() {
    let source = ScriptedSource::new(
        &["前端"],
        200,
        vec![item("1", "前端工程师"), item("2", "后端工程师")],
    );
    let store = MemoryStore::new();
    let notifier = MemoryNotifier::new();

    let report = run_cycle(&source, &store, &notifier).await.unwrap();
    assert_eq!(report.listed, 2);
    assert_eq!(report.matched, 1);
    assert_eq!(report.notified, 1);

    let sent = notifier.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "Scripted 前端工程师");

    // Only the match is recorded; the filtered item stays unseen.
    assert_eq!(store.load("Scripted").unwrap(), vec!["1"]);
}

#[tokio::test]
async fn second_cycle_over_unchanged_listing_is_silent() {
    let source = ScriptedSource::new(
        &["前端"],
        200,
        vec![item("1", "前端工程师"), item("2", "后端工程师")],
    );
    let store = MemoryStore::new();
    let notifier = MemoryNotifier::new();

    run_cycle(&source, &store, &notifier).await.unwrap();
    let report = run_cycle(&source, &store, &notifier).await.unwrap();

    assert_eq!(report.matched, 0);
    assert_eq!(report.notified, 0);
    assert_eq!(notifier.sent.lock().unwrap().len(), 1);
    assert_eq!(store.load("Scripted").unwrap(), vec!["1"]);
}

#[tokio::test]
async fn new_matches_are_prepended_in_match_order() {
    let store = MemoryStore::new();
    store
        .save("Scripted", &["old".to_string()], 200)
        .unwrap();

    let source = ScriptedSource::new(
        &["前端"],
        200,
        vec![item("x", "前端 A"), item("y", "前端 B")],
    );
    let notifier = MemoryNotifier::new();
    run_cycle(&source, &store, &notifier).await.unwrap();

    assert_eq!(store.load("Scripted").unwrap(), vec!["x", "y", "old"]);
}

#[tokio::test]
async fn capacity_bound_evicts_oldest() {
    let store = MemoryStore::new();
    store
        .save("Scripted", &["a".to_string(), "b".to_string()], 2)
        .unwrap();

    let source = ScriptedSource::new(&["前端"], 2, vec![item("c", "前端工程师")]);
    let notifier = MemoryNotifier::new();
    run_cycle(&source, &store, &notifier).await.unwrap();

    assert_eq!(store.load("Scripted").unwrap(), vec!["c", "a"]);
}

#[tokio::test]
async fn duplicate_ids_within_one_listing_notify_once() {
    // A source paging through sub-requests can return one item twice.
    let source = ScriptedSource::new(
        &["前端"],
        200,
        vec![item("1", "前端工程师"), item("1", "前端工程师")],
    );
    let store = MemoryStore::new();
    let notifier = MemoryNotifier::new();

    let report = run_cycle(&source, &store, &notifier).await.unwrap();
    assert_eq!(report.notified, 1);
    assert_eq!(store.load("Scripted").unwrap(), vec!["1"]);
}

struct FailingNotifier;

#[async_trait]
impl Notifier for FailingNotifier {
    async fn notify(&self, _subject: &str, _body: &str) -> Result<()> {
        anyhow::bail!("mailer down")
    }
}

#[tokio::test]
async fn delivery_failure_still_records_seen() {
    let source = ScriptedSource::new(&["前端"], 200, vec![item("1", "前端工程师")]);
    let store = MemoryStore::new();

    let report = run_cycle(&source, &store, &FailingNotifier).await.unwrap();
    assert_eq!(report.matched, 1);
    assert_eq!(report.notified, 0);
    assert_eq!(report.notify_errors, 1);

    // At-most-once: the id is seen, the next cycle stays silent.
    assert_eq!(store.load("Scripted").unwrap(), vec!["1"]);
    let report2 = run_cycle(&source, &store, &FailingNotifier).await.unwrap();
    assert_eq!(report2.matched, 0);
}
