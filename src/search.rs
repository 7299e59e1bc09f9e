//! Debounced live filtering of reference lists.

use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::entities::{departments, equipment, lessor_organizations, users, warehouses};

/// Default delay between the last keystroke and filtering.
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Text an item is searched by.
pub trait DisplayName {
    fn display_name(&self) -> &str;
}

impl DisplayName for equipment::Model {
    fn display_name(&self) -> &str {
        &self.name
    }
}

impl DisplayName for departments::Model {
    fn display_name(&self) -> &str {
        &self.name
    }
}

impl DisplayName for warehouses::Model {
    fn display_name(&self) -> &str {
        &self.name
    }
}

impl DisplayName for lessor_organizations::Model {
    fn display_name(&self) -> &str {
        &self.name
    }
}

impl DisplayName for users::Model {
    fn display_name(&self) -> &str {
        &self.full_name
    }
}

/// Case-insensitive substring match. An empty query keeps everything.
pub fn filter_by_name<T: DisplayName + Clone>(items: &[T], query: &str) -> Vec<T> {
    let needle = query.trim().to_lowercase();
    if needle.is_empty() {
        return items.to_vec();
    }
    items
        .iter()
        .filter(|item| item.display_name().to_lowercase().contains(&needle))
        .cloned()
        .collect()
}

struct Filtered<T> {
    revision: u64,
    items: Vec<T>,
}

/// Search box state that filters once typing pauses.
///
/// Each [`input`](Self::input) cancels the pending run, so only the
/// newest query ever reaches [`results`](Self::results).
pub struct LiveFilter<T> {
    items: Arc<Vec<T>>,
    delay: Duration,
    query: String,
    revision: u64,
    pending: Option<JoinHandle<()>>,
    tx: UnboundedSender<Filtered<T>>,
    rx: UnboundedReceiver<Filtered<T>>,
    results: Vec<T>,
}

impl<T> LiveFilter<T>
where
    T: DisplayName + Clone + Send + Sync + 'static,
{
    pub fn new(delay: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            items: Arc::new(Vec::new()),
            delay,
            query: String::new(),
            revision: 0,
            pending: None,
            tx,
            rx,
            results: Vec::new(),
        }
    }

    /// Replace the source list and refilter it right away.
    pub fn set_items(&mut self, items: Vec<T>) {
        self.cancel();
        self.results = filter_by_name(&items, &self.query);
        self.items = Arc::new(items);
    }

    /// Record new search text and schedule filtering after the delay.
    pub fn input(&mut self, handle: &Handle, text: &str) {
        self.cancel();
        self.query = text.to_string();

        let revision = self.revision;
        let items = Arc::clone(&self.items);
        let query = self.query.clone();
        let delay = self.delay;
        let tx = self.tx.clone();

        self.pending = Some(handle.spawn(async move {
            tokio::time::sleep(delay).await;
            let items = filter_by_name(&items, &query);
            debug!("Live filter '{}': {} matches", query, items.len());
            let _ = tx.send(Filtered { revision, items });
        }));
    }

    /// Apply finished runs. Returns true when the results changed.
    pub fn poll(&mut self) -> bool {
        let mut updated = false;
        while let Ok(filtered) = self.rx.try_recv() {
            // A run may finish just before it is aborted.
            if filtered.revision == self.revision {
                self.results = filtered.items;
                updated = true;
            }
        }
        updated
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn results(&self) -> &[T] {
        &self.results
    }

    pub fn is_pending(&self) -> bool {
        self.pending.as_ref().is_some_and(|h| !h.is_finished())
    }

    fn cancel(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
        self.revision += 1;
    }
}

impl<T> Drop for LiveFilter<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.pending.take() {
            handle.abort();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Item(&'static str);

    impl DisplayName for Item {
        fn display_name(&self) -> &str {
            self.0
        }
    }

    fn catalog() -> Vec<Item> {
        vec![Item("Автокран 25 т"), Item("Погрузчик"), Item("Кран-манипулятор"), Item("Экскаватор")]
    }

    #[test]
    fn test_filter_is_case_insensitive() {
        let found = filter_by_name(&catalog(), "КРАН");
        assert_eq!(found, vec![Item("Автокран 25 т"), Item("Кран-манипулятор")]);
    }

    #[test]
    fn test_empty_query_returns_all() {
        assert_eq!(filter_by_name(&catalog(), "").len(), 4);
        assert_eq!(filter_by_name(&catalog(), "   ").len(), 4);
    }

    #[test]
    fn test_no_match() {
        assert!(filter_by_name(&catalog(), "бульдозер").is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_waits_for_delay() {
        let mut filter = LiveFilter::new(DEFAULT_DEBOUNCE);
        filter.set_items(catalog());
        assert_eq!(filter.results().len(), 4);

        filter.input(&Handle::current(), "погр");
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(!filter.poll());
        assert_eq!(filter.results().len(), 4);

        tokio::time::sleep(Duration::from_millis(250)).await;
        tokio::task::yield_now().await;
        assert!(filter.poll());
        assert_eq!(filter.results(), &[Item("Погрузчик")]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_last_input_wins() {
        let mut filter = LiveFilter::new(DEFAULT_DEBOUNCE);
        filter.set_items(catalog());

        filter.input(&Handle::current(), "кран");
        tokio::time::sleep(Duration::from_millis(200)).await;
        filter.input(&Handle::current(), "экск");
        tokio::time::sleep(Duration::from_millis(200)).await;
        // First run would have fired by now had it not been cancelled.
        assert!(!filter.poll());

        tokio::time::sleep(Duration::from_millis(200)).await;
        tokio::task::yield_now().await;
        assert!(filter.poll());
        assert_eq!(filter.query(), "экск");
        assert_eq!(filter.results(), &[Item("Экскаватор")]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_set_items_refilters_current_query() {
        let mut filter = LiveFilter::new(Duration::from_millis(10));
        filter.input(&Handle::current(), "кран");
        tokio::time::sleep(Duration::from_millis(20)).await;
        filter.poll();
        assert!(filter.results().is_empty());

        filter.set_items(catalog());
        assert_eq!(filter.results().len(), 2);
        assert!(!filter.is_pending());
    }
}
