use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Mutex as AsyncMutex;
use tokio::time::Instant;

use crate::docs::{SharedStore, UpdateDocumentInput};
use crate::notify::Notifier;

/// Default quiet interval before a pending edit is flushed
pub const DEFAULT_DEBOUNCE_MS: u64 = 1000;

/// Timing knobs for the autosave controller.
///
/// A flush becomes due at `min(window_opened_at + max_wait,
/// last_edit_at + quiet_window)`: the quiet window is reset by every edit,
/// while `max_wait` caps how long steady typing can postpone a write. With
/// both at the default 1000ms a steady typist gets one write per second plus
/// one trailing write after they stop.
#[derive(Debug, Clone, Copy)]
pub struct AutosaveConfig {
    pub quiet_window: Duration,
    pub max_wait: Duration,
}

impl Default for AutosaveConfig {
    fn default() -> Self {
        AutosaveConfig {
            quiet_window: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
            max_wait: Duration::from_millis(DEFAULT_DEBOUNCE_MS),
        }
    }
}

/// Result of a flush attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    /// The pending snapshot was persisted
    Saved,
    /// Nothing was pending; trivially successful
    Clean,
    /// The write failed; the pending snapshot is retained for retry
    Failed,
}

impl SaveOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, SaveOutcome::Failed)
    }
}

#[derive(Debug)]
struct SaveState {
    /// Latest content snapshot not yet confirmed persisted
    pending: Option<String>,
    /// True while a store write is outstanding
    is_writing: bool,
    /// Timestamp of the last edit event
    last_scheduled_at: Option<Instant>,
    /// Timestamp of the first edit since the last flush (max-wait anchor)
    window_opened_at: Option<Instant>,
    /// Whether a debounce timer task is currently alive
    timer_armed: bool,
    /// Set on close; edits are ignored and timers exit
    closed: bool,
}

/// Buffers the edit stream for one open document and flushes it to the
/// content store: edit bursts coalesce into a single write per debounce
/// window, and at most one write is in flight at any instant.
///
/// All timer state lives on the controller instance, so concurrent sessions
/// for different documents never interfere. Closing the controller cancels
/// its timers; a timer from a closed session can never write.
///
/// Cloning is shallow; clones share the same session state.
#[derive(Clone)]
pub struct AutosaveController {
    doc_id: String,
    store: SharedStore,
    notifier: Notifier,
    config: AutosaveConfig,
    state: Arc<Mutex<SaveState>>,
    /// Serializes writes; a flush arriving mid-write waits here
    write_gate: Arc<AsyncMutex<()>>,
}

impl AutosaveController {
    pub fn new(
        doc_id: impl Into<String>,
        store: SharedStore,
        notifier: Notifier,
        config: AutosaveConfig,
    ) -> Self {
        AutosaveController {
            doc_id: doc_id.into(),
            store,
            notifier,
            config,
            state: Arc::new(Mutex::new(SaveState {
                pending: None,
                is_writing: false,
                last_scheduled_at: None,
                window_opened_at: None,
                timer_armed: false,
                closed: false,
            })),
            write_gate: Arc::new(AsyncMutex::new(())),
        }
    }

    pub fn document_id(&self) -> &str {
        &self.doc_id
    }

    /// Record an edit event from the rich text surface. Never blocks; the
    /// snapshot replaces any previously pending one and (re)schedules the
    /// debounce timer. Empty content is a valid snapshot.
    pub fn on_content_changed(&self, content: impl Into<String>) {
        let mut st = self.state.lock().unwrap();
        if st.closed {
            return;
        }

        let now = Instant::now();
        st.pending = Some(content.into());
        st.last_scheduled_at = Some(now);
        if st.window_opened_at.is_none() {
            st.window_opened_at = Some(now);
        }

        if !st.timer_armed {
            st.timer_armed = true;
            drop(st);
            let controller = self.clone();
            tokio::spawn(async move {
                controller.run_timer().await;
            });
        }
    }

    /// Force an immediate write attempt of the pending snapshot, bypassing
    /// the debounce delay. Returns once the attempt completes; a no-op
    /// (`Clean`) when nothing is pending. Failures are reported through the
    /// notification channel, never raised.
    pub async fn flush_now(&self) -> SaveOutcome {
        self.flush().await
    }

    /// Close the session: ignore further edits, let stale timers expire
    /// without writing, and make one final best-effort flush. A failed final
    /// flush is reported but does not block teardown.
    pub async fn close(&self) -> SaveOutcome {
        {
            let mut st = self.state.lock().unwrap();
            st.closed = true;
        }
        self.flush().await
    }

    /// True while a store write is outstanding
    pub fn is_writing(&self) -> bool {
        self.state.lock().unwrap().is_writing
    }

    /// True if an edit snapshot is awaiting persistence
    pub fn has_pending(&self) -> bool {
        self.state.lock().unwrap().pending.is_some()
    }

    fn deadline_of(&self, st: &SaveState) -> Option<Instant> {
        let window = st.window_opened_at? + self.config.max_wait;
        let quiet = st.last_scheduled_at? + self.config.quiet_window;
        Some(window.min(quiet))
    }

    /// Debounce timer task. Sleeps until the current deadline, re-checking
    /// after each wakeup because edits move the quiet deadline. Exactly one
    /// timer task is alive per controller while edits are pending.
    async fn run_timer(self) {
        loop {
            let deadline = {
                let mut st = self.state.lock().unwrap();
                if st.closed || st.pending.is_none() {
                    st.timer_armed = false;
                    return;
                }
                match self.deadline_of(&st) {
                    Some(deadline) => deadline,
                    None => {
                        st.timer_armed = false;
                        return;
                    }
                }
            };

            if Instant::now() < deadline {
                tokio::time::sleep_until(deadline).await;
                continue;
            }

            {
                let mut st = self.state.lock().unwrap();
                if st.closed {
                    st.timer_armed = false;
                    return;
                }
                // Disarm before flushing so an edit arriving mid-write can
                // arm the follow-up timer
                st.timer_armed = false;
            }

            let _ = self.flush().await;
            return;
        }
    }

    async fn flush(&self) -> SaveOutcome {
        // Single-flight: waits for any in-flight write, then snapshots the
        // latest pending content. A flush queued behind a write that already
        // persisted the newest content finds nothing pending and returns
        // Clean, so a burst of deferred flushes collapses to one follow-up.
        let _gate = self.write_gate.lock().await;

        let snapshot = {
            let mut st = self.state.lock().unwrap();
            let content = match st.pending.clone() {
                Some(content) => content,
                None => return SaveOutcome::Clean,
            };
            st.is_writing = true;
            st.window_opened_at = None;
            content
        };

        let result = self
            .store
            .update(&self.doc_id, UpdateDocumentInput::content(snapshot.clone()))
            .await;

        let mut st = self.state.lock().unwrap();
        st.is_writing = false;

        match result {
            Ok(()) => {
                // Clear only if no newer edit arrived while the write was
                // outstanding; otherwise that edit's timer flushes it next.
                if st.pending.as_deref() == Some(snapshot.as_str()) {
                    st.pending = None;
                    st.last_scheduled_at = None;
                }
                log::debug!(
                    "autosaved document {} ({} bytes)",
                    self.doc_id,
                    snapshot.len()
                );
                SaveOutcome::Saved
            }
            Err(err) => {
                // Pending snapshot retained; the next edit or explicit
                // flush retries it.
                log::warn!("autosave failed for document {}: {}", self.doc_id, err);
                self.notifier
                    .destructive(format!("Couldn't save your changes: {}", err));
                SaveOutcome::Failed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::docs::{
        ContentStore, CreateDocumentInput, Document, DocumentFilter, SortOrder, StoreError,
    };
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::Mutex as StdMutex;
    use tokio::time::sleep;

    /// Store that records content writes and fails on demand
    struct ScriptedStore {
        writes: StdMutex<Vec<String>>,
        failures: StdMutex<VecDeque<()>>,
        write_delay: Duration,
    }

    impl ScriptedStore {
        fn new() -> Arc<Self> {
            Self::with_delay(Duration::ZERO)
        }

        fn with_delay(write_delay: Duration) -> Arc<Self> {
            Arc::new(ScriptedStore {
                writes: StdMutex::new(Vec::new()),
                failures: StdMutex::new(VecDeque::new()),
                write_delay,
            })
        }

        fn fail_next(&self) {
            self.failures.lock().unwrap().push_back(());
        }

        fn writes(&self) -> Vec<String> {
            self.writes.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl ContentStore for ScriptedStore {
        async fn get(&self, _id: &str) -> Result<Option<Document>, StoreError> {
            Ok(None)
        }

        async fn create(&self, _input: CreateDocumentInput) -> Result<Document, StoreError> {
            Err(StoreError::Backend("not supported".to_string()))
        }

        async fn update(&self, _id: &str, input: UpdateDocumentInput) -> Result<(), StoreError> {
            if self.write_delay > Duration::ZERO {
                sleep(self.write_delay).await;
            }
            if self.failures.lock().unwrap().pop_front().is_some() {
                return Err(StoreError::Backend("injected write failure".to_string()));
            }
            self.writes
                .lock()
                .unwrap()
                .push(input.content.unwrap_or_default());
            Ok(())
        }

        async fn list(
            &self,
            _filter: DocumentFilter,
            _order: SortOrder,
        ) -> Result<Vec<Document>, StoreError> {
            Ok(Vec::new())
        }

        async fn delete(&self, _id: &str) -> Result<(), StoreError> {
            Ok(())
        }
    }

    fn init_logging() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn controller(store: Arc<ScriptedStore>) -> AutosaveController {
        init_logging();
        AutosaveController::new(
            "doc-1",
            store,
            Notifier::disconnected(),
            AutosaveConfig::default(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_edit_burst_collapses_to_one_write() {
        let store = ScriptedStore::new();
        let ctl = controller(store.clone());

        ctl.on_content_changed("H");
        sleep(Duration::from_millis(100)).await;
        ctl.on_content_changed("He");
        sleep(Duration::from_millis(100)).await;
        ctl.on_content_changed("Hello");

        // Let the debounce window elapse
        sleep(Duration::from_millis(2000)).await;

        assert_eq!(store.writes(), vec!["Hello".to_string()]);
        assert!(!ctl.has_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_steady_typing_one_write_per_window() {
        let store = ScriptedStore::new();
        let ctl = controller(store.clone());

        // 2500ms of typing at one edit per 100ms
        for i in 0..=25 {
            ctl.on_content_changed(format!("text {}", i));
            sleep(Duration::from_millis(100)).await;
        }
        sleep(Duration::from_millis(2000)).await;

        let writes = store.writes();
        // Two mid-stream writes capped by max_wait plus one trailing write
        assert_eq!(writes.len(), 3, "writes: {:?}", writes);
        assert_eq!(writes.last().unwrap(), "text 25");
        assert!(!ctl.has_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_edit_during_inflight_write_issues_one_follow_up() {
        let store = ScriptedStore::with_delay(Duration::from_millis(300));
        let ctl = controller(store.clone());

        ctl.on_content_changed("v1");
        // Debounce fires at 1000ms; the write stays in flight until 1300ms
        sleep(Duration::from_millis(1100)).await;
        assert!(ctl.is_writing());
        ctl.on_content_changed("v2");

        sleep(Duration::from_millis(3000)).await;

        // The in-flight write kept its snapshot; exactly one follow-up
        // carried the newer content
        assert_eq!(store.writes(), vec!["v1".to_string(), "v2".to_string()]);
        assert!(!ctl.has_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_flush_now_without_pending_is_clean() {
        let store = ScriptedStore::new();
        let ctl = controller(store.clone());

        assert_eq!(ctl.flush_now().await, SaveOutcome::Clean);
        assert!(store.writes().is_empty());

        ctl.on_content_changed("once");
        assert_eq!(ctl.flush_now().await, SaveOutcome::Saved);
        assert_eq!(ctl.flush_now().await, SaveOutcome::Clean);
        assert_eq!(store.writes(), vec!["once".to_string()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_write_retains_content_for_retry() {
        init_logging();
        let store = ScriptedStore::new();
        let (notifier, mut notices) = Notifier::channel();
        let ctl =
            AutosaveController::new("doc-1", store.clone(), notifier, AutosaveConfig::default());

        store.fail_next();
        ctl.on_content_changed("important");
        assert_eq!(ctl.flush_now().await, SaveOutcome::Failed);

        // Content survives the failure, one destructive notice is shown
        assert!(ctl.has_pending());
        assert!(store.writes().is_empty());
        let notice = notices.try_recv().unwrap();
        assert_eq!(notice.severity, crate::notify::Severity::Destructive);
        assert!(notices.try_recv().is_err());

        // The retry persists the same content
        assert_eq!(ctl.flush_now().await, SaveOutcome::Saved);
        assert_eq!(store.writes(), vec!["important".to_string()]);
        assert!(!ctl.has_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_empty_content_is_persisted() {
        let store = ScriptedStore::new();
        let ctl = controller(store.clone());

        ctl.on_content_changed("something");
        ctl.flush_now().await;
        ctl.on_content_changed("");
        assert_eq!(ctl.flush_now().await, SaveOutcome::Saved);

        assert_eq!(store.writes(), vec!["something".to_string(), String::new()]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_flushes_and_cancels_timers() {
        let store = ScriptedStore::new();
        let ctl = controller(store.clone());

        ctl.on_content_changed("final words");
        assert_eq!(ctl.close().await, SaveOutcome::Saved);
        assert_eq!(store.writes(), vec!["final words".to_string()]);

        // Edits after close are ignored and no stale timer ever writes
        ctl.on_content_changed("too late");
        sleep(Duration::from_millis(5000)).await;
        assert_eq!(store.writes().len(), 1);
        assert!(!ctl.has_pending());
    }

    #[tokio::test(start_paused = true)]
    async fn test_close_reports_failure_but_still_closes() {
        init_logging();
        let store = ScriptedStore::new();
        let (notifier, mut notices) = Notifier::channel();
        let ctl =
            AutosaveController::new("doc-1", store.clone(), notifier, AutosaveConfig::default());

        store.fail_next();
        ctl.on_content_changed("unsaved");
        assert_eq!(ctl.close().await, SaveOutcome::Failed);

        assert!(notices.try_recv().is_ok());
        // Session is closed regardless of the failed final write
        ctl.on_content_changed("ignored");
        sleep(Duration::from_millis(5000)).await;
        assert!(store.writes().is_empty());
    }
}
