use std::collections::HashMap;
use std::error::Error as StdError;
use std::fmt;

mod dom;
mod fetch;
mod history;
mod html;
mod location;
mod scheduler;
mod scripts;
mod selector;
mod swap;
mod transition;
mod window;

use dom::*;
use fetch::*;
use html::*;
use scheduler::*;
use selector::*;

pub use dom::NodeId;
pub use history::{
    Direction, Fallback, HistoryEntry, HistoryMode, LocationNavigation, LocationNavigationKind,
    NavigateOptions, NavigationState, ScrollRestoration,
};
pub use location::LocationParts;
pub use scheduler::PendingTimer;
pub use window::{AnimationHandle, FetchResponse, MockPage, MockWindow, PopStateEvent, Window};

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    HtmlParse(String),
    InvalidUrl(String),
    Runtime(String),
    SelectorNotFound(String),
    UnsupportedSelector(String),
    AssertionFailed {
        selector: String,
        expected: String,
        actual: String,
        dom_snippet: String,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::HtmlParse(msg) => write!(f, "html parse error: {msg}"),
            Self::InvalidUrl(url) => write!(f, "invalid url: {url}"),
            Self::Runtime(msg) => write!(f, "runtime error: {msg}"),
            Self::SelectorNotFound(selector) => write!(f, "selector not found: {selector}"),
            Self::UnsupportedSelector(selector) => write!(f, "unsupported selector: {selector}"),
            Self::AssertionFailed {
                selector,
                expected,
                actual,
                dom_snippet,
            } => write!(
                f,
                "assertion failed for {selector}: expected {expected}, actual {actual}, snippet {dom_snippet}"
            ),
        }
    }
}

impl StdError for Error {}

/// Element-level persistence identifier: elements sharing a value across the
/// old and new documents are the same stateful instance.
pub const PERSIST_ATTR: &str = "data-vr-persist";
/// Root attributes under this prefix survive every merge.
pub(crate) const RESERVED_ATTR_PREFIX: &str = "data-vr-";
pub(crate) const EXEC_ATTR: &str = "data-vr-exec";
pub(crate) const TRANSITION_ATTR: &str = "data-vr-transition";
pub(crate) const FALLBACK_ATTR: &str = "data-vr-transition-fallback";
/// Id attribute a dev server stamps on styles it injects at runtime.
pub(crate) const DEV_STYLE_ATTR: &str = "data-dev-id";
/// Name of the meta element that opts a page into client-side navigation;
/// pages without it get full browser loads.
pub const ENABLED_META: &str = "view-router-enabled";
/// Name of the meta element selecting the no-native-capability strategy:
/// `animate` (default), `swap`, or `none`.
pub const FALLBACK_META: &str = "view-router-fallback";

/// Fired after script replay on every completed navigation, including the
/// initial load.
pub const EVENT_PAGE_LOAD: &str = "router:page-load";
/// Fired immediately after DOM content is swapped, before script replay.
pub const EVENT_AFTER_SWAP: &str = "router:after-swap";

const SCROLL_THROTTLE_MS: i64 = 300;

/// Client-side navigation engine. Owns the live document and drives the
/// injected platform [`Window`]; the only writer of history entries it
/// created, and never a writer of anyone else's.
pub struct Router<W: Window> {
    window: W,
    document: Dom,
    /// Last known entry index, kept separate from the persisted per-entry
    /// index. The history stack exposes no direction signal, so a popstate
    /// is classified forward/back by comparing against this, and it is
    /// updated to the entry's index on every popstate. No other reader or
    /// writer exists.
    current_history_index: i64,
    navigation_in_flight: bool,
    listeners_active: bool,
    scheduler: Scheduler,
    scroll_throttle_wait: bool,
    scroll_throttle_pending: bool,
    events: Vec<String>,
    trace: bool,
    trace_events: bool,
    trace_timers: bool,
    trace_logs: Vec<String>,
    trace_log_limit: usize,
    trace_to_stderr: bool,
}

impl<W: Window> Router<W> {
    /// Attaches the engine to a freshly served page. Adopts existing engine
    /// state on the current entry (reload, or return from a page without the
    /// engine); otherwise seeds entry zero when the page participates.
    pub fn new(window: W, page_html: &str) -> Result<Self> {
        let document = parse_document(page_html)?;
        let mut router = Self {
            window,
            document,
            current_history_index: 0,
            navigation_in_flight: false,
            listeners_active: false,
            scheduler: Scheduler::new(),
            scroll_throttle_wait: false,
            scroll_throttle_pending: false,
            events: Vec::new(),
            trace: false,
            trace_events: true,
            trace_timers: true,
            trace_logs: Vec::new(),
            trace_log_limit: 10_000,
            trace_to_stderr: true,
        };

        if let Some(state) = router
            .window
            .history_state()
            .and_then(|raw| NavigationState::from_json(&raw))
        {
            router.current_history_index = state.index;
            router.window.scroll_to(state.scroll_x, state.scroll_y);
        } else if router.page_enabled() {
            let (x, y) = router.window.scroll_position();
            router
                .window
                .replace_state(NavigationState::new(0, x, y).to_json(), None);
        }

        router.listeners_active =
            router.window.supports_view_transitions() || router.fallback_mode() != Fallback::None;
        if router.listeners_active {
            router.mark_scripts_executed();
            router.emit_event(EVENT_PAGE_LOAD);
        }
        Ok(router)
    }

    /// Whether the current page advertises participation.
    pub fn page_enabled(&self) -> bool {
        self.document.meta_named(ENABLED_META).is_some()
    }

    /// Programmatic navigation entry point.
    pub fn navigate(&mut self, href: &str, options: NavigateOptions) -> Result<()> {
        if !self.page_enabled() {
            // never partially engage
            self.trace_nav(format!("not enabled here, full navigation to {href}"));
            self.window.assign(href);
            return Ok(());
        }
        let to = self
            .window
            .location()
            .resolve(href)
            .ok_or_else(|| Error::InvalidUrl(href.to_string()))?;

        let location = self.window.location().clone();
        if location.same_origin(&to) && location.same_page(&to) {
            self.trace_nav(format!("intra-page {}", to.href()));
            self.update_history_and_scroll(&to, options.is_replace(), true);
            return Ok(());
        }

        // cross-origin destinations fall out at fetch time
        if self.navigation_in_flight {
            self.trace_nav(format!("ignored {href}: navigation in flight"));
            return Ok(());
        }
        self.navigation_in_flight = true;
        let outcome = self.transition(Direction::Forward, to, options, None);
        self.navigation_in_flight = false;
        outcome
    }

    /// Handles the platform's back/forward signal for the active entry.
    pub fn handle_popstate(&mut self, state: Option<String>) -> Result<()> {
        if !self.listeners_active {
            return Ok(());
        }
        let parsed = state.as_deref().and_then(NavigationState::from_json);

        let Some(state) = parsed else {
            // No state, or state not shaped like ours: a browser-created
            // entry. Native behavior handles it without us.
            self.window.set_scroll_restoration(ScrollRestoration::Auto);
            self.trace_nav("popstate: foreign entry, leaving to the browser".to_string());
            return Ok(());
        };

        if !self.page_enabled() {
            // The destination page ran the engine; the current one does not,
            // so its code is not loaded here. Reload to pick it up; scroll
            // restoration happens when the destination re-attaches.
            self.window
                .set_scroll_restoration(ScrollRestoration::Manual);
            self.trace_nav("popstate: engine not loaded here, reloading".to_string());
            self.window.reload();
            return Ok(());
        }

        // the browser would jump to the old offset before the transition
        // completes
        self.window
            .set_scroll_restoration(ScrollRestoration::Manual);

        if state.intra_page {
            self.window.scroll_to(state.scroll_x, state.scroll_y);
            return Ok(());
        }

        let direction = if state.index > self.current_history_index {
            Direction::Forward
        } else {
            Direction::Back
        };
        self.current_history_index = state.index;
        self.trace_nav(format!(
            "popstate: {} to #{}",
            direction.as_str(),
            state.index
        ));

        if self.navigation_in_flight {
            self.trace_nav("popstate ignored: navigation in flight".to_string());
            return Ok(());
        }
        self.navigation_in_flight = true;
        let to = self.window.location().clone();
        let outcome = self.transition(direction, to, NavigateOptions::default(), Some(state));
        self.navigation_in_flight = false;
        outcome
    }

    /// A user scroll settled at the given offsets. Persists the position
    /// into the current entry, immediately when the platform reports scroll
    /// completion, otherwise through the throttle.
    pub fn user_scroll(&mut self, x: f64, y: f64) {
        self.window.scroll_to(x, y);
        if !self.listeners_active {
            return;
        }
        if self.window.supports_scroll_end() {
            self.persist_scroll_position();
        } else {
            self.on_throttled_scroll();
        }
    }

    fn on_throttled_scroll(&mut self) {
        if self.scroll_throttle_wait {
            // swallowed; the trailing edge repeats the write
            self.scroll_throttle_pending = true;
            return;
        }
        self.persist_scroll_position();
        self.scroll_throttle_wait = true;
        self.scheduler
            .schedule(SCROLL_THROTTLE_MS, ScheduledCallback::ScrollFlush);
    }

    /// Writes the live scroll offsets into the current entry's state, but
    /// only when that entry already carries state this engine created.
    pub(crate) fn persist_scroll_position(&mut self) {
        let Some(mut state) = self
            .window
            .history_state()
            .and_then(|raw| NavigationState::from_json(&raw))
        else {
            return;
        };
        let (x, y) = self.window.scroll_position();
        state.scroll_x = x;
        state.scroll_y = y;
        self.window.replace_state(state.to_json(), None);
    }

    // Deterministic clock.

    pub fn now_ms(&self) -> i64 {
        self.scheduler.now_ms
    }

    pub fn pending_timers(&self) -> Vec<PendingTimer> {
        self.scheduler.pending()
    }

    pub fn advance_time(&mut self, delta_ms: i64) -> Result<()> {
        if delta_ms < 0 {
            return Err(Error::Runtime(
                "advance_time requires a non-negative delta".into(),
            ));
        }
        let target = self.scheduler.now_ms.saturating_add(delta_ms);
        while let Some(task) = self.scheduler.pop_due(target) {
            self.run_scheduled(task);
        }
        self.scheduler.now_ms = target;
        Ok(())
    }

    fn run_scheduled(&mut self, task: ScheduledTask) {
        if self.trace && self.trace_timers {
            self.trace_push(format!("timer {} fired at {}", task.id, task.due_at));
        }
        match task.callback {
            ScheduledCallback::AnnounceTitle { region } => self.fill_announcement(region),
            ScheduledCallback::ScrollFlush => {
                if self.scroll_throttle_pending {
                    self.scroll_throttle_pending = false;
                    self.persist_scroll_position();
                }
                self.scroll_throttle_wait = false;
            }
        }
    }

    // Emitted document-level signals, in order.

    pub fn events(&self) -> &[String] {
        &self.events
    }

    pub fn take_events(&mut self) -> Vec<String> {
        std::mem::take(&mut self.events)
    }

    pub(crate) fn emit_event(&mut self, name: &str) {
        self.events.push(name.to_string());
        if self.trace && self.trace_events {
            self.trace_push(format!("event {name}"));
        }
    }

    // Trace facility.

    pub fn enable_trace(&mut self, enabled: bool) {
        self.trace = enabled;
    }

    pub fn take_trace_logs(&mut self) -> Vec<String> {
        std::mem::take(&mut self.trace_logs)
    }

    pub fn set_trace_stderr(&mut self, enabled: bool) {
        self.trace_to_stderr = enabled;
    }

    pub fn set_trace_events(&mut self, enabled: bool) {
        self.trace_events = enabled;
    }

    pub fn set_trace_timers(&mut self, enabled: bool) {
        self.trace_timers = enabled;
    }

    pub fn set_trace_log_limit(&mut self, max_entries: usize) -> Result<()> {
        if max_entries == 0 {
            return Err(Error::Runtime(
                "set_trace_log_limit requires at least 1 entry".into(),
            ));
        }
        self.trace_log_limit = max_entries;
        while self.trace_logs.len() > self.trace_log_limit {
            self.trace_logs.remove(0);
        }
        Ok(())
    }

    pub(crate) fn trace_nav(&mut self, message: String) {
        if self.trace {
            self.trace_push(format!("nav: {message}"));
        }
    }

    pub(crate) fn trace_event(&mut self, message: String) {
        if self.trace && self.trace_events {
            self.trace_push(message);
        }
    }

    fn trace_push(&mut self, entry: String) {
        if self.trace_to_stderr {
            eprintln!("[view_router] {entry}");
        }
        self.trace_logs.push(entry);
        while self.trace_logs.len() > self.trace_log_limit {
            self.trace_logs.remove(0);
        }
    }

    // Platform access for tests and callers.

    pub fn window(&self) -> &W {
        &self.window
    }

    pub fn window_mut(&mut self) -> &mut W {
        &mut self.window
    }

    // Document queries and assertions.

    pub fn query(&self, selector: &str) -> Result<NodeId> {
        select_one(&self.document, selector)
    }

    pub fn query_all(&self, selector: &str) -> Result<Vec<NodeId>> {
        select_all(&self.document, selector)
    }

    pub fn attr_of(&self, selector: &str, name: &str) -> Result<Option<String>> {
        let node = select_one(&self.document, selector)?;
        Ok(self.document.attr(node, name))
    }

    /// Sets runtime widget state on an input or textarea, the way typing
    /// would. Useful for proving persisted elements keep their state.
    pub fn type_text(&mut self, selector: &str, text: &str) -> Result<()> {
        let node = select_one(&self.document, selector)?;
        let tag = self.document.tag_name(node).unwrap_or_default();
        if !tag.eq_ignore_ascii_case("input") && !tag.eq_ignore_ascii_case("textarea") {
            return Err(Error::Runtime(format!(
                "type_text target must be input or textarea, got {tag}"
            )));
        }
        self.document.set_value(node, text);
        Ok(())
    }

    pub fn assert_text(&self, selector: &str, expected: &str) -> Result<()> {
        let node = select_one(&self.document, selector)?;
        let actual = self.document.text_content(node);
        if actual.trim() != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual: actual.trim().to_string(),
                dom_snippet: self.document.dump_node(node),
            });
        }
        Ok(())
    }

    pub fn assert_value(&self, selector: &str, expected: &str) -> Result<()> {
        let node = select_one(&self.document, selector)?;
        let actual = self.document.value(node).unwrap_or_default();
        if actual != expected {
            return Err(Error::AssertionFailed {
                selector: selector.to_string(),
                expected: expected.to_string(),
                actual,
                dom_snippet: self.document.dump_node(node),
            });
        }
        Ok(())
    }

    pub fn assert_exists(&self, selector: &str) -> Result<()> {
        select_one(&self.document, selector).map(|_| ())
    }

    pub fn dump_dom(&self, selector: &str) -> Result<String> {
        let node = select_one(&self.document, selector)?;
        Ok(self.document.dump_node(node))
    }
}

impl Router<MockWindow> {
    /// Browser back button: moves the mock history and routes the resulting
    /// popstate through the engine. `false` at the start of the stack.
    pub fn back(&mut self) -> Result<bool> {
        let Some(event) = self.window.back() else {
            return Ok(false);
        };
        self.handle_popstate(event.state)?;
        Ok(true)
    }

    pub fn forward(&mut self) -> Result<bool> {
        let Some(event) = self.window.forward() else {
            return Ok(false);
        };
        self.handle_popstate(event.state)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests;
