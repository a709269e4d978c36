use super::*;

/// Raw transport result; content-type classification happens in the fetcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchResponse {
    pub body: String,
    pub content_type: String,
    /// Final URL when the transport followed a redirect.
    pub redirected: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AnimationHandle(pub(crate) usize);

/// Popstate payload: the state stored on the entry that just became active.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PopStateEvent {
    pub state: Option<String>,
}

/// The platform surface the engine runs against. The document itself is
/// owned by the router; everything here is browser-global state the page
/// does not own: location, the history stack, scroll, transport, animation
/// and transition capabilities.
///
/// Every suspension point of the pipeline (fetch, preload settlement,
/// animation finish, script load, native transition completion) is a call on
/// this trait; an implementation decides when it completes.
pub trait Window {
    fn location(&self) -> &LocationParts;
    /// Full browser navigation. The engine hands the URL back to the
    /// platform and is done with it.
    fn assign(&mut self, url: &str);
    /// Location-href assignment used for fragment jumps on the current page.
    fn set_location_href(&mut self, url: &str);
    fn reload(&mut self);

    /// Serialized state of the active history entry, if any.
    fn history_state(&self) -> Option<String>;
    fn push_state(&mut self, state: String, url: &str);
    fn replace_state(&mut self, state: String, url: Option<&str>);
    fn scroll_restoration(&self) -> ScrollRestoration;
    fn set_scroll_restoration(&mut self, mode: ScrollRestoration);

    fn scroll_position(&self) -> (f64, f64);
    fn scroll_to(&mut self, x: f64, y: f64);

    /// `None` is a transport failure; the engine falls back to `assign`.
    fn fetch(&mut self, url: &str) -> Option<FetchResponse>;

    fn supports_view_transitions(&self) -> bool;
    fn begin_view_transition(&mut self);
    fn finish_view_transition(&mut self);

    /// Animations newly started by tagging the document with the given
    /// fallback phase.
    fn animations_started(&mut self, phase: &str) -> Vec<AnimationHandle>;
    fn animation_is_infinite(&self, animation: AnimationHandle) -> bool;
    /// Blocks until every listed animation has finished.
    fn await_animations(&mut self, animations: &[AnimationHandle]);

    fn preload_stylesheet(&mut self, href: &str);
    /// Blocks until every issued preload has settled, load or error.
    fn await_preloads(&mut self);

    fn await_script_load(&mut self, src: &str);

    fn supports_scroll_end(&self) -> bool;
    fn dev_mode(&self) -> bool;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockPage {
    pub(crate) html: String,
    pub(crate) content_type: String,
    pub(crate) redirect: Option<String>,
}

impl MockPage {
    pub fn html(markup: impl Into<String>) -> Self {
        Self {
            html: markup.into(),
            content_type: "text/html".to_string(),
            redirect: None,
        }
    }

    pub fn with_content_type(markup: impl Into<String>, content_type: impl Into<String>) -> Self {
        Self {
            html: markup.into(),
            content_type: content_type.into(),
            redirect: None,
        }
    }

    pub fn redirect_to(target: impl Into<String>) -> Self {
        Self {
            html: String::new(),
            content_type: "text/html".to_string(),
            redirect: Some(target.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct MockAnimation {
    name: String,
    infinite: bool,
}

const MAX_REDIRECTS: usize = 8;

/// Deterministic in-memory browser. Every platform interaction is resolved
/// immediately and recorded, so tests can assert on exact call sequences.
#[derive(Debug)]
pub struct MockWindow {
    location: LocationParts,
    entries: Vec<HistoryEntry>,
    entry_index: usize,
    scroll_restoration: ScrollRestoration,
    scroll_x: f64,
    scroll_y: f64,
    pages: HashMap<String, MockPage>,
    fetch_calls: Vec<String>,
    navigations: Vec<LocationNavigation>,
    reload_count: usize,
    supports_view_transitions: bool,
    supports_scroll_end: bool,
    dev_mode: bool,
    fallback_animations: Vec<MockAnimation>,
    awaited_animations: Vec<String>,
    preload_requests: Vec<String>,
    preload_waits: usize,
    script_loads: Vec<String>,
    view_transitions: usize,
}

impl MockWindow {
    pub fn new(url: &str) -> Result<Self> {
        let location =
            LocationParts::parse(url).ok_or_else(|| Error::InvalidUrl(url.to_string()))?;
        let entries = vec![HistoryEntry {
            url: location.href(),
            state: None,
        }];
        Ok(Self {
            location,
            entries,
            entry_index: 0,
            scroll_restoration: ScrollRestoration::Auto,
            scroll_x: 0.0,
            scroll_y: 0.0,
            pages: HashMap::new(),
            fetch_calls: Vec::new(),
            navigations: Vec::new(),
            reload_count: 0,
            supports_view_transitions: false,
            supports_scroll_end: false,
            dev_mode: false,
            fallback_animations: Vec::new(),
            awaited_animations: Vec::new(),
            preload_requests: Vec::new(),
            preload_waits: 0,
            script_loads: Vec::new(),
            view_transitions: 0,
        })
    }

    pub fn mount_page(&mut self, url: &str, page: MockPage) -> Result<()> {
        let resolved = self
            .location
            .resolve(url)
            .ok_or_else(|| Error::InvalidUrl(url.to_string()))?;
        self.pages.insert(resolved.href_without_hash(), page);
        Ok(())
    }

    pub fn set_supports_view_transitions(&mut self, supported: bool) {
        self.supports_view_transitions = supported;
    }

    pub fn set_supports_scroll_end(&mut self, supported: bool) {
        self.supports_scroll_end = supported;
    }

    pub fn set_dev_mode(&mut self, enabled: bool) {
        self.dev_mode = enabled;
    }

    /// Registers an animation that author CSS would start when the document
    /// enters the "old" fallback phase.
    pub fn add_fallback_animation(&mut self, name: impl Into<String>, infinite: bool) {
        self.fallback_animations.push(MockAnimation {
            name: name.into(),
            infinite,
        });
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn entry_index(&self) -> usize {
        self.entry_index
    }

    pub fn current_entry(&self) -> &HistoryEntry {
        &self.entries[self.entry_index]
    }

    pub fn fetch_calls(&self) -> &[String] {
        &self.fetch_calls
    }

    pub fn navigations(&self) -> &[LocationNavigation] {
        &self.navigations
    }

    pub fn reload_count(&self) -> usize {
        self.reload_count
    }

    pub fn preload_requests(&self) -> &[String] {
        &self.preload_requests
    }

    /// How many times the engine blocked on preload settlement.
    pub fn preload_wait_count(&self) -> usize {
        self.preload_waits
    }

    pub fn awaited_animations(&self) -> &[String] {
        &self.awaited_animations
    }

    pub fn script_loads(&self) -> &[String] {
        &self.script_loads
    }

    pub fn view_transition_count(&self) -> usize {
        self.view_transitions
    }

    /// Moves back one entry, as the browser's back button would, and returns
    /// the popstate payload the page would observe. `None` at the start of
    /// the stack.
    pub fn back(&mut self) -> Option<PopStateEvent> {
        if self.entry_index == 0 {
            return None;
        }
        self.entry_index -= 1;
        self.activate_current_entry()
    }

    pub fn forward(&mut self) -> Option<PopStateEvent> {
        if self.entry_index + 1 >= self.entries.len() {
            return None;
        }
        self.entry_index += 1;
        self.activate_current_entry()
    }

    fn activate_current_entry(&mut self) -> Option<PopStateEvent> {
        let entry = self.entries[self.entry_index].clone();
        if let Some(parsed) = LocationParts::parse(&entry.url) {
            self.location = parsed;
        }
        Some(PopStateEvent { state: entry.state })
    }

    /// A browser-created, stateless entry, e.g. from a plain hash link the
    /// engine never saw.
    pub fn push_browser_entry(&mut self, url: &str) -> Result<()> {
        let resolved = self
            .location
            .resolve(url)
            .ok_or_else(|| Error::InvalidUrl(url.to_string()))?;
        self.entries.truncate(self.entry_index + 1);
        self.entries.push(HistoryEntry {
            url: resolved.href(),
            state: None,
        });
        self.entry_index += 1;
        self.location = resolved;
        Ok(())
    }

    fn record_navigation(&mut self, kind: LocationNavigationKind, to: String) {
        self.navigations.push(LocationNavigation {
            kind,
            from: self.location.href(),
            to,
        });
    }
}

impl Window for MockWindow {
    fn location(&self) -> &LocationParts {
        &self.location
    }

    fn assign(&mut self, url: &str) {
        let Some(resolved) = self.location.resolve(url) else {
            return;
        };
        self.record_navigation(LocationNavigationKind::Assign, resolved.href());
        self.entries.truncate(self.entry_index + 1);
        self.entries.push(HistoryEntry {
            url: resolved.href(),
            state: None,
        });
        self.entry_index += 1;
        self.location = resolved;
    }

    fn set_location_href(&mut self, url: &str) {
        let Some(resolved) = self.location.resolve(url) else {
            return;
        };
        self.record_navigation(LocationNavigationKind::HrefSet, resolved.href());
        if resolved.href() != self.location.href() {
            // a fragment change creates a stateless browser entry
            self.entries.truncate(self.entry_index + 1);
            self.entries.push(HistoryEntry {
                url: resolved.href(),
                state: None,
            });
            self.entry_index += 1;
        }
        self.location = resolved;
    }

    fn reload(&mut self) {
        let href = self.location.href();
        self.record_navigation(LocationNavigationKind::Reload, href);
        self.reload_count += 1;
    }

    fn history_state(&self) -> Option<String> {
        self.entries[self.entry_index].state.clone()
    }

    fn push_state(&mut self, state: String, url: &str) {
        let Some(resolved) = self.location.resolve(url) else {
            return;
        };
        self.entries.truncate(self.entry_index + 1);
        self.entries.push(HistoryEntry {
            url: resolved.href(),
            state: Some(state),
        });
        self.entry_index += 1;
        self.location = resolved;
    }

    fn replace_state(&mut self, state: String, url: Option<&str>) {
        if let Some(url) = url {
            if let Some(resolved) = self.location.resolve(url) {
                self.entries[self.entry_index].url = resolved.href();
                self.location = resolved;
            }
        }
        self.entries[self.entry_index].state = Some(state);
    }

    fn scroll_restoration(&self) -> ScrollRestoration {
        self.scroll_restoration
    }

    fn set_scroll_restoration(&mut self, mode: ScrollRestoration) {
        self.scroll_restoration = mode;
    }

    fn scroll_position(&self) -> (f64, f64) {
        (self.scroll_x, self.scroll_y)
    }

    fn scroll_to(&mut self, x: f64, y: f64) {
        self.scroll_x = x;
        self.scroll_y = y;
    }

    fn fetch(&mut self, url: &str) -> Option<FetchResponse> {
        self.fetch_calls.push(url.to_string());
        let resolved = self.location.resolve(url)?;
        let mut key = resolved.href_without_hash();
        let mut redirected = false;
        for _ in 0..MAX_REDIRECTS {
            let page = self.pages.get(&key)?;
            if let Some(target) = page.redirect.clone() {
                let next = self.location.resolve(&target)?;
                key = next.href_without_hash();
                redirected = true;
                continue;
            }
            return Some(FetchResponse {
                body: page.html.clone(),
                content_type: page.content_type.clone(),
                redirected: redirected.then(|| key.clone()),
            });
        }
        None
    }

    fn supports_view_transitions(&self) -> bool {
        self.supports_view_transitions
    }

    fn begin_view_transition(&mut self) {
        self.view_transitions += 1;
    }

    fn finish_view_transition(&mut self) {}

    fn animations_started(&mut self, phase: &str) -> Vec<AnimationHandle> {
        if phase == "old" {
            (0..self.fallback_animations.len())
                .map(AnimationHandle)
                .collect()
        } else {
            Vec::new()
        }
    }

    fn animation_is_infinite(&self, animation: AnimationHandle) -> bool {
        self.fallback_animations
            .get(animation.0)
            .is_some_and(|a| a.infinite)
    }

    fn await_animations(&mut self, animations: &[AnimationHandle]) {
        for handle in animations {
            if let Some(animation) = self.fallback_animations.get(handle.0) {
                self.awaited_animations.push(animation.name.clone());
            }
        }
    }

    fn preload_stylesheet(&mut self, href: &str) {
        self.preload_requests.push(href.to_string());
    }

    fn await_preloads(&mut self) {
        // settle instantly; settlement order is the request order
        self.preload_waits += 1;
    }

    fn await_script_load(&mut self, src: &str) {
        self.script_loads.push(src.to_string());
    }

    fn supports_scroll_end(&self) -> bool {
        self.supports_scroll_end
    }

    fn dev_mode(&self) -> bool {
        self.dev_mode
    }
}
