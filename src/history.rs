/// The state record the engine persists into a history entry it owns.
///
/// Serialized shape: `{"index":N,"scrollX":N,"scrollY":N,"intraPage":true?}`.
/// An entry whose state is absent or does not round-trip through this shape
/// is foreign and must never be touched.
#[derive(Debug, Clone, PartialEq)]
pub struct NavigationState {
    /// Monotonically increasing push counter; never decremented. The only
    /// direction signal the history stack offers on back/forward.
    pub index: i64,
    pub scroll_x: f64,
    pub scroll_y: f64,
    /// Same-resource navigation that only ever scrolls, never merges.
    pub intra_page: bool,
}

impl NavigationState {
    pub(crate) fn new(index: i64, scroll_x: f64, scroll_y: f64) -> Self {
        Self {
            index,
            scroll_x,
            scroll_y,
            intra_page: false,
        }
    }

    pub fn to_json(&self) -> String {
        let mut out = format!(
            "{{\"index\":{},\"scrollX\":{},\"scrollY\":{}",
            self.index, self.scroll_x, self.scroll_y
        );
        if self.intra_page {
            out.push_str(",\"intraPage\":true");
        }
        out.push('}');
        out
    }

    /// Strict parse; `None` means the state is not ours.
    pub fn from_json(raw: &str) -> Option<Self> {
        let body = raw.trim().strip_prefix('{')?.strip_suffix('}')?;
        let mut index = None;
        let mut scroll_x = None;
        let mut scroll_y = None;
        let mut intra_page = None;
        for pair in body.split(',') {
            let (key, value) = pair.split_once(':')?;
            let key = key.trim().strip_prefix('"')?.strip_suffix('"')?;
            let value = value.trim();
            match key {
                "index" => index = Some(value.parse::<i64>().ok()?),
                "scrollX" => scroll_x = Some(value.parse::<f64>().ok()?),
                "scrollY" => scroll_y = Some(value.parse::<f64>().ok()?),
                "intraPage" => {
                    intra_page = Some(match value {
                        "true" => true,
                        "false" => false,
                        _ => return None,
                    })
                }
                _ => return None,
            }
        }
        Some(Self {
            index: index?,
            scroll_x: scroll_x?,
            scroll_y: scroll_y?,
            intra_page: intra_page.unwrap_or(false),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub url: String,
    /// Raw serialized state; `None` for browser-created entries.
    pub state: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScrollRestoration {
    Auto,
    Manual,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Back,
}

impl Direction {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Forward => "forward",
            Self::Back => "back",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryMode {
    /// Push, the default.
    #[default]
    Auto,
    Push,
    Replace,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NavigateOptions {
    pub history: HistoryMode,
}

impl NavigateOptions {
    pub(crate) fn is_replace(&self) -> bool {
        self.history == HistoryMode::Replace
    }
}

/// Strategy used when the platform has no native view transition capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fallback {
    None,
    Animate,
    Swap,
}

impl Fallback {
    pub(crate) fn from_marker(content: &str) -> Self {
        match content.trim() {
            "none" => Self::None,
            "swap" => Self::Swap,
            _ => Self::Animate,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationNavigationKind {
    Assign,
    HrefSet,
    Reload,
}

/// Observable record of a navigation handed back to the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationNavigation {
    pub kind: LocationNavigationKind,
    pub from: String,
    pub to: String,
}
