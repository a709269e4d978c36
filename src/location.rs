/// Parsed URL, split into the parts navigation decisions are made from.
///
/// Userinfo components are parsed past and discarded; the engine never
/// compares or reproduces credentials.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocationParts {
    pub(crate) scheme: String,
    pub(crate) has_authority: bool,
    pub(crate) hostname: String,
    pub(crate) port: String,
    pub(crate) pathname: String,
    pub(crate) opaque_path: String,
    pub(crate) search: String,
    pub(crate) hash: String,
}

impl LocationParts {
    pub fn protocol(&self) -> String {
        format!("{}:", self.scheme)
    }

    pub fn host(&self) -> String {
        if self.port.is_empty() {
            self.hostname.clone()
        } else {
            format!("{}:{}", self.hostname, self.port)
        }
    }

    pub fn origin(&self) -> String {
        if self.has_authority && !self.hostname.is_empty() {
            format!("{}//{}", self.protocol(), self.host())
        } else {
            "null".to_string()
        }
    }

    pub fn pathname(&self) -> &str {
        if self.has_authority {
            &self.pathname
        } else {
            &self.opaque_path
        }
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    pub fn hash(&self) -> &str {
        &self.hash
    }

    pub fn href(&self) -> String {
        if self.has_authority {
            let path = if self.pathname.is_empty() {
                "/".to_string()
            } else {
                self.pathname.clone()
            };
            format!(
                "{}//{}{}{}{}",
                self.protocol(),
                self.host(),
                path,
                self.search,
                self.hash
            )
        } else {
            format!(
                "{}{}{}{}",
                self.protocol(),
                self.opaque_path,
                self.search,
                self.hash
            )
        }
    }

    pub(crate) fn href_without_hash(&self) -> String {
        let mut stripped = self.clone();
        stripped.hash.clear();
        stripped.href()
    }

    /// Same origin, path, and query. The hash is deliberately ignored: a
    /// navigation that differs only by fragment is intra-page.
    pub fn same_page(&self, other: &LocationParts) -> bool {
        self.pathname == other.pathname && self.search == other.search
    }

    pub fn same_origin(&self, other: &LocationParts) -> bool {
        self.has_authority
            && other.has_authority
            && self.scheme == other.scheme
            && self.hostname == other.hostname
            && self.port == other.port
    }

    pub fn parse(input: &str) -> Option<Self> {
        let trimmed = input.trim();
        let scheme_end = trimmed.find(':')?;
        let scheme = trimmed[..scheme_end].to_ascii_lowercase();
        if !is_valid_url_scheme(&scheme) {
            return None;
        }
        let rest = &trimmed[scheme_end + 1..];
        if let Some(without_slashes) = rest.strip_prefix("//") {
            let authority_end = without_slashes
                .find(|ch| ['/', '?', '#'].contains(&ch))
                .unwrap_or(without_slashes.len());
            let authority = &without_slashes[..authority_end];
            let tail = &without_slashes[authority_end..];
            let hostport = match authority.rfind('@') {
                Some(at) => &authority[at + 1..],
                None => authority,
            };
            let (hostname, port) = split_hostname_and_port(hostport);
            let (pathname, search, hash) = split_path_search_hash(tail);
            let pathname = if pathname.is_empty() {
                "/".to_string()
            } else {
                normalize_pathname(&pathname)
            };
            Some(Self {
                scheme,
                has_authority: true,
                hostname,
                port,
                pathname,
                opaque_path: String::new(),
                search,
                hash,
            })
        } else {
            let (opaque_path, search, hash) = split_path_search_hash(rest);
            Some(Self {
                scheme,
                has_authority: false,
                hostname: String::new(),
                port: String::new(),
                pathname: String::new(),
                opaque_path,
                search,
                hash,
            })
        }
    }

    /// Resolves `reference` against `self`, the way a link href resolves
    /// against the document URL. Absolute references stand on their own;
    /// everything else needs an authority-based base.
    pub fn resolve(&self, reference: &str) -> Option<Self> {
        let reference = reference.trim();
        if let Some(absolute) = Self::parse(reference) {
            return Some(absolute);
        }
        if !self.has_authority {
            return None;
        }
        if reference.starts_with("//") {
            return Self::parse(&format!("{}:{}", self.scheme, reference));
        }

        let mut out = self.clone();
        if reference.is_empty() {
            out.hash.clear();
            return Some(out);
        }
        if let Some(fragment) = reference.strip_prefix('#') {
            out.hash = ensure_hash_prefix(fragment);
            return Some(out);
        }
        if reference.starts_with('?') {
            let (_, search, hash) = split_path_search_hash(reference);
            out.search = search;
            out.hash = hash;
            return Some(out);
        }

        let (path, search, hash) = split_path_search_hash(reference);
        let merged = if path.starts_with('/') {
            path
        } else {
            let base_dir = match self.pathname.rfind('/') {
                Some(idx) => &self.pathname[..idx + 1],
                None => "/",
            };
            format!("{base_dir}{path}")
        };
        out.pathname = normalize_pathname(&merged);
        out.search = search;
        out.hash = hash;
        Some(out)
    }
}

pub(crate) fn is_valid_url_scheme(scheme: &str) -> bool {
    let mut chars = scheme.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    if !first.is_ascii_alphabetic() {
        return false;
    }
    chars.all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '+' | '-' | '.'))
}

pub(crate) fn split_hostname_and_port(authority: &str) -> (String, String) {
    if authority.is_empty() {
        return (String::new(), String::new());
    }

    if let Some(rest) = authority.strip_prefix('[') {
        if let Some(end_idx) = rest.find(']') {
            let hostname = authority[..end_idx + 2].to_string();
            let suffix = &authority[end_idx + 2..];
            if let Some(port) = suffix.strip_prefix(':') {
                return (hostname, port.to_string());
            }
            return (hostname, String::new());
        }
    }

    if let Some(idx) = authority.rfind(':') {
        let hostname = &authority[..idx];
        let port = &authority[idx + 1..];
        if !hostname.contains(':') {
            return (hostname.to_string(), port.to_string());
        }
    }
    (authority.to_string(), String::new())
}

pub(crate) fn split_path_search_hash(tail: &str) -> (String, String, String) {
    let mut pathname = tail;
    let mut search = "";
    let mut hash = "";

    if let Some(hash_pos) = tail.find('#') {
        pathname = &tail[..hash_pos];
        hash = &tail[hash_pos..];
    }

    if let Some(search_pos) = pathname.find('?') {
        search = &pathname[search_pos..];
        pathname = &pathname[..search_pos];
    }

    (pathname.to_string(), search.to_string(), hash.to_string())
}

pub(crate) fn normalize_pathname(pathname: &str) -> String {
    let starts_with_slash = pathname.starts_with('/');
    let ends_with_slash = pathname.ends_with('/') && pathname.len() > 1;
    let mut parts = Vec::new();
    for segment in pathname.split('/') {
        if segment.is_empty() || segment == "." {
            continue;
        }
        if segment == ".." {
            parts.pop();
            continue;
        }
        parts.push(segment);
    }
    let mut out = if starts_with_slash {
        format!("/{}", parts.join("/"))
    } else {
        parts.join("/")
    };
    if out.is_empty() {
        out.push('/');
    }
    if ends_with_slash && !out.ends_with('/') {
        out.push('/');
    }
    out
}

pub(crate) fn ensure_hash_prefix(value: &str) -> String {
    if value.is_empty() {
        String::new()
    } else if value.starts_with('#') {
        value.to_string()
    } else {
        format!("#{value}")
    }
}
