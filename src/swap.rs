use super::*;

enum HeadDisposition {
    /// The destination has this element; drop the incoming copy and keep the
    /// live node in place.
    Counterpart(NodeId),
    /// No counterpart, but the preservation policy keeps it anyway.
    Keep,
    Discard,
}

impl<W: Window> Router<W> {
    /// Turns the live document into the destination document. Step order
    /// matters throughout; see the callers in the transition pipeline for
    /// when this runs relative to animation phases.
    pub(crate) fn swap_documents(
        &mut self,
        new_doc: &mut Dom,
        to: &LocationParts,
        options: NavigateOptions,
        pop_state: Option<&NavigationState>,
    ) -> Result<()> {
        self.merge_root_attributes(new_doc);
        self.reconcile_scripts(new_doc);
        self.merge_head(new_doc)?;
        self.replace_body(new_doc)?;

        if let Some(state) = pop_state {
            self.window.scroll_to(state.scroll_x, state.scroll_y);
        } else {
            self.update_history_and_scroll(to, options.is_replace(), false);
        }

        self.emit_event(EVENT_AFTER_SWAP);
        Ok(())
    }

    /// Clears the live root's attributes and applies the destination's,
    /// except that attributes in the reserved internal namespace survive
    /// unconditionally, re-applied last so a conflicting destination value
    /// cannot clobber them.
    fn merge_root_attributes(&mut self, new_doc: &Dom) {
        let (Some(live_root), Some(new_root)) =
            (self.document.document_element(), new_doc.document_element())
        else {
            return;
        };

        let mut preserved = Vec::new();
        for name in self.document.attr_names(live_root) {
            let value = self.document.attr(live_root, &name).unwrap_or_default();
            self.document.remove_attr(live_root, &name);
            if name.starts_with(RESERVED_ATTR_PREFIX) {
                preserved.push((name, value));
            }
        }
        for name in new_doc.attr_names(new_root) {
            if let Some(value) = new_doc.attr(new_root, &name) {
                self.document.set_attr(live_root, &name, &value);
            }
        }
        for (name, value) in preserved {
            self.document.set_attr(live_root, &name, &value);
        }
    }

    /// Marks destination scripts whose effect is already active as executed,
    /// so replay skips them while genuinely new scripts still run.
    fn reconcile_scripts(&mut self, new_doc: &mut Dom) {
        let live_scripts = self.document.scripts_in_order();
        let new_scripts = new_doc.scripts_in_order();
        for live in live_scripts {
            let live_src = self.document.attr(live, "src");
            let live_type = self.document.attr(live, "type").unwrap_or_default();
            let live_text = self.document.text_content(live);
            for new in &new_scripts {
                let new_src = new_doc.attr(*new, "src");
                let matches = match (&live_src, &new_src) {
                    // inline scripts match on content
                    (None, None) => live_text == new_doc.text_content(*new),
                    // external scripts match on source and type
                    (Some(a), Some(b)) => {
                        a == b && live_type == new_doc.attr(*new, "type").unwrap_or_default()
                    }
                    _ => false,
                };
                if matches {
                    new_doc.set_attr(*new, EXEC_ATTR, "");
                    break;
                }
            }
        }
    }

    fn merge_head(&mut self, new_doc: &mut Dom) -> Result<()> {
        let (Some(live_head), Some(new_head)) = (self.document.head(), new_doc.head()) else {
            return Err(Error::Runtime("document is missing a head".into()));
        };

        for child in self.document.children(live_head) {
            if self.document.element(child).is_none() {
                continue;
            }
            match self.head_disposition(child, new_doc) {
                HeadDisposition::Counterpart(new_el) => {
                    // keep the live node, drop the incoming copy
                    new_doc.remove_node(new_el)?;
                }
                HeadDisposition::Keep => {}
                HeadDisposition::Discard => {
                    self.document.remove_node(child)?;
                }
            }
        }

        // everything still in the destination head is genuinely new
        for child in new_doc.children(new_head) {
            self.document
                .clone_subtree_from_dom(new_doc, child, Some(live_head))?;
        }
        Ok(())
    }

    fn head_disposition(&self, live_el: NodeId, new_doc: &Dom) -> HeadDisposition {
        if let Some(persist_id) = self.document.attr(live_el, PERSIST_ATTR) {
            // head counterparts only; a body element sharing the id belongs
            // to the body pass
            if let Some(new_head) = new_doc.head() {
                if let Some(new_el) = new_doc
                    .elements_in_subtree(new_head)
                    .into_iter()
                    .find(|id| {
                        new_doc.attr(*id, PERSIST_ATTR).as_deref() == Some(persist_id.as_str())
                    })
                {
                    return HeadDisposition::Counterpart(new_el);
                }
            }
        }

        if self.is_stylesheet_link(&self.document, live_el) {
            if let Some(href) = self.document.attr(live_el, "href") {
                if let Some(scope) = new_doc.head() {
                    for candidate in new_doc.stylesheet_links(scope) {
                        if new_doc.attr(candidate, "href").as_deref() == Some(href.as_str()) {
                            return HeadDisposition::Counterpart(candidate);
                        }
                    }
                }
            }
        }

        // Style elements injected by a dev server have no counterpart in
        // server-rendered destination markup; discarding them would lose
        // styles until the next full load. Policy, not special case: keep
        // any unmatched dev-tagged style while the environment is in dev
        // mode.
        if self.window.dev_mode() && self.document.is_element_named(live_el, "style") {
            if let Some(dev_id) = self.document.attr(live_el, DEV_STYLE_ATTR) {
                if let Some(new_el) = new_doc.find_by_attr(DEV_STYLE_ATTR, &dev_id) {
                    return HeadDisposition::Counterpart(new_el);
                }
                return HeadDisposition::Keep;
            }
        }

        HeadDisposition::Discard
    }

    fn is_stylesheet_link(&self, dom: &Dom, node: NodeId) -> bool {
        dom.is_element_named(node, "link")
            && dom
                .attr(node, "rel")
                .is_some_and(|rel| rel.eq_ignore_ascii_case("stylesheet"))
    }

    /// Swaps the whole body, then re-homes persisted elements from the old
    /// body over their counterparts so stateful widgets survive with their
    /// node identity intact.
    fn replace_body(&mut self, new_doc: &Dom) -> Result<()> {
        let old_body = self
            .document
            .body()
            .ok_or_else(|| Error::Runtime("document is missing a body".into()))?;
        let new_body = new_doc
            .body()
            .ok_or_else(|| Error::Runtime("destination is missing a body".into()))?;

        let body_clone = self.document.clone_subtree_from_dom(new_doc, new_body, None)?;
        self.document.replace_with(old_body, body_clone)?;

        for preserved in self.document.elements_in_subtree(old_body) {
            let Some(persist_id) = self.document.attr(preserved, PERSIST_ATTR) else {
                continue;
            };
            if let Some(counterpart) = self.document.find_by_attr(PERSIST_ATTR, &persist_id) {
                self.document.replace_with(counterpart, preserved)?;
            }
        }
        self.document.rebuild_id_index();
        Ok(())
    }

    /// FOUC guard: hint-load every destination stylesheet the live document
    /// does not already have, and wait for all of them to settle. Must run
    /// before the body swap in every branch.
    pub(crate) fn preload_new_stylesheets(&mut self, new_doc: &Dom) {
        let Some(new_head) = new_doc.head() else {
            return;
        };
        let mut issued = 0usize;
        for link in new_doc.stylesheet_links(new_head) {
            let Some(href) = new_doc.attr(link, "href") else {
                continue;
            };
            let persisted = new_doc
                .attr(link, PERSIST_ATTR)
                .and_then(|id| self.document.find_by_attr(PERSIST_ATTR, &id))
                .is_some();
            let already_present = self
                .document
                .head()
                .map(|head| {
                    self.document
                        .stylesheet_links(head)
                        .into_iter()
                        .any(|live| self.document.attr(live, "href").as_deref() == Some(&href))
                })
                .unwrap_or(false);
            if persisted || already_present {
                continue;
            }
            self.window.preload_stylesheet(&href);
            issued += 1;
        }
        if issued > 0 {
            self.window.await_preloads();
        }
    }

    /// Shared by intra-page navigations and the merge finalizer.
    pub(crate) fn update_history_and_scroll(
        &mut self,
        to: &LocationParts,
        replace: bool,
        intra_page: bool,
    ) {
        let fresh = !self.window.location().same_page(to);
        if to.href() != self.window.location().href() {
            if replace {
                let state = self
                    .window
                    .history_state()
                    .and_then(|raw| NavigationState::from_json(&raw))
                    .unwrap_or_else(|| {
                        let (x, y) = self.window.scroll_position();
                        NavigationState::new(self.current_history_index, x, y)
                    });
                self.window.replace_state(state.to_json(), Some(&to.href()));
                self.trace_nav(format!("history replace -> {}", to.href()));
            } else {
                // tag the outgoing entry so a later return to it knows
                // whether it was an intra-page stop
                if let Some(mut state) = self
                    .window
                    .history_state()
                    .and_then(|raw| NavigationState::from_json(&raw))
                {
                    state.intra_page = intra_page;
                    self.window.replace_state(state.to_json(), None);
                }
                self.current_history_index += 1;
                let (x, y) = self.window.scroll_position();
                let mut state = NavigationState::new(self.current_history_index, x, y);
                state.intra_page = intra_page;
                self.window.push_state(state.to_json(), &to.href());
                self.trace_nav(format!(
                    "history push #{} -> {}",
                    self.current_history_index,
                    to.href()
                ));
            }
            // freshly loaded pages start from the top
            if fresh {
                self.window.scroll_to(0.0, 0.0);
            }
        }
        if !to.hash().is_empty() {
            // already on the target page; the fragment jump is the
            // platform's business
            self.window.set_location_href(&to.href());
        } else {
            self.window.scroll_to(0.0, 0.0);
        }
    }
}
