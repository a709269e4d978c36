use super::*;

impl<W: Window> Router<W> {
    /// One navigation attempt, fetch through announcement. Every failure
    /// mode inside degrades to a full browser navigation; the caller never
    /// sees an error for a page that simply is not ours to handle.
    pub(crate) fn transition(
        &mut self,
        direction: Direction,
        mut to: LocationParts,
        options: NavigateOptions,
        pop_state: Option<NavigationState>,
    ) -> Result<()> {
        let href = to.href();
        let Some(page) = fetch_page(&mut self.window, &href) else {
            self.trace_nav(format!("bail: fetch failed for {href}"));
            self.window.assign(&href);
            return Ok(());
        };
        // show the final URL when the transport was redirected
        if let Some(redirected) = &page.redirected {
            if let Some(parsed) = LocationParts::parse(redirected) {
                to = parsed;
            }
        }
        self.trace_nav(format!("fetched {} as {}", to.href(), page.media_type));

        let mut new_doc = match parse_document(&page.html) {
            Ok(doc) => doc,
            Err(_) => {
                self.trace_nav(format!("bail: unparsable markup from {href}"));
                self.window.assign(&href);
                return Ok(());
            }
        };
        // the parser materializes noscript alternate content as visible
        // nodes; none of it is real DOM after a swap
        for noscript in new_doc
            .connected_elements()
            .into_iter()
            .filter(|id| new_doc.is_element_named(*id, "noscript"))
            .collect::<Vec<_>>()
        {
            new_doc.remove_node(noscript)?;
        }

        if new_doc.meta_named(ENABLED_META).is_none() {
            self.trace_nav(format!("bail: destination {href} opted out"));
            self.window.assign(&href);
            return Ok(());
        }

        if pop_state.is_none() {
            // a later back navigation to the current entry must restore the
            // offset we are leaving at, so record it before mutating the DOM
            self.persist_scroll_position();
        }

        if let Some(root) = self.document.document_element() {
            self.document
                .set_attr(root, TRANSITION_ATTR, direction.as_str());
        }

        if self.window.supports_view_transitions() {
            self.window.begin_view_transition();
            let merged = self.update_document(&mut new_doc, &to, options, pop_state.as_ref(), None);
            self.window.finish_view_transition();
            merged?;
        } else {
            let fallback = self.fallback_mode();
            self.update_document(&mut new_doc, &to, options, pop_state.as_ref(), Some(fallback))?;
        }

        self.run_scripts()?;
        self.mark_scripts_executed();
        self.emit_event(EVENT_PAGE_LOAD);
        self.announce();
        Ok(())
    }

    /// Merge execution, sequenced relative to the fallback animation phases
    /// when there is no native capability.
    fn update_document(
        &mut self,
        new_doc: &mut Dom,
        to: &LocationParts,
        options: NavigateOptions,
        pop_state: Option<&NavigationState>,
        fallback: Option<Fallback>,
    ) -> Result<()> {
        self.preload_new_stylesheets(new_doc);

        if fallback == Some(Fallback::Animate) {
            if let Some(root) = self.document.document_element() {
                self.document.set_attr(root, FALLBACK_ATTR, "old");
            }
            let started = self.window.animations_started("old");
            // animations that never end must never gate the merge
            let finite: Vec<AnimationHandle> = started
                .into_iter()
                .filter(|handle| !self.window.animation_is_infinite(*handle))
                .collect();
            self.window.await_animations(&finite);
            self.swap_documents(new_doc, to, options, pop_state)?;
            // the fallback attribute is in the reserved namespace, so it
            // survived the root-attribute merge
            if let Some(root) = self.document.document_element() {
                self.document.set_attr(root, FALLBACK_ATTR, "new");
            }
        } else {
            self.swap_documents(new_doc, to, options, pop_state)?;
        }
        Ok(())
    }

    /// Fallback strategy advertised by the current page; animated unless the
    /// page says otherwise.
    pub(crate) fn fallback_mode(&self) -> Fallback {
        self.document
            .meta_named(FALLBACK_META)
            .and_then(|meta| self.document.attr(meta, "content"))
            .map(|content| Fallback::from_marker(&content))
            .unwrap_or(Fallback::Animate)
    }
}
