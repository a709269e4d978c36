use super::*;

const HIDDEN_REGION_STYLE: &str = "position:absolute;left:0;top:0;clip:rect(0 0 0 0);\
clip-path:inset(50%);overflow:hidden;white-space:nowrap;width:1px;height:1px";

/// Screen readers need to see the live region change; filling it in the same
/// tick it is inserted is not reliably detected.
const ANNOUNCE_DELAY_MS: i64 = 60;

impl<W: Window> Router<W> {
    /// Replays every script the merge delivered, in document order. Parsed
    /// script nodes are inert; each one is substituted with an equivalent
    /// fresh node so it executes as if freshly loaded. External scripts
    /// block the replay of everything after them until their load settles.
    pub(crate) fn run_scripts(&mut self) -> Result<()> {
        for script in self.document.scripts_in_order() {
            if self.document.has_attr(script, EXEC_ATTR) {
                continue;
            }
            let fresh = self.document.create_detached_element("script");
            for name in self.document.attr_names(script) {
                if let Some(value) = self.document.attr(script, &name) {
                    self.document.set_attr(fresh, &name, &value);
                }
            }
            let inline = self.document.text_content(script);
            if !inline.is_empty() {
                self.document.create_text(fresh, inline);
            }
            if let Some(src) = self.document.attr(script, "src") {
                self.window.await_script_load(&src);
            }
            self.document.set_attr(fresh, EXEC_ATTR, "");
            self.document.replace_with(script, fresh)?;
            self.trace_event("script replayed".to_string());
        }
        Ok(())
    }

    /// Flags every current script so the next merge's replay skips them.
    pub(crate) fn mark_scripts_executed(&mut self) {
        for script in self.document.scripts_in_order() {
            self.document.set_attr(script, EXEC_ATTR, "");
        }
    }

    /// One-shot page-change announcement: insert a hidden assertive live
    /// region now, fill it with the new page's name after a short delay.
    pub(crate) fn announce(&mut self) {
        let Some(body) = self.document.body() else {
            return;
        };
        let region = self.document.create_detached_element("div");
        self.document.set_attr(region, "aria-live", "assertive");
        self.document.set_attr(region, "aria-atomic", "true");
        self.document.set_attr(region, "style", HIDDEN_REGION_STYLE);
        if self.document.append_child(body, region).is_err() {
            return;
        }
        self.scheduler
            .schedule(ANNOUNCE_DELAY_MS, ScheduledCallback::AnnounceTitle { region });
    }

    /// Deferred half of `announce`: title, then first heading, then path.
    pub(crate) fn fill_announcement(&mut self, region: NodeId) {
        let title = self
            .document
            .first_element_named("title")
            .map(|node| self.document.text_content(node))
            .filter(|text| !text.trim().is_empty())
            .or_else(|| {
                self.document
                    .first_element_named("h1")
                    .map(|node| self.document.text_content(node))
                    .filter(|text| !text.trim().is_empty())
            })
            .unwrap_or_else(|| self.window.location().pathname().to_string());
        self.document.set_text_content(region, title.trim());
        self.trace_event(format!("announced \"{}\"", title.trim()));
    }
}
