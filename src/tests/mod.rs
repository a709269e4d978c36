use super::*;

mod announcer_and_timers;
mod parser_and_selectors;
mod urls_and_state;

fn enabled_page(title: &str, head_extra: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head>\
         <meta name=\"{ENABLED_META}\" content=\"true\">\
         <title>{title}</title>{head_extra}</head><body>{body}</body></html>"
    )
}

fn plain_page(title: &str, body: &str) -> String {
    format!("<!DOCTYPE html><html><head><title>{title}</title></head><body>{body}</body></html>")
}

fn router_at(url: &str, html: &str) -> Result<Router<MockWindow>> {
    let window = MockWindow::new(url)?;
    Router::new(window, html)
}

fn state_of(entry: &HistoryEntry) -> Option<NavigationState> {
    entry.state.as_deref().and_then(NavigationState::from_json)
}
