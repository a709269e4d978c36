use super::*;

#[test]
fn announcement_uses_the_new_title_after_the_delay() -> Result<()> {
    let mut router = router_at("https://site.test/", &enabled_page("Home", "", "<h1>Home</h1>"))?;
    router.window_mut().mount_page(
        "/about",
        MockPage::html(enabled_page("About", "", "<h1>About</h1>")),
    )?;

    router.navigate("/about", NavigateOptions::default())?;

    assert_eq!(router.pending_timers().len(), 1);
    router.assert_text("div[aria-live=assertive]", "")?;

    router.advance_time(60)?;
    router.assert_text("div[aria-live=assertive]", "About")?;
    assert!(router.pending_timers().is_empty());
    assert_eq!(router.now_ms(), 60);
    Ok(())
}

#[test]
fn announcement_falls_back_to_heading_then_pathname() -> Result<()> {
    let deep = "<!DOCTYPE html><html><head>\
        <meta name=\"view-router-enabled\" content=\"true\">\
        </head><body><h1>Deep Dive</h1></body></html>";
    let bare = "<!DOCTYPE html><html><head>\
        <meta name=\"view-router-enabled\" content=\"true\">\
        </head><body><p>bare</p></body></html>";
    let mut router = router_at("https://site.test/", &enabled_page("Home", "", "<h1>Home</h1>"))?;
    router
        .window_mut()
        .mount_page("/deep", MockPage::html(deep.to_string()))?;
    router
        .window_mut()
        .mount_page("/bare", MockPage::html(bare.to_string()))?;

    router.navigate("/deep", NavigateOptions::default())?;
    router.advance_time(60)?;
    router.assert_text("div[aria-live=assertive]", "Deep Dive")?;

    router.navigate("/bare", NavigateOptions::default())?;
    router.advance_time(60)?;
    router.assert_text("div[aria-live=assertive]", "/bare")?;
    Ok(())
}

#[test]
fn time_cannot_move_backwards() -> Result<()> {
    let mut router = router_at("https://site.test/", &enabled_page("Home", "", "<h1>Home</h1>"))?;
    assert!(matches!(router.advance_time(-1), Err(Error::Runtime(_))));
    Ok(())
}

#[test]
fn swap_event_precedes_page_load() -> Result<()> {
    let mut router = router_at("https://site.test/", &enabled_page("Home", "", "<h1>Home</h1>"))?;
    router.window_mut().mount_page(
        "/about",
        MockPage::html(enabled_page("About", "", "<h1>About</h1>")),
    )?;

    router.navigate("/about", NavigateOptions::default())?;

    assert_eq!(
        router.take_events(),
        [EVENT_PAGE_LOAD, EVENT_AFTER_SWAP, EVENT_PAGE_LOAD]
    );
    Ok(())
}

#[test]
fn trace_log_limit_drops_oldest_entries() -> Result<()> {
    let mut router = router_at("https://site.test/", &enabled_page("Home", "", "<h1>Home</h1>"))?;
    router.window_mut().mount_page(
        "/about",
        MockPage::html(enabled_page("About", "", "<h1>About</h1>")),
    )?;
    router.enable_trace(true);
    router.set_trace_stderr(false);
    router.set_trace_log_limit(2)?;

    router.navigate("/about", NavigateOptions::default())?;

    assert_eq!(router.take_trace_logs().len(), 2);
    assert!(matches!(
        router.set_trace_log_limit(0),
        Err(Error::Runtime(_))
    ));
    Ok(())
}
