use view_router::{
    ENABLED_META, LocationNavigationKind, MockPage, MockWindow, NavigateOptions, PERSIST_ATTR,
    Router, Window,
};

fn page(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html><html><head>\
         <meta name=\"{ENABLED_META}\" content=\"true\">\
         <title>{title}</title></head><body>{body}</body></html>"
    )
}

fn with_search(title: &str, heading: &str) -> String {
    page(
        title,
        &format!("<input {PERSIST_ATTR}=\"nav-search\"><h1>{heading}</h1>"),
    )
}

#[test]
fn browsing_session_with_back_forward_and_persistence() -> view_router::Result<()> {
    let mut window = MockWindow::new("https://blog.test/")?;
    window.mount_page("/", MockPage::html(with_search("Home", "Home")))?;
    window.mount_page("/posts", MockPage::html(with_search("Posts", "Posts")))?;
    window.mount_page(
        "/posts/one",
        MockPage::html(with_search("Post One", "Post One")),
    )?;

    let mut router = Router::new(window, &with_search("Home", "Home"))?;
    router.type_text("input", "rust")?;

    router.navigate("/posts", NavigateOptions::default())?;
    router.assert_text("h1", "Posts")?;
    router.assert_value("input", "rust")?;

    router.user_scroll(0.0, 420.0);
    router.navigate("/posts/one", NavigateOptions::default())?;
    router.assert_text("h1", "Post One")?;
    assert_eq!(router.window().scroll_position(), (0.0, 0.0));

    assert!(router.back()?);
    router.assert_text("h1", "Posts")?;
    assert_eq!(router.window().scroll_position(), (0.0, 420.0));
    router.assert_value("input", "rust")?;

    assert!(router.back()?);
    router.assert_text("h1", "Home")?;

    assert!(router.forward()?);
    router.assert_text("h1", "Posts")?;
    router.assert_value("input", "rust")?;

    router.advance_time(60)?;
    router.assert_text("div[aria-live=assertive]", "Posts")?;
    Ok(())
}

#[test]
fn cross_page_fragment_defers_the_scroll_to_the_platform() -> view_router::Result<()> {
    let mut window = MockWindow::new("https://site.test/")?;
    window.mount_page(
        "/guide",
        MockPage::html(page("Guide", "<h1>Guide</h1><h2 id=\"setup\">Setup</h2>")),
    )?;
    let mut router = Router::new(window, &page("Home", "<h1>Home</h1>"))?;

    router.navigate("/guide#setup", NavigateOptions::default())?;

    // the page was fetched and merged, then the fragment jump was handed back
    router.assert_text("h1", "Guide")?;
    assert_eq!(router.window().entries().len(), 2);
    assert_eq!(
        router.window().current_entry().url,
        "https://site.test/guide#setup"
    );
    assert_eq!(router.window().location().hash(), "#setup");
    let nav = router.window().navigations().last().expect("fragment jump");
    assert_eq!(nav.kind, LocationNavigationKind::HrefSet);
    assert_eq!(nav.to, "https://site.test/guide#setup");
    Ok(())
}

#[test]
fn deep_linking_with_fragments_stays_client_side() -> view_router::Result<()> {
    let mut window = MockWindow::new("https://blog.test/guide")?;
    window.mount_page(
        "/guide",
        MockPage::html(page("Guide", "<h1>Guide</h1><h2 id=\"setup\">Setup</h2>")),
    )?;

    let mut router = Router::new(
        window,
        &page("Guide", "<h1>Guide</h1><h2 id=\"setup\">Setup</h2>"),
    )?;

    router.navigate("#setup", NavigateOptions::default())?;
    assert!(router.window().fetch_calls().is_empty());
    assert_eq!(router.window().location().hash(), "#setup");
    assert_eq!(router.window().entries().len(), 2);

    assert!(router.back()?);
    assert!(router.window().fetch_calls().is_empty());
    assert_eq!(router.window().location().hash(), "");
    Ok(())
}
