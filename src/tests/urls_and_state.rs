use super::*;

#[test]
fn urls_split_into_navigation_parts() {
    let url = LocationParts::parse("https://user:pw@site.test:8080/a/b?q=1#frag").expect("parse");
    assert_eq!(url.protocol(), "https:");
    assert_eq!(url.origin(), "https://site.test:8080");
    assert_eq!(url.pathname(), "/a/b");
    assert_eq!(url.search(), "?q=1");
    assert_eq!(url.hash(), "#frag");
    // credentials never reappear
    assert_eq!(url.href(), "https://site.test:8080/a/b?q=1#frag");
}

#[test]
fn schemeless_input_is_rejected() {
    assert!(LocationParts::parse("not a url").is_none());
    assert!(LocationParts::parse("/relative/only").is_none());
    assert!(matches!(
        MockWindow::new("no scheme here"),
        Err(Error::InvalidUrl(_))
    ));
}

#[test]
fn relative_references_resolve_against_the_document() {
    let base = LocationParts::parse("https://site.test/docs/guide/page?x=1#top").expect("parse");

    assert_eq!(base.resolve("../intro").expect("up").pathname(), "/docs/intro");
    assert_eq!(
        base.resolve("other").expect("sibling").pathname(),
        "/docs/guide/other"
    );
    assert_eq!(base.resolve("/root").expect("absolute").pathname(), "/root");

    let frag = base.resolve("#below").expect("fragment");
    assert_eq!(frag.pathname(), "/docs/guide/page");
    assert_eq!(frag.search(), "?x=1");
    assert_eq!(frag.hash(), "#below");

    let query = base.resolve("?y=2").expect("query");
    assert_eq!(query.pathname(), "/docs/guide/page");
    assert_eq!(query.search(), "?y=2");
    assert_eq!(query.hash(), "");
}

#[test]
fn dot_segments_normalize_away() {
    let base = LocationParts::parse("https://site.test/a/b/c").expect("parse");
    assert_eq!(
        base.resolve("./../x/./y/../z").expect("resolve").pathname(),
        "/a/x/z"
    );
    assert_eq!(base.resolve("../../../up").expect("resolve").pathname(), "/up");
}

#[test]
fn same_page_ignores_the_fragment() {
    let here = LocationParts::parse("https://site.test/a?q=1#x").expect("parse");
    let fragment_only = here.resolve("#y").expect("fragment");
    let new_query = here.resolve("?q=2").expect("query");
    assert!(here.same_page(&fragment_only));
    assert!(here.same_origin(&fragment_only));
    assert!(!here.same_page(&new_query));
}

#[test]
fn origins_differ_by_scheme_host_and_port() {
    let a = LocationParts::parse("https://site.test/x").expect("parse");
    let b = LocationParts::parse("https://site.test:8443/x").expect("parse");
    let c = LocationParts::parse("http://site.test/x").expect("parse");
    let d = LocationParts::parse("https://site.test/other").expect("parse");
    assert!(!a.same_origin(&b));
    assert!(!a.same_origin(&c));
    assert!(a.same_origin(&d));
}

#[test]
fn navigation_state_round_trips_and_rejects_foreign_shapes() {
    let mut state = NavigationState::new(7, 1.5, 250.0);
    state.intra_page = true;
    assert_eq!(NavigationState::from_json(&state.to_json()), Some(state));

    let plain = NavigationState::new(0, 0.0, 0.0);
    assert_eq!(
        plain.to_json(),
        "{\"index\":0,\"scrollX\":0,\"scrollY\":0}"
    );

    assert!(NavigationState::from_json("{\"index\":1}").is_none());
    assert!(
        NavigationState::from_json("{\"index\":1,\"scrollX\":0,\"scrollY\":0,\"app\":2}").is_none()
    );
    assert!(NavigationState::from_json("null").is_none());
    assert!(NavigationState::from_json("").is_none());
}

#[test]
fn fallback_marker_values_parse_with_an_animated_default() {
    assert_eq!(Fallback::from_marker("none"), Fallback::None);
    assert_eq!(Fallback::from_marker("swap"), Fallback::Swap);
    assert_eq!(Fallback::from_marker("animate"), Fallback::Animate);
    assert_eq!(Fallback::from_marker("anything else"), Fallback::Animate);
}
