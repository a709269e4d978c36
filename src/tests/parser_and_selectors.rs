use super::*;

#[test]
fn fragments_gain_the_page_skeleton() -> Result<()> {
    let dom = parse_document("<title>T</title><p>hi</p>")?;
    let head = dom.head().expect("head");
    let body = dom.body().expect("body");
    let title = dom.first_element_named("title").expect("title");
    let p = dom.first_element_named("p").expect("p");
    assert_eq!(dom.parent(title), Some(head));
    assert_eq!(dom.parent(p), Some(body));
    Ok(())
}

#[test]
fn raw_text_and_comments_parse_correctly() -> Result<()> {
    let dom = parse_document(
        "<html><head><script>if (a < b) { go() }</script></head>\
         <body><!-- note --><p id=\"out\">ok</p></body></html>",
    )?;
    let script = dom.first_element_named("script").expect("script");
    assert_eq!(dom.text_content(script), "if (a < b) { go() }");
    let out = dom.by_id("out").expect("indexed");
    assert!(dom.is_connected(out));
    assert_eq!(dom.text_content(out), "ok");
    Ok(())
}

#[test]
fn valueless_attributes_parse_as_empty_strings() -> Result<()> {
    let dom = parse_document("<input disabled>")?;
    let input = dom.first_element_named("input").expect("input");
    assert_eq!(dom.attr(input, "disabled"), Some(String::new()));
    Ok(())
}

#[test]
fn unclosed_comment_is_a_parse_error() {
    assert!(matches!(
        parse_document("<p><!-- oops"),
        Err(Error::HtmlParse(_))
    ));
}

#[test]
fn descendant_and_attribute_selectors_match() -> Result<()> {
    let router = router_at(
        "https://site.test/",
        &enabled_page(
            "Home",
            "",
            "<nav class=\"menu main\"><a href=\"/x\" data-kind=\"primary\">x</a></nav>\
             <a href=\"/y\">y</a>",
        ),
    )?;

    assert_eq!(router.query_all("a")?.len(), 2);
    assert_eq!(router.query_all("nav a")?.len(), 1);
    router.assert_exists(".menu")?;
    router.assert_exists("nav.menu.main")?;
    router.assert_exists("a[data-kind=primary]")?;
    router.assert_exists("a[data-kind]")?;

    assert!(matches!(
        router.query("#missing"),
        Err(Error::SelectorNotFound(_))
    ));
    assert!(matches!(
        router.query("a > b"),
        Err(Error::UnsupportedSelector(_))
    ));
    Ok(())
}

#[test]
fn assertion_failures_carry_a_dom_snippet() -> Result<()> {
    let router = router_at(
        "https://site.test/",
        &enabled_page("Home", "", "<h1 id=\"title\">Home</h1>"),
    )?;
    let err = router.assert_text("#title", "Away").unwrap_err();
    match err {
        Error::AssertionFailed {
            expected,
            actual,
            dom_snippet,
            ..
        } => {
            assert_eq!(expected, "Away");
            assert_eq!(actual, "Home");
            assert!(dom_snippet.contains("<h1"));
        }
        other => panic!("unexpected error: {other}"),
    }
    Ok(())
}

#[test]
fn type_text_rejects_non_editable_targets() -> Result<()> {
    let mut router = router_at(
        "https://site.test/",
        &enabled_page("Home", "", "<p>text</p>"),
    )?;
    assert!(matches!(
        router.type_text("p", "nope"),
        Err(Error::Runtime(_))
    ));
    Ok(())
}
