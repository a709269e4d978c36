use proptest::collection::vec;
use proptest::prelude::*;
use view_router::{LocationParts, NavigationState};

fn segment_strategy() -> BoxedStrategy<String> {
    prop_oneof![
        Just("a"),
        Just("bb"),
        Just("posts"),
        Just("2024"),
        Just("index.html"),
        Just("."),
        Just(".."),
    ]
    .prop_map(str::to_string)
    .boxed()
}

proptest! {
    #[test]
    fn resolved_paths_are_absolute_and_normalized(
        segments in vec(segment_strategy(), 0..6),
        trailing in any::<bool>(),
    ) {
        let base = LocationParts::parse("https://site.test/docs/guide/page").unwrap();
        let mut reference = segments.join("/");
        if trailing && !reference.is_empty() {
            reference.push('/');
        }
        let resolved = base.resolve(&reference).unwrap();
        let path = resolved.pathname().to_string();
        prop_assert!(path.starts_with('/'));
        prop_assert!(!path.contains("/../"));
        prop_assert!(!path.contains("/./"));
        prop_assert!(!path.ends_with("/.."));
        prop_assert!(!path.ends_with("/."));

        // resolving the absolute result is a fixed point
        let again = base.resolve(&path).unwrap();
        prop_assert_eq!(again.pathname(), path.as_str());
    }

    #[test]
    fn href_reparses_to_the_same_parts(
        segments in vec("[a-z]{1,5}", 0..4),
        query in prop_oneof![Just(String::new()), Just("?q=1".to_string())],
    ) {
        let url = format!("https://site.test/{}{}", segments.join("/"), query);
        let parsed = LocationParts::parse(&url).unwrap();
        let href = parsed.href();
        let reparsed = LocationParts::parse(&href).unwrap();
        prop_assert_eq!(reparsed.href(), href);
        prop_assert_eq!(reparsed, parsed);
    }

    #[test]
    fn hash_only_references_stay_on_the_same_page(fragment in "[a-z]{0,8}") {
        let base = LocationParts::parse("https://site.test/p?q=1").unwrap();
        let resolved = base.resolve(&format!("#{fragment}")).unwrap();
        prop_assert!(base.same_page(&resolved));
        prop_assert!(base.same_origin(&resolved));
    }

    #[test]
    fn state_json_round_trips(
        index in 0i64..100_000,
        x in 0u32..1_000_000u32,
        y in 0u32..1_000_000u32,
        intra in any::<bool>(),
    ) {
        let state = NavigationState {
            index,
            scroll_x: x as f64,
            scroll_y: y as f64,
            intra_page: intra,
        };
        prop_assert_eq!(NavigationState::from_json(&state.to_json()), Some(state));
    }

    #[test]
    fn extra_keys_make_state_foreign(key in "[a-z]{1,6}") {
        prop_assume!(key != "index");
        let raw = format!("{{\"index\":1,\"scrollX\":0,\"scrollY\":0,\"{key}\":1}}");
        prop_assert!(NavigationState::from_json(&raw).is_none());
    }
}
