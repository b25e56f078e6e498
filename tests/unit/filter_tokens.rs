use explorer_engine::filter::{self, FilterError, FilterKind, FilterMap, FilterValue};
use explorer_engine::service::{ExplorerService, PageableParams};
use explorer_engine::test_utils::sample_service;

#[test]
fn test_single_clause_round_trip() {
    let mut map = FilterMap::new();
    map.insert("status", "true");

    assert_eq!(filter::serialize(&map).unwrap(), "::status:true");

    let parsed = filter::parse("::status:true");
    assert!(parsed.is_clean());
    assert_eq!(parsed.entries, map);
}

#[test]
fn test_multi_clause_round_trips() {
    let cases: Vec<Vec<(&str, FilterValue)>> = vec![
        vec![
            ("status", FilterValue::exact("true")),
            ("owner", FilterValue::contains("ann").with_reference("UserEntity", "login")),
            ("due", FilterValue::date_range(1_700_000_000_000, 1_705_270_400_000)),
        ],
        vec![
            ("homepage", FilterValue::exact("http://host:8080/x")),
            ("title", FilterValue::contains("a:b")),
            ("note", FilterValue::exact("")),
        ],
        vec![
            ("due", FilterValue::date_range(0, 86_400_000)),
            ("project", FilterValue::exact("7").with_reference("ProjectEntity", "id")),
            ("at", FilterValue::exact("12:30")),
            ("owner", FilterValue::contains("")),
        ],
    ];

    for clauses in cases {
        let mut map = FilterMap::new();
        for (name, value) in &clauses {
            map.set_value(*name, value);
        }

        let token = filter::serialize(&map).unwrap();
        let parsed = filter::parse(&token);
        assert!(parsed.is_clean(), "{token}: {:?}", parsed.diagnostics);
        assert_eq!(parsed.entries, map, "{token}");

        let order: Vec<&str> = parsed.entries.iter().map(|(name, _)| name).collect();
        let expected: Vec<&str> = clauses.iter().map(|(name, _)| *name).collect();
        assert_eq!(order, expected);

        for (name, value) in &clauses {
            assert_eq!(parsed.entries.value(name).unwrap().unwrap(), *value, "{name} in {token}");
        }
    }
}

#[test]
fn test_reference_substring_clause() {
    let mut map = FilterMap::new();
    map.set_value("owner", &FilterValue::contains("ann").with_reference("UserEntity", "login"));

    let token = filter::serialize(&map).unwrap();
    assert_eq!(token, "::owner:%ann%{UserEntity.login}");

    let parsed = filter::parse(&token);
    let raw = parsed.entries.get("owner").unwrap();
    assert_eq!(filter::clear_value(raw), "%ann%");
    assert_eq!(filter::reference_pointer(raw), Some("UserEntity.login"));

    let value = FilterValue::decode(raw).unwrap();
    assert_eq!(value.kind, FilterKind::Contains("ann".to_string()));
    assert_eq!(value.text(), Some("ann"));
    assert_eq!(value.reference.unwrap().to_string(), "UserEntity.login");
}

#[test]
fn test_empty_mapping_is_empty_token() {
    assert_eq!(filter::serialize(&FilterMap::new()).unwrap(), "");
    assert!(filter::parse("").entries.is_empty());
}

#[test]
fn test_value_keeps_inner_colons() {
    let parsed = filter::parse("::url:http://host:8080/x");
    assert_eq!(parsed.entries.get("url"), Some("http://host:8080/x"));
}

#[test]
fn test_later_duplicates_overwrite() {
    let parsed = filter::parse("::a:1::b:2::a:3");
    assert_eq!(parsed.entries.get("a"), Some("3"));
    assert_eq!(parsed.entries.iter().map(|(k, _)| k).collect::<Vec<_>>(), vec!["a", "b"]);
}

#[test]
fn test_malformed_clauses_are_reported() {
    let parsed = filter::parse("::status:true::broken::also");
    assert_eq!(parsed.entries.get("status"), Some("true"));
    assert_eq!(parsed.diagnostics.len(), 2);

    let err = filter::parse_strict("::broken").unwrap_err();
    assert!(matches!(err, FilterError::Malformed { .. }));
}

#[test]
fn test_unrepresentable_values_are_rejected() {
    let mut map = FilterMap::new();
    map.insert("note", "a::b");
    assert!(matches!(filter::serialize(&map), Err(FilterError::AmbiguousValue { .. })));

    let mut map = FilterMap::new();
    map.insert("a:b", "x");
    assert!(matches!(filter::serialize(&map), Err(FilterError::InvalidKey { .. })));
}

#[test]
fn test_date_range_values() {
    let value = FilterValue::decode("FROM1000TO2000").unwrap();
    assert_eq!(value.kind, FilterKind::DateRange { from: 1000, to: 2000 });

    assert!(matches!(FilterValue::decode("FROMTO2000"), Err(FilterError::InvalidDateRange { .. })));

    let (lenient, diagnostic) = FilterValue::decode_lenient("FROMTO2000");
    assert_eq!(lenient.kind, FilterKind::Exact("FROMTO2000".to_string()));
    assert!(diagnostic.is_some());

    // A value that only looks like the start of a range is plain text
    assert_eq!(FilterValue::decode("FROM the TOP").unwrap().kind, FilterKind::Exact("FROM the TOP".to_string()));
}

#[tokio::test]
async fn test_service_applies_filter_tokens() {
    let service = sample_service();
    let params = PageableParams {
        filter: Some("::owner:%ANN%{UserEntity.login}::done:false".to_string()),
        ..PageableParams::default()
    };

    let page = service.get_section_list("TaskEntity", &params).await.unwrap();
    let titles: Vec<_> = page.content.iter().map(|row| row["title"].as_str().unwrap()).collect();
    assert_eq!(titles, vec!["Write release notes", "Plan roadmap"]);
    assert_eq!(page.total, 2);
}

#[tokio::test]
async fn test_service_date_range_filter() {
    let service = sample_service();
    let params = PageableParams {
        filter: Some("::due:FROM1700000000001TO1705270400000".to_string()),
        ..PageableParams::default()
    };

    let page = service.get_section_list("TaskEntity", &params).await.unwrap();
    let ids: Vec<_> = page.content.iter().map(|row| row["id"].as_i64().unwrap()).collect();
    assert_eq!(ids, vec![2, 3]);
}
