mod common;

use std::sync::Arc;

use common::{page, MockFetcher};
use registrar_lib::{Advance, CatalogCourse, Error, PageIterator, Request, TransportError};
use serde::Deserialize;
use serde_json::json;

#[derive(Debug, Deserialize, PartialEq)]
struct Row {
    id: u32,
}

fn three_pages() -> MockFetcher {
    MockFetcher::new()
        .respond(page(json!([{ "id": 1 }, { "id": 2 }]), 1, 3))
        .respond(page(json!([{ "id": 3 }, { "id": 4 }]), 2, 3))
        .respond(page(json!([{ "id": 5 }]), 3, 3))
}

#[test]
fn walks_every_page_then_stops() {
    let fetcher = Arc::new(three_pages());
    let mut pages = PageIterator::new(fetcher.clone(), Request::new("https://example.edu/info"));

    let mut seen = Vec::new();
    for expected_size in [2, 2, 1] {
        assert!(matches!(pages.advance(), Advance::Continue));
        assert_eq!(pages.page_size(), expected_size);
        for index in 0..pages.page_size() {
            seen.push(pages.decode_row::<Row>(index).unwrap().id);
        }
    }

    assert!(pages.is_terminal());
    assert!(matches!(pages.advance(), Advance::Exhausted));
    assert!(matches!(pages.advance(), Advance::Exhausted));
    assert!(pages.last_error().is_none());
    assert_eq!(seen, [1, 2, 3, 4, 5]);
    assert_eq!(fetcher.calls(), 3);
}

#[test]
fn requests_pages_in_order() {
    let fetcher = Arc::new(three_pages());
    let request = Request::new("https://example.edu/search").with_param("term", "2022A");
    let rows: Vec<Row> = PageIterator::new(fetcher.clone(), request)
        .collect_all()
        .unwrap();

    assert_eq!(rows.len(), 5);
    for (index, number) in ["1", "2", "3"].into_iter().enumerate() {
        assert_eq!(fetcher.param(index, "page_number").as_deref(), Some(number));
        assert_eq!(fetcher.param(index, "term").as_deref(), Some("2022A"));
    }
}

#[test]
fn transport_failure_is_terminal() {
    let fetcher = Arc::new(
        MockFetcher::new()
            .respond(page(json!([{ "id": 1 }]), 1, 3))
            .fail("connection reset"),
    );
    let mut pages = PageIterator::new(fetcher.clone(), Request::new("https://example.edu/info"));

    assert!(matches!(pages.advance(), Advance::Continue));
    assert!(matches!(
        pages.advance(),
        Advance::Failed(Error::Transport(TransportError::Connection(_)))
    ));
    assert!(matches!(
        pages.last_error(),
        Some(Error::Transport(TransportError::Connection(message))) if message == "connection reset"
    ));
    assert_eq!(pages.page_size(), 0);

    assert!(matches!(pages.advance(), Advance::Exhausted));
    assert_eq!(fetcher.calls(), 2);
}

#[test]
fn malformed_envelope_is_terminal() {
    let fetcher = Arc::new(MockFetcher::new().respond_raw("<html>maintenance</html>"));
    let mut pages = PageIterator::new(fetcher.clone(), Request::new("https://example.edu/info"));

    assert!(matches!(pages.advance(), Advance::Failed(Error::Decode(_))));
    assert!(matches!(pages.advance(), Advance::Exhausted));
    assert_eq!(fetcher.calls(), 1);
}

#[test]
fn upstream_error_is_unescaped() {
    let fetcher = Arc::new(MockFetcher::new().respond(json!({
        "result_data": [],
        "service_meta": {
            "error": true,
            "error_text": "Department &quot;XYZ&quot; not found",
        }
    })));
    let mut pages = PageIterator::new(fetcher, Request::new("https://example.edu/info"));

    match pages.advance() {
        Advance::Failed(Error::Upstream(message)) => {
            assert_eq!(message, "Department \"XYZ\" not found")
        }
        other => panic!("unexpected {other:?}"),
    }
    assert!(pages.is_terminal());
}

#[test]
fn collect_all_surfaces_failure() {
    let fetcher = Arc::new(
        MockFetcher::new()
            .respond(page(json!([{ "id": 1 }]), 1, 2))
            .fail("timed out"),
    );
    let result = PageIterator::new(fetcher, Request::new("https://example.edu/info"))
        .collect_all::<Row>();

    assert!(matches!(result, Err(Error::Transport(_))));
}

#[test]
fn rows_decode_lazily() {
    let fetcher = Arc::new(MockFetcher::new().respond(page(
        json!([
            { "course_id": "CIS1200", "course_title": "Programming Languages and Techniques I" },
            { "course_id": 42 },
        ]),
        1,
        1,
    )));
    let mut pages = PageIterator::new(fetcher, Request::new("https://example.edu/info"));
    assert!(matches!(pages.advance(), Advance::Continue));

    let mut rows = pages.rows::<CatalogCourse>();
    let first = rows.next().unwrap().unwrap();
    assert_eq!(first.course_id, "CIS1200");
    assert_eq!(first.course_title, "Programming Languages and Techniques I");
    assert!(matches!(rows.next(), Some(Err(Error::Decode(_)))));
    assert!(rows.next().is_none());
}

#[test]
fn raw_row_bounds() {
    let fetcher = Arc::new(MockFetcher::new().respond(page(json!([{ "id": 7 }]), 1, 1)));
    let mut pages = PageIterator::new(fetcher, Request::new("https://example.edu/info"));
    assert!(matches!(pages.advance(), Advance::Continue));

    assert_eq!(pages.raw_row(0).unwrap().get(), r#"{"id":7}"#);
    assert!(matches!(
        pages.raw_row(1),
        Err(Error::RowIndex { index: 1, len: 1 })
    ));
}

#[test]
fn cursor_never_moves_backwards() {
    let fetcher = Arc::new(
        MockFetcher::new()
            .respond(json!({
                "result_data": [{ "id": 1 }],
                "service_meta": {
                    "current_page_number": 1,
                    "next_page_number": 0,
                    "number_of_pages": 2,
                }
            }))
            .respond(page(json!([{ "id": 2 }]), 2, 2)),
    );
    let mut pages = PageIterator::new(fetcher.clone(), Request::new("https://example.edu/info"));

    assert_eq!(pages.current_page(), 1);
    assert!(matches!(pages.advance(), Advance::Continue));
    assert_eq!(pages.current_page(), 2);
    assert_eq!(pages.total_pages(), Some(2));
    assert!(matches!(pages.advance(), Advance::Continue));
    assert!(matches!(pages.advance(), Advance::Exhausted));
    assert_eq!(fetcher.param(1, "page_number").as_deref(), Some("2"));
}

#[test]
fn envelope_without_metadata_is_a_single_page() {
    let fetcher = Arc::new(MockFetcher::new().respond(json!({ "result_data": [{ "id": 1 }] })));
    let rows: Vec<Row> = PageIterator::new(fetcher.clone(), Request::new("https://example.edu/info"))
        .collect_all()
        .unwrap();

    assert_eq!(rows, [Row { id: 1 }]);
    assert_eq!(fetcher.calls(), 1);
}

#[test]
fn json_that_is_not_an_envelope_fails_to_decode() {
    let fetcher = Arc::new(MockFetcher::new().respond(json!({ "message": "Unauthorized" })));
    let mut pages = PageIterator::new(fetcher.clone(), Request::new("https://example.edu/info"));

    assert!(matches!(pages.advance(), Advance::Failed(Error::Decode(_))));
    assert!(matches!(pages.last_error(), Some(Error::Decode(_))));
    assert!(matches!(pages.advance(), Advance::Exhausted));
    assert_eq!(fetcher.calls(), 1);
}

#[test]
fn largest_page_number_does_not_overflow() {
    let fetcher = Arc::new(
        MockFetcher::new().respond(page(json!([{ "id": 1 }]), u32::MAX, u32::MAX)),
    );
    let mut pages = PageIterator::new(fetcher.clone(), Request::new("https://example.edu/info"));

    assert!(matches!(pages.advance(), Advance::Continue));
    assert_eq!(pages.current_page(), u32::MAX);
    assert!(pages.is_terminal());
    assert!(matches!(pages.advance(), Advance::Exhausted));
    assert_eq!(fetcher.calls(), 1);
}
