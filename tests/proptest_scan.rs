//! Property-based tests using proptest
//!
//! These tests check the scanner's request accounting, the row limit, the
//! hydrate gate's concurrency bound and column value extraction against
//! randomized inputs.

use futures::{executor::block_on, future, StreamExt};
use jira_tables::scan::{paginate, HydrateGate, Page, ScanCursor};
use jira_tables::table::row::{coerce, extract_json_value};
use jira_tables::table::{Cell, ColumnType};
use jira_tables::{ConnectorError, Result};
use proptest::prelude::*;
use serde_json::{json, Value};
use std::cell::RefCell;
use std::rc::Rc;

/// In-memory source of `n` items; records every page request
fn run_scan(
    n: usize,
    page_size: usize,
    limit: Option<u64>,
    report_total: bool,
) -> (Vec<Result<usize>>, Vec<ScanCursor>) {
    let requests = Rc::new(RefCell::new(Vec::new()));
    let log = requests.clone();
    let stream = paginate(page_size, limit, move |cursor: ScanCursor| {
        log.borrow_mut().push(cursor);
        let end = (cursor.offset + cursor.page_size).min(n);
        let items: Vec<usize> = (cursor.offset.min(n)..end).collect();
        let page = if report_total {
            Page::with_total(items, n as u64)
        } else {
            Page::new(items)
        };
        future::ready(Ok(page))
    });
    let items = block_on(stream.collect::<Vec<_>>());
    let requests = requests.borrow().clone();
    (items, requests)
}

fn ceil_div(a: usize, b: usize) -> usize {
    a.div_ceil(b)
}

proptest! {
    #[test]
    fn total_reporting_scan_uses_ceil_n_over_p_requests(
        n in 1usize..5000,
        p in 1usize..1200,
    ) {
        let (items, requests) = run_scan(n, p, None, true);
        prop_assert_eq!(requests.len(), ceil_div(n, p));
        let values: Vec<usize> = items.into_iter().map(|r| r.unwrap()).collect();
        prop_assert_eq!(values, (0..n).collect::<Vec<_>>());
    }

    #[test]
    fn short_page_scan_uses_ceil_n_over_p_requests(
        n in 1usize..5000,
        p in 1usize..1200,
    ) {
        // an exact multiple needs one trailing empty page to detect the end
        prop_assume!(n % p != 0);
        let (items, requests) = run_scan(n, p, None, false);
        prop_assert_eq!(requests.len(), ceil_div(n, p));
        prop_assert_eq!(items.len(), n);
    }

    #[test]
    fn offsets_advance_by_page_size(
        n in 1usize..3000,
        p in 1usize..500,
        report_total in any::<bool>(),
    ) {
        let (_, requests) = run_scan(n, p, None, report_total);
        for (i, cursor) in requests.iter().enumerate() {
            prop_assert_eq!(cursor.offset, i * p);
            prop_assert_eq!(cursor.page_size, p);
        }
    }

    #[test]
    fn limit_emits_exactly_l_items_with_minimal_requests(
        (n, l) in (1usize..3000).prop_flat_map(|n| (Just(n), 0..=n)),
        p in 1usize..1200,
        report_total in any::<bool>(),
    ) {
        let (items, requests) = run_scan(n, p, Some(l as u64), report_total);
        prop_assert_eq!(items.len(), l);
        prop_assert!(items.iter().all(|r| r.is_ok()));

        if l == 0 {
            prop_assert!(requests.is_empty());
        } else {
            let effective = p.min(l);
            prop_assert_eq!(requests.len(), ceil_div(l, effective));
            // the last request is the page that holds the l-th item
            let last = requests.last().unwrap();
            prop_assert!(last.offset < l && l <= last.offset + last.page_size);
        }
    }

    #[test]
    fn failed_page_keeps_earlier_items_and_ends_with_one_error(
        pages_before_failure in 0usize..5,
        p in 1usize..50,
    ) {
        let stream = paginate(p, None, move |cursor: ScanCursor| {
            let page = if cursor.offset >= pages_before_failure * p {
                Err(ConnectorError::Transport {
                    status: Some(500),
                    message: "API request failed".to_string(),
                })
            } else {
                Ok(Page::new((cursor.offset..cursor.offset + p).collect::<Vec<usize>>()))
            };
            future::ready(page)
        });
        let items = block_on(stream.collect::<Vec<_>>());

        prop_assert_eq!(items.len(), pages_before_failure * p + 1);
        prop_assert!(items[..items.len() - 1].iter().all(|r| r.is_ok()));
        prop_assert!(items.last().unwrap().is_err());
    }
}

mod gate_tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn in_flight_hydrates_never_exceed_capacity(
            capacity in 1usize..16,
            tasks in 0usize..120,
        ) {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(4)
                .enable_all()
                .build()
                .unwrap();

            let peak = runtime.block_on(async {
                let gate = Arc::new(HydrateGate::new(capacity));
                let current = Arc::new(AtomicUsize::new(0));
                let peak = Arc::new(AtomicUsize::new(0));

                let handles: Vec<_> = (0..tasks)
                    .map(|i| {
                        let gate = gate.clone();
                        let current = current.clone();
                        let peak = peak.clone();
                        tokio::spawn(async move {
                            gate.enrich("proptest", || async {
                                let now = current.fetch_add(1, Ordering::SeqCst) + 1;
                                peak.fetch_max(now, Ordering::SeqCst);
                                tokio::task::yield_now().await;
                                current.fetch_sub(1, Ordering::SeqCst);
                                Ok::<_, ConnectorError>(i)
                            })
                            .await
                        })
                    })
                    .collect();

                for handle in futures::future::join_all(handles).await {
                    handle.unwrap().unwrap();
                }
                assert_eq!(gate.available_slots(), capacity);
                peak.load(Ordering::SeqCst)
            });

            prop_assert!(peak <= capacity);
        }
    }
}

mod column_value_tests {
    use super::*;

    fn arb_groups() -> impl Strategy<Value = Vec<String>> {
        prop::collection::vec("[a-z][a-z0-9-]{0,30}", 0..20)
    }

    proptest! {
        #[test]
        fn wildcard_extracts_every_name_in_order(names in arb_groups()) {
            let groups: Vec<Value> = names.iter().map(|n| json!({"name": n, "self": "x"})).collect();
            let extracted = extract_json_value(&Value::Array(groups), "*.name");
            prop_assert_eq!(extracted, json!(names));
        }

        #[test]
        fn empty_path_returns_original(id in any::<i64>(), name in "[A-Za-z ]{0,40}") {
            let board = json!({"id": id, "name": name});
            prop_assert_eq!(extract_json_value(&board, ""), board);
        }

        #[test]
        fn missing_path_is_null(key in "[a-z]{1,12}") {
            let value = json!({"id": 1});
            prop_assume!(key != "id");
            prop_assert_eq!(extract_json_value(&value, &key), Value::Null);
        }

        #[test]
        fn numeric_strings_coerce_to_int(id in any::<i64>()) {
            prop_assert_eq!(coerce(json!(id.to_string()), ColumnType::Int), Cell::Int(id));
            prop_assert_eq!(coerce(json!(id), ColumnType::Int), Cell::Int(id));
        }
    }
}
