use proptest::prelude::*;
use seekpage::{
    Collection, Document, FieldCatalog, FieldSpec, IdKind, MemoryCollection, Order, PageRequest,
    PaginationEngine, Query, Value, ValueKind,
};

fn catalog() -> FieldCatalog {
    FieldCatalog::new("_id", IdKind::Integer)
        .with_field("score", FieldSpec::typed("score", ValueKind::Numeric))
        .with_field("label", FieldSpec::new("label"))
}

fn build(rows: &[(Option<i64>, u8)]) -> MemoryCollection {
    MemoryCollection::new(
        rows.iter()
            .enumerate()
            .map(|(i, (score, label))| {
                let doc = Document::new()
                    .with("_id", i as i64)
                    .with("label", format!("l{}", label % 4));
                match score {
                    Some(score) => doc.with("score", *score),
                    None => doc.with("score", Value::Null),
                }
            })
            .collect(),
    )
}

fn expected(coll: &MemoryCollection, path: &str, order: Order) -> Vec<Value> {
    coll.fetch(&Query::new().order_by(path, order).order_by("_id", order))
        .expect("scan")
        .iter()
        .map(|d| d.get("_id").cloned().unwrap_or(Value::Null))
        .collect()
}

// Walks every page, checking per-page metadata on the way.
fn walk(coll: &MemoryCollection, per_page: usize, sort_by: &str, order: Order) -> Vec<Value> {
    let mut seen = Vec::new();
    let mut offset: Option<String> = None;
    let mut expected_start = 1u64;
    loop {
        let request = PageRequest::new(catalog())
            .per_page(per_page)
            .sort_by(sort_by)
            .order(order)
            .offset(offset.as_deref());
        let engine = PaginationEngine::new(coll, request).expect("engine");
        let rows = engine.results().expect("results");
        assert!(rows.len() <= per_page);
        assert_eq!(engine.start().expect("start"), expected_start);
        assert_eq!(engine.total().expect("total"), coll.len() as u64);
        expected_start += rows.len() as u64;
        seen.extend(rows.iter().map(|d| d.get("_id").cloned().unwrap_or(Value::Null)));
        if !engine.has_next().expect("has_next") {
            return seen;
        }
        offset = engine.next_offset().expect("next");
    }
}

fn arb_rows() -> impl Strategy<Value = Vec<(Option<i64>, u8)>> {
    prop::collection::vec((prop::option::of(-3i64..4), any::<u8>()), 0..40)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn concatenated_pages_cover_the_sorted_set(
        rows in arb_rows(),
        per_page in 1usize..12,
        descending in any::<bool>(),
    ) {
        let coll = build(&rows);
        let order = if descending { Order::Desc } else { Order::Asc };
        prop_assert_eq!(walk(&coll, per_page, "score", order), expected(&coll, "score", order));
    }

    #[test]
    fn generic_text_sort_covers_the_sorted_set(rows in arb_rows(), per_page in 1usize..8) {
        let coll = build(&rows);
        prop_assert_eq!(walk(&coll, per_page, "label", Order::Asc), expected(&coll, "label", Order::Asc));
    }

    #[test]
    fn descending_is_the_reverse_of_ascending(rows in arb_rows(), per_page in 1usize..12) {
        let coll = build(&rows);
        let mut asc = walk(&coll, per_page, "score", Order::Asc);
        asc.reverse();
        prop_assert_eq!(walk(&coll, per_page, "score", Order::Desc), asc);
    }

    #[test]
    fn previous_token_lands_on_the_previous_page(rows in arb_rows(), per_page in 1usize..6) {
        let coll = build(&rows);
        let request = |offset: Option<&str>| {
            PageRequest::new(catalog())
                .per_page(per_page)
                .sort_by("score")
                .offset(offset)
        };
        let mut pages: Vec<Vec<Value>> = Vec::new();
        let mut tokens: Vec<Option<String>> = vec![None];
        loop {
            let engine = PaginationEngine::new(&coll, request(tokens.last().and_then(|t| t.as_deref())))
                .expect("engine");
            pages.push(
                engine
                    .results()
                    .expect("results")
                    .iter()
                    .map(|d| d.get("_id").cloned().unwrap_or(Value::Null))
                    .collect(),
            );
            if !engine.has_next().expect("has_next") {
                break;
            }
            tokens.push(engine.next_offset().expect("next"));
        }
        for idx in 1..pages.len() {
            let engine = PaginationEngine::new(&coll, request(tokens[idx].as_deref())).expect("page");
            let prev = engine.prev_offset().expect("prev");
            let back = PaginationEngine::new(&coll, request(prev.as_deref())).expect("back");
            let back_ids: Vec<Value> = back
                .results()
                .expect("results")
                .iter()
                .map(|d| d.get("_id").cloned().unwrap_or(Value::Null))
                .collect();
            prop_assert_eq!(&back_ids, &pages[idx - 1]);
        }
    }
}
