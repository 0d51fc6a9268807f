use criterion::{Criterion, black_box, criterion_group, criterion_main};
use seekpage::{
    Document, FieldCatalog, FieldSpec, IdKind, MemoryCollection, Order, PageRequest,
    PaginationEngine, ValueKind,
};

const SEEDED_ROWS: i64 = 5_000;
const PER_PAGE: usize = 50;

fn seeded() -> MemoryCollection {
    MemoryCollection::new(
        (0..SEEDED_ROWS)
            .map(|i| {
                Document::new()
                    .with("_id", i)
                    .with("age", (i * 7919) % 97)
                    .with("name", format!("user-{i}"))
            })
            .collect(),
    )
}

fn catalog() -> FieldCatalog {
    FieldCatalog::new("_id", IdKind::Integer)
        .with_field("age", FieldSpec::typed("age", ValueKind::Numeric))
        .with_field("name", FieldSpec::new("name"))
}

fn walk(coll: &MemoryCollection, sort_by: &str, order: Order, pages: usize) -> usize {
    let mut offset: Option<String> = None;
    let mut rows = 0;
    for _ in 0..pages {
        let request = PageRequest::new(catalog())
            .per_page(PER_PAGE)
            .sort_by(sort_by)
            .order(order)
            .offset(offset.as_deref());
        let Ok(engine) = PaginationEngine::new(coll, request) else {
            break;
        };
        rows += engine.count().unwrap_or(0);
        match engine.next_offset() {
            Ok(Some(next)) => offset = Some(next),
            _ => break,
        }
    }
    rows
}

fn bench_pagination(c: &mut Criterion) {
    let coll = seeded();

    c.bench_function("first_page_numeric_sort", |b| {
        b.iter(|| black_box(walk(&coll, "age", Order::Asc, 1)))
    });

    c.bench_function("walk_twenty_pages_desc", |b| {
        b.iter(|| black_box(walk(&coll, "age", Order::Desc, 20)))
    });

    c.bench_function("walk_twenty_pages_text_sort", |b| {
        b.iter(|| black_box(walk(&coll, "name", Order::Asc, 20)))
    });

    let token = PaginationEngine::new(
        &coll,
        PageRequest::new(catalog()).per_page(PER_PAGE).sort_by("age"),
    )
    .ok()
    .and_then(|engine| engine.next_offset().ok().flatten());
    c.bench_function("page_metadata_mid_walk", |b| {
        b.iter(|| {
            let request = PageRequest::new(catalog())
                .per_page(PER_PAGE)
                .sort_by("age")
                .offset(token.as_deref());
            PaginationEngine::new(&coll, request)
                .ok()
                .and_then(|engine| engine.into_page().ok())
                .map(|page| black_box(page.position))
        })
    });
}

criterion_group!(benches, bench_pagination);
criterion_main!(benches);
