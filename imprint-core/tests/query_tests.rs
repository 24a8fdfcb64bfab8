//! End-to-end tests for the list pipeline over real storage

use imprint_core::store::FindQuery;
use imprint_core::{AdvancedResults, Database, Document, Filter, LocalStorage, QueryParams};
use serde_json::{json, Value};
use std::sync::Arc;
use tempfile::TempDir;

fn book(id: usize, title: &str, price: f64) -> Document {
    let doc = json!({
        "id": format!("b{id:02}"),
        "title": title,
        "price": price,
        "publisher": "p1",
        "createdAt": format!("2024-01-{:02}T00:00:00Z", id + 1),
    });
    match doc {
        Value::Object(map) => map,
        _ => unreachable!(),
    }
}

async fn seeded(db: &Database, count: usize) {
    for i in 0..count {
        db.books
            .insert(book(i, &format!("Book {i:02}"), (i * 5) as f64))
            .await
            .unwrap();
    }
}

fn titles(data: &[Document]) -> Vec<&str> {
    data.iter()
        .map(|d| d["title"].as_str().unwrap())
        .collect()
}

#[tokio::test]
async fn test_collections_survive_reopen() {
    let temp_dir = TempDir::new().unwrap();

    {
        let db = Database::open(Arc::new(LocalStorage::new(temp_dir.path())))
            .await
            .unwrap();
        seeded(&db, 3).await;
    }

    let db = Database::open(Arc::new(LocalStorage::new(temp_dir.path())))
        .await
        .unwrap();
    let all = db.books.find(&FindQuery::new(Filter::all())).await.unwrap();
    assert_eq!(all.len(), 3);

    let envelope = AdvancedResults::new(db.books.clone(), None)
        .run(&[("price[gt]", "0")])
        .await
        .unwrap();
    assert_eq!(envelope.count, 2);
}

#[tokio::test]
async fn test_last_page_links_back_only() {
    let db = Database::in_memory().await.unwrap();
    seeded(&db, 12).await;

    let params = QueryParams::parse("page=3&limit=5&sort=title").unwrap();
    let envelope = AdvancedResults::new(db.books.clone(), None)
        .execute(&params)
        .await
        .unwrap();

    assert_eq!(envelope.count, 2);
    assert_eq!(titles(&envelope.data), vec!["Book 10", "Book 11"]);
    assert!(envelope.pagination.next.is_none());
    let prev = envelope.pagination.prev.unwrap();
    assert_eq!((prev.page, prev.limit), (2, 5));
}

#[tokio::test]
async fn test_page_past_the_end_is_empty() {
    let db = Database::in_memory().await.unwrap();
    seeded(&db, 4).await;

    let envelope = AdvancedResults::new(db.books.clone(), None)
        .run(&[("page", "9"), ("limit", "2")])
        .await
        .unwrap();

    assert_eq!(envelope.count, 0);
    assert!(envelope.data.is_empty());
    assert!(envelope.pagination.next.is_none());
}

#[tokio::test]
async fn test_multi_key_sort() {
    let db = Database::in_memory().await.unwrap();
    db.books.insert(book(0, "Beta", 10.0)).await.unwrap();
    db.books.insert(book(1, "Alpha", 10.0)).await.unwrap();
    db.books.insert(book(2, "Gamma", 20.0)).await.unwrap();

    let envelope = AdvancedResults::new(db.books.clone(), None)
        .run(&[("sort", "-price,title")])
        .await
        .unwrap();

    assert_eq!(titles(&envelope.data), vec!["Gamma", "Alpha", "Beta"]);
}

#[tokio::test]
async fn test_percent_encoded_values() {
    let db = Database::in_memory().await.unwrap();
    db.books.insert(book(0, "Hello World", 1.0)).await.unwrap();
    db.books.insert(book(1, "Hello", 1.0)).await.unwrap();

    let params = QueryParams::parse("title=Hello%20World&select=title").unwrap();
    let envelope = AdvancedResults::new(db.books.clone(), None)
        .execute(&params)
        .await
        .unwrap();

    assert_eq!(envelope.count, 1);
    assert_eq!(envelope.data[0]["title"], "Hello World");
    assert!(envelope.data[0].get("price").is_none());
}
