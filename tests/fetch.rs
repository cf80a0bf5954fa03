use std::fs;

use url::Url;
use uuid::Uuid;
use webgrade::fetch::{DocumentStore, Fetch, FetchError, FetchReason, StaticPages};

#[test]
fn static_pages_answer_404_for_unknown_urls() {
    let pages = StaticPages::new().with_page("https://amy.example", "<p>hi</p>");

    let known = Url::parse("https://amy.example/").unwrap();
    assert_eq!(pages.fetch(&known).unwrap(), "<p>hi</p>");

    let unknown = Url::parse("https://bob.example/").unwrap();
    let err = pages.fetch(&unknown).unwrap_err();
    assert_eq!(err.reason(), FetchReason::HttpError);
    assert_eq!(err, FetchError::Http {
        url:    "https://bob.example/".into(),
        status: 404,
    });
    assert_eq!(pages.requests().len(), 2);
}

#[test]
fn document_store_overwrites_per_key() {
    let dir = std::env::temp_dir().join(format!("webgrade-store-{}", Uuid::new_v4()));
    fs::create_dir_all(&dir).expect("create temp dir");
    let store = DocumentStore::new(&dir);

    let first = store.save("amy", "My First Webpage", "one").expect("save");
    let second = store.save("amy", "My First Webpage", "two").expect("save");
    assert_eq!(first, second);
    assert_eq!(first, dir.join("amy_my-first-webpage.html"));
    assert_eq!(fs::read_to_string(&first).unwrap(), "two");
    assert_eq!(fs::read_dir(&dir).unwrap().count(), 1);

    let _ = fs::remove_dir_all(dir);
}
