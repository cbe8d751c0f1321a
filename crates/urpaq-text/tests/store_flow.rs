use tempfile::TempDir;
use urpaq_core::traits::DocumentStore;
use urpaq_core::types::RetrievalDocument;
use urpaq_text::TantivyDocumentStore;

fn palace_docs() -> Vec<RetrievalDocument> {
    vec![
        RetrievalDocument::new("bells", "Расписание звонков", "1 занятие 9:00 - 9:40. 2 занятие 9:45 - 10:25."),
        RetrievalDocument::new("rooms", "Направления", "Лаборатория биотехнологий. Кабинеты химии и биологии."),
        RetrievalDocument::new("contacts", "Контакты", "Телефон приемной 8 7152 34-02-40, адрес улица Жамбыла 55 А."),
    ]
}

#[test]
fn save_is_an_upsert() {
    let store = TantivyDocumentStore::in_memory().expect("store");
    store.save(&RetrievalDocument::new("a", "Первый", "старый текст")).unwrap();
    store.save(&RetrievalDocument::new("a", "Первый", "новый текст")).unwrap();

    assert_eq!(store.count().unwrap(), 1);
    let found = store.find_by_id("a").unwrap().expect("document");
    assert_eq!(found.text, "новый текст");
    assert!(store.exists("a").unwrap());
    assert!(!store.exists("b").unwrap());
}

#[test]
fn replacing_a_source_drops_all_of_its_chunks() {
    let store = TantivyDocumentStore::in_memory().unwrap();
    store.save_many(&palace_docs()).unwrap();
    let chunks: Vec<RetrievalDocument> =
        (0..3).map(|i| RetrievalDocument::new(format!("guide_chunk_{i}"), "Справочник", format!("часть {i}"))).collect();
    store.save_many(&chunks).unwrap();
    assert_eq!(store.count().unwrap(), 6);

    let fresh = RetrievalDocument::new("guide_chunk_0", "Справочник", "новая редакция");
    assert_eq!(store.replace_sources(&["guide".to_string()], &[fresh]).unwrap(), 1);

    assert_eq!(store.count().unwrap(), 4);
    assert_eq!(store.find_by_id("guide_chunk_0").unwrap().expect("chunk").text, "новая редакция");
    assert!(!store.exists("guide_chunk_2").unwrap());
    assert!(store.exists("bells").unwrap());
}

#[test]
fn search_matches_word_forms_and_ranks_best_first() {
    let store = TantivyDocumentStore::in_memory().unwrap();
    assert_eq!(store.save_many(&palace_docs()).unwrap(), 3);

    let hits = store.search("кабинет химии", 10).unwrap();
    assert!(!hits.is_empty());
    assert_eq!(hits[0].document.id, "rooms");
    for pair in hits.windows(2) {
        assert!(pair[0].score >= pair[1].score);
    }

    let by_name = store.search("звонки", 10).unwrap();
    assert_eq!(by_name[0].document.id, "bells");
}

#[test]
fn blank_query_or_zero_limit_returns_nothing() {
    let store = TantivyDocumentStore::in_memory().unwrap();
    store.save_many(&palace_docs()).unwrap();
    assert!(store.search("   ", 5).unwrap().is_empty());
    assert!(store.search("телефон", 0).unwrap().is_empty());
}

#[test]
fn delete_and_find_all() {
    let store = TantivyDocumentStore::in_memory().unwrap();
    store.save_many(&palace_docs()).unwrap();

    store.delete_by_id("bells").unwrap();
    let mut ids: Vec<String> = store.find_all().unwrap().into_iter().map(|d| d.id).collect();
    ids.sort();
    assert_eq!(ids, vec!["contacts", "rooms"]);

    store.delete_all().unwrap();
    assert_eq!(store.count().unwrap(), 0);
    assert!(store.find_all().unwrap().is_empty());
}

#[test]
fn on_disk_index_survives_reopen() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("index");
    {
        let store = TantivyDocumentStore::open_or_create(&dir).unwrap();
        store.save_many(&palace_docs()).unwrap();
    }
    let reopened = TantivyDocumentStore::open_or_create(&dir).unwrap();
    assert_eq!(reopened.count().unwrap(), 3);
    assert_eq!(reopened.find_by_id("contacts").unwrap().unwrap().name, "Контакты");
}
