//! Reader and writer chains configured through the repository builder

mod common;

use std::rc::Rc;

use common::*;
use entity_normalizer::Entity;

fn reader(store: &Rc<InMemoryEntityStore>) -> Rc<dyn EntityStoreReader> {
    store.clone()
}

fn writer(store: &Rc<InMemoryEntityStore>) -> Rc<dyn EntityStoreWriter> {
    store.clone()
}

#[test]
fn test_explicit_store_receives_writes() {
    init_logger();
    let store = Rc::new(InMemoryEntityStore::new());
    let mut repository = NormalizedEntityRepository::builder()
        .set_readers([reader(&store)])
        .set_writers([writer(&store)])
        .build();

    repository.put_message(message());
    assert_eq!(store.get_user(&ozzy().id()).as_deref(), Some(&ozzy()));
    assert_eq!(store.get_device(&DeviceType::Windows).as_deref(), Some(&windows()));
    assert_eq!(repository.get_message(&MESSAGE_ID).as_deref(), Some(&message()));
}

#[test]
fn test_writes_broadcast_to_every_writer() {
    init_logger();
    let first = Rc::new(InMemoryEntityStore::new());
    let second = Rc::new(InMemoryEntityStore::new());
    let mut repository = NormalizedEntityRepository::builder()
        .set_readers([reader(&first)])
        .set_writers([writer(&first), writer(&second)])
        .build();

    repository.put_user(fozzy());
    assert_eq!(first.get_user(&fozzy().id()).as_deref(), Some(&fozzy()));
    assert_eq!(second.get_user(&fozzy().id()).as_deref(), Some(&fozzy()));
}

#[test]
fn test_readers_probed_in_order() {
    init_logger();
    let first = Rc::new(InMemoryEntityStore::new());
    let second = Rc::new(InMemoryEntityStore::new());
    let repository = NormalizedEntityRepository::builder()
        .set_readers([reader(&first), reader(&second)])
        .build();

    assert!(second.put_user(Rc::new(ozzy())));
    assert_eq!(repository.get_user(&ozzy().id()).as_deref(), Some(&ozzy()));

    first.put_user(Rc::new(ozzy_renamed()));
    assert_eq!(repository.get_user(&ozzy().id()).as_deref(), Some(&ozzy_renamed()));
}

#[test]
fn test_default_writer_is_separate_from_explicit_readers() {
    init_logger();
    let store = Rc::new(InMemoryEntityStore::new());
    let mut repository = NormalizedEntityRepository::builder().set_readers([reader(&store)]).build();

    let dirty = repository.put_user(gozzy());
    assert_eq!(dirty.len(), 1);
    assert!(repository.get_user(&gozzy().id()).is_none());
}

#[test]
fn test_empty_lists_fall_back_to_one_shared_store() {
    init_logger();
    let mut repository = NormalizedEntityRepository::builder()
        .set_readers(Vec::new())
        .set_writers(Vec::new())
        .build();

    repository.put_user(ozzy());
    assert_eq!(repository.get_user(&ozzy().id()).as_deref(), Some(&ozzy()));
}

#[test]
fn test_missing_reference_keeps_cached_value() {
    init_logger();
    let store = Rc::new(InMemoryEntityStore::new());
    let repository = NormalizedEntityRepository::builder()
        .set_readers([reader(&store)])
        .set_writers([writer(&store)])
        .build();

    // written straight to the store, so none of the referenced entities exist
    let cached = Rc::new(message());
    store.put_message(Rc::clone(&cached));

    let read = repository.get_message(&MESSAGE_ID).unwrap();
    assert!(Rc::ptr_eq(&cached, &read));
}

#[test]
fn test_store_replaces_by_id() {
    let store = InMemoryEntityStore::new();
    assert!(store.get_user(&1).is_none());
    assert!(store.put_user(Rc::new(ozzy())));
    assert!(store.put_user(Rc::new(ozzy_renamed())));
    assert_eq!(store.get_user(&1).as_deref(), Some(&ozzy_renamed()));
}
