//! End-to-end behavior of the generated repository over the messaging model

mod common;

use std::{collections::HashMap, rc::Rc};

use common::*;
use entity_normalizer::Entity;

#[test]
fn test_empty_start() {
    let repository = repository();
    assert!(repository.get_message(&MESSAGE_ID).is_none());
    assert!(repository.get_user(&ozzy().id()).is_none());
    assert!(repository.get_device(&DeviceType::Android).is_none());
}

#[test]
fn test_put_extracts_every_nested_entity() {
    let mut repository = repository();
    let dirty = repository.put_message(message());

    assert_eq!(dirty.len(), 7);
    for entity in [
        EntityRef::from(message()),
        EntityRef::from(ozzy()),
        EntityRef::from(fozzy()),
        EntityRef::from(gozzy()),
        EntityRef::from(android()),
        EntityRef::from(ios()),
        EntityRef::from(windows()),
    ] {
        assert!(dirty.contains(&entity), "missing {entity:?}");
    }
}

#[test]
fn test_get_all_after_put() {
    let mut repository = repository();
    repository.put_message(message());

    for user in [ozzy(), fozzy(), gozzy()] {
        assert_eq!(repository.get_user(&user.id()).as_deref(), Some(&user));
    }
    for device in [android(), ios(), windows()] {
        assert_eq!(repository.get_device(&device.id()).as_deref(), Some(&device));
    }
    assert_eq!(repository.get_message(&MESSAGE_ID).as_deref(), Some(&message()));
}

#[test]
fn test_single_over_single() {
    let mut repository = repository();
    repository.put_user(ozzy());
    repository.put_user(ozzy_renamed());
    assert_eq!(repository.get_user(&ozzy().id()).as_deref(), Some(&ozzy_renamed()));
}

#[test]
fn test_update_nested_from_single() {
    let mut repository = repository();
    repository.put_message(message());
    repository.put_user(ozzy_renamed());

    assert_eq!(repository.get_user(&ozzy().id()).as_deref(), Some(&ozzy_renamed()));
    let message = repository.get_message(&MESSAGE_ID).unwrap();
    assert_eq!(message.sender(), &ozzy_renamed());
    assert_eq!(
        message.users_by_devices().get(&vec![android(), ios()]),
        Some(&vec![ozzy_renamed(), fozzy()])
    );
    assert_eq!(message.users_by_devices().get(&vec![windows()]), Some(&vec![gozzy()]));
    assert_eq!(message.body(), "Hello World");
}

#[test]
fn test_update_single_from_nested() {
    let mut repository = repository();
    repository.put_user(ozzy_renamed());
    repository.put_message(message());
    assert_eq!(repository.get_user(&ozzy().id()).as_deref(), Some(&ozzy()));
}

#[test]
fn test_update_inside_list_of_maps() {
    let mut repository = repository();
    repository.put_message(message());
    let fozzy_renamed = User::new(2, "Fozzy Bear".to_string());
    repository.put_user(fozzy_renamed.clone());

    let message = repository.get_message(&MESSAGE_ID).unwrap();
    assert_eq!(message.recipients(), &vec![fozzy_renamed.clone(), gozzy()]);
    assert_eq!(
        message.recipients_to_read_list(),
        &vec![HashMap::from([(fozzy_renamed.clone(), true)]), HashMap::from([(gozzy(), false)])]
    );
    assert_eq!(
        message.users_by_devices().get(&vec![android(), ios()]),
        Some(&vec![ozzy(), fozzy_renamed])
    );
}

#[test]
fn test_unchanged_composite_is_not_rebuilt() {
    let mut repository = repository();
    repository.put_message(message());

    let first = repository.get_message(&MESSAGE_ID).unwrap();
    let second = repository.get_message(&MESSAGE_ID).unwrap();
    assert!(Rc::ptr_eq(&first, &second));

    // rewriting an identical value keeps the composite clean
    repository.put_user(ozzy());
    let third = repository.get_message(&MESSAGE_ID).unwrap();
    assert!(Rc::ptr_eq(&first, &third));
}

#[test]
fn test_stale_composite_is_rebuilt() {
    let mut repository = repository();
    repository.put_message(message());
    let cached = repository.get_message(&MESSAGE_ID).unwrap();

    repository.put_user(ozzy_renamed());
    let rebuilt = repository.get_message(&MESSAGE_ID).unwrap();
    assert!(!Rc::ptr_eq(&cached, &rebuilt));
    assert_eq!(cached.sender(), &ozzy());
    assert_eq!(rebuilt.sender(), &ozzy_renamed());
    assert_eq!(rebuilt.message_id(), &MESSAGE_ID);
}

#[test]
fn test_canonical_reference_across_composites() {
    let mut repository = repository();
    let first = message();
    let second = Message::new(
        2,
        "Second".to_string(),
        gozzy(),
        vec![ozzy_renamed()],
        Vec::new(),
        HashMap::new(),
    );
    repository.put_message(first);
    repository.put_message(second);

    let first = repository.get_message(&MESSAGE_ID).unwrap();
    let second = repository.get_message(&2).unwrap();
    assert_eq!(first.sender(), &ozzy_renamed());
    assert_eq!(second.recipients(), &vec![ozzy_renamed()]);
    assert_eq!(first.sender(), &second.recipients()[0]);
}

#[test]
fn test_dirty_set_of_leaf_entity() {
    let mut repository = repository();
    let dirty = repository.put_device(android());
    assert_eq!(dirty.len(), 1);
    assert!(dirty.contains(&EntityRef::from(android())));

    // putting the same message twice reports the same set
    let once = repository.put_message(message());
    let twice = repository.put_message(message());
    assert_eq!(once, twice);
}

#[test]
fn test_entity_ref_identity() {
    let ozzy_ref = EntityRef::from(ozzy());
    assert_eq!(ozzy_ref, EntityRef::from(Rc::new(ozzy())));
    assert_ne!(ozzy_ref, EntityRef::from(ozzy_renamed()));
    assert_ne!(ozzy_ref, EntityRef::from(fozzy()));
    assert!(ozzy_ref.entity_type().ends_with("model::user::User"));
    assert_eq!(ozzy_ref.entity_type(), ozzy().entity_type());
    assert_ne!(ozzy_ref.entity_type(), EntityRef::from(android()).entity_type());
}

#[test]
fn test_generated_entity_surface() {
    let user = ozzy();
    assert_eq!(user.id(), 1);
    assert_eq!(user.user_id(), &1);
    assert_eq!(user.name(), "Ozzy");
    assert_eq!(<User as Entity>::ENTITY_TYPE, user.entity_type());

    let device = ios();
    assert_eq!(device.id(), DeviceType::Ios);
    assert_eq!(device.device_type(), &DeviceType::Ios);

    let message = message();
    assert_eq!(message.id(), MESSAGE_ID);
    assert_eq!(message.recipients().len(), 2);
    assert_eq!(message.recipients_to_read_list().len(), 2);
    assert_eq!(message.users_by_devices().len(), 2);
}
