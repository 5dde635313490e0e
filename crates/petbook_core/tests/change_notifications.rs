use petbook_core::{ChangeChannel, ContentUri, PetGateway, PetPatch};
use rusqlite::types::Value;

fn rex_patch() -> PetPatch {
    PetPatch {
        name: Some("Rex".to_string()),
        breed: Some("Lab".to_string()),
        gender: Some(1),
        weight: Some(10),
    }
}

#[test]
fn insert_publishes_collection_uri_once() {
    let gateway = PetGateway::open_in_memory().unwrap();
    let watcher = gateway.channel().subscribe(&ContentUri::collection());

    gateway
        .insert(&ContentUri::collection(), &rex_patch())
        .unwrap();

    assert_eq!(watcher.take(), 1);
}

#[test]
fn rejected_insert_publishes_nothing() {
    let gateway = PetGateway::open_in_memory().unwrap();
    let watcher = gateway.channel().subscribe(&ContentUri::collection());

    let mut patch = rex_patch();
    patch.gender = Some(9);
    gateway
        .insert(&ContentUri::collection(), &patch)
        .unwrap_err();

    assert_eq!(watcher.pending(), 0);
}

#[test]
fn update_publishes_the_uri_as_given_exactly_once() {
    let gateway = PetGateway::open_in_memory().unwrap();
    let item_uri = gateway
        .insert(&ContentUri::collection(), &rex_patch())
        .unwrap();
    let item_watcher = gateway.channel().subscribe(&item_uri);

    let patch = PetPatch {
        weight: Some(11),
        ..PetPatch::default()
    };
    let changed = gateway.update(&item_uri, &patch, None, &[]).unwrap();

    assert_eq!(changed, 1);
    assert_eq!(item_watcher.take(), 1);
}

#[test]
fn update_matching_no_rows_publishes_nothing() {
    let gateway = PetGateway::open_in_memory().unwrap();
    let watcher = gateway.channel().subscribe(&ContentUri::collection());

    let patch = PetPatch {
        weight: Some(11),
        ..PetPatch::default()
    };
    let changed = gateway.update(&ContentUri::item(42), &patch, None, &[]).unwrap();

    assert_eq!(changed, 0);
    assert_eq!(watcher.pending(), 0);
}

#[test]
fn empty_patch_update_publishes_nothing_and_skips_storage() {
    let gateway = PetGateway::open_in_memory().unwrap();
    let item_uri = gateway
        .insert(&ContentUri::collection(), &rex_patch())
        .unwrap();
    let watcher = gateway.channel().subscribe(&item_uri);

    let changed = gateway
        .update(&item_uri, &PetPatch::default(), None, &[])
        .unwrap();

    assert_eq!(changed, 0);
    assert_eq!(watcher.pending(), 0);
}

#[test]
fn item_delete_publishes_item_uri_once() {
    let gateway = PetGateway::open_in_memory().unwrap();
    let item_uri = gateway
        .insert(&ContentUri::collection(), &rex_patch())
        .unwrap();
    let watcher = gateway.channel().subscribe(&item_uri);

    let removed = gateway.delete(&item_uri, None, &[]).unwrap();

    assert_eq!(removed, 1);
    assert_eq!(watcher.take(), 1);
}

#[test]
fn deleting_a_missing_item_publishes_nothing() {
    let gateway = PetGateway::open_in_memory().unwrap();
    let item_uri = ContentUri::item(7);
    let watcher = gateway.channel().subscribe(&item_uri);

    let removed = gateway.delete(&item_uri, None, &[]).unwrap();

    assert_eq!(removed, 0);
    assert_eq!(watcher.pending(), 0);
}

#[test]
fn collection_delete_never_publishes_even_when_rows_are_removed() {
    let gateway = PetGateway::open_in_memory().unwrap();
    gateway
        .insert(&ContentUri::collection(), &rex_patch())
        .unwrap();
    gateway
        .insert(&ContentUri::collection(), &rex_patch())
        .unwrap();
    let watcher = gateway.channel().subscribe(&ContentUri::collection());

    let removed = gateway
        .delete(
            &ContentUri::collection(),
            Some("name = ?"),
            &[Value::Text("Rex".to_string())],
        )
        .unwrap();

    assert_eq!(removed, 2);
    assert_eq!(watcher.pending(), 0);
}

#[test]
fn collection_watcher_refreshes_on_item_mutations() {
    let gateway = PetGateway::open_in_memory().unwrap();
    let item_uri = gateway
        .insert(&ContentUri::collection(), &rex_patch())
        .unwrap();
    let list_watcher = gateway.channel().subscribe(&ContentUri::collection());

    let patch = PetPatch {
        name: Some("Rexy".to_string()),
        ..PetPatch::default()
    };
    gateway.update(&item_uri, &patch, None, &[]).unwrap();
    gateway.delete(&item_uri, None, &[]).unwrap();

    assert_eq!(list_watcher.take(), 2);
}

#[test]
fn query_cursor_is_subscribed_to_the_queried_uri() {
    let gateway = PetGateway::open_in_memory().unwrap();
    gateway
        .insert(&ContentUri::collection(), &rex_patch())
        .unwrap();

    let cursor = gateway
        .query(&ContentUri::collection(), None, None, &[], None)
        .unwrap();
    assert_eq!(cursor.notification_uri(), &ContentUri::collection());
    assert_eq!(cursor.subscription().pending(), 0);

    gateway
        .insert(&ContentUri::collection(), &rex_patch())
        .unwrap();

    // The cursor now knows its data is stale and can be re-queried.
    assert_eq!(cursor.subscription().take(), 1);
}
