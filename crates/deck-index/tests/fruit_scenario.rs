//! Sort and reversal on a small fruit basket.

use deck_core::{EventBus, ItemId};
use deck_index::{ChangeOptions, ItemIndex, sort_by_field};
use serde_json::json;

fn display_index(index: &ItemIndex, id: &str) -> Option<usize> {
    index.get(&ItemId::new(id)).and_then(|item| item.display_index())
}

#[test]
fn sort_by_name_then_reverse() {
    let index = ItemIndex::new(EventBus::new());
    index
        .add_all_values(
            [
                json!({"id": "cherry", "name": "Cherry"}),
                json!({"id": "apple", "name": "Apple"}),
                json!({"id": "banana", "name": "Banana"}),
            ],
            ChangeOptions::deferred(),
        )
        .expect("well-formed items");
    assert_eq!(display_index(&index, "apple"), None, "indexing was deferred");

    index.set_sort_key(Some(sort_by_field("name")));
    assert_eq!(display_index(&index, "apple"), Some(0));
    assert_eq!(display_index(&index, "banana"), Some(1));
    assert_eq!(display_index(&index, "cherry"), Some(2));

    index.set_reversed(true);
    assert_eq!(display_index(&index, "apple"), Some(2));
    assert_eq!(display_index(&index, "banana"), Some(1));
    assert_eq!(display_index(&index, "cherry"), Some(0));
}
