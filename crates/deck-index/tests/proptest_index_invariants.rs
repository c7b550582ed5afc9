//! Property-based invariant tests for the item index.
//!
//! For any sequence of add/remove/filter/sort/reverse operations:
//!
//! 1. Displayed items are exactly the items passing the filter
//! 2. Their display indices form the contiguous range 0..k
//! 3. Display order matches a stable sort by key over insertion order,
//!    reversed when the flag is set
//! 4. Filtered-out items have no display index

use std::rc::Rc;

use deck_core::{EventBus, ItemId};
use deck_index::{ChangeOptions, Filter, Item, ItemIndex, SortKey, SortKeyFn};
use proptest::prelude::*;
use serde_json::{Map, json};

#[derive(Debug, Clone)]
enum Op {
    Add(u8, i64),
    Remove(u8),
    Filter(Option<i64>),
    Sort(bool),
    Reverse(bool),
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => (0u8..20, -5i64..5).prop_map(|(id, rank)| Op::Add(id, rank)),
        2 => (0u8..20).prop_map(Op::Remove),
        1 => proptest::option::of(-5i64..5).prop_map(Op::Filter),
        1 => any::<bool>().prop_map(Op::Sort),
        1 => any::<bool>().prop_map(Op::Reverse),
    ]
}

fn item(id: u8, rank: i64) -> Item {
    let mut data = Map::new();
    data.insert("rank".into(), json!(rank));
    Item::new(format!("i{id}"), data)
}

fn rank_of(item: &Item) -> i64 {
    item.get("rank").and_then(|v| v.as_i64()).unwrap_or_default()
}

/// Reference model: insertion-ordered (id, rank) list plus settings.
#[derive(Default)]
struct Model {
    items: Vec<(ItemId, i64)>,
    threshold: Option<i64>,
    sorted: bool,
    reversed: bool,
}

impl Model {
    fn expected_order(&self) -> Vec<ItemId> {
        let mut shown: Vec<&(ItemId, i64)> = self
            .items
            .iter()
            .filter(|(_, rank)| self.threshold.is_none_or(|t| *rank >= t))
            .collect();
        if self.sorted {
            shown.sort_by_key(|(_, rank)| *rank);
        }
        if self.reversed {
            shown.reverse();
        }
        shown.into_iter().map(|(id, _)| id.clone()).collect()
    }
}

proptest! {
    #[test]
    fn display_order_matches_model(ops in proptest::collection::vec(op_strategy(), 1..60)) {
        let index = ItemIndex::new(EventBus::new());
        let mut model = Model::default();
        let sort_key: SortKeyFn = Rc::new(|item: &Item| SortKey::Number(rank_of(item) as f64));

        for op in ops {
            match op {
                Op::Add(id, rank) => {
                    index.add(item(id, rank), ChangeOptions::default()).unwrap();
                    let key = ItemId::new(format!("i{id}"));
                    match model.items.iter_mut().find(|(k, _)| *k == key) {
                        Some(entry) => entry.1 = rank,
                        None => model.items.push((key, rank)),
                    }
                }
                Op::Remove(id) => {
                    let key = ItemId::new(format!("i{id}"));
                    index.remove(&key, ChangeOptions::default());
                    model.items.retain(|(k, _)| *k != key);
                }
                Op::Filter(threshold) => {
                    let filter: Option<Filter> = threshold
                        .map(|t| Rc::new(move |item: &Item| rank_of(item) >= t) as Filter);
                    index.set_filter(filter);
                    model.threshold = threshold;
                }
                Op::Sort(on) => {
                    index.set_sort_key(on.then(|| Rc::clone(&sort_key)));
                    model.sorted = on;
                }
                Op::Reverse(on) => {
                    index.set_reversed(on);
                    model.reversed = on;
                }
            }
        }

        let expected = model.expected_order();
        prop_assert_eq!(index.display_order(), expected.clone());

        for (pos, id) in expected.iter().enumerate() {
            prop_assert_eq!(index.get(id).and_then(|i| i.display_index()), Some(pos));
        }
        for (id, _) in &model.items {
            if !expected.contains(id) {
                prop_assert_eq!(index.get(id).and_then(|i| i.display_index()), None);
            }
        }
        prop_assert_eq!(index.len(), model.items.len());
    }
}
