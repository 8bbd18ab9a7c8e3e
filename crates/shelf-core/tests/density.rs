//! Every list stays dense under arbitrary sequences of mutations.

use proptest::prelude::*;
use shelf_core::{ImportEntry, ItemType, ItemUpdate, NewItem, Store};
use uuid::Uuid;

#[derive(Debug, Clone)]
enum Op {
    Create(ItemType, Vec<String>),
    Delete(usize),
    Reorder(usize, i64),
    ChangeType(usize, ItemType),
    ToggleRead(usize, bool),
    BulkDelete(Vec<usize>),
    BulkMove(Vec<usize>, ItemType),
    BulkTag(Vec<usize>, Vec<String>),
    Import(Vec<u8>),
}

fn arb_type() -> impl Strategy<Value = ItemType> {
    prop_oneof![Just(ItemType::Bookmark), Just(ItemType::ReadingList)]
}

fn arb_tags() -> impl Strategy<Value = Vec<String>> {
    prop::collection::vec("[a-c]{1}", 0..3)
}

fn arb_picks() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(any::<usize>(), 0..5)
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        3 => (arb_type(), arb_tags()).prop_map(|(t, tags)| Op::Create(t, tags)),
        1 => any::<usize>().prop_map(Op::Delete),
        2 => (any::<usize>(), -3i64..12).prop_map(|(i, p)| Op::Reorder(i, p)),
        1 => (any::<usize>(), arb_type()).prop_map(|(i, t)| Op::ChangeType(i, t)),
        1 => (any::<usize>(), any::<bool>()).prop_map(|(i, r)| Op::ToggleRead(i, r)),
        1 => arb_picks().prop_map(Op::BulkDelete),
        2 => (arb_picks(), arb_type()).prop_map(|(p, t)| Op::BulkMove(p, t)),
        1 => (arb_picks(), arb_tags()).prop_map(|(p, tags)| Op::BulkTag(p, tags)),
        1 => prop::collection::vec(0u8..6, 0..4).prop_map(Op::Import),
    ]
}

/// Current ids plus one that never exists, so picks can miss
fn candidates(store: &Store) -> Vec<Uuid> {
    let mut ids: Vec<Uuid> = store.list_items().unwrap().iter().map(|i| i.id).collect();
    ids.push(Uuid::nil());
    ids
}

fn pick(ids: &[Uuid], index: usize) -> Uuid {
    ids[index % ids.len()]
}

fn apply(store: &mut Store, op: Op, counter: &mut u32) {
    let ids = candidates(store);
    match op {
        Op::Create(item_type, tags) => {
            *counter += 1;
            store
                .create_item(
                    NewItem::new(format!("item {}", counter), format!("https://{}.test", counter))
                        .with_type(item_type)
                        .with_tags(tags),
                )
                .unwrap();
        }
        Op::Delete(i) => {
            store.delete_item(pick(&ids, i)).unwrap();
        }
        Op::Reorder(i, position) => {
            let id = pick(&ids, i);
            let item_type = store
                .get_item(id)
                .unwrap()
                .map(|item| item.item_type)
                .unwrap_or_default();
            store.reorder_item(id, item_type, position).unwrap();
        }
        Op::ChangeType(i, item_type) => {
            let update = ItemUpdate {
                item_type: Some(item_type),
                ..Default::default()
            };
            match store.update_item(pick(&ids, i), update) {
                Ok(()) => {}
                Err(e) => assert!(e.is_not_found()),
            }
        }
        Op::ToggleRead(i, read) => match store.toggle_read(pick(&ids, i), read) {
            Ok(()) => {}
            Err(e) => assert!(e.is_not_found()),
        },
        Op::BulkDelete(picks) => {
            let targets: Vec<Uuid> = picks.iter().map(|i| pick(&ids, *i)).collect();
            store.bulk_delete(&targets).unwrap();
        }
        Op::BulkMove(picks, item_type) => {
            let targets: Vec<Uuid> = picks.iter().map(|i| pick(&ids, *i)).collect();
            store.bulk_move(&targets, item_type).unwrap();
        }
        Op::BulkTag(picks, tags) => {
            let targets: Vec<Uuid> = picks.iter().map(|i| pick(&ids, *i)).collect();
            store.bulk_tag(&targets, &tags).unwrap();
        }
        Op::Import(urls) => {
            // Small url space so imports collide with each other and with creates
            let entries: Vec<ImportEntry> = urls
                .iter()
                .map(|n| ImportEntry {
                    title: String::new(),
                    url: format!("https://{}.test", n),
                    tags: vec![],
                })
                .collect();
            store.import_bookmarks(&entries).unwrap();
        }
    }
}

fn positions(store: &Store, item_type: ItemType) -> Vec<i64> {
    store
        .list_partition(item_type)
        .unwrap()
        .iter()
        .map(|i| i.position)
        .collect()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(128))]

    #[test]
    fn lists_stay_dense(ops in prop::collection::vec(arb_op(), 1..40)) {
        let mut store = Store::open_in_memory().unwrap();
        let mut counter = 0;

        for op in ops {
            apply(&mut store, op, &mut counter);

            prop_assert!(store.check_density().unwrap().is_empty());
            for item_type in ItemType::ALL {
                let found = positions(&store, item_type);
                let expected: Vec<i64> = (0..found.len() as i64).collect();
                prop_assert_eq!(found, expected);
            }
        }
    }

    #[test]
    fn reorder_to_own_position_is_identity(count in 1usize..8, pick in any::<usize>()) {
        let mut store = Store::open_in_memory().unwrap();
        for n in 0..count {
            store
                .create_item(
                    NewItem::new(format!("n{}", n), format!("https://n{}.test", n))
                        .with_type(ItemType::ReadingList),
                )
                .unwrap();
        }

        let before = store.list_partition(ItemType::ReadingList).unwrap();
        let target = &before[pick % before.len()];
        store
            .reorder_item(target.id, ItemType::ReadingList, target.position)
            .unwrap();

        prop_assert_eq!(store.list_partition(ItemType::ReadingList).unwrap(), before);
    }

    #[test]
    fn bulk_move_places_items_in_caller_order(count in 1usize..8, picks in prop::collection::vec(any::<usize>(), 1..6)) {
        let mut store = Store::open_in_memory().unwrap();
        for n in 0..count {
            store
                .create_item(
                    NewItem::new(format!("n{}", n), format!("https://n{}.test", n))
                        .with_type(ItemType::ReadingList),
                )
                .unwrap();
        }
        let ids: Vec<Uuid> = store
            .list_partition(ItemType::ReadingList)
            .unwrap()
            .iter()
            .map(|i| i.id)
            .collect();

        let mut order: Vec<Uuid> = Vec::new();
        for p in &picks {
            let id = ids[p % ids.len()];
            if !order.contains(&id) {
                order.push(id);
            }
        }

        let targets: Vec<Uuid> = picks.iter().map(|p| ids[p % ids.len()]).collect();
        store.bulk_move(&targets, ItemType::Bookmark).unwrap();

        let moved: Vec<Uuid> = store
            .list_partition(ItemType::Bookmark)
            .unwrap()
            .iter()
            .map(|i| i.id)
            .collect();
        prop_assert_eq!(moved, order);
    }
}
