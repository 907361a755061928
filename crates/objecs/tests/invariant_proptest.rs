//! # Membership Invariant Property Test
//!
//! For random operation sequences, every live view contains exactly the
//! live entities that hold all of its required components and none of its
//! excluded ones.

use objecs::{EntityId, Store, ViewId};
use proptest::prelude::*;

const NAMES: [&str; 5] = ["a", "b", "c", "d", "e"];

#[derive(Clone, Debug)]
enum Op {
    Create(Vec<usize>),
    Delete(usize),
    Set(usize, usize),
    Remove(usize, Vec<usize>),
    Archetype(Vec<usize>, Vec<usize>),
    Without(usize, Vec<usize>),
    Dispose(usize),
    Clear,
}

fn names(indices: &[usize]) -> Vec<&'static str> {
    indices.iter().map(|&i| NAMES[i % NAMES.len()]).collect()
}

fn arb_names() -> impl Strategy<Value = Vec<usize>> {
    prop::collection::vec(0..NAMES.len(), 0..3)
}

fn arb_op() -> impl Strategy<Value = Op> {
    prop_oneof![
        4 => arb_names().prop_map(Op::Create),
        2 => any::<usize>().prop_map(Op::Delete),
        4 => (any::<usize>(), 0..NAMES.len()).prop_map(|(e, c)| Op::Set(e, c)),
        3 => (any::<usize>(), arb_names()).prop_map(|(e, c)| Op::Remove(e, c)),
        1 => (arb_names(), arb_names()).prop_map(|(r, x)| Op::Archetype(r, x)),
        1 => (any::<usize>(), arb_names()).prop_map(|(v, x)| Op::Without(v, x)),
        1 => any::<usize>().prop_map(Op::Dispose),
        1 => Just(Op::Clear),
    ]
}

fn pick<T: Copy>(items: &[T], index: usize) -> Option<T> {
    (!items.is_empty()).then(|| items[index % items.len()])
}

fn check(store: &Store<u32>, views: &[ViewId]) -> Result<(), TestCaseError> {
    for &view in views {
        let Some(archetype) = store.view(view) else {
            continue;
        };
        let mut expected = 0;
        for id in store.entities() {
            let matches = archetype.matches(store.mask(id).unwrap_or_default());
            prop_assert_eq!(archetype.contains(id), matches, "{:?} {:?}", view, id);
            expected += usize::from(matches);
        }
        prop_assert_eq!(archetype.len(), expected);
    }
    Ok(())
}

proptest! {
    #[test]
    fn views_match_rescan(ops in prop::collection::vec(arb_op(), 1..80)) {
        let mut store: Store<u32> = Store::new();
        let mut entities: Vec<EntityId> = Vec::new();
        let mut views: Vec<ViewId> = Vec::new();

        for op in ops {
            match op {
                Op::Create(c) => {
                    let pairs: Vec<(&str, u32)> = names(&c).into_iter().map(|n| (n, 1)).collect();
                    entities.push(store.create_with(pairs).unwrap());
                }
                Op::Delete(e) => {
                    if let Some(id) = pick(&entities, e) {
                        let alive = store.contains(id);
                        prop_assert_eq!(store.delete(id), alive);
                    }
                }
                Op::Set(e, c) => {
                    if let Some(id) = pick(&entities, e) {
                        let alive = store.contains(id);
                        prop_assert_eq!(store.set_component(id, NAMES[c], 1).is_ok(), alive);
                    }
                }
                Op::Remove(e, c) => {
                    if let Some(id) = pick(&entities, e) {
                        let alive = store.contains(id);
                        prop_assert_eq!(store.remove_components(id, &names(&c)).is_ok(), alive);
                    }
                }
                Op::Archetype(r, x) => {
                    views.push(store.archetype(&names(&r), &names(&x)).unwrap());
                }
                Op::Without(v, x) => {
                    if let Some(parent) = pick(&views, v) {
                        if store.view(parent).is_some() {
                            views.push(store.without(parent, &names(&x)).unwrap());
                        } else {
                            prop_assert!(store.without(parent, &names(&x)).is_err());
                        }
                    }
                }
                Op::Dispose(v) => {
                    if let Some(view) = pick(&views, v) {
                        let registered = store.view(view).is_some();
                        prop_assert_eq!(store.dispose(view), registered);
                    }
                }
                Op::Clear => store.clear(),
            }
            check(&store, &views)?;
        }
    }
}
