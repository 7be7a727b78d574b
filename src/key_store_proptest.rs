// Property tests for KeyStore kept inside the crate so they can reach the
// internal layer directly.

use crate::key_store::{KeyStore, Occupied};
use core::hash::{BuildHasher, Hasher};
use proptest::prelude::*;

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Insert(usize, i32),
    TryInsert(usize, i32),
    Remove(usize),
    Get(usize),
    Contains(String),
    Mutate(usize, i32),
    Clear,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=8).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Insert(i, v)),
            2 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::TryInsert(i, v)),
            3 => idx.clone().prop_map(OpI::Remove),
            2 => idx.clone().prop_map(OpI::Get),
            2 => prop_oneof![contains_pool, "[a-z]{0,5}"].prop_map(OpI::Contains),
            2 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::Mutate(i, d)),
            1 => Just(OpI::Clear),
        ];
        proptest::collection::vec(op, 1..60).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Ordered model: a Vec of (key, value) in insertion order. Overwrites keep
// position; removals close the gap.
fn model_pos(model: &[(String, i32)], k: &str) -> Option<usize> {
    model.iter().position(|(mk, _)| mk == k)
}

fn run_state_machine<S: BuildHasher>(
    mut sut: KeyStore<i32, S>,
    pool: Vec<String>,
    ops: Vec<OpI>,
) -> Result<(), TestCaseError> {
    let mut model: Vec<(String, i32)> = Vec::new();

    for op in ops {
        match op {
            OpI::Insert(i, v) => {
                let k = pool[i].clone();
                let prev = sut.insert(k.clone(), v);
                match model_pos(&model, &k) {
                    Some(p) => {
                        prop_assert_eq!(prev, Some(model[p].1));
                        model[p].1 = v;
                    }
                    None => {
                        prop_assert_eq!(prev, None);
                        model.push((k, v));
                    }
                }
            }
            OpI::TryInsert(i, v) => {
                let k = pool[i].clone();
                let already = model_pos(&model, &k);
                match sut.try_insert(k.clone(), v) {
                    Ok(()) => {
                        prop_assert!(already.is_none(), "try_insert must fail on duplicate");
                        model.push((k, v));
                    }
                    Err(Occupied { key }) => {
                        prop_assert!(already.is_some(), "duplicate error only when key exists");
                        prop_assert_eq!(key, k);
                    }
                }
            }
            OpI::Remove(i) => {
                let k = &pool[i];
                let got = sut.remove(k);
                let expected = model_pos(&model, k).map(|p| model.remove(p).1);
                prop_assert_eq!(got, expected);
            }
            OpI::Get(i) => {
                let k = &pool[i];
                let expected = model_pos(&model, k).map(|p| &model[p].1);
                prop_assert_eq!(sut.get(k), expected);
            }
            OpI::Contains(s) => {
                prop_assert_eq!(sut.contains_key(&s), model_pos(&model, &s).is_some());
            }
            OpI::Mutate(i, d) => {
                let k = &pool[i];
                if let Some(v) = sut.get_mut(k) {
                    *v = v.saturating_add(d);
                    let p = model_pos(&model, k).expect("model tracks live key");
                    model[p].1 = model[p].1.saturating_add(d);
                } else {
                    prop_assert!(model_pos(&model, k).is_none());
                }
            }
            OpI::Clear => {
                prop_assert_eq!(sut.clear(), model.len());
                model.clear();
            }
        }

        // Post-conditions after each op: exact order and size parity.
        let seen: Vec<(&str, i32)> = sut.iter().map(|(k, v)| (k, *v)).collect();
        let expected: Vec<(&str, i32)> = model.iter().map(|(k, v)| (k.as_str(), *v)).collect();
        prop_assert_eq!(seen, expected);
        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
    }
    Ok(())
}

// Property: State-machine equivalence against an insertion-ordered Vec model.
// - Overwrites return the previous value and keep position.
// - `try_insert` rejects present keys and hands the key back.
// - `remove` returns the model's value; absent removals are no-ops.
// - `iter` yields exactly the model's entries in the model's order.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        run_state_machine(KeyStore::new(), pool, ops)?;
    }
}

// Collision variant using a constant hasher to stress equality resolution.
#[derive(Clone, Default)]
struct ConstBuildHasher;
struct ConstHasher;
impl BuildHasher for ConstBuildHasher {
    type Hasher = ConstHasher;
    fn build_hasher(&self) -> Self::Hasher {
        ConstHasher
    }
}
impl Hasher for ConstHasher {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        0
    }
}

// Property: Same invariants as above under worst-case collisions.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        run_state_machine(KeyStore::with_hasher(ConstBuildHasher), pool, ops)?;
    }
}
