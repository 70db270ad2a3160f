#![cfg(test)]

// Property tests for ChainTable kept inside the crate so they can check
// structure (chain lengths, load factor) next to observable behavior.

use crate::chain_table::ChainTable;
use crate::config::TableConfig;
use proptest::prelude::*;
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::hash::{BuildHasher, Hasher};

// Key newtype with Borrow<str> to exercise borrowed lookup.
#[derive(Clone, Eq, PartialEq, Ord, PartialOrd, Hash)]
struct Key(String);
impl fmt::Debug for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}
impl std::borrow::Borrow<str> for Key {
    fn borrow(&self) -> &str {
        &self.0
    }
}

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Insert(usize, i32),
    Remove(usize),
    Get(usize),
    Contains(String),
    Mutate(usize, i32),
    Iterate,
    Clear,
}

fn key_from(pool: &[String], i: usize) -> Key {
    Key(pool[i].clone())
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=40).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Insert(i, v)),
            2 => idx.clone().prop_map(OpI::Remove),
            2 => idx.clone().prop_map(OpI::Get),
            1 => prop_oneof![
                contains_pool.prop_map(|s: String| s),
                "[a-z]{0,5}".prop_map(|s| s)
            ]
            .prop_map(OpI::Contains),
            1 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::Mutate(i, d)),
            1 => Just(OpI::Iterate),
            1 => Just(OpI::Clear),
        ];
        proptest::collection::vec(op, 1..120).prop_map(move |ops| (pool.clone(), ops))
    })
}

// Drives one scenario against a `HashMap` model.
// Invariants exercised across random operation sequences:
// - Insert returns `None` for new keys and the model's previous pair otherwise.
// - `remove` returns the owned `(K, V)` matching the model; misses change nothing.
// - `get`/`contains_key` parity with the model, including borrowed `&str` lookups.
// - `iter` yields each live entry exactly once.
// - After each op: len parity, chain lengths sum to len, load factor under threshold.
fn run_scenario<S: BuildHasher>(
    mut sut: ChainTable<Key, i32, S>,
    pool: &[String],
    ops: Vec<OpI>,
) -> Result<(), TestCaseError> {
    let mut model: HashMap<Key, i32> = HashMap::new();
    let mut capacity = sut.capacity();

    for op in ops {
        match op {
            OpI::Insert(i, v) => {
                let k = key_from(pool, i);
                let before = model.insert(k.clone(), v);
                match sut.insert(k.clone(), v) {
                    None => prop_assert!(before.is_none(), "fresh insert only for new keys"),
                    Some((dk, dv)) => {
                        prop_assert_eq!(dk, k);
                        prop_assert_eq!(Some(dv), before);
                    }
                }
                prop_assert_eq!(sut.get(&key_from(pool, i)), Some(&v));
            }
            OpI::Remove(i) => {
                let k = key_from(pool, i);
                let expected = model.remove(&k).map(|v| (k.clone(), v));
                prop_assert_eq!(sut.remove(&k), expected);
                prop_assert!(!sut.contains_key(&k));
            }
            OpI::Get(i) => {
                let k = key_from(pool, i);
                prop_assert_eq!(sut.get(&k), model.get(&k));
            }
            OpI::Contains(s) => {
                let has = sut.contains_key(s.as_str());
                let has_model = model.keys().any(|k| k.0 == s);
                prop_assert_eq!(has, has_model);
            }
            OpI::Mutate(i, d) => {
                let k = key_from(pool, i);
                match (sut.get_mut(&k), model.get_mut(&k)) {
                    (Some(sv), Some(mv)) => {
                        *sv = sv.saturating_add(d);
                        *mv = mv.saturating_add(d);
                    }
                    (None, None) => {}
                    (s, m) => prop_assert!(false, "presence mismatch: {:?} vs {:?}", s, m),
                }
            }
            OpI::Iterate => {
                let s_keys: Vec<_> = sut.keys().cloned().collect();
                let unique: BTreeSet<_> = s_keys.iter().cloned().collect();
                prop_assert_eq!(s_keys.len(), unique.len(), "no key yielded twice");
                let m_keys: BTreeSet<_> = model.keys().cloned().collect();
                prop_assert_eq!(unique, m_keys);
            }
            OpI::Clear => {
                sut.clear();
                model.clear();
            }
        }

        prop_assert_eq!(sut.len(), model.len());
        prop_assert_eq!(sut.is_empty(), model.is_empty());
        prop_assert_eq!(sut.chain_lengths().iter().sum::<usize>(), sut.len());
        prop_assert!(sut.load_factor() < sut.max_load());
        prop_assert!(sut.capacity() >= capacity, "capacity never shrinks");
        capacity = sut.capacity();
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        run_scenario(ChainTable::new(), &pool, ops)?;
    }

    #[test]
    fn prop_state_machine_small_table((pool, ops) in arb_scenario()) {
        let cfg = TableConfig::new().initial_capacity(1).max_load(0.75);
        let sut: ChainTable<Key, i32> = ChainTable::with_config(cfg, Default::default());
        run_scenario(sut, &pool, ops)?;
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

// Property: Same state-machine invariants as above, under worst-case
// collision behavior (constant hasher). Every entry shares one chain, so
// this stresses prepend, unlink at every position, and relinking on growth.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        let sut: ChainTable<Key, i32, ConstBuildHasher> = ChainTable::with_hasher(ConstBuildHasher);
        run_scenario(sut, &pool, ops)?;
    }
}

// Property: a remove/reinsert round trip restores count and membership.
proptest! {
    #[test]
    fn prop_insert_remove_round_trip(
        base in proptest::collection::hash_map(any::<u16>(), any::<i32>(), 0..200),
        k in any::<u16>(),
        v in any::<i32>(),
    ) {
        prop_assume!(!base.contains_key(&k));
        let mut t: ChainTable<u16, i32> = base.iter().map(|(&k, &v)| (k, v)).collect();
        let len = t.len();

        prop_assert_eq!(t.insert(k, v), None);
        prop_assert_eq!(t.remove(&k), Some((k, v)));
        prop_assert_eq!(t.len(), len);
        prop_assert!(!t.contains_key(&k));
        for (bk, bv) in &base {
            prop_assert_eq!(t.get(bk), Some(bv));
        }
    }
}
