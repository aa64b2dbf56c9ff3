#![cfg(test)]

// Property tests for InternTable kept inside the crate so they can use a
// tiny arena and a colliding hasher without widening the public API.

use crate::config::TableConfig;
use crate::handle::Handle;
use crate::intern_table::InternTable;
use core::hash::BuildHasher;
use proptest::prelude::*;
use std::collections::HashMap;

#[derive(Clone, Default)]
struct LowEntropyBuildHasher;
struct LowEntropyHasher(u64);
impl BuildHasher for LowEntropyBuildHasher {
    type Hasher = LowEntropyHasher;
    fn build_hasher(&self) -> Self::Hasher {
        LowEntropyHasher(0)
    }
}
impl core::hash::Hasher for LowEntropyHasher {
    // Only the length and first byte contribute: lots of full collisions.
    fn write(&mut self, bytes: &[u8]) {
        self.0 = self.0.wrapping_mul(31).wrapping_add(bytes.len() as u64);
        if let Some(&b) = bytes.first() {
            self.0 = self.0.wrapping_mul(31).wrapping_add(b as u64);
        }
    }
    fn finish(&self) -> u64 {
        self.0
    }
}

#[derive(Clone, Debug)]
enum Op {
    Intern(usize),
    Lookup(usize),
    Contains(Vec<u8>),
    Format(usize),
}

fn arb_scenario() -> impl Strategy<Value = (Vec<Vec<u8>>, Vec<Op>)> {
    proptest::collection::vec(proptest::collection::vec(any::<u8>(), 0..6), 1..=12).prop_flat_map(
        |pool| {
            let idx = 0..pool.len();
            let op = prop_oneof![
                3 => idx.clone().prop_map(Op::Intern),
                1 => idx.clone().prop_map(Op::Lookup),
                1 => proptest::collection::vec(any::<u8>(), 0..6).prop_map(Op::Contains),
                1 => (0..pool.len()).prop_map(Op::Format),
            ];
            proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
        },
    )
}

fn run<S: BuildHasher>(
    table: &InternTable<S>,
    pool: &[Vec<u8>],
    ops: Vec<Op>,
) -> Result<(), TestCaseError> {
    let mut model: HashMap<Vec<u8>, Handle<'_>> = HashMap::new();
    for op in ops {
        match op {
            Op::Intern(i) => {
                let key = &pool[i];
                let h = table.intern(key).unwrap();
                prop_assert_eq!(h.as_bytes(), key.as_slice());
                match model.get(key) {
                    Some(prev) => {
                        prop_assert_eq!(*prev, h);
                    }
                    None => {
                        // A new value never aliases an existing entry.
                        prop_assert!(model.values().all(|other| *other != h));
                        model.insert(key.clone(), h);
                    }
                }
            }
            Op::Lookup(i) => {
                let key = &pool[i];
                prop_assert_eq!(table.lookup(key), model.get(key).copied());
            }
            Op::Contains(bytes) => {
                prop_assert_eq!(table.contains(&bytes), model.contains_key(&bytes));
            }
            Op::Format(i) => {
                let text = format!("#{}", i);
                let h = crate::intern_format!(table, "#{}", i).unwrap();
                prop_assert_eq!(h, table.intern(&text).unwrap());
                model.entry(text.into_bytes()).or_insert(h);
            }
        }
        prop_assert_eq!(table.len(), model.len());
        // Earlier handles still read their bytes after any growth.
        for (k, h) in &model {
            prop_assert_eq!(h.as_bytes(), k.as_slice());
        }
    }
    Ok(())
}

// Property: state-machine equivalence against a HashMap model.
// - intern is canonical and never aliases distinct values;
// - lookup/contains agree with the model and never create;
// - len tracks distinct values; handles stay readable across growth.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        let config = TableConfig::default()
            .with_shards(4)
            .with_initial_chunk_capacity(1)
            .with_max_chunk_capacity(4);
        let table = InternTable::with_config(config);
        run(&table, &pool, ops)?;
    }

    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        let config = TableConfig::default().with_shards(2).with_initial_chunk_capacity(2);
        let table = InternTable::with_config_and_hasher(config, LowEntropyBuildHasher);
        run(&table, &pool, ops)?;
    }
}
