#![allow(missing_docs)]
use std::hash::BuildHasherDefault;

use hashbrown::HashMap;
use rand::prelude::*;
use rand_pcg::Pcg64;
use zwohash::ZwoHasher;

use crate::{
    DerefTable, DerefTableConfig, InsertOutcome, LoadBalancingConfig, RecordLayout, TableError,
    TableId, TinyPointer,
};

type RefMap = HashMap<Vec<u8>, (Vec<u8>, TinyPointer), BuildHasherDefault<ZwoHasher>>;

struct CheckedTable {
    dut: DerefTable,
    ref_map: RefMap,
}

impl CheckedTable {
    fn new(config: DerefTableConfig) -> Self {
        CheckedTable {
            dut: DerefTable::with_config(RecordLayout::new(4, 4).unwrap(), config).unwrap(),
            ref_map: RefMap::default(),
        }
    }
    fn insert(&mut self, key: &[u8], value: &[u8]) {
        match self.dut.insert(key, value) {
            Ok(InsertOutcome::Inserted(ptr)) => {
                assert!(self
                    .ref_map
                    .insert(key.to_vec(), (value.to_vec(), ptr))
                    .is_none());
            }
            Ok(InsertOutcome::Updated(ptr)) => {
                let entry = self.ref_map.get_mut(key).expect("update of absent key");
                assert_eq!(entry.1, ptr, "record moved on update");
                entry.0 = value.to_vec();
            }
            Err(err) => {
                assert_eq!(err, TableError::CapacityExceeded);
                assert!(!self.ref_map.contains_key(key));
            }
        }
    }
    fn lookup(&self, key: &[u8]) {
        let ref_result = self.ref_map.get(key);
        assert_eq!(
            ref_result.map(|(value, _)| &value[..]),
            self.dut.lookup(key)
        );
        if let Some((value, ptr)) = ref_result {
            assert_eq!(self.dut.get(*ptr), Some((key, &value[..])));
            assert_eq!(self.dut.lookup_at(key, *ptr), Some(&value[..]));
        }
    }
    fn delete(&mut self, key: &[u8]) {
        let ref_result = self.ref_map.remove(key);
        let dut_result = match &ref_result {
            Some((_, ptr)) if ptr.slot() % 2 == 0 => self.dut.delete_at(key, *ptr),
            _ => self.dut.delete(key),
        };
        assert_eq!(ref_result.is_some(), dut_result);
    }
    fn reset(&mut self) {
        self.ref_map.clear();
        self.dut.reset();
    }
    fn check(&self) {
        self.dut.check();
        assert_eq!(self.ref_map.len(), self.dut.len());
        for (key, (value, ptr)) in self.ref_map.iter() {
            assert_eq!(self.dut.get(*ptr), Some((&key[..], &value[..])));
        }
        for (ptr, key, value) in self.dut.iter() {
            assert_eq!(
                self.ref_map.get(key),
                Some(&(value.to_vec(), ptr)),
            );
        }
    }
}

fn tiny_config() -> DerefTableConfig {
    DerefTableConfig {
        primary: LoadBalancingConfig {
            num_buckets: 1,
            slots_per_bucket: 2,
            initial_slots_per_bucket: 1,
            seed: 1,
        },
        secondary: LoadBalancingConfig {
            num_buckets: 1,
            slots_per_bucket: 1,
            initial_slots_per_bucket: 1,
            seed: 2,
        },
    }
}

fn key(i: u32) -> [u8; 4] {
    i.to_le_bytes()
}

#[test]
fn insert_lookup_delete() {
    let mut table = DerefTable::create(4, 4).unwrap();
    for (k, v) in [(42, 123), (100, 456), (2021, 789)] {
        assert!(table.insert(&key(k), &key(v)).unwrap().is_inserted());
    }
    assert_eq!(table.lookup(&key(100)), Some(&key(456)[..]));
    assert!(table.delete(&key(100)));
    assert_eq!(table.lookup(&key(100)), None);
    assert!(!table.delete(&key(100)));
    assert_eq!(table.len(), 2);
    table.reset();
    assert_eq!(table.lookup(&key(42)), None);
    assert!(table.is_empty());
    table.check();
}

#[test]
fn fills_primary_then_secondary() {
    let mut table = DerefTable::with_config(RecordLayout::new(4, 4).unwrap(), tiny_config())
        .unwrap();
    let ptrs: Vec<TinyPointer> = (0..3)
        .map(|i| table.insert(&key(i), &key(i * 10)).unwrap().location())
        .collect();
    assert_eq!(
        ptrs,
        [
            TinyPointer::new(TableId::Primary, 0, 0),
            TinyPointer::new(TableId::Primary, 0, 1),
            TinyPointer::new(TableId::Secondary, 0, 0),
        ]
    );
    assert_eq!(table.primary().active_slots_per_bucket(), 2);

    assert_eq!(
        table.insert(&key(3), &key(30)),
        Err(TableError::CapacityExceeded)
    );
    assert_eq!(table.len(), 3);

    let updated = table.insert(&key(2), &key(99)).unwrap();
    assert_eq!(updated, InsertOutcome::Updated(ptrs[2]));
    assert_eq!(table.get(ptrs[2]), Some((&key(2)[..], &key(99)[..])));
    assert_eq!(
        table.insert(&key(0), &key(77)),
        Ok(InsertOutcome::Updated(ptrs[0]))
    );
    assert_eq!(table.lookup(&key(0)), Some(&key(77)[..]));
    assert_eq!(table.len(), 3);

    assert!(table.delete_at(&key(1), ptrs[1]));
    assert_eq!(
        table.insert(&key(3), &key(30)).unwrap(),
        InsertOutcome::Inserted(ptrs[1])
    );
    table.check();
}

#[test]
fn reset_restores_initial_active_range() {
    let mut table = DerefTable::with_config(RecordLayout::new(4, 4).unwrap(), tiny_config())
        .unwrap();
    let initial = table.active_capacity();
    for i in 0..3 {
        table.insert(&key(i), &key(i)).unwrap();
    }
    assert!(table.active_capacity() > initial);
    table.reset();
    assert_eq!(table.active_capacity(), initial);
    assert_eq!(table.max_capacity(), 3);
    for i in 0..3 {
        assert_eq!(table.lookup(&key(i)), None);
    }
    assert_eq!(
        table.insert(&key(1), &key(1)).unwrap(),
        InsertOutcome::Inserted(TinyPointer::new(TableId::Primary, 0, 0))
    );
    table.check();
}

#[test]
fn primary_growth_keeps_records() {
    let mut table = DerefTable::with_max_capacity(RecordLayout::new(4, 4).unwrap(), 64).unwrap();
    let initial = table.primary().active_slots_per_bucket();
    let mut inserted = vec![];
    let mut extra_after_growth = 5;
    for i in 0..64 {
        table.insert(&key(i), &key(i + 1000)).unwrap();
        inserted.push(i);
        if table.primary().active_slots_per_bucket() > initial {
            extra_after_growth -= 1;
            if extra_after_growth == 0 {
                break;
            }
        }
    }
    assert!(table.primary().active_slots_per_bucket() > initial);
    for &i in &inserted {
        assert_eq!(table.lookup(&key(i)), Some(&key(i + 1000)[..]));
    }
    table.check();
}

#[test]
fn pointers_survive_growth() {
    let mut table =
        DerefTable::with_max_capacity(RecordLayout::new(4, 4).unwrap(), 1 << 12).unwrap();
    let early: Vec<(u32, TinyPointer)> = (0..32)
        .map(|i| (i, table.insert(&key(i), &key(!i)).unwrap().location()))
        .collect();
    let active_before = table.active_capacity();
    for i in 32..3000 {
        table.insert(&key(i), &key(!i)).unwrap();
    }
    assert!(table.active_capacity() > active_before);
    for (i, ptr) in early {
        assert_eq!(table.get(ptr), Some((&key(i)[..], &key(!i)[..])));
    }
    table.check();
}

#[test]
fn pointer_bits_are_small() {
    let table = DerefTable::with_max_capacity(RecordLayout::new(8, 8).unwrap(), 1 << 16).unwrap();
    assert!(table.pointer_bits() <= 18);
    assert_eq!(table.pointer_bits(), table.config().pointer_bits());
    let stats = table.stats();
    assert_eq!(stats.occupied, 0);
    assert_eq!(stats.active_capacity, table.active_capacity());
    assert!(stats.active_capacity < table.max_capacity());
}

#[test]
fn stale_pointer_falls_back_to_rehash() {
    let mut table = DerefTable::create(4, 4).unwrap();
    let ptr = table.insert(&key(5), &key(50)).unwrap().location();
    assert!(table.delete(&key(5)));
    assert_eq!(table.get(ptr), None);
    assert_eq!(table.lookup_at(&key(5), ptr), None);
    let other = table.insert(&key(6), &key(60)).unwrap().location();
    assert_eq!(table.lookup_at(&key(6), ptr), Some(&key(60)[..]));
    assert!(!table.delete_at(&key(5), other));
    assert_eq!(table.len(), 1);
}

#[test]
fn pointer_display() {
    assert_eq!(TinyPointer::new(TableId::Secondary, 12, 3).to_string(), "S:12:3");
}

#[test]
fn random_ops() {
    let mut rng = Pcg64::seed_from_u64(3);
    for (max_capacity, key_range) in [(64, 200u32), (1 << 10, 900), (1 << 12, 100)] {
        let mut table = CheckedTable::new(DerefTableConfig::for_max_capacity(max_capacity));
        for _ in 0..20_000 {
            let k = key(rng.gen_range(0..key_range));
            match rng.gen_range(0..100) {
                0..=49 => {
                    let value: [u8; 4] = rng.gen();
                    table.insert(&k, &value);
                }
                50..=79 => table.lookup(&k),
                80..=98 => table.delete(&k),
                _ => table.reset(),
            }
            if rng.gen_ratio(1, 256) {
                table.check();
            }
        }
        table.check();
    }
}
