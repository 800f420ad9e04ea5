#![allow(missing_docs)]
use std::hash::BuildHasherDefault;

use hashbrown::HashMap;
use rand::prelude::*;
use rand_pcg::Pcg64;
use zwohash::ZwoHasher;

use crate::{
    InsertOutcome, RecordLayout, RobinHoodConfig, RobinHoodTable, TableError, MAX_CAPACITY,
};

type RefMap = HashMap<Vec<u8>, Vec<u8>, BuildHasherDefault<ZwoHasher>>;

struct CheckedTable {
    dut: RobinHoodTable,
    ref_map: RefMap,
}

impl CheckedTable {
    fn new(key_size: usize, value_size: usize, config: RobinHoodConfig) -> Self {
        CheckedTable {
            dut: RobinHoodTable::with_config(
                RecordLayout::new(key_size, value_size).unwrap(),
                config,
            )
            .unwrap(),
            ref_map: RefMap::default(),
        }
    }
    fn insert(&mut self, key: &[u8], value: &[u8]) {
        let ref_result = self.ref_map.insert(key.to_vec(), value.to_vec());
        let dut_result = self.dut.insert(key, value).unwrap();
        assert_eq!(ref_result.is_none(), dut_result.is_inserted());
        assert_eq!(
            self.dut.slot(dut_result.location()),
            Some((key, value)),
            "returned slot does not hold the inserted record"
        );
    }
    fn lookup(&self, key: &[u8]) {
        assert_eq!(
            self.ref_map.get(key).map(|value| &value[..]),
            self.dut.lookup(key)
        );
    }
    fn delete(&mut self, key: &[u8]) {
        let ref_result = self.ref_map.remove(key).is_some();
        let dut_result = self.dut.delete(key);
        assert_eq!(ref_result, dut_result);
    }
    fn reset(&mut self) {
        self.ref_map.clear();
        self.dut.reset();
    }
    fn check(&self) {
        self.dut.check();
        assert_eq!(self.ref_map.len(), self.dut.len());
        for (key, value) in self.ref_map.iter() {
            assert_eq!(self.dut.lookup(key), Some(&value[..]));
        }
        for (key, value) in self.dut.iter() {
            assert_eq!(self.ref_map.get(key).map(|value| &value[..]), Some(value));
        }
    }
}

fn random_ops(rng: &mut impl Rng, table: &mut CheckedTable, key_range: u32, ops: usize) {
    for _ in 0..ops {
        let key = rng.gen_range(0..key_range).to_le_bytes();
        match rng.gen_range(0..100) {
            0..=49 => {
                let value: [u8; 6] = rng.gen();
                table.insert(&key, &value);
            }
            50..=79 => table.lookup(&key),
            80..=98 => table.delete(&key),
            _ => table.reset(),
        }
        if rng.gen_ratio(1, 64) {
            table.check();
        }
    }
    table.check();
}

#[test]
fn scenario_insert_lookup_delete() {
    let mut table = RobinHoodTable::create(4, 4).unwrap();
    table.insert(&1u32.to_le_bytes(), &100u32.to_le_bytes()).unwrap();
    table.insert(&2u32.to_le_bytes(), &200u32.to_le_bytes()).unwrap();
    assert_eq!(table.lookup(&1u32.to_le_bytes()), Some(&100u32.to_le_bytes()[..]));
    assert_eq!(table.lookup(&2u32.to_le_bytes()), Some(&200u32.to_le_bytes()[..]));
    assert!(table.delete(&1u32.to_le_bytes()));
    assert_eq!(table.lookup(&1u32.to_le_bytes()), None);
    assert_eq!(table.lookup(&2u32.to_le_bytes()), Some(&200u32.to_le_bytes()[..]));
    table.check();
}

#[test]
fn update_keeps_len() {
    let mut table = RobinHoodTable::create(4, 4).unwrap();
    let key = 7u32.to_le_bytes();
    assert!(table.insert(&key, &1u32.to_le_bytes()).unwrap().is_inserted());
    let outcome = table.insert(&key, &2u32.to_le_bytes()).unwrap();
    assert!(matches!(outcome, InsertOutcome::Updated(_)));
    assert_eq!(table.len(), 1);
    assert_eq!(table.lookup(&key), Some(&2u32.to_le_bytes()[..]));
}

#[test]
fn delete_absent_key() {
    let mut table = RobinHoodTable::create(4, 4).unwrap();
    table.insert(&1u32.to_le_bytes(), &1u32.to_le_bytes()).unwrap();
    assert!(!table.delete(&2u32.to_le_bytes()));
    assert_eq!(table.len(), 1);
}

#[test]
fn update_at_threshold_does_not_grow() {
    let mut table = RobinHoodTable::create(4, 4).unwrap();
    for i in 0..4u32 {
        table.insert(&i.to_le_bytes(), &i.to_le_bytes()).unwrap();
    }
    assert_eq!(table.capacity(), 8);
    table.insert(&3u32.to_le_bytes(), &9u32.to_le_bytes()).unwrap();
    assert_eq!(table.capacity(), 8);
    table.insert(&4u32.to_le_bytes(), &4u32.to_le_bytes()).unwrap();
    assert_eq!(table.capacity(), 16);
}

#[test]
fn doublings_match_load_factor() {
    for (initial_capacity, max_load_factor, n) in
        [(8, 0.5, 100usize), (8, 0.5, 4), (1024, 0.7, 5000), (16, 1.0, 17)]
    {
        let config = RobinHoodConfig {
            initial_capacity,
            max_load_factor,
        };
        let mut table =
            RobinHoodTable::with_config(RecordLayout::new(8, 8).unwrap(), config).unwrap();
        for i in 0..n as u64 {
            table.insert(&i.to_le_bytes(), &(i * 3).to_le_bytes()).unwrap();
        }
        let ratio = n as f64 / max_load_factor / initial_capacity as f64;
        let doublings = ratio.log2().ceil().max(0.0) as u32;
        assert_eq!(table.capacity(), initial_capacity << doublings);
        assert_eq!(table.len(), n);
        for i in 0..n as u64 {
            assert_eq!(table.lookup(&i.to_le_bytes()), Some(&(i * 3).to_le_bytes()[..]));
        }
        table.check();
    }
}

#[test]
fn reset_keeps_capacity() {
    let mut table = RobinHoodTable::create(2, 1).unwrap();
    for i in 0..40u16 {
        table.insert(&i.to_le_bytes(), &[i as u8]).unwrap();
    }
    let capacity = table.capacity();
    table.reset();
    assert_eq!(table.capacity(), capacity);
    assert!(table.is_empty());
    for i in 0..40u16 {
        assert_eq!(table.lookup(&i.to_le_bytes()), None);
    }
    assert!(table.insert(&5u16.to_le_bytes(), &[1]).unwrap().is_inserted());
    assert_eq!(table.len(), 1);
    table.check();
}

#[test]
fn reserve_grows_ahead() {
    let mut table = RobinHoodTable::create(4, 0).unwrap();
    table.reserve(1000).unwrap();
    assert_eq!(table.capacity(), 2048);
    for i in 0..1000u32 {
        table.insert(&i.to_le_bytes(), &[]).unwrap();
    }
    assert_eq!(table.capacity(), 2048);
    assert_eq!(table.lookup(&999u32.to_le_bytes()), Some(&[][..]));
}

#[test]
fn failed_reserve_leaves_table_unchanged() {
    let mut table = CheckedTable::new(4, 4, RobinHoodConfig::default());
    for i in 0..100u32 {
        table.insert(&i.to_le_bytes(), &(!i).to_le_bytes());
    }
    let capacity = table.dut.capacity();
    let len = table.dut.len();

    for additional in [usize::MAX, MAX_CAPACITY, MAX_CAPACITY / 2] {
        assert_eq!(
            table.dut.reserve(additional),
            Err(TableError::CapacityExceeded)
        );
        assert_eq!(table.dut.capacity(), capacity);
        assert_eq!(table.dut.len(), len);
        table.check();
    }
    for i in 0..100u32 {
        table.lookup(&i.to_le_bytes());
    }

    table.dut.grow().unwrap();
    assert_eq!(table.dut.capacity(), capacity * 2);
    table.check();
}

#[test]
fn full_load_factor_wraps_around() {
    let config = RobinHoodConfig {
        initial_capacity: 4,
        max_load_factor: 1.0,
    };
    let mut table = CheckedTable::new(1, 1, config);
    for key in 0..4u8 {
        table.insert(&[key], &[key]);
    }
    assert_eq!(table.dut.capacity(), 4);
    table.check();
    table.lookup(&[200]);
    table.delete(&[1]);
    table.check();
}

#[test]
fn invalid_layout() {
    assert!(matches!(
        RobinHoodTable::create(0, 4),
        Err(TableError::InvalidLayout { .. })
    ));
}

#[test]
#[should_panic]
fn wrong_value_width() {
    let mut table = RobinHoodTable::create(4, 4).unwrap();
    let _ = table.insert(&[0; 4], &[0; 3]);
}

#[test]
fn random_small_keys() {
    let mut rng = Pcg64::seed_from_u64(1);
    let mut table = CheckedTable::new(4, 6, RobinHoodConfig::default());
    random_ops(&mut rng, &mut table, 64, 20_000);
}

#[test]
fn random_large_key_space() {
    let mut rng = Pcg64::seed_from_u64(2);
    for max_load_factor in [0.5, 0.9] {
        let config = RobinHoodConfig {
            initial_capacity: 2,
            max_load_factor,
        };
        let mut table = CheckedTable::new(4, 6, config);
        random_ops(&mut rng, &mut table, 5_000, 30_000);
    }
}
