use std::collections::HashMap;

use case_insensitive_map::{CaseInsensitiveMap, Key};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum Op {
    Insert(String, u32),
    Remove(String),
    Push(u32),
}

fn key_strategy() -> impl Strategy<Value = String> {
    // a small alphabet so that case collisions and numeric keys are frequent
    prop_oneof![
        "[a-cA-C]{1,3}",
        "[0-9]{1,2}",
        "-?[1-9][0-9]?",
    ]
}

fn op_strategy() -> impl Strategy<Value = Op> {
    prop_oneof![
        (key_strategy(), any::<u32>()).prop_map(|(k, v)| Op::Insert(k, v)),
        key_strategy().prop_map(Op::Remove),
        any::<u32>().prop_map(Op::Push),
    ]
}

/// Reference model: a vector of (display key, value) with a linear scan.
#[derive(Default)]
struct Model {
    entries: Vec<(Key, u32)>,
    next_index: i64,
}

impl Model {
    fn normalize(key: &Key) -> Key {
        match key {
            Key::Str(s) => Key::Str(s.to_ascii_lowercase()),
            int => int.clone(),
        }
    }

    fn position(&self, key: &Key) -> Option<usize> {
        let token = Self::normalize(key);
        self.entries.iter().position(|(k, _)| Self::normalize(k) == token)
    }

    fn insert(&mut self, key: Key, value: u32) {
        if let Key::Int(i) = key {
            if i >= self.next_index {
                self.next_index = i + 1;
            }
        }
        match self.position(&key) {
            Some(pos) => self.entries[pos] = (key, value),
            None => self.entries.push((key, value)),
        }
    }

    fn remove(&mut self, key: &Key) {
        if let Some(pos) = self.position(key) {
            self.entries.remove(pos);
        }
    }
}

proptest! {
    #[test]
    fn behaves_like_ordered_reference_model(ops in prop::collection::vec(op_strategy(), 0..200)) {
        let mut map = CaseInsensitiveMap::new();
        let mut model = Model::default();

        for op in ops {
            match op {
                Op::Insert(k, v) => {
                    map.insert(k.as_str(), v);
                    model.insert(Key::from(k), v);
                }
                Op::Remove(k) => {
                    let before = map.len();
                    let expected = model.position(&Key::from(k.as_str())).is_some();
                    prop_assert_eq!(map.remove(k.as_str()).is_some(), expected);
                    prop_assert_eq!(map.len(), before - usize::from(expected));
                    model.remove(&Key::from(k));
                }
                Op::Push(v) => {
                    let idx = map.push(v).unwrap();
                    prop_assert_eq!(idx, model.next_index);
                    model.insert(Key::Int(idx), v);
                }
            }
            prop_assert_eq!(map.len(), model.entries.len());
            prop_assert_eq!(map.next_index(), Some(model.next_index));
        }

        let actual: Vec<_> = map.iter().map(|(k, v)| (k.clone(), *v)).collect();
        prop_assert_eq!(&actual, &model.entries);

        for (key, value) in &model.entries {
            prop_assert_eq!(map.get(key), Some(value));
        }
    }

    #[test]
    fn any_casing_reads_the_same_entry(key in "[a-zA-Z][a-zA-Z0-9_-]{0,15}", value: u32) {
        let mut map = CaseInsensitiveMap::new();
        map.insert(key.as_str(), value);

        prop_assert_eq!(map.get(key.to_ascii_uppercase().as_str()), Some(&value));
        prop_assert_eq!(map.get(key.to_ascii_lowercase().as_str()), Some(&value));
        prop_assert!(map.contains_key(key.as_str()));
    }

    #[test]
    fn source_duplicates_collapse(pairs in prop::collection::vec(("[a-dA-D]{1,2}", any::<u8>()), 0..40)) {
        let map: CaseInsensitiveMap<u8> = pairs.iter().map(|(k, v)| (k.as_str(), *v)).collect();

        let mut last: HashMap<String, (usize, &str, u8)> = HashMap::new();
        for (pos, (k, v)) in pairs.iter().enumerate() {
            let first = last.get(&k.to_ascii_lowercase()).map_or(pos, |e| e.0);
            last.insert(k.to_ascii_lowercase(), (first, k.as_str(), *v));
        }
        let mut expected: Vec<_> = last.into_values().collect();
        expected.sort_by_key(|e| e.0);

        prop_assert_eq!(map.len(), expected.len());
        for ((key, value), (_, exp_key, exp_value)) in map.iter().zip(expected) {
            prop_assert_eq!(key, exp_key);
            prop_assert_eq!(*value, exp_value);
        }
    }

    #[test]
    fn push_never_reuses_removed_index(n in 1usize..30, removed in prop::collection::vec(0i64..30, 0..10)) {
        let mut map = CaseInsensitiveMap::new();
        for i in 0..n {
            map.push(i).unwrap();
        }
        for idx in removed {
            map.remove(idx);
        }
        prop_assert_eq!(map.push(n), Ok(n as i64));
    }
}
