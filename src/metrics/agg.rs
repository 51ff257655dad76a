use std::{cmp::Ordering, collections::HashMap, hash::Hash, ops::Add};

use super::SortOrder;

/// Exact product/vendor match, ignoring case and whitespace runs.
pub fn same_name(stored: &str, wanted: &str) -> bool {
    let mut a = stored.split_whitespace();
    let mut b = wanted.split_whitespace();
    loop {
        match (a.next(), b.next()) {
            (None, None) => return true,
            (Some(x), Some(y)) if x.to_lowercase() == y.to_lowercase() => continue,
            _ => return false,
        }
    }
}

/// Case-insensitive substring match, used for exploratory filtering.
pub fn name_contains(stored: &str, needle: &str) -> bool {
    stored.to_lowercase().contains(&needle.trim().to_lowercase())
}

pub(crate) fn mean(values: impl IntoIterator<Item = f64>) -> Option<f64> {
    let (sum, n) = values
        .into_iter()
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    (n > 0).then(|| sum / n as f64)
}

/// Accumulates values per key, remembering the order keys were first seen.
pub(crate) struct Grouped<K, V> {
    entries: Vec<(K, V)>,
    index: HashMap<K, usize>,
}

impl<K, V> Grouped<K, V>
where
    K: Eq + Hash + Clone,
    V: Copy + Add<Output = V>,
{
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            index: HashMap::new(),
        }
    }

    pub fn add(&mut self, key: K, value: V) {
        match self.index.get(&key) {
            Some(&i) => self.entries[i].1 = self.entries[i].1 + value,
            None => {
                self.index.insert(key.clone(), self.entries.len());
                self.entries.push((key, value));
            }
        }
    }

    pub fn into_vec(self) -> Vec<(K, V)> {
        self.entries
    }
}

/// Group-by-sum in first-seen key order.
pub(crate) fn group_sum<K, V>(items: impl IntoIterator<Item = (K, V)>) -> Vec<(K, V)>
where
    K: Eq + Hash + Clone,
    V: Copy + Add<Output = V>,
{
    let mut g = Grouped::new();
    for (k, v) in items {
        g.add(k, v);
    }
    g.into_vec()
}

/// Group-by-mean in first-seen key order.
pub(crate) fn group_mean<K>(items: impl IntoIterator<Item = (K, f64)>) -> Vec<(K, f64)>
where
    K: Eq + Hash + Clone,
{
    let mut g: Grouped<K, MeanAcc> = Grouped::new();
    for (k, v) in items {
        g.add(k, MeanAcc { sum: v, n: 1 });
    }
    g.into_vec()
        .into_iter()
        .map(|(k, acc)| (k, acc.sum / acc.n as f64))
        .collect()
}

#[derive(Clone, Copy)]
struct MeanAcc {
    sum: f64,
    n: usize,
}

impl Add for MeanAcc {
    type Output = MeanAcc;

    fn add(self, other: MeanAcc) -> MeanAcc {
        MeanAcc {
            sum: self.sum + other.sum,
            n: self.n + other.n,
        }
    }
}

/// First entry holding the largest value.
pub(crate) fn arg_max<K, V: PartialOrd + Copy>(
    items: impl IntoIterator<Item = (K, V)>,
) -> Option<(K, V)> {
    pick(items, |candidate, best| candidate > best)
}

/// First entry holding the smallest value.
pub(crate) fn arg_min<K, V: PartialOrd + Copy>(
    items: impl IntoIterator<Item = (K, V)>,
) -> Option<(K, V)> {
    pick(items, |candidate, best| candidate < best)
}

fn pick<K, V: Copy>(
    items: impl IntoIterator<Item = (K, V)>,
    better: impl Fn(V, V) -> bool,
) -> Option<(K, V)> {
    let mut best: Option<(K, V)> = None;
    for (k, v) in items {
        let replace = match &best {
            Some((_, b)) => better(v, *b),
            None => true,
        };
        if replace {
            best = Some((k, v));
        }
    }
    best
}

/// Stable sort by value then truncate, so equal values keep their input order.
pub(crate) fn rank<K, V: PartialOrd>(mut items: Vec<(K, V)>, order: SortOrder, n: usize) -> Vec<(K, V)> {
    items.sort_by(|a, b| {
        let ord = a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal);
        match order {
            SortOrder::Ascending => ord,
            SortOrder::Descending => ord.reverse(),
        }
    });
    items.truncate(n);
    items
}

/// Distinct values in first-seen order.
pub(crate) fn unique<'a>(items: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for item in items {
        if !out.iter().any(|seen| seen == item) {
            out.push(item.to_string());
        }
    }
    out
}
