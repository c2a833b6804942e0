//! Multi-membership bucketing
//!
//! A member with N keys lands in N buckets; members without keys land in the
//! unassigned list. Members keep the order they are passed in, so callers
//! sort once before bucketing.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use super::resolver::LabelMap;

/// Bucket keys (resolved labels) per member id
#[derive(Debug, Clone, Default)]
pub struct Memberships {
    keys: HashMap<String, BTreeSet<String>>,
}

impl Memberships {
    /// Build from (member, value) pairs, keying each member by the value's label
    pub fn from_pairs(pairs: &[(String, String)], labels: &LabelMap) -> Self {
        let mut keys: HashMap<String, BTreeSet<String>> = HashMap::new();
        for (member, value) in pairs {
            keys.entry(member.clone())
                .or_default()
                .insert(labels.get(value).to_string());
        }
        Self { keys }
    }

    pub fn keys_for(&self, member: &str) -> Option<&BTreeSet<String>> {
        self.keys.get(member)
    }
}

/// Named buckets sorted by key plus the members with no key
#[derive(Debug, Clone)]
pub struct Buckets<T> {
    pub named: BTreeMap<String, Vec<T>>,
    pub unassigned: Vec<T>,
}

/// Bucket `members` by their memberships
pub fn bucket_members<T, F>(members: &[T], id_of: F, memberships: &Memberships) -> Buckets<T>
where
    T: Clone,
    F: Fn(&T) -> &str,
{
    let mut named: BTreeMap<String, Vec<T>> = BTreeMap::new();
    let mut unassigned = Vec::new();

    for member in members {
        match memberships.keys_for(id_of(member)) {
            Some(keys) if !keys.is_empty() => {
                for key in keys {
                    named.entry(key.clone()).or_default().push(member.clone());
                }
            }
            _ => unassigned.push(member.clone()),
        }
    }

    Buckets { named, unassigned }
}
