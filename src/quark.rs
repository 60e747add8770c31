use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

pub trait StringTable {
    fn to_str(&self, id: usize) -> Option<&str>;
    fn to_id(&self, s: &str) -> Option<usize>;
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// An immutable symbol table.
///
/// Symbols are kept sorted, so ids follow the canonical (byte-wise) order of
/// the symbols: id `i` sorts before id `j` whenever `i < j`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct Quark {
    v: Vec<String>,
    m: HashMap<String, usize>,
}

impl From<Vec<String>> for Quark {
    fn from(value: Vec<String>) -> Self {
        value.into_iter().collect()
    }
}

impl From<Quark> for Vec<String> {
    fn from(value: Quark) -> Self {
        value.v
    }
}

impl<S: Into<String>> FromIterator<S> for Quark {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let v: Vec<String> = iter
            .into_iter()
            .map(Into::into)
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        let m = v.iter().enumerate().map(|(i, s)| (s.to_string(), i)).collect();
        Self { v, m }
    }
}

impl StringTable for Quark {
    fn to_str(&self, id: usize) -> Option<&str> {
        self.v.get(id).map(|x| x.as_str())
    }

    fn to_id(&self, s: &str) -> Option<usize> {
        self.m.get(s).copied()
    }

    fn len(&self) -> usize {
        self.v.len()
    }
}

impl Quark {
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.v.iter().map(String::as_str)
    }

    pub fn contains(&self, s: &str) -> bool {
        self.m.contains_key(s)
    }

    pub fn as_slice(&self) -> &[String] {
        &self.v
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn find_by_str() {
        let quark: Quark = ["two", "zero", "one", "two", "one"].into_iter().collect();
        assert_eq!(quark.len(), 3);
        for (s, id) in [("one", 0), ("two", 1), ("zero", 2)] {
            assert_eq!(Some(id), quark.to_id(s), "{} != {}", s, id);
        }
        assert_eq!(quark.to_id("three"), None);
    }

    #[test]
    fn find_by_id() {
        let quark = Quark::from(vec!["b".to_string(), "a".to_string()]);
        assert_eq!(quark.to_str(0), Some("a"));
        assert_eq!(quark.to_str(1), Some("b"));
        assert_eq!(quark.to_str(2), None);
    }

    #[test]
    fn serde_keeps_order() {
        let quark: Quark = ["VB", "NN", "AT"].into_iter().collect();
        let s = serde_json::to_string(&quark).unwrap();
        assert_eq!(s, r#"["AT","NN","VB"]"#);
        let back: Quark = serde_json::from_str(&s).unwrap();
        assert_eq!(back, quark);
        assert_eq!(back.to_id("VB"), Some(2));
    }
}
