use std::collections::HashMap;
use std::sync::RwLock;

/// Pattern index for `/`-separated paths with MQTT-style wildcards.
///
/// - `+` stands for exactly one segment (`interaction/+` matches
///   `interaction/r1` but not `interaction/r1/comments`).
/// - `#` stands for zero or more trailing segments and must come last
///   (`compose/#` matches `compose`, `compose/comment/r1`, ...).
///
/// Used for both state subscriptions and request handlers.
pub struct Trie<T> {
    root: RwLock<Node<T>>,
}

struct Node<T> {
    exact: HashMap<String, Node<T>>,
    one: Option<Box<Node<T>>>,
    /// Values registered with a `#` at this depth.
    tail: Vec<T>,
    /// Values whose pattern ends exactly at this node.
    here: Vec<T>,
}

impl<T> Node<T> {
    fn empty() -> Self {
        Self {
            exact: HashMap::new(),
            one: None,
            tail: Vec::new(),
            here: Vec::new(),
        }
    }
}

impl<T: Clone> Trie<T> {
    pub fn new() -> Self {
        Self {
            root: RwLock::new(Node::empty()),
        }
    }

    pub fn insert(&self, pattern: &str, value: T) {
        let mut node = self.root.write().unwrap();
        let mut cur: &mut Node<T> = &mut node;
        for seg in segments(pattern) {
            match seg {
                "#" => {
                    cur.tail.push(value);
                    return;
                }
                "+" => {
                    cur = &mut **cur.one.get_or_insert_with(|| Box::new(Node::empty()));
                }
                s => {
                    cur = cur.exact.entry(s.to_string()).or_insert_with(Node::empty);
                }
            }
        }
        cur.here.push(value);
    }

    /// All values whose pattern matches the concrete `path`.
    ///
    /// Order: exact branches before `+` branches, deeper `#` values before
    /// shallower ones is not guaranteed. Callers must not depend on it.
    pub fn matches(&self, path: &str) -> Vec<T> {
        let root = self.root.read().unwrap();
        let segs: Vec<&str> = segments(path).collect();
        let mut out = Vec::new();
        collect(&root, &segs, &mut out);
        out
    }

    /// Remove the values stored under `pattern` for which `pred` holds.
    pub fn remove<F>(&self, pattern: &str, pred: F) -> bool
    where
        F: Fn(&T) -> bool,
    {
        let mut root = self.root.write().unwrap();
        let mut cur: &mut Node<T> = &mut root;
        for seg in segments(pattern) {
            let next = match seg {
                "#" => return retain_not(&mut cur.tail, &pred),
                "+" => cur.one.as_deref_mut(),
                s => cur.exact.get_mut(s),
            };
            match next {
                Some(n) => cur = n,
                None => return false,
            }
        }
        retain_not(&mut cur.here, &pred)
    }

    /// True if at least one value is registered under exactly `pattern`.
    pub fn contains_pattern(&self, pattern: &str) -> bool {
        let root = self.root.read().unwrap();
        let mut cur: &Node<T> = &root;
        for seg in segments(pattern) {
            let next = match seg {
                "#" => return !cur.tail.is_empty(),
                "+" => cur.one.as_deref(),
                s => cur.exact.get(s),
            };
            match next {
                Some(n) => cur = n,
                None => return false,
            }
        }
        !cur.here.is_empty()
    }
}

impl<T: Clone> Default for Trie<T> {
    fn default() -> Self {
        Self::new()
    }
}

fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}

fn collect<T: Clone>(node: &Node<T>, segs: &[&str], out: &mut Vec<T>) {
    // `#` swallows whatever is left, including nothing.
    out.extend(node.tail.iter().cloned());

    let Some((first, rest)) = segs.split_first() else {
        out.extend(node.here.iter().cloned());
        return;
    };
    if let Some(child) = node.exact.get(*first) {
        collect(child, rest, out);
    }
    if let Some(child) = node.one.as_deref() {
        collect(child, rest, out);
    }
}

fn retain_not<T, F: Fn(&T) -> bool>(values: &mut Vec<T>, pred: &F) -> bool {
    let before = values.len();
    values.retain(|v| !pred(v));
    values.len() < before
}
