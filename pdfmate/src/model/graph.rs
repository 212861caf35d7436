//! Object graph traversal.
//!
//! All walks use an explicit worklist and a visited set, so reference cycles
//! (a page whose annotation points back at the page, a font descriptor
//! shared by two fonts) terminate and deep graphs cannot overflow the stack.

use lopdf::{Object, ObjectId};
use std::collections::{BTreeMap, BTreeSet};

/// Result of a reachability walk.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Reachability {
    /// Present objects reached from the roots.
    pub reachable: BTreeSet<ObjectId>,
    /// Referenced ids with no object behind them.
    pub dangling: BTreeSet<ObjectId>,
}

impl Reachability {
    /// True when every reference resolved.
    pub fn is_complete(&self) -> bool {
        self.dangling.is_empty()
    }
}

/// Indirect references held directly by `object`, in document order.
///
/// Nested arrays and dictionaries are searched; referenced objects are not
/// followed.
pub fn references(object: &Object) -> Vec<ObjectId> {
    let mut found = Vec::new();
    let mut stack = vec![object];

    while let Some(current) = stack.pop() {
        match current {
            Object::Reference(id) => found.push(*id),
            Object::Array(items) => stack.extend(items.iter().rev()),
            Object::Dictionary(dict) => {
                let values: Vec<&Object> = dict.iter().map(|(_, v)| v).collect();
                stack.extend(values.into_iter().rev());
            }
            Object::Stream(stream) => {
                let values: Vec<&Object> = stream.dict.iter().map(|(_, v)| v).collect();
                stack.extend(values.into_iter().rev());
            }
            _ => {}
        }
    }

    found
}

/// Walk the graph from `roots`, following every indirect reference.
pub fn reachable(
    objects: &BTreeMap<ObjectId, Object>,
    roots: impl IntoIterator<Item = ObjectId>,
) -> Reachability {
    let mut result = Reachability::default();
    let mut worklist: Vec<ObjectId> = roots.into_iter().collect();

    while let Some(id) = worklist.pop() {
        if result.reachable.contains(&id) || result.dangling.contains(&id) {
            continue;
        }
        match objects.get(&id) {
            Some(object) => {
                result.reachable.insert(id);
                worklist.extend(
                    references(object)
                        .into_iter()
                        .filter(|r| !result.reachable.contains(r)),
                );
            }
            None => {
                result.dangling.insert(id);
            }
        }
    }

    result
}

/// Replace every indirect reference inside `object` with `map(id)`.
pub fn rewrite_references(object: &mut Object, map: &mut impl FnMut(ObjectId) -> Object) {
    let mut stack = vec![object];

    while let Some(current) = stack.pop() {
        if let Object::Reference(id) = *current {
            *current = map(id);
            continue;
        }
        match current {
            Object::Array(items) => stack.extend(items.iter_mut()),
            Object::Dictionary(dict) => stack.extend(dict.iter_mut().map(|(_, v)| v)),
            Object::Stream(stream) => stack.extend(stream.dict.iter_mut().map(|(_, v)| v)),
            _ => {}
        }
    }
}
