//! Path resolution and the convergence engine.
//!
//! Everything here is a pure in-memory transform over a [`Document`]: no
//! I/O, no retries, no partial effects. [`converge`] validates the whole
//! path read-only before touching the tree, so a structural failure leaves
//! the document exactly as it was — including failures that would otherwise
//! strike halfway through auto-vivification.

use crate::error::{ConvergeError, Result};
use crate::path::{EntryPath, Segment};
use crate::types::{Document, Kind, Outcome, Value};
use std::collections::BTreeMap;

/// Read-only lookup of the value at `path`.
///
/// Walks from the root dictionary down. A missing dictionary key anywhere
/// along the way, or an index past the end of the array at the *leaf*
/// position, is `Ok(None)`; everything else is a structural error:
///
/// - [`ConvergeError::PathTypeMismatch`] — descending into a scalar, or a
///   key segment applied to an array;
/// - [`ConvergeError::InvalidIndex`] — an index segment applied to a
///   dictionary (including the root), or out of bounds for an intermediate
///   array. An intermediate index names a position the path claims exists;
///   its absence is a structural disagreement, not a missing entry.
pub fn lookup<'a>(doc: &'a Document, path: &EntryPath) -> Result<Option<&'a Value>> {
    if path.is_empty() {
        return Err(ConvergeError::EmptyPath);
    }
    let mut current: Option<&Value> = None;
    for (i, seg) in path.segments().iter().enumerate() {
        let next = match (current, seg) {
            (None, Segment::Key(k)) => doc.root.get(k),
            (None, Segment::Index(ix)) => {
                return Err(invalid_index(path, i + 1, *ix, Kind::Dict));
            }
            (Some(Value::Dict(map)), Segment::Key(k)) => map.get(k),
            (Some(Value::Array(items)), Segment::Index(ix)) => match items.get(*ix) {
                Some(v) => Some(v),
                None if i + 1 == path.len() => None,
                None => return Err(invalid_index(path, i + 1, *ix, Kind::Array)),
            },
            (Some(Value::Dict(_)), Segment::Index(ix)) => {
                return Err(invalid_index(path, i + 1, *ix, Kind::Dict));
            }
            (Some(node), _) => {
                return Err(ConvergeError::PathTypeMismatch {
                    at: path.prefix(i),
                    found: node.kind(),
                });
            }
        };
        match next {
            Some(v) => current = Some(v),
            None => return Ok(None),
        }
    }
    Ok(current)
}

/// Make the leaf at `path` hold `desired`.
///
/// The algorithm:
///
/// 1. Validate the full path read-only. Any structural failure aborts with
///    the document unmutated.
/// 2. Walk to the parent of the leaf, creating an empty dictionary for each
///    missing intermediate key segment (auto-vivification). Index segments
///    never auto-vivify: a missing array position fails
///    [`ConvergeError::InvalidIndex`] rather than padding.
/// 3. Compare the current leaf (if any) against `desired` with type-aware
///    equality: `Int(4)` and `Real(4.0)` differ even though the payloads
///    match numerically — the type tag is part of the contract.
/// 4. Equal: return `changed: false`, no mutation. Not equal (including an
///    absent leaf): set the leaf, return `changed: true` with the prior
///    value.
///
/// Persisting the result is the caller's decision; this function performs
/// no I/O. Repeating an identical call is guaranteed to report
/// `changed: false` and leave the tree identical.
pub fn converge(doc: &mut Document, path: &EntryPath, desired: Value) -> Result<Outcome> {
    check_writable(doc, path)?;

    let Some((last, intermediate)) = path.segments().split_last() else {
        return Err(ConvergeError::EmptyPath);
    };

    // Walk (and auto-vivify) down to the container that owns the leaf.
    // check_writable already proved every step below is structurally sound.
    let mut slot = Slot::Dict(&mut doc.root);
    for (i, seg) in intermediate.iter().enumerate() {
        slot = slot.descend(path, i, seg)?;
    }

    match (slot, last) {
        (Slot::Dict(map), Segment::Key(k)) => {
            let prior = map.get(k).cloned();
            if prior.as_ref() == Some(&desired) {
                Ok(Outcome::unchanged(prior))
            } else {
                map.insert(k.clone(), desired);
                Ok(Outcome::changed(prior))
            }
        }
        (Slot::Array(items), Segment::Index(ix)) => match items.get_mut(*ix) {
            Some(current) if *current == desired => Ok(Outcome::unchanged(Some(desired))),
            Some(current) => {
                let prior = std::mem::replace(current, desired);
                Ok(Outcome::changed(Some(prior)))
            }
            None => Err(invalid_index(path, path.len(), *ix, Kind::Array)),
        },
        (Slot::Dict(_), Segment::Index(ix)) => {
            Err(invalid_index(path, path.len(), *ix, Kind::Dict))
        }
        (Slot::Array(_), Segment::Key(_)) => Err(ConvergeError::PathTypeMismatch {
            at: path.prefix(path.len() - 1),
            found: Kind::Array,
        }),
    }
}

/// Remove the leaf at `path`, if present.
///
/// Removing an absent leaf (or a leaf below an absent intermediate) is
/// `changed: false` — delete is idempotent in the same sense converge is.
/// Structural mismatches error exactly as in [`lookup`]; nothing is ever
/// auto-vivified on the way to a delete.
pub fn delete(doc: &mut Document, path: &EntryPath) -> Result<Outcome> {
    // The read-only walk both validates the path and tells us whether
    // there is anything to remove.
    if lookup(doc, path)?.is_none() {
        return Ok(Outcome::unchanged(None));
    }

    let Some((last, intermediate)) = path.segments().split_last() else {
        return Err(ConvergeError::EmptyPath);
    };

    let mut slot = Slot::Dict(&mut doc.root);
    for (i, seg) in intermediate.iter().enumerate() {
        slot = slot.descend(path, i, seg)?;
    }

    match (slot, last) {
        (Slot::Dict(map), Segment::Key(k)) => Ok(Outcome::changed(map.remove(k))),
        (Slot::Array(items), Segment::Index(ix)) if *ix < items.len() => {
            Ok(Outcome::changed(Some(items.remove(*ix))))
        }
        // lookup() found the leaf, so these arms are unreachable in
        // practice; surface the structural errors they would be anyway.
        (Slot::Array(_), Segment::Index(ix)) => {
            Err(invalid_index(path, path.len(), *ix, Kind::Array))
        }
        (Slot::Dict(_), Segment::Index(ix)) => {
            Err(invalid_index(path, path.len(), *ix, Kind::Dict))
        }
        (Slot::Array(_), Segment::Key(_)) => Err(ConvergeError::PathTypeMismatch {
            at: path.prefix(path.len() - 1),
            found: Kind::Array,
        }),
    }
}

// ============================================================================
// Internals
// ============================================================================

/// A mutable position inside the tree: the container a segment addresses.
enum Slot<'a> {
    Dict(&'a mut BTreeMap<String, Value>),
    Array(&'a mut Vec<Value>),
}

impl<'a> Slot<'a> {
    /// Descend one intermediate segment, auto-vivifying a missing key as an
    /// empty dictionary. `i` is the segment's position, for error context.
    fn descend(self, path: &EntryPath, i: usize, seg: &Segment) -> Result<Slot<'a>> {
        match (self, seg) {
            (Slot::Dict(map), Segment::Key(k)) => {
                let node = map
                    .entry(k.clone())
                    .or_insert_with(|| Value::Dict(BTreeMap::new()));
                match node {
                    Value::Dict(m) => Ok(Slot::Dict(m)),
                    Value::Array(a) => Ok(Slot::Array(a)),
                    other => Err(ConvergeError::PathTypeMismatch {
                        at: path.prefix(i + 1),
                        found: other.kind(),
                    }),
                }
            }
            (Slot::Array(items), Segment::Index(ix)) => match items.get_mut(*ix) {
                Some(Value::Dict(m)) => Ok(Slot::Dict(m)),
                Some(Value::Array(a)) => Ok(Slot::Array(a)),
                Some(other) => Err(ConvergeError::PathTypeMismatch {
                    at: path.prefix(i + 1),
                    found: other.kind(),
                }),
                None => Err(invalid_index(path, i + 1, *ix, Kind::Array)),
            },
            (Slot::Dict(_), Segment::Index(ix)) => {
                Err(invalid_index(path, i + 1, *ix, Kind::Dict))
            }
            (Slot::Array(_), Segment::Key(_)) => Err(ConvergeError::PathTypeMismatch {
                at: path.prefix(i),
                found: Kind::Array,
            }),
        }
    }
}

/// Read-only feasibility check for a write at `path`.
///
/// Verifies that every existing node along the path is traversable, that
/// index segments land on existing array positions, and that everything
/// below the first missing intermediate is key segments only (the part that
/// auto-vivification is allowed to create). Runs before any mutation so a
/// failing converge leaves no half-built intermediates behind.
fn check_writable(doc: &Document, path: &EntryPath) -> Result<()> {
    let segs = path.segments();
    if segs.is_empty() {
        return Err(ConvergeError::EmptyPath);
    }

    let mut current: Option<&Value> = None;
    let mut vivifying = false;
    for (i, seg) in segs.iter().enumerate() {
        let last = i + 1 == segs.len();

        if vivifying {
            // Below a to-be-created dictionary only keys are addressable.
            match seg {
                Segment::Key(_) => continue,
                Segment::Index(ix) => return Err(invalid_index(path, i + 1, *ix, Kind::Dict)),
            }
        }

        let next = match (current, seg) {
            (None, Segment::Key(k)) => doc.root.get(k),
            (None, Segment::Index(ix)) => {
                return Err(invalid_index(path, i + 1, *ix, Kind::Dict));
            }
            (Some(Value::Dict(map)), Segment::Key(k)) => map.get(k),
            (Some(Value::Array(items)), Segment::Index(ix)) => match items.get(*ix) {
                Some(v) => Some(v),
                // Index positions must exist, last segment included — a
                // write never pads an array.
                None => return Err(invalid_index(path, i + 1, *ix, Kind::Array)),
            },
            (Some(Value::Dict(_)), Segment::Index(ix)) => {
                return Err(invalid_index(path, i + 1, *ix, Kind::Dict));
            }
            (Some(node), _) => {
                return Err(ConvergeError::PathTypeMismatch {
                    at: path.prefix(i),
                    found: node.kind(),
                });
            }
        };

        match next {
            Some(v) => current = Some(v),
            None if last => {} // absent leaf under an existing dict: plain insert
            None => vivifying = true,
        }
    }
    Ok(())
}

fn invalid_index(path: &EntryPath, upto: usize, index: usize, found: Kind) -> ConvergeError {
    ConvergeError::InvalidIndex {
        at: path.prefix(upto),
        index,
        found,
    }
}
