//! Filter evaluation, projection and `$set` for the in-memory store.
//! Follows MongoDB semantics for the operators it supports and rejects the rest.

use std::cmp::Ordering;

use bson::{Bson, Document};

use crate::database::manager::DatabaseError;

pub fn matches(doc: &Document, filter: &Document) -> Result<bool, DatabaseError> {
    for (key, cond) in filter {
        let ok = match key.as_str() {
            "$and" => {
                let mut all = true;
                for clause in clauses(key, cond)? {
                    if !matches(doc, clause)? {
                        all = false;
                        break;
                    }
                }
                all
            }
            "$or" => {
                let mut any = false;
                for clause in clauses(key, cond)? {
                    if matches(doc, clause)? {
                        any = true;
                        break;
                    }
                }
                any
            }
            "$nor" => {
                let mut none = true;
                for clause in clauses(key, cond)? {
                    if matches(doc, clause)? {
                        none = false;
                        break;
                    }
                }
                none
            }
            op if op.starts_with('$') => {
                return Err(DatabaseError::QueryError(format!("unknown top level operator: {}", op)));
            }
            path => field_matches(lookup(doc, path), cond)?,
        };
        if !ok {
            return Ok(false);
        }
    }
    Ok(true)
}

fn clauses<'a>(op: &str, cond: &'a Bson) -> Result<Vec<&'a Document>, DatabaseError> {
    let invalid = || DatabaseError::QueryError(format!("{} argument must be a non-empty array of objects", op));
    match cond {
        Bson::Array(items) if !items.is_empty() => items
            .iter()
            .map(|item| match item {
                Bson::Document(d) => Ok(d),
                _ => Err(invalid()),
            })
            .collect(),
        _ => Err(invalid()),
    }
}

/// Resolve a dotted path such as `address.city`
pub fn lookup<'a>(doc: &'a Document, path: &str) -> Option<&'a Bson> {
    let mut parts = path.split('.');
    let mut current = doc.get(parts.next()?)?;
    for part in parts {
        current = match current {
            Bson::Document(d) => d.get(part)?,
            _ => return None,
        };
    }
    Some(current)
}

fn field_matches(value: Option<&Bson>, cond: &Bson) -> Result<bool, DatabaseError> {
    match cond {
        Bson::Document(ops) if is_operator_document(ops) => {
            for (op, arg) in ops {
                if !apply_operator(value, op, arg)? {
                    return Ok(false);
                }
            }
            Ok(true)
        }
        _ => Ok(equals(value, cond)),
    }
}

fn is_operator_document(doc: &Document) -> bool {
    doc.keys().next().map_or(false, |k| k.starts_with('$'))
}

fn apply_operator(value: Option<&Bson>, op: &str, arg: &Bson) -> Result<bool, DatabaseError> {
    let result = match op {
        "$eq" => equals(value, arg),
        "$ne" => !equals(value, arg),
        "$gt" => compare_any(value, arg, |o| o == Ordering::Greater),
        "$gte" => compare_any(value, arg, |o| o != Ordering::Less),
        "$lt" => compare_any(value, arg, |o| o == Ordering::Less),
        "$lte" => compare_any(value, arg, |o| o != Ordering::Greater),
        "$in" => in_list(value, op, arg)?,
        "$nin" => !in_list(value, op, arg)?,
        "$exists" => truthy(arg) == value.is_some(),
        other => return Err(DatabaseError::QueryError(format!("unknown operator: {}", other))),
    };
    Ok(result)
}

fn in_list(value: Option<&Bson>, op: &str, arg: &Bson) -> Result<bool, DatabaseError> {
    match arg {
        Bson::Array(items) => Ok(items.iter().any(|item| equals(value, item))),
        _ => Err(DatabaseError::QueryError(format!("{} needs an array", op))),
    }
}

/// Equality with MongoDB's array rule: a scalar matches an array containing it.
/// A missing field equals null.
fn equals(value: Option<&Bson>, expected: &Bson) -> bool {
    match value {
        None => matches!(expected, Bson::Null),
        Some(Bson::Array(items)) if !matches!(expected, Bson::Array(_)) => {
            items.iter().any(|item| values_equal(item, expected))
        }
        Some(v) => values_equal(v, expected),
    }
}

fn compare_any(value: Option<&Bson>, arg: &Bson, pred: impl Fn(Ordering) -> bool) -> bool {
    match value {
        Some(Bson::Array(items)) => items.iter().any(|item| compare(item, arg).map_or(false, &pred)),
        Some(v) => compare(v, arg).map_or(false, pred),
        None => false,
    }
}

fn values_equal(a: &Bson, b: &Bson) -> bool {
    match compare(a, b) {
        Some(ordering) => ordering == Ordering::Equal,
        None => a == b,
    }
}

/// Ordering between values of comparable types; None across type brackets
fn compare(a: &Bson, b: &Bson) -> Option<Ordering> {
    match (a, b) {
        (Bson::String(x), Bson::String(y)) => Some(x.cmp(y)),
        (Bson::Boolean(x), Bson::Boolean(y)) => Some(x.cmp(y)),
        (Bson::ObjectId(x), Bson::ObjectId(y)) => Some(x.bytes().cmp(&y.bytes())),
        (Bson::DateTime(x), Bson::DateTime(y)) => Some(x.timestamp_millis().cmp(&y.timestamp_millis())),
        (Bson::Null, Bson::Null) => Some(Ordering::Equal),
        _ => match (as_f64(a), as_f64(b)) {
            (Some(x), Some(y)) => x.partial_cmp(&y),
            _ => None,
        },
    }
}

fn as_f64(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(n) => Some(*n as f64),
        Bson::Int64(n) => Some(*n as f64),
        Bson::Double(n) => Some(*n),
        _ => None,
    }
}

fn truthy(value: &Bson) -> bool {
    match value {
        Bson::Boolean(b) => *b,
        Bson::Null => false,
        other => as_f64(other).map_or(true, |n| n != 0.0),
    }
}

/// Apply an inclusion or exclusion projection. Mixing the two (other than
/// `_id`) is an error, as in MongoDB.
pub fn project(doc: &Document, projection: &Document) -> Result<Document, DatabaseError> {
    if projection.is_empty() {
        return Ok(doc.clone());
    }

    let mut include_id = true;
    let mut id_only = false;
    let mut includes: Vec<&str> = Vec::new();
    let mut excludes: Vec<&str> = Vec::new();
    for (field, flag) in projection {
        if field == "_id" {
            include_id = truthy(flag);
            id_only = include_id;
        } else if truthy(flag) {
            includes.push(field.as_str());
        } else {
            excludes.push(field.as_str());
        }
    }

    if let (Some(_), Some(excluded)) = (includes.first(), excludes.first()) {
        return Err(DatabaseError::QueryError(format!(
            "Cannot do exclusion on field {} in inclusion projection",
            excluded
        )));
    }

    if includes.is_empty() && excludes.is_empty() && id_only {
        return Ok(include_paths(doc, &["_id"]));
    }

    if includes.is_empty() {
        let mut out = doc.clone();
        for path in excludes {
            remove_path(&mut out, path);
        }
        if !include_id {
            out.remove("_id");
        }
        return Ok(out);
    }

    if include_id {
        includes.push("_id");
    }
    Ok(include_paths(doc, &includes))
}

fn include_paths(doc: &Document, paths: &[&str]) -> Document {
    let mut out = Document::new();
    for (key, value) in doc {
        if paths.iter().any(|p| *p == key.as_str()) {
            out.insert(key.clone(), value.clone());
            continue;
        }
        let prefix = format!("{}.", key);
        let nested: Vec<&str> = paths.iter().filter_map(|p| p.strip_prefix(prefix.as_str())).collect();
        if nested.is_empty() {
            continue;
        }
        if let Bson::Document(sub) = value {
            out.insert(key.clone(), include_paths(sub, &nested));
        }
    }
    out
}

fn remove_path(doc: &mut Document, path: &str) {
    match path.split_once('.') {
        None => {
            doc.remove(path);
        }
        Some((head, rest)) => {
            if let Some(Bson::Document(sub)) = doc.get_mut(head) {
                remove_path(sub, rest);
            }
        }
    }
}

/// `$set` merge; returns whether anything changed
pub fn apply_set(doc: &mut Document, set: &Document) -> Result<bool, DatabaseError> {
    if let Some(id) = set.get("_id") {
        if doc.get("_id") != Some(id) {
            return Err(DatabaseError::QueryError(
                "Performing an update on the path '_id' would modify the immutable field '_id'".to_string(),
            ));
        }
    }

    let mut changed = false;
    for (path, value) in set {
        changed |= set_path(doc, path, value.clone())?;
    }
    Ok(changed)
}

fn set_path(doc: &mut Document, path: &str, value: Bson) -> Result<bool, DatabaseError> {
    match path.split_once('.') {
        None => {
            let changed = doc.get(path) != Some(&value);
            doc.insert(path, value);
            Ok(changed)
        }
        Some((head, rest)) => {
            if doc.get(head).is_none() {
                doc.insert(head, Document::new());
            }
            match doc.get_mut(head) {
                Some(Bson::Document(sub)) => set_path(sub, rest, value),
                _ => Err(DatabaseError::QueryError(format!(
                    "Cannot create field '{}' in non-document element '{}'",
                    rest, head
                ))),
            }
        }
    }
}
