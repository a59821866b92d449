//! Option-returning accessors over lopdf objects.
//!
//! lopdf's own accessors return `Result`; most lookups here treat a missing
//! or mistyped entry as absent, so these read better in `Option` chains.

use super::{Dictionary, Object, ObjectId};

/// Numeric value of an integer or real object.
pub fn number(obj: &Object) -> Option<f32> {
    match obj {
        Object::Integer(i) => Some(*i as f32),
        Object::Real(r) => Some(*r),
        _ => None,
    }
}

pub fn integer(obj: &Object) -> Option<i64> {
    obj.as_i64().ok()
}

pub fn name(obj: &Object) -> Option<&[u8]> {
    obj.as_name().ok()
}

pub fn string_bytes(obj: &Object) -> Option<&[u8]> {
    match obj {
        Object::String(bytes, _) => Some(bytes),
        _ => None,
    }
}

pub fn reference(obj: &Object) -> Option<ObjectId> {
    obj.as_reference().ok()
}

pub fn array(obj: &Object) -> Option<&Vec<Object>> {
    obj.as_array().ok()
}

/// A dictionary object, or the dictionary of a stream.
pub fn dict_of(obj: &Object) -> Option<&Dictionary> {
    match obj {
        Object::Dictionary(dict) => Some(dict),
        Object::Stream(stream) => Some(&stream.dict),
        _ => None,
    }
}

pub fn dict_of_mut(obj: &mut Object) -> Option<&mut Dictionary> {
    match obj {
        Object::Dictionary(dict) => Some(dict),
        Object::Stream(stream) => Some(&mut stream.dict),
        _ => None,
    }
}

/// Entry `key` of `dict`, if present.
pub fn entry<'a>(dict: &'a Dictionary, key: &[u8]) -> Option<&'a Object> {
    dict.get(key).ok()
}

/// Whether `/Type` equals `type_name`.
pub fn has_type(dict: &Dictionary, type_name: &[u8]) -> bool {
    entry(dict, b"Type").and_then(name) == Some(type_name)
}

/// A name object from a string.
pub fn name_object(value: &str) -> Object {
    Object::Name(value.as_bytes().to_vec())
}
