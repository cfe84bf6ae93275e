use alloc::{string::String, vec::Vec};

use quickcheck::TestResult;
use quickcheck_macros::quickcheck;

use super::{doc, root_array};
use crate::Tape;

fn int_tape(vals: &[i64]) -> Tape {
    doc(|b| {
        b.begin_array();
        for &v in vals {
            b.int(v);
        }
        b.end_array().unwrap();
    })
}

#[quickcheck]
fn ints_survive_bulk_extraction(vals: Vec<i64>) -> bool {
    root_array(&int_tape(&vals)).as_ints().unwrap() == vals
}

#[quickcheck]
fn ints_widen_to_floats_like_a_cast(vals: Vec<i64>) -> bool {
    let floats = root_array(&int_tape(&vals)).as_floats().unwrap();
    floats.len() == vals.len() && floats.iter().zip(&vals).all(|(f, &v)| *f == v as f64)
}

#[quickcheck]
fn floats_survive_bulk_extraction(vals: Vec<f64>) -> bool {
    let tape = doc(|b| {
        b.begin_array();
        for &v in &vals {
            b.float(v);
        }
        b.end_array().unwrap();
    });
    let out = root_array(&tape).as_floats().unwrap();
    // Bit-level comparison keeps NaN inputs honest.
    out.len() == vals.len() && out.iter().zip(&vals).all(|(a, b)| a.to_bits() == b.to_bits())
}

#[quickcheck]
fn strings_survive_bulk_extraction(vals: Vec<String>) -> bool {
    let tape = doc(|b| {
        b.begin_array();
        for v in &vals {
            b.string(v).unwrap();
        }
        b.end_array().unwrap();
    });
    root_array(&tape).as_strings().unwrap() == vals
}

#[quickcheck]
fn serialized_ints_parse_back(vals: Vec<i64>) -> bool {
    let bytes = root_array(&int_tape(&vals)).to_json().unwrap();
    let parsed: Vec<i64> = serde_json::from_slice(&bytes).unwrap();
    parsed == vals
}

#[quickcheck]
fn serialized_finite_floats_parse_back(vals: Vec<f64>) -> TestResult {
    if vals.iter().any(|v| !v.is_finite()) {
        return TestResult::discard();
    }
    let tape = doc(|b| {
        b.begin_array();
        for &v in &vals {
            b.float(v);
        }
        b.end_array().unwrap();
    });
    let bytes = root_array(&tape).to_json().unwrap();
    let parsed: Vec<f64> = serde_json::from_slice(&bytes).unwrap();
    TestResult::from_bool(parsed == vals)
}

#[quickcheck]
fn serialized_strings_parse_back(vals: Vec<String>) -> bool {
    let tape = doc(|b| {
        b.begin_array();
        for v in &vals {
            b.string(v).unwrap();
        }
        b.end_array().unwrap();
    });
    let bytes = root_array(&tape).to_json().unwrap();
    let parsed: Vec<String> = serde_json::from_slice(&bytes).unwrap();
    parsed == vals
}

#[quickcheck]
fn draining_two_cursors_yields_identical_sequences(vals: Vec<i64>) -> bool {
    let tape = int_tape(&vals);
    let a = root_array(&tape);
    let drain = |mut i: crate::Iter<'_>| {
        let mut out = Vec::new();
        while let Some((_, elem)) = i.next_iter().unwrap() {
            out.push(elem.as_i64().unwrap());
        }
        out
    };
    drain(a.iter()) == drain(a.iter())
}
