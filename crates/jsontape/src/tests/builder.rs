use alloc::string::ToString;

use super::doc;
use crate::{TapeBuilder, TapeError, Type};

#[test]
fn scalar_documents_frame_with_root_words() {
    let tape = doc(|b| b.int(1));
    // Opening root, int tag, payload, trailing root.
    assert_eq!(tape.len(), 4);
    assert_eq!(tape.iter().peek().unwrap(), Some(Type::Root));
}

#[test]
fn finish_rejects_unclosed_scopes() {
    let mut b = TapeBuilder::new();
    b.begin_array();
    b.int(1);
    assert_eq!(
        b.finish().unwrap_err(),
        TapeError::Corrupt("unclosed array or object scope")
    );
}

#[test]
fn close_without_open_is_rejected() {
    let mut b = TapeBuilder::new();
    assert!(matches!(b.end_array(), Err(TapeError::Corrupt(_))));
    assert!(matches!(b.end_object(), Err(TapeError::Corrupt(_))));
}

#[test]
fn mismatched_close_is_rejected_and_recoverable() {
    let mut b = TapeBuilder::new();
    b.begin_array();
    assert!(matches!(b.end_object(), Err(TapeError::Corrupt(_))));
    // The open array is still there and can be closed properly.
    b.int(1);
    b.end_array().unwrap();
    let tape = b.finish().unwrap();
    assert_eq!(tape.iter().value().unwrap().to_string(), "[1]");
}

#[test]
fn default_builds_an_empty_document() {
    let tape = TapeBuilder::default().finish().unwrap();
    assert_eq!(tape.len(), 2);
    let mut it = tape.iter();
    let (_, sub) = it.next_iter().unwrap().unwrap();
    assert_eq!(sub.peek().unwrap(), None);
}

#[test]
fn is_empty_only_for_tapes_without_words() {
    let tape = doc(|b| b.null());
    assert!(!tape.is_empty());
    assert_eq!(tape.len(), 3);
}

#[test]
fn interleaved_scopes_nest_correctly() {
    let tape = doc(|b| {
        b.begin_array();
        b.begin_object();
        b.string("inner").unwrap();
        b.begin_array();
        b.uint(1);
        b.end_array().unwrap();
        b.end_object().unwrap();
        b.bool(false);
        b.end_array().unwrap();
    });
    assert_eq!(
        tape.iter().value().unwrap().to_string(),
        r#"[{"inner":[1]},false]"#
    );
}
