mod builder;
mod properties;

use crate::{Array, Tape, TapeBuilder};

/// Build a document tape, panicking on builder misuse.
fn doc(build: impl FnOnce(&mut TapeBuilder)) -> Tape {
    let mut b = TapeBuilder::new();
    build(&mut b);
    b.finish().expect("well-formed test tape")
}

/// Bind the accessor for a document whose root element is an array.
fn root_array(tape: &Tape) -> Array<'_> {
    let mut it = tape.iter();
    let (_, sub) = it
        .next_iter()
        .expect("readable root")
        .expect("non-empty document");
    sub.array().expect("root element is an array")
}
