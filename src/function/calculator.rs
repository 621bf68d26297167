//! Type 4 (PostScript calculator) functions.
//!
//! A full PostScript calculator language interpreter is out of scope
//! (it belongs to the front-end that parses color operators out of a
//! content stream); this models the evaluated function as an opaque
//! closure supplied by that front-end, tagged with a caller-assigned
//! `id` so two `Calculator`s can still be told apart for fingerprinting
//! without reflecting into the closure.

use std::rc::Rc;

#[derive(Clone)]
pub struct Calculator {
    id: u64,
    eval: Rc<dyn Fn(&[f32]) -> Vec<f32>>,
}

impl Calculator {
    pub fn new(id: u64, eval: Rc<dyn Fn(&[f32]) -> Vec<f32>>) -> Self {
        Calculator { id, eval }
    }

    pub fn invoke(&self, input: &[f32]) -> Vec<f32> {
        (self.eval)(input)
    }

    pub(super) fn fingerprint_bytes(&self, bytes: &mut Vec<u8>) {
        bytes.extend_from_slice(&self.id.to_le_bytes());
    }
}

impl std::fmt::Debug for Calculator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Calculator").field("id", &self.id).finish()
    }
}
