//! General-purpose color/tint transform functions (PDF function types
//! 0, 2, 3, 4), and the single-channel sub-links (transfer and
//! calibration) that the device-code chain composes per output
//! channel.
//!
//! Parsing a function out of a PDF object belongs to the front-end
//! interpreter and is out of scope here; what this module provides is
//! the evaluator: `Function::invoke` and the `SubLink` wrapper around
//! it that the device-code link calls on every pixel.

mod calculator;
mod exponential;
mod sampled;
mod stitching;

use std::rc::Rc;

pub use calculator::Calculator;
pub use exponential::ExponentialFunction;
pub use sampled::{InterpolationOrder, SampledFunction};
pub use stitching::StitchingFunction;

/// A PDF function: `m` inputs, `n` outputs, clipped to `domain`/`range`
/// before and after evaluation respectively.
#[derive(Clone)]
pub struct Function {
    domain: Vec<f32>,
    range: Option<Vec<f32>>,
    kind: FunctionKind,
}

#[derive(Clone)]
enum FunctionKind {
    Sampled(SampledFunction),
    Exponential(ExponentialFunction),
    Stitching(StitchingFunction),
    Calculator(Calculator),
}

impl std::fmt::Debug for Function {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Function")
            .field("domain", &self.domain)
            .field("range", &self.range)
            .field("kind", &self.kind_name())
            .finish()
    }
}

impl Function {
    pub fn sampled(domain: Vec<f32>, range: Option<Vec<f32>>, sampled: SampledFunction) -> Self {
        Function { domain, range, kind: FunctionKind::Sampled(sampled) }
    }

    pub fn exponential(
        domain: Vec<f32>,
        range: Option<Vec<f32>>,
        exponential: ExponentialFunction,
    ) -> Self {
        Function { domain, range, kind: FunctionKind::Exponential(exponential) }
    }

    pub fn stitching(domain: Vec<f32>, range: Option<Vec<f32>>, stitching: StitchingFunction) -> Self {
        Function { domain, range, kind: FunctionKind::Stitching(stitching) }
    }

    pub fn calculator(domain: Vec<f32>, range: Option<Vec<f32>>, calculator: Calculator) -> Self {
        Function { domain, range, kind: FunctionKind::Calculator(calculator) }
    }

    fn kind_name(&self) -> &'static str {
        match self.kind {
            FunctionKind::Sampled(_) => "Sampled",
            FunctionKind::Exponential(_) => "Exponential",
            FunctionKind::Stitching(_) => "Stitching",
            FunctionKind::Calculator(_) => "Calculator",
        }
    }

    /// Evaluate at `input`, clipping each input to its `Domain` pair
    /// and (if present) each output to its `Range` pair, per the
    /// function dictionary's clipping rule.
    pub fn invoke(&self, input: &[f32]) -> Vec<f32> {
        let clipped: Vec<f32> = input
            .iter()
            .enumerate()
            .map(|(i, &x)| clip_pair(x, &self.domain, i))
            .collect();

        let mut out = match &self.kind {
            FunctionKind::Sampled(s) => s.invoke(&clipped),
            FunctionKind::Exponential(e) => e.invoke(clipped[0]),
            FunctionKind::Stitching(s) => s.invoke(clipped[0]),
            FunctionKind::Calculator(c) => c.invoke(&clipped),
        };

        if let Some(range) = &self.range {
            for (j, y) in out.iter_mut().enumerate() {
                *y = clip_pair(*y, range, j);
            }
        }

        out
    }

    /// A deterministic fingerprint for this function's structure,
    /// split into `n` words. Used to key the transfer/calibration
    /// sub-link slots in a device-code chain's fingerprint without
    /// having to compare full function trees on every cache lookup.
    fn fingerprint(&self, n: usize) -> Vec<u32> {
        let mut bytes = Vec::new();
        for d in &self.domain {
            bytes.extend_from_slice(&d.to_bits().to_le_bytes());
        }
        if let Some(range) = &self.range {
            for r in range {
                bytes.extend_from_slice(&r.to_bits().to_le_bytes());
            }
        }
        bytes.push(match &self.kind {
            FunctionKind::Sampled(_) => 0,
            FunctionKind::Exponential(_) => 2,
            FunctionKind::Stitching(_) => 3,
            FunctionKind::Calculator(_) => 4,
        });
        match &self.kind {
            FunctionKind::Sampled(s) => s.fingerprint_bytes(&mut bytes),
            FunctionKind::Exponential(e) => e.fingerprint_bytes(&mut bytes),
            FunctionKind::Stitching(s) => s.fingerprint_bytes(&mut bytes),
            FunctionKind::Calculator(c) => c.fingerprint_bytes(&mut bytes),
        }
        stable_fingerprint(&bytes, n)
    }
}

fn clip_pair(x: f32, bounds: &[f32], i: usize) -> f32 {
    match (bounds.get(2 * i), bounds.get(2 * i + 1)) {
        (Some(&lo), Some(&hi)) => x.clamp(lo.min(hi), lo.max(hi)),
        _ => x,
    }
}

/// FNV-1a over `bytes`, reseeded per output word so the `n` words are
/// independent without pulling in a hashing crate for a handful of
/// bytes.
fn stable_fingerprint(bytes: &[u8], n: usize) -> Vec<u32> {
    (0..n)
        .map(|word| {
            let mut hash: u32 = 0x811c_9dc5 ^ (word as u32).wrapping_mul(0x9e37_79b9);
            for &b in bytes {
                hash ^= b as u32;
                hash = hash.wrapping_mul(0x0100_0193);
            }
            hash
        })
        .collect()
}

/// A single-channel transform plugged into one output channel of a
/// device-code chain: the identity, a fixed invert (dummy transfer),
/// or a wrapped [`Function`] acting as a transfer or calibration
/// function. Composing a channel's transfer sub-link with its
/// calibration sub-link (transfer applied first, calibration applied
/// to the transfer's output) reproduces the source's
/// `dci_invokexfercal`.
#[derive(Debug, Clone)]
pub enum SubLink {
    Identity,
    /// A transfer function absent for this channel; `invert` models a
    /// negative-job dummy transfer (`y = 1 - x`) versus a true no-op.
    DummyTransfer { invert: bool },
    Transfer(Rc<Function>),
    Calibration(Rc<Function>),
}

impl SubLink {
    pub fn invoke(&self, x: f32) -> f32 {
        match self {
            SubLink::Identity => x,
            SubLink::DummyTransfer { invert: false } => x,
            SubLink::DummyTransfer { invert: true } => 1.0 - x,
            SubLink::Transfer(f) | SubLink::Calibration(f) => {
                f.invoke(std::slice::from_ref(&x))[0]
            }
        }
    }

    /// Fingerprint slots for this sub-link when used as a transfer
    /// link: fixed at 3 words regardless of the wrapped function's
    /// complexity, per the device-code chain's fingerprint layout.
    pub fn transfer_fingerprint(&self) -> [u32; 3] {
        match self {
            SubLink::Transfer(f) => {
                let v = f.fingerprint(3);
                [v[0], v[1], v[2]]
            }
            // An all-ones fingerprint for the dummy/identity case keeps
            // it distinguishable from any real, all-zero-domain function.
            _ => [u32::MAX; 3],
        }
    }

    /// Fingerprint slots for this sub-link when used as a calibration
    /// link: fixed at 2 words.
    pub fn calibration_fingerprint(&self) -> [u32; 2] {
        match self {
            SubLink::Calibration(f) => {
                let v = f.fingerprint(2);
                [v[0], v[1]]
            }
            _ => [u32::MAX; 2],
        }
    }
}

/// Evaluate a channel's composed transfer-then-calibration transform.
/// Mirrors `dci_invokexfercal`'s order: the transfer sub-link runs on
/// the raw device value first, and the calibration sub-link runs on
/// its output.
pub fn invoke_transfer_calibration(transfer: &SubLink, calibration: &SubLink, x: f32) -> f32 {
    calibration.invoke(transfer.invoke(x))
}
