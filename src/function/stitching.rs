//! Type 3 (stitching) functions: k 1-input subfunctions, each owning a
//! subinterval of the outer domain.

use super::Function;

#[derive(Clone)]
pub struct StitchingFunction {
    domain: [f32; 2],
    functions: Vec<Function>,
    bounds: Vec<f32>,
    encode: Vec<f32>,
}

impl StitchingFunction {
    pub fn new(domain: [f32; 2], functions: Vec<Function>, bounds: Vec<f32>, encode: Vec<f32>) -> Self {
        assert_eq!(bounds.len(), functions.len().saturating_sub(1));
        assert_eq!(encode.len(), 2 * functions.len());
        StitchingFunction { domain, functions, bounds, encode }
    }

    pub fn invoke(&self, x: f32) -> Vec<f32> {
        let k = self.subfunction_index(x);
        let (lo, hi) = self.subdomain(k);
        let e0 = self.encode[2 * k];
        let e1 = self.encode[2 * k + 1];
        let t = if hi != lo { (x - lo) / (hi - lo) } else { 0.0 };
        let encoded = e0 + t * (e1 - e0);
        self.functions[k].invoke(&[encoded])
    }

    fn subfunction_index(&self, x: f32) -> usize {
        for (i, &bound) in self.bounds.iter().enumerate() {
            if x < bound {
                return i;
            }
        }
        self.functions.len() - 1
    }

    fn subdomain(&self, k: usize) -> (f32, f32) {
        let lo = if k == 0 { self.domain[0] } else { self.bounds[k - 1] };
        let hi = if k == self.bounds.len() { self.domain[1] } else { self.bounds[k] };
        (lo, hi)
    }

    pub(super) fn fingerprint_bytes(&self, bytes: &mut Vec<u8>) {
        for &v in self.domain.iter().chain(self.bounds.iter()).chain(self.encode.iter()) {
            bytes.extend_from_slice(&v.to_bits().to_le_bytes());
        }
        bytes.extend_from_slice(&(self.functions.len() as u32).to_le_bytes());
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::function::ExponentialFunction;

    #[test]
    fn picks_the_subfunction_owning_the_point() {
        let low = Function::exponential(vec![0.0, 1.0], None, ExponentialFunction::new(vec![0.0], vec![0.5], 1.0));
        let high = Function::exponential(vec![0.0, 1.0], None, ExponentialFunction::new(vec![0.5], vec![1.0], 1.0));
        let stitched = StitchingFunction::new([0.0, 1.0], vec![low, high], vec![0.5], vec![0.0, 1.0, 0.0, 1.0]);

        assert!((stitched.invoke(0.25)[0] - 0.25).abs() < 1e-6);
        assert!((stitched.invoke(0.75)[0] - 0.75).abs() < 1e-6);
    }
}
