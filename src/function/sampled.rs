//! Type 0 (sampled) functions: an m-dimensional table of n-component
//! samples, looked up by multilinear interpolation.
//!
//! Decoding the raw sample stream out of a PDF content stream is a
//! front-end concern, so this keeps `size`/`encode`/`decode` but stores
//! samples pre-decoded to `f32` in `[0, 1]`.

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InterpolationOrder {
    Linear,
    Cubic,
}

impl Default for InterpolationOrder {
    fn default() -> Self {
        InterpolationOrder::Linear
    }
}

#[derive(Clone)]
pub struct SampledFunction {
    /// Domain, one `[lo, hi]` pair per input dimension; duplicated
    /// from the owning `Function` so `Encode` can map from it without
    /// the caller threading domain bounds through `invoke`.
    domain: Vec<f32>,
    size: Vec<u32>,
    n_outputs: usize,
    /// Order is recorded for fidelity with the source dictionary but
    /// cubic spline interpolation isn't implemented; every lookup uses
    /// linear interpolation, a conservative and still-correct
    /// approximation at table resolutions DCILUT actually runs at.
    order: InterpolationOrder,
    encode: Vec<f32>,
    decode: Vec<f32>,
    /// Row-major samples, first input dimension fastest, `n_outputs`
    /// components per grid point, each a normalized `[0, 1]` value.
    samples: Vec<f32>,
}

impl SampledFunction {
    pub fn new(
        domain: Vec<f32>,
        size: Vec<u32>,
        n_outputs: usize,
        order: InterpolationOrder,
        encode: Vec<f32>,
        decode: Vec<f32>,
        samples: Vec<f32>,
    ) -> Self {
        assert_eq!(domain.len(), 2 * size.len(), "domain must have 2 entries per input dimension");
        assert_eq!(
            samples.len(),
            size.iter().product::<u32>() as usize * n_outputs,
            "sample table size does not match Size * n_outputs"
        );
        SampledFunction { domain, size, n_outputs, order, encode, decode, samples }
    }

    pub fn invoke(&self, input: &[f32]) -> Vec<f32> {
        let m = self.size.len();
        debug_assert_eq!(input.len(), m);

        // Map each input into continuous sample-table coordinates via
        // Encode, then split into an integer corner and a fractional
        // weight for multilinear interpolation.
        let mut lo = vec![0usize; m];
        let mut frac = vec![0f32; m];
        for i in 0..m {
            let d0 = self.domain[2 * i];
            let d1 = self.domain[2 * i + 1];
            let e0 = self.encode[2 * i];
            let e1 = self.encode[2 * i + 1];
            let max_index = (self.size[i] as f32 - 1.0).max(0.0);
            let t = if d1 != d0 { (input[i] - d0) / (d1 - d0) } else { 0.0 };
            let c = (e0 + t * (e1 - e0)).clamp(0.0, max_index);
            lo[i] = c.floor() as usize;
            if lo[i] >= self.size[i] as usize && self.size[i] > 0 {
                lo[i] = self.size[i] as usize - 1;
            }
            frac[i] = c - lo[i] as f32;
        }

        let mut out = vec![0f32; self.n_outputs];
        let corners = 1usize << m;
        for corner in 0..corners {
            let mut weight = 1.0f32;
            let mut index = vec![0usize; m];
            for i in 0..m {
                let take_hi = (corner >> i) & 1 == 1;
                if take_hi {
                    weight *= frac[i];
                    index[i] = (lo[i] + 1).min(self.size[i].saturating_sub(1) as usize);
                } else {
                    weight *= 1.0 - frac[i];
                    index[i] = lo[i];
                }
            }
            if weight == 0.0 {
                continue;
            }
            let flat = self.flatten(&index);
            for j in 0..self.n_outputs {
                out[j] += weight * self.samples[flat * self.n_outputs + j];
            }
        }

        for (j, y) in out.iter_mut().enumerate() {
            let d0 = self.decode[2 * j];
            let d1 = self.decode[2 * j + 1];
            *y = d0 + *y * (d1 - d0);
        }
        out
    }

    fn flatten(&self, index: &[usize]) -> usize {
        let mut flat = 0;
        let mut stride = 1;
        for i in 0..index.len() {
            flat += index[i] * stride;
            stride *= self.size[i] as usize;
        }
        flat
    }

    pub(super) fn fingerprint_bytes(&self, bytes: &mut Vec<u8>) {
        for &s in &self.size {
            bytes.extend_from_slice(&s.to_le_bytes());
        }
        bytes.push(match self.order {
            InterpolationOrder::Linear => 1,
            InterpolationOrder::Cubic => 3,
        });
        for &v in self.domain.iter().chain(self.encode.iter()).chain(self.decode.iter()) {
            bytes.extend_from_slice(&v.to_bits().to_le_bytes());
        }
        for &v in &self.samples {
            bytes.extend_from_slice(&v.to_bits().to_le_bytes());
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn one_dimensional_linear_interpolation_hits_grid_points() {
        let f = SampledFunction::new(
            vec![0.0, 1.0],
            vec![3],
            1,
            InterpolationOrder::Linear,
            vec![0.0, 2.0],
            vec![0.0, 1.0],
            vec![0.0, 0.5, 1.0],
        );
        assert_eq!(f.invoke(&[0.0]), vec![0.0]);
        assert_eq!(f.invoke(&[1.0]), vec![1.0]);
    }

    #[test]
    fn interpolates_between_grid_points() {
        let f = SampledFunction::new(
            vec![0.0, 1.0],
            vec![2],
            1,
            InterpolationOrder::Linear,
            vec![0.0, 1.0],
            vec![0.0, 1.0],
            vec![0.0, 1.0],
        );
        let y = f.invoke(&[0.5])[0];
        assert!((y - 0.5).abs() < 1e-6);
    }

    #[test]
    fn two_dimensional_corners_are_exact() {
        // 2x2 grid, outputs = sum of the two encoded coordinates.
        let f = SampledFunction::new(
            vec![0.0, 1.0, 0.0, 1.0],
            vec![2, 2],
            1,
            InterpolationOrder::Linear,
            vec![0.0, 1.0, 0.0, 1.0],
            vec![0.0, 2.0],
            vec![0.0, 0.5, 0.5, 1.0],
        );
        assert!((f.invoke(&[0.0, 0.0])[0] - 0.0).abs() < 1e-6);
        assert!((f.invoke(&[1.0, 1.0])[0] - 2.0).abs() < 1e-6);
    }
}
