//! Photoink interpolation: a one-to-many mapping from a nominal
//! colorant to a set of physical inks (e.g. Cyan → LightCyan + Cyan),
//! per the GLOSSARY's "Photoink" entry and §4.2's "Photoink
//! interpolation" sub-link variant.

/// One breakpoint of a photoink transform: at input `position`, the
/// nominal channel's ink should be split across `weights`, one per
/// mapped output colorant, in output-colorant order.
#[derive(Debug, Clone)]
pub struct PhotoinkBreakpoint {
    pub position: f32,
    pub weights: Vec<f32>,
}

/// A piecewise-linear map from one nominal channel to `n_mapped`
/// physical colorants. Breakpoints must be sorted ascending by
/// `position` and all span the same `n_mapped` length.
#[derive(Debug, Clone)]
pub struct PhotoinkTransform {
    breakpoints: Vec<PhotoinkBreakpoint>,
    n_mapped: usize,
}

impl PhotoinkTransform {
    pub fn new(breakpoints: Vec<PhotoinkBreakpoint>) -> Self {
        assert!(breakpoints.len() >= 2, "a photoink transform needs at least two breakpoints");
        let n_mapped = breakpoints[0].weights.len();
        assert!(breakpoints.iter().all(|b| b.weights.len() == n_mapped));
        assert!(
            breakpoints.windows(2).all(|w| w[0].position <= w[1].position),
            "photoink breakpoints must be sorted ascending"
        );
        PhotoinkTransform { breakpoints, n_mapped }
    }

    pub fn n_mapped_colorants(&self) -> usize {
        self.n_mapped
    }

    /// Linearly interpolates the weight vector at `x`, clamping to the
    /// first/last breakpoint outside `[position_0, position_last]`.
    /// Mirrors `guc_interpolatePhotoinkTransform`.
    pub fn invoke(&self, x: f32) -> Vec<f32> {
        let last = self.breakpoints.len() - 1;
        if x <= self.breakpoints[0].position {
            return self.breakpoints[0].weights.clone();
        }
        if x >= self.breakpoints[last].position {
            return self.breakpoints[last].weights.clone();
        }
        for w in self.breakpoints.windows(2) {
            let (a, b) = (&w[0], &w[1]);
            if x >= a.position && x <= b.position {
                let t = if b.position != a.position { (x - a.position) / (b.position - a.position) } else { 0.0 };
                return a.weights.iter().zip(&b.weights).map(|(&wa, &wb)| wa + t * (wb - wa)).collect();
            }
        }
        unreachable!("breakpoints are sorted and x was bracketed above")
    }
}
