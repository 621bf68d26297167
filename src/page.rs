//! Per-page color state: the page-owned DCILUT pool and the
//! pseudo-to-real colorant map recombine installs, plus the dirty
//! flags that replace the source's process-wide globals (§9 Design
//! Notes: "Global mutable state").

use std::collections::HashMap;

use crate::colorant::ColorantIndex;
use crate::dcilut::DcilutPool;
use crate::preseparation::PseudoColorantIndex;

/// Carried through invocation arguments instead of the source's
/// `new_color_detected`/`new_screen_detected` process-wide flags.
#[derive(Debug, Clone, Copy, Default)]
pub struct DirtyFlags {
    pub new_color_detected: bool,
    pub new_screen_detected: bool,
}

pub struct PageColorState {
    pub dcilut_pool: DcilutPool,
    pseudo_to_real: HashMap<PseudoColorantIndex, ColorantIndex>,
    pub dirty: DirtyFlags,
}

impl PageColorState {
    pub fn new() -> Self {
        PageColorState { dcilut_pool: DcilutPool::new(), pseudo_to_real: HashMap::new(), dirty: DirtyFlags::default() }
    }

    /// Installs the pseudo-to-real colorant map, built once at
    /// recombine start and read-only thereafter (§5 "Shared
    /// resources").
    pub fn install_pseudo_map(&mut self, map: HashMap<PseudoColorantIndex, ColorantIndex>) {
        self.pseudo_to_real = map;
    }

    pub fn resolve_pseudo(&self, pseudo: PseudoColorantIndex) -> Option<ColorantIndex> {
        self.pseudo_to_real.get(&pseudo).copied()
    }
}

impl Default for PageColorState {
    fn default() -> Self {
        PageColorState::new()
    }
}
