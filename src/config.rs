//! System parameters table (§6 "System parameters that affect
//! behavior"), threaded explicitly into the components that consult
//! it rather than read from implicit global state.

use crate::colorant::DuplicatePolicy;

#[derive(Debug, Clone, Copy)]
pub struct Config {
    pub overprint: bool,
    pub overprint_black: bool,
    pub overprint_gray: bool,
    pub overprint_gray_images: bool,
    pub overprint_white: bool,
    pub ignore_overprint_mode: bool,
    pub overprint_icc_based: bool,
    pub table_based_color: bool,
    pub immediate_repro: bool,
    pub contone_mask: Option<u16>,
    pub force_positive: bool,
    pub duplicate_colorants: DuplicatePolicy,
    /// Tolerance for C6's avoid-max-blit optimization. §9 Open
    /// Questions: undocumented in the source beyond "happens to be
    /// good enough"; exposed as a knob rather than a hardcoded
    /// `1/4096`.
    pub avoid_max_blit_tolerance: f32,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            overprint: true,
            overprint_black: false,
            overprint_gray: false,
            overprint_gray_images: false,
            overprint_white: false,
            ignore_overprint_mode: false,
            overprint_icc_based: false,
            table_based_color: true,
            immediate_repro: false,
            contone_mask: None,
            force_positive: false,
            duplicate_colorants: DuplicatePolicy::Last,
            avoid_max_blit_tolerance: 1.0 / 4096.0,
        }
    }
}

impl Config {
    pub fn overprint_params(&self) -> crate::overprint::OverprintParams {
        crate::overprint::OverprintParams {
            overprint: self.overprint,
            overprint_black: self.overprint_black,
            overprint_gray: self.overprint_gray,
            overprint_gray_images: self.overprint_gray_images,
            overprint_white: self.overprint_white,
            ignore_overprint_mode: self.ignore_overprint_mode,
            overprint_icc_based: self.overprint_icc_based,
        }
    }
}
