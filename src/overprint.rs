//! The overprint mask bit-set (C5's output type), and the overprint
//! decision engine that fills it in.
//!
//! Grounded on the source's `OVERPRINT_COLORANT`/`KNOCKOUT_COLORANT`/
//! `INTERSECT_OVERPRINTMASK` macros and `op_decide_overprints`: per
//! §9 Design Notes, the packed-bit macros become a typed bit-set with
//! the same MSB-first word layout, and the decision table becomes an
//! explicit function instead of a maze of `#define`s.

/// Bit set to `overprint`, clear to `knockout`, one bit per output
/// colorant, packed MSB-first per 32-bit word.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverprintMask {
    words: Vec<u32>,
    n_colorants: usize,
}

impl OverprintMask {
    pub fn all_knockout(n_colorants: usize) -> Self {
        OverprintMask { words: vec![0; word_count(n_colorants)], n_colorants }
    }

    pub fn all_overprint(n_colorants: usize) -> Self {
        OverprintMask { words: vec![u32::MAX; word_count(n_colorants)], n_colorants }
    }

    pub fn len(&self) -> usize {
        self.n_colorants
    }

    pub fn is_empty(&self) -> bool {
        self.n_colorants == 0
    }

    fn locate(&self, ci: usize) -> (usize, u32) {
        assert!(ci < self.n_colorants, "colorant index out of range");
        let word = ci / 32;
        // MSB-first within the word.
        let bit = 31 - (ci % 32) as u32;
        (word, 1u32 << bit)
    }

    pub fn overprint(&mut self, ci: usize) {
        let (word, bit) = self.locate(ci);
        self.words[word] |= bit;
    }

    pub fn knockout(&mut self, ci: usize) {
        let (word, bit) = self.locate(ci);
        self.words[word] &= !bit;
    }

    pub fn is_overprint(&self, ci: usize) -> bool {
        let (word, bit) = self.locate(ci);
        self.words[word] & bit != 0
    }

    pub fn is_paint(&self, ci: usize) -> bool {
        !self.is_overprint(ci)
    }

    pub fn count_overprint(&self) -> usize {
        (0..self.n_colorants).filter(|&ci| self.is_overprint(ci)).count()
    }

    /// AND together two masks of the same length.
    pub fn intersect(&self, other: &OverprintMask) -> OverprintMask {
        assert_eq!(self.n_colorants, other.n_colorants);
        let words = self.words.iter().zip(&other.words).map(|(a, b)| a & b).collect();
        OverprintMask { words, n_colorants: self.n_colorants }
    }
}

fn word_count(n_colorants: usize) -> usize {
    (n_colorants + 31) / 32
}

/// Running intersection of per-sample overprint masks across an
/// image/shfill block invocation, per §3 "Block overprint".
#[derive(Debug, Clone)]
pub struct BlockOverprint {
    mask: OverprintMask,
    /// Cleared the first time any sample knocks out a colorant that
    /// was previously overprinting in every sample seen so far.
    overprint_all: bool,
}

impl BlockOverprint {
    pub fn new(n_colorants: usize) -> Self {
        BlockOverprint { mask: OverprintMask::all_overprint(n_colorants), overprint_all: true }
    }

    pub fn accumulate(&mut self, sample: &OverprintMask) {
        if sample.count_overprint() < sample.len() {
            self.overprint_all = false;
        }
        self.mask = self.mask.intersect(sample);
    }

    pub fn mask(&self) -> &OverprintMask {
        &self.mask
    }

    pub fn overprint_all(&self) -> bool {
        self.overprint_all
    }
}

/// System parameters consulted by the decision engine. A subset of
/// `config::Config`, passed explicitly so the engine stays a pure
/// function of its inputs.
#[derive(Debug, Clone, Copy)]
pub struct OverprintParams {
    pub overprint: bool,
    pub overprint_black: bool,
    pub overprint_gray: bool,
    pub overprint_gray_images: bool,
    pub overprint_white: bool,
    pub ignore_overprint_mode: bool,
    pub overprint_icc_based: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorType {
    Fill,
    Stroke,
    Image,
    Shfill,
    Vignette,
    Backdrop,
}

impl ColorType {
    fn is_image_like(self) -> bool {
        matches!(self, ColorType::Image | ColorType::Shfill | ColorType::Vignette)
    }
}

/// One device colorant's contribution to the overprint decision: its
/// index in the output mask, its value, whether the job's
/// `overprintProcess` legacy bit mask marks it as an overprintable
/// process channel, and (for DeviceN shared-colorants handling)
/// whether every colorant it shares an `/All` mapping with is also
/// zero.
#[derive(Debug, Clone, Copy)]
pub struct Component {
    pub ci: usize,
    pub value: f32,
    pub is_black: bool,
    pub overprint_process_bit: bool,
    pub shared_all_zero: bool,
}

/// Outcome of [`decide_overprints`]: whether overprinting applies at
/// all, and (if so) the mask to install.
#[derive(Debug, Clone)]
pub enum OverprintDecision {
    /// Overprinting does not apply; the caller falls through to an
    /// all-knockout (or, per `OverprintWhite`, a paint-as-white) path.
    NotApplicable,
    Mask(OverprintMask),
}

/// Translates `op_decide_overprints`. `components` describes every
/// *output* device colorant this object could paint; `setoverprint`/
/// `opm1` mirror the PDF graphics state's overprint flag and
/// `OPM == 1` (implicit zero-component overprint allowed).
pub fn decide_overprints(
    params: &OverprintParams,
    color_type: ColorType,
    is_compositing: bool,
    setoverprint: bool,
    opm1: bool,
    is_transformed_spot: bool,
    input_space_is_device_n: bool,
    black_position: Option<usize>,
    is_100_percent_black: bool,
    components: &[Component],
    n_output_colorants: usize,
) -> OverprintDecision {
    if !params.overprint {
        return OverprintDecision::NotApplicable;
    }

    if is_compositing && color_type == ColorType::Image {
        let mut mask = OverprintMask::all_knockout(n_output_colorants);
        if setoverprint {
            for c in components {
                mask.overprint(c.ci);
            }
        }
        return OverprintDecision::Mask(mask);
    }

    let opm1_effective = opm1 && !params.ignore_overprint_mode;
    let mut mask = OverprintMask::all_knockout(n_output_colorants);
    let mut any_overprint = false;

    if params.overprint_black && is_100_percent_black {
        if let Some(black_ci) = black_position {
            for c in components {
                if c.ci != black_ci {
                    mask.overprint(c.ci);
                    any_overprint = true;
                }
            }
            return OverprintDecision::Mask(mask);
        }
    }

    let all_zero = components.iter().all(|c| c.value == 0.0);
    // OverprintWhite takes precedence over the gray implicit-overprint
    // path for an all-zero object: a job that asked to paint zero as
    // white must not have OverprintGray implicitly overprint it first.
    let gray_applies = !(all_zero && params.overprint_white);

    if setoverprint {
        for c in components {
            let zero = c.value == 0.0;
            if !zero {
                continue;
            }
            if input_space_is_device_n && !c.shared_all_zero {
                continue;
            }
            let eligible = opm1_effective || (c.overprint_process_bit && components.len() == 4);
            let allow_image_gray =
                gray_applies && color_type.is_image_like() && (params.overprint_gray_images || params.overprint_gray);
            let allow_gray = gray_applies && !color_type.is_image_like() && params.overprint_gray;
            if eligible || allow_gray || allow_image_gray {
                mask.overprint(c.ci);
                any_overprint = true;
            }
        }
    }

    if is_transformed_spot {
        for c in components {
            mask.overprint(c.ci);
            any_overprint = true;
        }
    }

    if all_zero && !any_overprint {
        if params.overprint_white {
            return OverprintDecision::Mask(OverprintMask::all_knockout(n_output_colorants));
        }
        if color_type != ColorType::Shfill {
            return OverprintDecision::NotApplicable;
        }
    }

    let _ = params.overprint_icc_based;
    OverprintDecision::Mask(mask)
}
