//! The page-description-level color space tag a color chain is built
//! against.
//!
//! `ColorSpace` and its `Separation`/`DeviceN` variants describe some
//! input color space a chain is built against; every
//! `FromObj`/dictionary-parsing path is dropped, since parsing PDF
//! color space arrays belongs to the front-end interpreter, which is
//! an external collaborator out of scope for this crate.

use std::rc::Rc;

use crate::function::Function;

#[derive(Debug, Clone)]
pub struct SeparationColorSpace {
    pub name: String,
    pub alternate_space: Rc<ColorSpace>,
    pub tint_transform: Rc<Function>,
}

#[derive(Debug, Clone)]
pub struct DeviceNColorSpace {
    pub names: Vec<String>,
    pub alternate_space: Rc<ColorSpace>,
    pub tint_transform: Rc<Function>,
    /// Set when the raster style declares an `/All`-separation mapping
    /// for this space: a component is then eligible for implicit
    /// overprint only if every colorant it shares that mapping with is
    /// also zero (§4.5 "Shared-colorants exception").
    pub shares_all_separation: bool,
}

#[derive(Debug, Clone)]
pub struct IndexedColorSpace {
    pub base: Rc<ColorSpace>,
    pub hival: u8,
}

#[derive(Debug, Clone)]
pub enum ColorSpace {
    DeviceGray,
    DeviceRGB,
    DeviceCMYK,
    CalGray,
    CalRGB,
    Lab,
    IccBased { n_components: usize, alternate: Rc<ColorSpace> },
    Indexed(IndexedColorSpace),
    Pattern(Option<Rc<ColorSpace>>),
    Separation(SeparationColorSpace),
    DeviceN(DeviceNColorSpace),
}

impl ColorSpace {
    /// Number of input channels a color in this space carries, before
    /// any tint transform / alternate-space expansion.
    pub fn n_components(&self) -> usize {
        match self {
            ColorSpace::DeviceGray | ColorSpace::CalGray => 1,
            ColorSpace::DeviceRGB | ColorSpace::CalRGB | ColorSpace::Lab => 3,
            ColorSpace::DeviceCMYK => 4,
            ColorSpace::IccBased { n_components, .. } => *n_components,
            ColorSpace::Indexed(_) => 1,
            ColorSpace::Pattern(base) => base.as_ref().map_or(0, |b| b.n_components()),
            ColorSpace::Separation(_) => 1,
            ColorSpace::DeviceN(s) => s.names.len(),
        }
    }

    /// Follows `Indexed` down to its base space; every other variant is
    /// already resolved. Mirrors `op_allow_implicit`'s `SPACE_Indexed`
    /// case, which walks to the base colorspace before deciding.
    pub fn base_space(&self) -> &ColorSpace {
        match self {
            ColorSpace::Indexed(i) => i.base.base_space(),
            other => other,
        }
    }

    pub fn is_gray(&self) -> bool {
        matches!(self.base_space(), ColorSpace::DeviceGray | ColorSpace::CalGray)
    }

    pub fn is_cmyk(&self) -> bool {
        matches!(self.base_space(), ColorSpace::DeviceCMYK)
    }

    pub fn is_icc_based(&self) -> bool {
        matches!(self.base_space(), ColorSpace::IccBased { .. })
    }

    pub fn is_device_n_or_separation(&self) -> bool {
        matches!(self, ColorSpace::DeviceN(_) | ColorSpace::Separation(_))
    }
}
