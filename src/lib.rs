#![allow(dead_code)]

mod color_space;
mod color_value;
mod colorant;
mod config;
mod dcilut;
mod devicecode;
mod dl;
mod error;
mod function;
mod halftone;
mod imstore;
mod link;
mod nonintercept;
mod overprint;
mod page;
mod photoink;
mod preconvert;
mod preseparation;
mod recombine;

pub use crate::color_space::{ColorSpace, DeviceNColorSpace, IndexedColorSpace, SeparationColorSpace};
pub use crate::color_value::ColorValue;
pub use crate::colorant::{sort_colorants, ColorantIndex, DuplicatePolicy, SortedColorants};
pub use crate::config::Config;
pub use crate::dcilut::{ContoneMask, DcilutHandle, DcilutPool, SubLinkFingerprint};
pub use crate::devicecode::{
    select_halftone_variant, ChainColorModel, ChainLinkId, Channel, DeviceCodeLink, DeviceCodeLinkConfig,
    DeviceCodeType, HalftoneVariant, PatternPaintType,
};
pub use crate::dl::{DlColor, DlColorSink};
pub use crate::error::{DccError, DccResult};
pub use crate::function::{Calculator, Function, SubLink};
pub use crate::halftone::{HalftoneSink, HalftoneType};
pub use crate::imstore::{ImageBBox, ImageStoreSink};
pub use crate::link::{make_devicecode_link, make_nonintercept_link, make_preseparation_link, Link};
pub use crate::nonintercept::{NonInterceptLink, OriginalChannel};
pub use crate::overprint::{
    decide_overprints, BlockOverprint, ColorType, Component, OverprintDecision, OverprintMask, OverprintParams,
};
pub use crate::page::{DirtyFlags, PageColorState};
pub use crate::photoink::{PhotoinkBreakpoint, PhotoinkTransform};
pub use crate::preconvert::{
    choose_conversion_method, preconvert_dl, preconvert_group, ConversionMethod, DlObject, Group, PreconvertAction,
    TransparencyStrategy,
};
pub use crate::preseparation::{PreseparationLink, PseudoColorantIndex};
pub use crate::recombine::{
    recombine_prepare, recombine_shfill_patch, rewrite_image_fast_path, FusedColor, LateColorAttrib, ObjectColorKind,
    PreSeparatedObject,
};
