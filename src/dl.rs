//! The display-list color builder collaborator interface (§6).

use crate::color_value::ColorValue;
use crate::colorant::ColorantIndex;
use crate::error::DccResult;
use crate::overprint::OverprintMask;

/// Opaque handle to a DL color object owned by the back end; this
/// crate never inspects its contents directly, only passes it back
/// through this trait.
pub trait DlColor: std::fmt::Debug {}

/// Implemented by the display-list color builder. A device-code link
/// never allocates or mutates a DL color object directly; it always
/// goes through these three operations.
pub trait DlColorSink {
    type Color: DlColor;

    /// Builds a new DL color from parallel `colorants`/`values`
    /// arrays, the non-overprint ("fill-in") path.
    fn alloc_fillin(&mut self, colorants: &[ColorantIndex], values: &[ColorValue]) -> DccResult<Self::Color>;

    /// Applies `mask` onto `color` using the max-blit merge opcode
    /// when `max_blit` is set, or an ordinary replace otherwise.
    fn apply_overprints(&mut self, color: &mut Self::Color, mask: &OverprintMask, max_blit: bool) -> DccResult<()>;

    /// Drops `colorant` from `color` entirely (used when an
    /// overprinted shfill/vignette slot must disappear rather than
    /// merely knock out).
    fn remove_colorant(&mut self, color: &mut Self::Color, colorant: ColorantIndex) -> DccResult<()>;
}
