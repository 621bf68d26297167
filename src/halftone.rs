//! The halftone module collaborator interface (§6): the screen/
//! threshold generator and output raster back-end this crate only
//! ever reaches through these four calls.

use crate::colorant::ColorantIndex;
use crate::error::DccResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HalftoneType {
    Screened,
    ScreenedWithAngle,
    Contone,
}

/// Implemented by the halftone screen/threshold generator. A
/// device-code link invokes exactly these four operations as side
/// effects; it never reaches into halftone module internals.
pub trait HalftoneSink {
    /// Marks a screen as used for `(erase_no, spot_no, httype,
    /// colorant_index)`, the cheapest of the four calls and the one
    /// every halftone-update variant issues.
    fn ht_set_used(&mut self, erase_no: u32, spot_no: u32, httype: HalftoneType, colorant: ColorantIndex);

    /// Reserves a halftone form/level for `colorant` at `level`
    /// (0..=max_level); returns once the level is guaranteed
    /// renderable.
    fn ht_allocate_form(
        &mut self,
        erase_no: u32,
        spot_no: u32,
        httype: HalftoneType,
        colorant: ColorantIndex,
        level: u16,
    ) -> DccResult<()>;

    /// Contone path: records that `colorant`'s screen is retained
    /// without quantizing to a discrete halftone level.
    fn ht_keep_screen(&mut self, erase_no: u32, spot_no: u32, httype: HalftoneType, colorant: ColorantIndex);

    /// Applies any pending coordinate/domain transforms the halftone
    /// module needs for `n` colorants' worth of input values, writing
    /// `out` back.
    fn ht_do_transforms(&mut self, colorants: &[ColorantIndex], input: &[f32], out: &mut [f32]) -> DccResult<()>;
}
