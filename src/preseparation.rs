//! The preseparation link (C7): trivial by design. It attaches a
//! pseudo-colorant to a single-channel DL color, marks the object for
//! recombine, and sets the halftone screen for the device raster
//! style, since the final colorant isn't known until recombine runs.

use crate::color_value::ColorValue;
use crate::colorant::ColorantIndex;
use crate::dl::DlColorSink;
use crate::error::DccResult;
use crate::halftone::{HalftoneSink, HalftoneType};

/// A pseudo-colorant index, negative-range per §3 "Pseudo-colorant".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PseudoColorantIndex(pub i32);

pub struct PreseparationLink {
    pub pseudo_colorant: PseudoColorantIndex,
    pub spot_no: u32,
}

impl PreseparationLink {
    /// Builds the single-channel DL color tagged with this link's
    /// pseudo-colorant, and marks the device raster style's screen as
    /// used (recombine will pick the real colorant and screen later).
    pub fn invoke_single<H, D>(&self, halftone: &mut H, dl: &mut D, input: f32, erase_no: u32) -> DccResult<D::Color>
    where
        H: HalftoneSink,
        D: DlColorSink,
    {
        let ci = ColorantIndex::Pseudo(self.pseudo_colorant.0);
        halftone.ht_set_used(erase_no, self.spot_no, HalftoneType::Contone, ci);
        dl.alloc_fillin(&[ci], &[ColorValue::from_unit_f32(input)])
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::dl::DlColor;
    use crate::overprint::OverprintMask;

    #[derive(Debug)]
    struct TestColor {
        colorants: Vec<ColorantIndex>,
        values: Vec<ColorValue>,
    }
    impl DlColor for TestColor {}

    struct RecordingDl;
    impl DlColorSink for RecordingDl {
        type Color = TestColor;
        fn alloc_fillin(&mut self, colorants: &[ColorantIndex], values: &[ColorValue]) -> DccResult<TestColor> {
            Ok(TestColor { colorants: colorants.to_vec(), values: values.to_vec() })
        }
        fn apply_overprints(&mut self, _color: &mut TestColor, _mask: &OverprintMask, _max_blit: bool) -> DccResult<()> {
            Ok(())
        }
        fn remove_colorant(&mut self, _color: &mut TestColor, _colorant: ColorantIndex) -> DccResult<()> {
            Ok(())
        }
    }

    struct NoopHalftone;
    impl HalftoneSink for NoopHalftone {
        fn ht_set_used(&mut self, _erase_no: u32, _spot_no: u32, _httype: HalftoneType, _colorant: ColorantIndex) {}
        fn ht_allocate_form(
            &mut self,
            _erase_no: u32,
            _spot_no: u32,
            _httype: HalftoneType,
            _colorant: ColorantIndex,
            _level: u16,
        ) -> DccResult<()> {
            Ok(())
        }
        fn ht_keep_screen(&mut self, _erase_no: u32, _spot_no: u32, _httype: HalftoneType, _colorant: ColorantIndex) {}
        fn ht_do_transforms(&mut self, _colorants: &[ColorantIndex], _input: &[f32], _out: &mut [f32]) -> DccResult<()> {
            Ok(())
        }
    }

    #[test]
    fn tags_the_output_with_the_pseudo_colorant() {
        let link = PreseparationLink { pseudo_colorant: PseudoColorantIndex(-1), spot_no: 3 };
        let mut halftone = NoopHalftone;
        let mut dl = RecordingDl;
        let color = link.invoke_single(&mut halftone, &mut dl, 0.75, 0).unwrap();
        assert_eq!(color.colorants, vec![ColorantIndex::Pseudo(-1)]);
        assert_eq!(color.values.len(), 1);
    }
}
