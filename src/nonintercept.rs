//! The non-intercept link (C6): used after a device-code link upstream
//! has already produced a color-managed result. It never computes new
//! color values, only an overprint set for the *original* input
//! colorants, intersected into the existing DL color via max-blit.

use crate::color_value::ColorValue;
use crate::colorant::ColorantIndex;
use crate::dl::{DlColor, DlColorSink};
use crate::error::DccResult;
use crate::overprint::{decide_overprints, ColorType, Component, OverprintDecision, OverprintMask, OverprintParams};

/// One original (pre-color-management) input colorant this link
/// tracks, and the device colorant it would have produced directly
/// (used only by the avoid-max-blit optimization below).
#[derive(Debug, Clone, Copy)]
pub struct OriginalChannel {
    pub colorant: ColorantIndex,
    pub value: f32,
    /// The device-managed color's value for this same colorant, if
    /// it maps into one; `None` means this original colorant has no
    /// counterpart in the managed result.
    pub managed_value: Option<f32>,
    pub overprint_process_bit: bool,
}

pub struct NonInterceptLink {
    pub channels: Vec<OriginalChannel>,
    pub n_output_colorants: usize,
    pub avoid_max_blit_tolerance: f32,
}

impl NonInterceptLink {
    /// Computes the overprint set for the original colorants and
    /// either (a) intersects it into `color` via max-blit, or (b), if
    /// every original colorant maps into the managed result within
    /// tolerance, replaces `color` outright with an ordinary
    /// knockout-subset DL color (the avoid-max-blit optimization,
    /// §4.6).
    pub fn invoke_single<D: DlColorSink>(
        &self,
        dl: &mut D,
        color: &mut D::Color,
        params: &OverprintParams,
        setoverprint: bool,
        opm1: bool,
    ) -> DccResult<()> {
        let components: Vec<Component> = self
            .channels
            .iter()
            .enumerate()
            .map(|(i, c)| Component {
                ci: i,
                value: c.value,
                is_black: false,
                overprint_process_bit: c.overprint_process_bit,
                shared_all_zero: true,
            })
            .collect();

        let decision = decide_overprints(
            params,
            ColorType::Fill,
            false,
            setoverprint,
            opm1,
            false,
            false,
            None,
            false,
            &components,
            self.n_output_colorants,
        );

        let mask = match decision {
            OverprintDecision::NotApplicable => return Ok(()),
            OverprintDecision::Mask(mask) => mask,
        };

        if self.avoids_max_blit() {
            dl.apply_overprints(color, &mask, false)?;
        } else {
            dl.apply_overprints(color, &mask, true)?;
        }
        Ok(())
    }

    /// True if every original channel maps to a managed-result value
    /// within tolerance, so a max-blit merge would be a no-op and can
    /// be skipped in favor of a plain knockout-subset color, per
    /// §4.6 ("prevents downstream hold-vector deduplication from
    /// refusing to merge color-managed runs").
    fn avoids_max_blit(&self) -> bool {
        self.channels.iter().all(|c| match c.managed_value {
            Some(managed) => (managed - c.value).abs() <= self.avoid_max_blit_tolerance,
            None => false,
        })
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use std::marker::PhantomData;

    #[derive(Debug)]
    struct TestColor {
        applied: Vec<(OverprintMask, bool)>,
    }
    struct RecordingDl(PhantomData<()>);
    impl DlColor for TestColor {}
    impl DlColorSink for RecordingDl {
        type Color = TestColor;
        fn alloc_fillin(&mut self, _colorants: &[ColorantIndex], _values: &[ColorValue]) -> DccResult<TestColor> {
            Ok(TestColor { applied: vec![] })
        }
        fn apply_overprints(&mut self, color: &mut TestColor, mask: &OverprintMask, max_blit: bool) -> DccResult<()> {
            color.applied.push((mask.clone(), max_blit));
            Ok(())
        }
        fn remove_colorant(&mut self, _color: &mut TestColor, _colorant: ColorantIndex) -> DccResult<()> {
            Ok(())
        }
    }

    fn params() -> OverprintParams {
        OverprintParams {
            overprint: true,
            overprint_black: false,
            overprint_gray: false,
            overprint_gray_images: false,
            overprint_white: false,
            ignore_overprint_mode: false,
            overprint_icc_based: false,
        }
    }

    #[test]
    fn within_tolerance_skips_max_blit() {
        let link = NonInterceptLink {
            channels: vec![OriginalChannel {
                colorant: ColorantIndex::Real(0),
                value: 0.0,
                managed_value: Some(0.0 + 1.0 / 8192.0),
                overprint_process_bit: true,
            }],
            n_output_colorants: 1,
            avoid_max_blit_tolerance: 1.0 / 4096.0,
        };
        let mut dl = RecordingDl(PhantomData);
        let mut color = dl.alloc_fillin(&[], &[]).unwrap();
        link.invoke_single(&mut dl, &mut color, &params(), true, true).unwrap();
        assert_eq!(color.applied[0].1, false);
    }

    #[test]
    fn outside_tolerance_uses_max_blit() {
        let link = NonInterceptLink {
            channels: vec![OriginalChannel {
                colorant: ColorantIndex::Real(0),
                value: 0.0,
                managed_value: Some(0.5),
                overprint_process_bit: true,
            }],
            n_output_colorants: 1,
            avoid_max_blit_tolerance: 1.0 / 4096.0,
        };
        let mut dl = RecordingDl(PhantomData);
        let mut color = dl.alloc_fillin(&[], &[]).unwrap();
        link.invoke_single(&mut dl, &mut color, &params(), true, true).unwrap();
        assert_eq!(color.applied[0].1, true);
    }

    #[test]
    fn no_applicable_overprint_leaves_color_untouched() {
        let link = NonInterceptLink {
            channels: vec![OriginalChannel {
                colorant: ColorantIndex::Real(0),
                value: 1.0,
                managed_value: Some(1.0),
                overprint_process_bit: true,
            }],
            n_output_colorants: 1,
            avoid_max_blit_tolerance: 1.0 / 4096.0,
        };
        let mut dl = RecordingDl(PhantomData);
        let mut color = dl.alloc_fillin(&[], &[]).unwrap();
        link.invoke_single(&mut dl, &mut color, &params(), false, false).unwrap();
        assert!(color.applied.is_empty());
    }
}
