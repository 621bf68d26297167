//! The device-code link (C4): the central link that turns a vector of
//! `[0,1]` input colors into device codes, an overprint mask, and
//! halftone-cache side effects.

use crate::color_value::ColorValue;
use crate::colorant::ColorantIndex;
use crate::dcilut::{ContoneMask, DcilutHandle, DcilutPool};
use crate::dl::{DlColor, DlColorSink};
use crate::error::{DccError, DccResult};
use crate::function::SubLink;
use crate::halftone::{HalftoneSink, HalftoneType};
use crate::overprint::{decide_overprints, BlockOverprint, ColorType, Component, OverprintDecision, OverprintMask, OverprintParams};
use crate::photoink::PhotoinkTransform;

/// Exactly 12 fingerprint slots used as the color-chain cache key
/// (CLID), per §4.4: 3 transfer + 2 calibration + 1 transfer-id +
/// spotno + a packed flag word + 2 raster-style ids + httype +
/// contone-mask value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChainLinkId(pub [u32; 12]);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceCodeType {
    Normal,
    HalftoneOnly,
    TransferOnly,
    CalibrationOnly,
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternPaintType {
    Colored,
    Uncolored,
    NotPattern,
}

/// The reproduction color model of the chain, used to size the output
/// vector and locate the black channel before any sub-link runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainColorModel {
    Gray,
    Rgb,
    Cmyk,
    NamedColor,
    Cie,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HalftoneVariant {
    Halftone,
    HalftoneTrapping,
    HalftoneShfill,
    HalftoneBackdropRender,
    Contone,
    ContoneTrapping,
    PatternContone,
    Nothing,
}

/// Selects the halftone-update variant once, at construction, from the
/// device/job configuration (§4.4's table), so invocation never has to
/// re-derive it per object.
pub fn select_halftone_variant(
    color_type: ColorType,
    is_halftoning: bool,
    is_trapping: bool,
    is_backdrop_raster_style: bool,
    pattern_paint_type: PatternPaintType,
    n_output_colorants: usize,
) -> HalftoneVariant {
    if pattern_paint_type == PatternPaintType::Colored || n_output_colorants == 0 {
        return HalftoneVariant::Nothing;
    }
    if pattern_paint_type == PatternPaintType::Uncolored && !is_backdrop_raster_style && !is_halftoning {
        return HalftoneVariant::PatternContone;
    }
    if is_backdrop_raster_style {
        return HalftoneVariant::HalftoneBackdropRender;
    }
    match (is_halftoning, is_trapping, color_type) {
        (true, _, ColorType::Shfill) => HalftoneVariant::HalftoneShfill,
        (true, true, _) => HalftoneVariant::HalftoneTrapping,
        (true, false, _) => HalftoneVariant::Halftone,
        (false, true, _) => HalftoneVariant::ContoneTrapping,
        (false, false, _) => HalftoneVariant::Contone,
    }
}

/// One input channel of a device-code link: its sub-links, optional
/// photoink fan-out, and the DCILUT it shares with any other channel
/// of identical fingerprint.
pub struct Channel {
    pub input_colorant: ColorantIndex,
    /// Output colorant slots this channel maps into device order;
    /// length 1 unless `photoink` is set.
    pub output_colorants: Vec<ColorantIndex>,
    pub transfer: SubLink,
    pub calibration: SubLink,
    pub photoink: Option<PhotoinkTransform>,
    pub dcilut: DcilutHandle,
    /// Legacy `overprintProcess` bit for this channel, consulted by
    /// C5 for 4-channel process jobs.
    pub overprint_process_bit: bool,
}

impl Channel {
    fn compute_fn(&self) -> impl Fn(f32) -> Vec<f32> + '_ {
        move |x: f32| {
            let transformed = crate::function::invoke_transfer_calibration(&self.transfer, &self.calibration, x);
            match &self.photoink {
                Some(p) => p.invoke(transformed),
                None => vec![transformed],
            }
        }
    }
}

pub struct DeviceCodeLinkConfig {
    pub color_type: ColorType,
    pub is_intercepting: bool,
    pub is_compositing: bool,
    pub device_code_type: DeviceCodeType,
    pub pattern_paint_type: PatternPaintType,
    pub chain_color_model: ChainColorModel,
    pub illegal_tint_transform: bool,
}

impl DeviceCodeLinkConfig {
    /// Builds a [`DeviceCodeLink`] from this config plus the pieces
    /// that vary per invocation site rather than per chain shape:
    /// the already-resolved sub-link channels, the spot/repro
    /// identity, the shared contone mask, and the halftone-variant
    /// inputs consulted once at construction (§4.4's variant table).
    ///
    /// Black position is derived from `chain_color_model`: the last
    /// output colorant of a CMYK chain is black; every other model
    /// has no distinguished black channel here.
    #[allow(clippy::too_many_arguments)]
    pub fn build_link(
        self,
        channels: Vec<Channel>,
        spot_no: u32,
        repro_type: u32,
        contone_mask: Option<ContoneMask>,
        is_halftoning: bool,
        is_trapping: bool,
        is_backdrop_raster_style: bool,
    ) -> DeviceCodeLink {
        let n_output_colorants = channels.iter().map(|c| c.output_colorants.len()).sum();
        let black_position = match self.chain_color_model {
            ChainColorModel::Cmyk if n_output_colorants > 0 => Some(n_output_colorants - 1),
            _ => None,
        };
        let variant = select_halftone_variant(
            self.color_type,
            is_halftoning,
            is_trapping,
            is_backdrop_raster_style,
            self.pattern_paint_type,
            n_output_colorants,
        );

        DeviceCodeLink {
            channels,
            n_output_colorants,
            black_position,
            overprint_mask: OverprintMask::all_knockout(n_output_colorants),
            spot_no,
            repro_type,
            variant,
            config: self,
            contone_mask,
        }
    }
}

pub struct DeviceCodeLink {
    pub channels: Vec<Channel>,
    pub n_output_colorants: usize,
    pub black_position: Option<usize>,
    pub overprint_mask: OverprintMask,
    pub spot_no: u32,
    pub repro_type: u32,
    pub variant: HalftoneVariant,
    pub config: DeviceCodeLinkConfig,
    pub contone_mask: Option<ContoneMask>,
}

impl DeviceCodeLink {
    pub fn chain_link_id(&self, transfer_id: u32, flags: u32, raster_style_ids: [u32; 2], httype: u32) -> ChainLinkId {
        let t = self.channels.first().map(|c| c.transfer.transfer_fingerprint()).unwrap_or([u32::MAX; 3]);
        let c = self.channels.first().map(|c| c.calibration.calibration_fingerprint()).unwrap_or([u32::MAX; 2]);
        let contone = self.contone_mask.map(|m| m.threshold.0 as u32).unwrap_or(0);
        ChainLinkId([
            t[0],
            t[1],
            t[2],
            c[0],
            c[1],
            transfer_id,
            self.spot_no,
            flags,
            raster_style_ids[0],
            raster_style_ids[1],
            httype,
            contone,
        ])
    }

    /// Steps 1-7 of §4.4's algorithm for a single (non-block) object.
    #[allow(clippy::too_many_arguments)]
    pub fn invoke_single<H, D>(
        &mut self,
        pool: &mut DcilutPool,
        halftone: &mut H,
        dl: &mut D,
        inputs: &[f32],
        setoverprint: bool,
        opm1: bool,
        is_transformed_spot: bool,
        input_space_is_device_n: bool,
        is_100_percent_black: bool,
        overprint_params: &OverprintParams,
        erase_no: u32,
    ) -> DccResult<D::Color>
    where
        H: HalftoneSink,
        D: DlColorSink,
    {
        if inputs.len() != self.channels.len() {
            return Err(DccError::Internal("invoke_single: input arity does not match channel count"));
        }

        // Step 4: float -> 16-bit once, then DCILUT per channel.
        let mut device_values: Vec<ColorValue> = Vec::with_capacity(self.n_output_colorants);
        let mut device_colorants: Vec<ColorantIndex> = Vec::with_capacity(self.n_output_colorants);
        for (channel, &x) in self.channels.iter().zip(inputs) {
            let v16 = ColorValue::from_unit_f32(x);
            let compute = channel.compute_fn();
            let values = pool.invoke(channel.dcilut, v16, self.contone_mask, &compute)?;
            for (ci, value) in channel.output_colorants.iter().zip(values) {
                device_colorants.push(*ci);
                device_values.push(value);
            }
        }

        // Step 5: halftone-update side effect.
        self.run_halftone_variant(halftone, erase_no, &device_colorants, &device_values)?;

        // Step 2: overprint decision, against the *input* values (not
        // the device-coded ones), per §4.5.
        let components: Vec<Component> = self
            .channels
            .iter()
            .zip(inputs)
            .enumerate()
            .map(|(i, (channel, &x))| Component {
                ci: i,
                value: x,
                is_black: self.black_position == Some(i),
                overprint_process_bit: channel.overprint_process_bit,
                shared_all_zero: true,
            })
            .collect();

        let decision = decide_overprints(
            overprint_params,
            self.config.color_type,
            self.config.is_compositing,
            setoverprint,
            opm1,
            is_transformed_spot,
            input_space_is_device_n,
            self.black_position,
            is_100_percent_black,
            &components,
            self.n_output_colorants,
        );

        let mask = match decision {
            OverprintDecision::NotApplicable => OverprintMask::all_knockout(self.n_output_colorants),
            OverprintDecision::Mask(mask) => mask,
        };
        self.overprint_mask = mask.clone();

        // Step 3: a color-managed chain (intercepting, not compositing)
        // defers all overprint reasoning to the non-intercept link and
        // must not pre-reduce the colorant set here.
        let apply_max_blits = self.config.is_intercepting && !self.config.is_compositing;

        // Step 6: reduce to the painted subset.
        let is_shfill_like = matches!(self.config.color_type, ColorType::Shfill | ColorType::Vignette);
        let (reduced_colorants, reduced_values) = if apply_max_blits {
            (device_colorants.clone(), device_values.clone())
        } else {
            let mut reduced_colorants = Vec::new();
            let mut reduced_values = Vec::new();
            for (i, (&ci, &value)) in device_colorants.iter().zip(&device_values).enumerate() {
                if mask.is_paint(i) {
                    reduced_colorants.push(ci);
                    reduced_values.push(value);
                } else if is_shfill_like {
                    reduced_colorants.push(ci);
                    reduced_values.push(ColorValue::TRANSPARENT);
                }
            }
            (reduced_colorants, reduced_values)
        };

        // Step 7: emit the DL color.
        let mut color = dl.alloc_fillin(&reduced_colorants, &reduced_values)?;
        if is_transformed_spot {
            dl.apply_overprints(&mut color, &mask, true)?;
        }
        Ok(color)
    }

    /// Invokes every sample in an image or shfill block through
    /// `invoke_single`, tracking the running [`BlockOverprint`]
    /// intersection across samples per §3 "Block overprint" instead of
    /// deciding overprint once for the whole block.
    #[allow(clippy::too_many_arguments)]
    pub fn invoke_block<H, D>(
        &mut self,
        pool: &mut DcilutPool,
        halftone: &mut H,
        dl: &mut D,
        samples: &[Vec<f32>],
        setoverprint: bool,
        opm1: bool,
        is_transformed_spot: bool,
        input_space_is_device_n: bool,
        overprint_params: &OverprintParams,
        erase_no: u32,
    ) -> DccResult<(Vec<D::Color>, BlockOverprint)>
    where
        H: HalftoneSink,
        D: DlColorSink,
    {
        let mut block = BlockOverprint::new(self.n_output_colorants);
        let mut colors = Vec::with_capacity(samples.len());
        for inputs in samples {
            let is_100_percent_black = self
                .black_position
                .map(|bp| inputs.iter().enumerate().all(|(i, &v)| if i == bp { v >= 1.0 } else { v <= 0.0 }))
                .unwrap_or(false);
            let color = self.invoke_single(
                pool,
                halftone,
                dl,
                inputs,
                setoverprint,
                opm1,
                is_transformed_spot,
                input_space_is_device_n,
                is_100_percent_black,
                overprint_params,
                erase_no,
            )?;
            block.accumulate(&self.overprint_mask);
            colors.push(color);
        }
        Ok((colors, block))
    }

    fn run_halftone_variant<H: HalftoneSink>(
        &self,
        halftone: &mut H,
        erase_no: u32,
        colorants: &[ColorantIndex],
        values: &[ColorValue],
    ) -> DccResult<()> {
        match self.variant {
            HalftoneVariant::Nothing => Ok(()),
            HalftoneVariant::HalftoneBackdropRender => {
                for &ci in colorants {
                    halftone.ht_set_used(erase_no, self.spot_no, HalftoneType::Screened, ci);
                }
                Ok(())
            }
            HalftoneVariant::Contone | HalftoneVariant::ContoneTrapping => {
                for &ci in colorants {
                    halftone.ht_keep_screen(erase_no, self.spot_no, HalftoneType::Contone, ci);
                }
                self.reserve_white_black_if_trapping(halftone, erase_no, colorants, values)
            }
            HalftoneVariant::PatternContone => {
                for &ci in colorants {
                    halftone.ht_keep_screen(erase_no, self.spot_no, HalftoneType::Contone, ci);
                }
                Ok(())
            }
            HalftoneVariant::Halftone | HalftoneVariant::HalftoneTrapping | HalftoneVariant::HalftoneShfill => {
                for (&ci, &value) in colorants.iter().zip(values) {
                    let level = 255 - (value.0 >> 8) as u16;
                    halftone.ht_allocate_form(erase_no, self.spot_no, HalftoneType::Screened, ci, level)?;
                }
                if self.variant == HalftoneVariant::HalftoneTrapping {
                    self.reserve_white_black_if_trapping(halftone, erase_no, colorants, values)?;
                }
                Ok(())
            }
        }
    }

    fn reserve_white_black_if_trapping<H: HalftoneSink>(
        &self,
        halftone: &mut H,
        erase_no: u32,
        colorants: &[ColorantIndex],
        values: &[ColorValue],
    ) -> DccResult<()> {
        for (&ci, &value) in colorants.iter().zip(values) {
            if value.is_white() || value.is_full_ink() {
                halftone.ht_allocate_form(erase_no, self.spot_no, HalftoneType::Screened, ci, if value.is_white() { 0 } else { 255 })?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::function::Function;
    use std::rc::Rc;

    struct RecordingHalftone {
        allocate_calls: Vec<(ColorantIndex, u16)>,
        set_used_calls: usize,
    }

    impl HalftoneSink for RecordingHalftone {
        fn ht_set_used(&mut self, _erase_no: u32, _spot_no: u32, _httype: HalftoneType, _colorant: ColorantIndex) {
            self.set_used_calls += 1;
        }
        fn ht_allocate_form(
            &mut self,
            _erase_no: u32,
            _spot_no: u32,
            _httype: HalftoneType,
            colorant: ColorantIndex,
            level: u16,
        ) -> DccResult<()> {
            self.allocate_calls.push((colorant, level));
            Ok(())
        }
        fn ht_keep_screen(&mut self, _erase_no: u32, _spot_no: u32, _httype: HalftoneType, _colorant: ColorantIndex) {}
        fn ht_do_transforms(&mut self, _colorants: &[ColorantIndex], _input: &[f32], _out: &mut [f32]) -> DccResult<()> {
            Ok(())
        }
    }

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
        fn remove_colorant(&mut self, color: &mut TestColor, colorant: ColorantIndex) -> DccResult<()> {
            if let Some(pos) = color.colorants.iter().position(|&c| c == colorant) {
                color.colorants.remove(pos);
                color.values.remove(pos);
            }
            Ok(())
        }
    }

    fn cmyk_link(variant: HalftoneVariant) -> (DeviceCodeLink, DcilutPool) {
        let mut pool = DcilutPool::new();
        let channels = (0..4)
            .map(|i| {
                let handle = pool.reserve(
                    crate::dcilut::SubLinkFingerprint { transfer: [u32::MAX; 3], calibration: [u32::MAX; 2], context: [i, 0, 0, 0] },
                    1,
                    false,
                ).unwrap();
                Channel {
                    input_colorant: ColorantIndex::Real(i),
                    output_colorants: vec![ColorantIndex::Real(i)],
                    transfer: SubLink::Identity,
                    calibration: SubLink::Identity,
                    photoink: None,
                    dcilut: handle,
                    overprint_process_bit: true,
                }
            })
            .collect();
        let link = DeviceCodeLink {
            channels,
            n_output_colorants: 4,
            black_position: Some(3),
            overprint_mask: OverprintMask::all_knockout(4),
            spot_no: 1,
            repro_type: 0,
            variant,
            config: DeviceCodeLinkConfig {
                color_type: ColorType::Fill,
                is_intercepting: false,
                is_compositing: false,
                device_code_type: DeviceCodeType::Normal,
                pattern_paint_type: PatternPaintType::NotPattern,
                chain_color_model: ChainColorModel::Cmyk,
                illegal_tint_transform: false,
            },
            contone_mask: None,
        };
        (link, pool)
    }

    #[test]
    fn s1_hundred_percent_black_overprints_cmy_and_paints_only_k() {
        let (mut link, mut pool) = cmyk_link(HalftoneVariant::Halftone);
        let params = OverprintParams {
            overprint: true,
            overprint_black: true,
            overprint_gray: false,
            overprint_gray_images: false,
            overprint_white: false,
            ignore_overprint_mode: false,
            overprint_icc_based: false,
        };
        let mut halftone = RecordingHalftone { allocate_calls: vec![], set_used_calls: 0 };
        let mut dl = RecordingDl;
        let color = link
            .invoke_single(&mut pool, &mut halftone, &mut dl, &[0.0, 0.0, 0.0, 1.0], false, false, false, false, true, &params, 0)
            .unwrap();

        assert!(link.overprint_mask.is_overprint(0));
        assert!(link.overprint_mask.is_overprint(1));
        assert!(link.overprint_mask.is_overprint(2));
        assert!(link.overprint_mask.is_paint(3));
        assert_eq!(color.colorants, vec![ColorantIndex::Real(3)]);
        assert_eq!(color.values, vec![ColorValue::MAX]);
    }

    #[test]
    fn s4_repeated_invocation_does_not_reinvoke_sub_links() {
        use std::cell::Cell;
        let (mut link, mut pool) = cmyk_link(HalftoneVariant::Contone);
        let calls = Rc::new(Cell::new(0));
        let calls_clone = calls.clone();
        let counting_transfer = crate::function::Function::calculator(
            vec![0.0, 1.0],
            None,
            crate::function::Calculator::new(
                1,
                Rc::new(move |input: &[f32]| {
                    calls_clone.set(calls_clone.get() + 1);
                    vec![input[0]]
                }),
            ),
        );
        let counting_transfer: Rc<Function> = Rc::new(counting_transfer);
        link.channels[0].transfer = SubLink::Transfer(counting_transfer);

        let params = OverprintParams {
            overprint: false,
            overprint_black: false,
            overprint_gray: false,
            overprint_gray_images: false,
            overprint_white: false,
            ignore_overprint_mode: false,
            overprint_icc_based: false,
        };
        let mut halftone = RecordingHalftone { allocate_calls: vec![], set_used_calls: 0 };
        let mut dl = RecordingDl;

        link.invoke_single(&mut pool, &mut halftone, &mut dl, &[0.5, 0.0, 0.0, 0.0], false, false, false, false, false, &params, 0)
            .unwrap();
        let after_first = calls.get();
        link.invoke_single(&mut pool, &mut halftone, &mut dl, &[0.5, 0.0, 0.0, 0.0], false, false, false, false, false, &params, 0)
            .unwrap();
        assert_eq!(calls.get(), after_first, "second identical invocation must hit the DCILUT, not the sub-link");
    }

    #[test]
    fn invoke_block_intersects_overprint_across_samples() {
        let (mut link, mut pool) = cmyk_link(HalftoneVariant::Contone);
        let params = OverprintParams {
            overprint: true,
            overprint_black: true,
            overprint_gray: false,
            overprint_gray_images: false,
            overprint_white: false,
            ignore_overprint_mode: false,
            overprint_icc_based: false,
        };
        let mut halftone = RecordingHalftone { allocate_calls: vec![], set_used_calls: 0 };
        let mut dl = RecordingDl;
        let samples = vec![vec![0.0, 0.0, 0.0, 1.0], vec![0.2, 0.2, 0.2, 0.2]];
        let (colors, block) = link
            .invoke_block(&mut pool, &mut halftone, &mut dl, &samples, false, false, false, false, &params, 0)
            .unwrap();
        assert_eq!(colors.len(), 2);
        assert!(!block.overprint_all());
    }

    /// A color-managed chain (intercepting, not compositing) must emit
    /// the full unreduced colorant set even though the overprint mask
    /// says to knock three of them out, leaving the reduction to C6.
    #[test]
    fn fapplymaxblts_chain_skips_colorant_reduction() {
        let (mut link, mut pool) = cmyk_link(HalftoneVariant::Halftone);
        link.config.is_intercepting = true;
        link.config.is_compositing = false;
        let params = OverprintParams {
            overprint: true,
            overprint_black: true,
            overprint_gray: false,
            overprint_gray_images: false,
            overprint_white: false,
            ignore_overprint_mode: false,
            overprint_icc_based: false,
        };
        let mut halftone = RecordingHalftone { allocate_calls: vec![], set_used_calls: 0 };
        let mut dl = RecordingDl;
        let color = link
            .invoke_single(&mut pool, &mut halftone, &mut dl, &[0.0, 0.0, 0.0, 1.0], false, false, false, false, true, &params, 0)
            .unwrap();

        assert!(link.overprint_mask.is_overprint(0));
        assert_eq!(color.colorants.len(), 4, "color-managed chain must not pre-reduce colorants");
    }

    #[test]
    fn build_link_derives_black_position_from_cmyk_model() {
        let mut pool = DcilutPool::new();
        let channels: Vec<Channel> = (0..4)
            .map(|i| {
                let handle = pool
                    .reserve(
                        crate::dcilut::SubLinkFingerprint { transfer: [u32::MAX; 3], calibration: [u32::MAX; 2], context: [i, 0, 0, 0] },
                        1,
                        false,
                    )
                    .unwrap();
                Channel {
                    input_colorant: ColorantIndex::Real(i),
                    output_colorants: vec![ColorantIndex::Real(i)],
                    transfer: SubLink::Identity,
                    calibration: SubLink::Identity,
                    photoink: None,
                    dcilut: handle,
                    overprint_process_bit: true,
                }
            })
            .collect();
        let config = DeviceCodeLinkConfig {
            color_type: ColorType::Fill,
            is_intercepting: false,
            is_compositing: false,
            device_code_type: DeviceCodeType::Normal,
            pattern_paint_type: PatternPaintType::NotPattern,
            chain_color_model: ChainColorModel::Cmyk,
            illegal_tint_transform: false,
        };
        let link = config.build_link(channels, 1, 0, None, true, false, false);
        assert_eq!(link.black_position, Some(3));
        assert_eq!(link.variant, HalftoneVariant::Halftone);
    }
}
