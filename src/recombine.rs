//! Recombine adjust (C8): fuses a pre-separated job's single-channel
//! objects back into multi-channel device colors.

use crate::colorant::ColorantIndex;
use crate::error::{DccError, DccResult};
use crate::imstore::ImageStoreSink;
use crate::page::PageColorState;
use crate::preseparation::PseudoColorantIndex;

/// How often (in objects walked) the `often` cooperative yield polls
/// the interrupt flag, per §5 "Suspension points".
const OFTEN_TICK: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LateColorAttrib {
    Gray,
    Rgb,
    Cmyk,
    Separation,
}

/// A single-channel DL object produced by C7, still carrying its
/// pseudo-colorant(s) and (for Quark-pretrapped jobs) a second DL
/// color listing trap colorants.
#[derive(Debug, Clone)]
pub struct PreSeparatedObject {
    pub pseudo_values: Vec<(PseudoColorantIndex, f32)>,
    pub late_color_attrib: Option<LateColorAttrib>,
    pub trap_values: Option<Vec<(PseudoColorantIndex, f32)>>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ObjectColorKind {
    None,
    Process(Vec<(ColorantIndex, f32)>),
    Spots(Vec<(ColorantIndex, f32)>),
}

/// A fused, device-space color, plus the overprint-by-trap-colorant
/// rewrite applied in step 6.
#[derive(Debug, Clone, PartialEq)]
pub struct FusedColor {
    pub colorants: Vec<(ColorantIndex, f32)>,
    /// Colorants present only because a trap plane named them, with
    /// zero paint in the main color: these overprint (max-blit)
    /// rather than knock out, per step 6.
    pub trap_overprint_colorants: Vec<ColorantIndex>,
    pub recombine_flag_cleared: bool,
}

/// Step 1-3: resolve pseudo-colorants to real ones and classify.
pub fn classify(
    object: &PreSeparatedObject,
    page: &PageColorState,
    is_process_colorant: &dyn Fn(ColorantIndex) -> bool,
) -> ObjectColorKind {
    let resolved: Vec<(ColorantIndex, f32)> = object
        .pseudo_values
        .iter()
        .filter_map(|&(p, v)| page.resolve_pseudo(p).map(|ci| (ci, v)))
        .collect();

    if resolved.is_empty() {
        return ObjectColorKind::None;
    }

    if resolved.iter().all(|&(ci, _)| is_process_colorant(ci)) {
        ObjectColorKind::Process(resolved)
    } else {
        ObjectColorKind::Spots(resolved)
    }
}

/// Steps 4-6 for one object: recover the late color attrib (informational
/// only here; real re-invocation of the device-code chain is delegated
/// to `rebuild`), fuse, and rewrite trap colorants to overprint.
fn recombine_one(
    object: &PreSeparatedObject,
    page: &PageColorState,
    is_process_colorant: &dyn Fn(ColorantIndex) -> bool,
    rebuild: &dyn Fn(&ObjectColorKind) -> DccResult<Vec<(ColorantIndex, f32)>>,
) -> DccResult<FusedColor> {
    let kind = classify(object, page, is_process_colorant);
    if kind == ObjectColorKind::None {
        return Ok(FusedColor { colorants: vec![], trap_overprint_colorants: vec![], recombine_flag_cleared: true });
    }

    let mut colorants = rebuild(&kind)?;

    let mut trap_overprint_colorants = Vec::new();
    if let Some(trap_values) = &object.trap_values {
        for &(pseudo, _) in trap_values {
            if let Some(ci) = page.resolve_pseudo(pseudo) {
                let main_is_zero = colorants.iter().find(|(c, _)| *c == ci).map(|(_, v)| *v == 0.0).unwrap_or(true);
                if main_is_zero {
                    colorants.retain(|(c, _)| *c != ci);
                    trap_overprint_colorants.push(ci);
                }
            }
        }
    }

    Ok(FusedColor { colorants, trap_overprint_colorants, recombine_flag_cleared: true })
}

/// Entry point: walks every pre-separated object on the page, fusing
/// each one, polling `interrupt` every [`OFTEN_TICK`] objects.
pub fn recombine_prepare(
    page: &mut PageColorState,
    objects: &[PreSeparatedObject],
    is_process_colorant: &dyn Fn(ColorantIndex) -> bool,
    rebuild: &dyn Fn(&ObjectColorKind) -> DccResult<Vec<(ColorantIndex, f32)>>,
    interrupt: &dyn Fn() -> bool,
) -> DccResult<Vec<FusedColor>> {
    log::debug!("recombine_prepare: walking {} objects", objects.len());
    let mut fused = Vec::with_capacity(objects.len());
    for (i, object) in objects.iter().enumerate() {
        if i % OFTEN_TICK == 0 && interrupt() {
            log::warn!("recombine_prepare interrupted after {i} objects");
            return Err(DccError::Interrupt);
        }
        fused.push(recombine_one(object, page, is_process_colorant, rebuild)?);
    }
    page.dirty.new_color_detected = true;
    Ok(fused)
}

/// Step 7: color-converts each Gouraud vertex of a decomposed shfill
/// patch independently.
pub fn recombine_shfill_patch(
    vertices: &[Vec<(PseudoColorantIndex, f32)>],
    page: &PageColorState,
    is_process_colorant: &dyn Fn(ColorantIndex) -> bool,
    rebuild: &dyn Fn(&ObjectColorKind) -> DccResult<Vec<(ColorantIndex, f32)>>,
) -> DccResult<Vec<Vec<(ColorantIndex, f32)>>> {
    vertices
        .iter()
        .map(|vertex| {
            let object = PreSeparatedObject { pseudo_values: vertex.clone(), late_color_attrib: None, trap_values: None };
            let kind = classify(&object, page, is_process_colorant);
            if kind == ObjectColorKind::None {
                Ok(vec![])
            } else {
                rebuild(&kind)
            }
        })
        .collect()
}

/// Step 8 fast path: the image's planes map one-to-one onto real
/// colorants (no photoink fan-out, no spot-to-process conversion), so
/// recombine only needs to relabel the store's plane order rather than
/// recompute samples.
pub fn rewrite_image_fast_path<S: ImageStoreSink>(
    store: &mut S,
    pseudo_plane_order: &[PseudoColorantIndex],
    page: &PageColorState,
    real_plane_order: &[ColorantIndex],
) -> DccResult<()> {
    let mapped: Vec<usize> = pseudo_plane_order
        .iter()
        .map(|p| {
            let ci = page.resolve_pseudo(*p).ok_or(DccError::Internal("unmapped pseudo-colorant in image plane"))?;
            real_plane_order
                .iter()
                .position(|&r| r == ci)
                .ok_or(DccError::Internal("image plane has no matching real colorant"))
        })
        .collect::<DccResult<_>>()?;
    store.store_reorder(&mapped)
}
