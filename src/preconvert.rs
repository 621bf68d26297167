//! Preconvert (C9): color-converts across blend-space group
//! boundaries after recombine, emitting device colors.

use crate::error::{DccError, DccResult};

const OFTEN_TICK: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransparencyStrategy {
    One,
    Two,
}

/// The conversion method chosen once per group at group-close time so
/// every object in the group (vector or image) renders with no
/// visible seam, per §4.9.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversionMethod {
    TomsTables,
    InvokeBlock,
    OnTheFly,
    FastRgbToGray,
    FastRgbToCmyk,
}

/// Picks the conversion method for a group from its image geometry,
/// mirroring the source's "choose once at group close" rule: regular,
/// axis-aligned full-coverage images can use the cheap fast paths;
/// anything else falls back to tom's-tables or on-the-fly.
pub fn choose_conversion_method(
    has_images: bool,
    images_are_axis_aligned: bool,
    source_is_rgb: bool,
    dest_is_gray: bool,
    dest_is_cmyk: bool,
) -> ConversionMethod {
    if !has_images {
        return ConversionMethod::InvokeBlock;
    }
    if images_are_axis_aligned && source_is_rgb && dest_is_gray {
        return ConversionMethod::FastRgbToGray;
    }
    if images_are_axis_aligned && source_is_rgb && dest_is_cmyk {
        return ConversionMethod::FastRgbToCmyk;
    }
    if images_are_axis_aligned {
        ConversionMethod::TomsTables
    } else {
        ConversionMethod::OnTheFly
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreconvertAction {
    /// Converted now, in this pass.
    Converted,
    /// Left for an on-the-fly conversion during rendering.
    Deferred,
    /// Already device-space; only the progress counter moves.
    Skipped,
}

#[derive(Debug, Clone)]
pub struct DlObject {
    pub id: u32,
    pub is_device_color: bool,
    /// `None` for a direct-only region object (always preconverted
    /// now); `Some(strategy)` for a transparency-composited object,
    /// whose strategy decides whether it preconverts now or defers.
    pub transparency_strategy: Option<TransparencyStrategy>,
    pub pixel_area: u64,
}

#[derive(Debug)]
pub struct Group {
    pub children: Vec<Group>,
    pub objects: Vec<DlObject>,
}

/// Per-object decision for step "decide whether to preconvert now ...
/// or defer to on-the-fly conversion during rendering".
fn decide_action(object: &DlObject) -> PreconvertAction {
    if object.is_device_color {
        return PreconvertAction::Skipped;
    }
    match object.transparency_strategy {
        None => PreconvertAction::Converted,
        Some(TransparencyStrategy::One) => PreconvertAction::Converted,
        Some(TransparencyStrategy::Two) => PreconvertAction::Deferred,
    }
}

/// Walks `group`'s children before `group` itself (the ordering
/// guarantee of §4.9), calling `convert` for every object that is
/// preconverted now. Returns the per-object actions in the same
/// pre-order the objects were visited, for progress accounting.
pub fn preconvert_group(
    group: &Group,
    convert: &dyn Fn(&DlObject) -> DccResult<()>,
    progress: &mut u64,
    interrupt: &dyn Fn() -> bool,
) -> DccResult<Vec<(u32, PreconvertAction)>> {
    let mut results = Vec::new();
    for child in &group.children {
        results.extend(preconvert_group(child, convert, progress, interrupt)?);
    }

    for (i, object) in group.objects.iter().enumerate() {
        if i % OFTEN_TICK == 0 && interrupt() {
            log::warn!("preconvert_group interrupted after {i} objects in this group");
            return Err(DccError::Interrupt);
        }
        let action = decide_action(object);
        if action == PreconvertAction::Converted {
            convert(object)?;
        }
        *progress += 1 + object.pixel_area;
        results.push((object.id, action));
    }

    Ok(results)
}

pub fn preconvert_dl(
    root: &Group,
    _strategy: TransparencyStrategy,
    convert: &dyn Fn(&DlObject) -> DccResult<()>,
    interrupt: &dyn Fn() -> bool,
) -> DccResult<Vec<(u32, PreconvertAction)>> {
    log::debug!("preconvert_dl: entering group tree");
    let mut progress = 0u64;
    let result = preconvert_group(root, convert, &mut progress, interrupt);
    log::debug!("preconvert_dl: progress counter at {progress}");
    result
}
