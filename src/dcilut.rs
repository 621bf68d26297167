//! DCILUT: the two-tier interpolation cache (C3).
//!
//! Per §9 Design Notes ("Reference-counted, interned tables → arena +
//! index"), the source's intrusive doubly-linked, refcounted DCILUT
//! list becomes a page-owned slab (`DcilutPool`) indexed by a
//! generation-checked handle (`DcilutHandle`), so a stale handle after
//! a slot is recycled is a catchable bug rather than a dangling
//! pointer.

use std::collections::HashMap;

use crate::color_value::ColorValue;
use crate::error::{DccError, DccResult};

/// Three slots identifying the transfer sub-link, two for calibration,
/// four for "device context" (spot number, colorant index, immediate-
/// repro flag, contone-mask value). Per §3 two sub-link chains compare
/// equal iff every slot matches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubLinkFingerprint {
    pub transfer: [u32; 3],
    pub calibration: [u32; 2],
    pub context: [u32; 4],
}

impl SubLinkFingerprint {
    /// The interning key the source computes as `XOR(all fingerprint
    /// slots)`, kept around for parity with the hash-cache `hash_slot`
    /// derivation even though `DcilutPool` itself interns by full
    /// equality via a `HashMap`.
    pub fn xor_hash(&self) -> u32 {
        self.transfer.iter().chain(&self.calibration).chain(&self.context).fold(0, |acc, &w| acc ^ w)
    }
}

/// A precomputed near-clear fixup: any interpolated output at or above
/// `threshold` is clamped to `replacement`, applied after
/// interpolation and before the result is stored in the hash cache.
#[derive(Debug, Clone, Copy)]
pub struct ContoneMask {
    pub threshold: ColorValue,
    pub replacement: ColorValue,
}

impl ContoneMask {
    fn apply(&self, v: ColorValue) -> ColorValue {
        if v.0 >= self.threshold.0 {
            self.replacement
        } else {
            v
        }
    }
}

struct HashCache {
    input: Box<[Option<ColorValue>]>,
    output: Box<[Box<[ColorValue]>]>,
}

impl HashCache {
    fn new(n_mapped: usize) -> Self {
        HashCache {
            input: vec![None; ColorValue::HASH_CACHE_SIZE].into_boxed_slice(),
            output: (0..ColorValue::HASH_CACHE_SIZE)
                .map(|_| vec![ColorValue::ZERO; n_mapped].into_boxed_slice())
                .collect(),
        }
    }

    fn lookup(&self, v: ColorValue) -> Option<&[ColorValue]> {
        let slot = v.hash_slot();
        match self.input[slot] {
            Some(key) if key == v => Some(&self.output[slot]),
            _ => None,
        }
    }

    fn store(&mut self, v: ColorValue, values: &[ColorValue]) {
        let slot = v.hash_slot();
        self.input[slot] = Some(v);
        self.output[slot].clone_from_slice(values);
    }
}

/// One DCILUT: a lazily populated 256-entry table per mapped output
/// colorant, plus an optional 1024-entry hash cache.
struct DcilutEntity {
    ref_count: u32,
    n_mapped_colorants: usize,
    fingerprint: SubLinkFingerprint,
    codes: Box<[Option<Box<[ColorValue]>>]>,
    cache: Option<HashCache>,
}

impl DcilutEntity {
    fn new(fingerprint: SubLinkFingerprint, n_mapped_colorants: usize, with_hash_cache: bool) -> Self {
        DcilutEntity {
            ref_count: 1,
            n_mapped_colorants,
            fingerprint,
            codes: vec![None; ColorValue::TABLE_SIZE].into_boxed_slice(),
            cache: if with_hash_cache { Some(HashCache::new(n_mapped_colorants)) } else { None },
        }
    }

    fn code_at(&mut self, index: usize, compute: &dyn Fn(f32) -> Vec<f32>) -> DccResult<&[ColorValue]> {
        if self.codes[index].is_none() {
            let x = index as f32 / (ColorValue::TABLE_SIZE - 1) as f32;
            let values = compute(x);
            if values.len() != self.n_mapped_colorants {
                return Err(DccError::Internal("compute callback returned wrong colorant count"));
            }
            let codes: Vec<ColorValue> = values.into_iter().map(ColorValue::from_unit_f32).collect();
            self.codes[index] = Some(codes.into_boxed_slice());
        }
        Ok(self.codes[index].as_ref().unwrap())
    }

    /// Interpolation algorithm from §4.3, run independently per mapped
    /// output colorant but sharing `hi_index`/`frac`.
    fn invoke(
        &mut self,
        v: ColorValue,
        contone_mask: Option<ContoneMask>,
        compute: &dyn Fn(f32) -> Vec<f32>,
    ) -> DccResult<Vec<ColorValue>> {
        if let Some(cache) = &self.cache {
            if let Some(hit) = cache.lookup(v) {
                return Ok(hit.to_vec());
            }
        }

        let (hi_index, frac) = v.table_index_and_fraction();
        let lo = self.code_at(hi_index, compute)?.to_vec();

        let mut result = if frac == 0 {
            lo
        } else {
            let hi = self.code_at((hi_index + 1).min(ColorValue::TABLE_SIZE - 1), compute)?.to_vec();
            lo.iter()
                .zip(&hi)
                .map(|(&l, &h)| {
                    let blended = (l.0 as u32 * (256 - frac) + h.0 as u32 * frac + 128) >> 8;
                    ColorValue(blended as u16)
                })
                .collect()
        };

        if let Some(mask) = contone_mask {
            for r in result.iter_mut() {
                *r = mask.apply(*r);
            }
        }

        if let Some(cache) = &mut self.cache {
            cache.store(v, &result);
        }

        Ok(result)
    }
}

/// Generation-checked index into a [`DcilutPool`]. Stale handles from
/// a previous occupant of the slot are rejected rather than silently
/// aliasing a different DCILUT.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DcilutHandle {
    index: usize,
    generation: u32,
}

/// Page-owned slab of DCILUTs, interned by [`SubLinkFingerprint`].
/// Replaces the source's intrusive doubly-linked refcounted list
/// (§9).
#[derive(Default)]
pub struct DcilutPool {
    slots: Vec<Option<DcilutEntity>>,
    generations: Vec<u32>,
    free: Vec<usize>,
    by_fingerprint: HashMap<SubLinkFingerprint, DcilutHandle>,
}

impl DcilutPool {
    pub fn new() -> Self {
        DcilutPool::default()
    }

    /// Reserves the DCILUT for `fingerprint`, creating it (with a
    /// `ref_count` of 1) if no live entity shares that fingerprint, or
    /// incrementing the existing one's `ref_count` otherwise. Per
    /// invariant 1 (§3), two live DCILUTs in the same pool never share
    /// a fingerprint.
    pub fn reserve(
        &mut self,
        fingerprint: SubLinkFingerprint,
        n_mapped_colorants: usize,
        with_hash_cache: bool,
    ) -> DccResult<DcilutHandle> {
        if let Some(&handle) = self.by_fingerprint.get(&fingerprint) {
            self.entity_mut(handle)?.ref_count += 1;
            return Ok(handle);
        }

        let entity = DcilutEntity::new(fingerprint, n_mapped_colorants, with_hash_cache);
        let handle = if let Some(index) = self.free.pop() {
            self.slots[index] = Some(entity);
            DcilutHandle { index, generation: self.generations[index] }
        } else {
            let index = self.slots.len();
            self.slots.push(Some(entity));
            self.generations.push(0);
            DcilutHandle { index, generation: 0 }
        };

        self.by_fingerprint.insert(fingerprint, handle);
        Ok(handle)
    }

    /// Drops one reference, freeing the slot (and bumping its
    /// generation so outstanding handles become invalid) once the
    /// count reaches zero.
    pub fn release(&mut self, handle: DcilutHandle) -> DccResult<()> {
        let fingerprint = {
            let entity = self.entity_mut(handle)?;
            entity.ref_count -= 1;
            if entity.ref_count > 0 {
                return Ok(());
            }
            entity.fingerprint
        };

        self.slots[handle.index] = None;
        self.generations[handle.index] += 1;
        self.free.push(handle.index);
        self.by_fingerprint.remove(&fingerprint);
        log::debug!("dcilut evicted: slot {} fingerprint {:?}", handle.index, fingerprint);
        Ok(())
    }

    pub fn invoke(
        &mut self,
        handle: DcilutHandle,
        v: ColorValue,
        contone_mask: Option<ContoneMask>,
        compute: &dyn Fn(f32) -> Vec<f32>,
    ) -> DccResult<Vec<ColorValue>> {
        self.entity_mut(handle)?.invoke(v, contone_mask, compute)
    }

    pub fn ref_count(&self, handle: DcilutHandle) -> DccResult<u32> {
        Ok(self.entity(handle)?.ref_count)
    }

    pub fn n_live(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    /// Invariant 4 (§8): the union of live fingerprints in the pool
    /// contains no duplicates. True by construction (`reserve` always
    /// consults `by_fingerprint` first), exposed for tests.
    pub fn fingerprints_are_unique(&self) -> bool {
        let mut seen = std::collections::HashSet::new();
        self.slots.iter().flatten().all(|e| seen.insert(e.fingerprint))
    }

    fn entity(&self, handle: DcilutHandle) -> DccResult<&DcilutEntity> {
        if self.generations.get(handle.index) != Some(&handle.generation) {
            return Err(DccError::Internal("stale DcilutHandle"));
        }
        self.slots[handle.index].as_ref().ok_or(DccError::Internal("stale DcilutHandle"))
    }

    fn entity_mut(&mut self, handle: DcilutHandle) -> DccResult<&mut DcilutEntity> {
        if self.generations.get(handle.index) != Some(&handle.generation) {
            return Err(DccError::Internal("stale DcilutHandle"));
        }
        self.slots[handle.index].as_mut().ok_or(DccError::Internal("stale DcilutHandle"))
    }
}
