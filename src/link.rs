//! Tagged-variant link dispatch, replacing the source's field-union
//! `CLINKfunctions` vtable (§9 Design Notes: "Union-of-variants for
//! link types").

use crate::dcilut::ContoneMask;
use crate::devicecode::{Channel, DeviceCodeLink, DeviceCodeLinkConfig};
use crate::nonintercept::NonInterceptLink;
use crate::preseparation::PreseparationLink;

/// One link in a color chain. The source dispatches through a
/// `CLINKfunctions` table keyed by `CLINKtype`; here the dispatch is
/// the match arm itself.
pub enum Link {
    DeviceCode(DeviceCodeLink),
    NonIntercept(NonInterceptLink),
    Preseparation(PreseparationLink),
}

impl Link {
    pub fn as_device_code(&self) -> Option<&DeviceCodeLink> {
        match self {
            Link::DeviceCode(link) => Some(link),
            _ => None,
        }
    }

    pub fn as_device_code_mut(&mut self) -> Option<&mut DeviceCodeLink> {
        match self {
            Link::DeviceCode(link) => Some(link),
            _ => None,
        }
    }

    pub fn as_non_intercept(&self) -> Option<&NonInterceptLink> {
        match self {
            Link::NonIntercept(link) => Some(link),
            _ => None,
        }
    }

    pub fn as_preseparation(&self) -> Option<&PreseparationLink> {
        match self {
            Link::Preseparation(link) => Some(link),
            _ => None,
        }
    }
}

/// Builds a device-code link from its config and the chain's resolved
/// channels, per §6's color-chain construction API: the config
/// selects the halftone-update variant and derives the black channel
/// instead of the caller setting them directly.
#[allow(clippy::too_many_arguments)]
pub fn make_devicecode_link(
    config: DeviceCodeLinkConfig,
    channels: Vec<Channel>,
    spot_no: u32,
    repro_type: u32,
    contone_mask: Option<ContoneMask>,
    is_halftoning: bool,
    is_trapping: bool,
    is_backdrop_raster_style: bool,
) -> Link {
    Link::DeviceCode(config.build_link(channels, spot_no, repro_type, contone_mask, is_halftoning, is_trapping, is_backdrop_raster_style))
}

pub fn make_nonintercept_link(link: NonInterceptLink) -> Link {
    Link::NonIntercept(link)
}

pub fn make_preseparation_link(link: PreseparationLink) -> Link {
    Link::Preseparation(link)
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::colorant::ColorantIndex;
    use crate::preseparation::PseudoColorantIndex;

    #[test]
    fn dispatch_matches_the_constructed_variant() {
        let link = make_preseparation_link(PreseparationLink {
            pseudo_colorant: PseudoColorantIndex(-2),
            spot_no: 0,
        });
        assert!(link.as_preseparation().is_some());
        assert!(link.as_device_code().is_none());
        let _ = ColorantIndex::Pseudo(-2);
    }
}
