use std::io::Result;

use super::Opts;
use crate::event::EventConfig;
use crate::ffi::Attr;

/// Builds the `perf_event_attr` for a sibling event.
///
/// Siblings must share the group leader's `disabled` state and `read_format`
/// (the kernel rejects a group with mismatched sample types), so both are
/// copied straight from `leader_attr` instead of being configurable here.
pub(crate) fn from(event_cfg: EventConfig, opts: &Opts, leader_attr: &Attr) -> Result<Attr> {
    let mut attr = Attr {
        size: size_of::<Attr>() as _,
        ..Default::default()
    };

    attr.type_ = event_cfg.ty;
    attr.config = event_cfg.config;

    super::super::apply_exclude(&mut attr, &opts.exclude);

    attr.read_format = leader_attr.read_format;
    attr.set_disabled(leader_attr.disabled());

    Ok(attr)
}
