use std::io::Result;

use super::Opts;
use crate::event::EventConfig;
use crate::ffi::Attr;

pub(crate) fn from(event_cfg: EventConfig, opts: &Opts) -> Result<Attr> {
    let mut attr = Attr {
        size: size_of::<Attr>() as _,
        ..Default::default()
    };

    attr.type_ = event_cfg.ty;
    attr.config = event_cfg.config;

    super::apply_exclude(&mut attr, &opts.exclude);

    attr.read_format = opts.stat_format.as_read_format()?;
    attr.set_disabled(!opts.enable as _);

    Ok(attr)
}
