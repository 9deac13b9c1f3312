//! Generates Rust bindings for the subset of `<linux/perf_event.h>` the
//! hardware-counter sampler needs: the `perf_event_attr` layout, the
//! hardware/cache event-id enums, the read-format flags, and the handful of
//! `PERF_EVENT_IOC_*` ioctl numbers used to enable/disable/reset a group.
//!
//! Unlike a general-purpose `perf_event_open` wrapper we don't need to track
//! every kernel ABI revision: these fields have been stable since the
//! counters subsystem landed, so a single bindgen pass against the build
//! host's system headers is enough.

use std::env;
use std::path::PathBuf;

use anyhow::{Context, Result};

const WRAPPER: &str = "
#include <linux/perf_event.h>

enum perf_ioc_ops {
    PERF_IOC_OP_ENABLE  = PERF_EVENT_IOC_ENABLE,
    PERF_IOC_OP_DISABLE = PERF_EVENT_IOC_DISABLE,
    PERF_IOC_OP_RESET   = PERF_EVENT_IOC_RESET,
};
";

fn main() -> Result<()> {
    #[cfg(not(any(target_os = "linux", target_os = "android")))]
    compile_error!("the hardware counter sampler only supports linux and android targets");

    let bindings = bindgen::Builder::default()
        .header_contents("wrapper.h", WRAPPER)
        .derive_default(true)
        .generate_comments(false)
        .prepend_enum_name(false)
        .translate_enum_integer_types(true)
        .allowlist_type("perf_event_attr")
        .allowlist_item("perf_type_id")
        .allowlist_item("perf_hw_id")
        .allowlist_item("perf_hw_cache_id")
        .allowlist_item("perf_hw_cache_op_id")
        .allowlist_item("perf_hw_cache_op_result_id")
        .allowlist_item("perf_event_read_format")
        .allowlist_item("perf_ioc_ops")
        .allowlist_item("PERF_IOC_FLAG_GROUP")
        .allowlist_item("PERF_FLAG_FD_CLOEXEC")
        .generate()
        .context("failed to generate perf_event_open bindings")?;

    let out = PathBuf::from(env::var("OUT_DIR").context("OUT_DIR not set")?);
    bindings
        .write_to_file(out.join("bindings.rs"))
        .context("failed to write generated bindings")?;

    println!("cargo:rerun-if-changed=build.rs");

    Ok(())
}
