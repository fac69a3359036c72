// Copyright 2026 the Hwoverlay Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Adds the `VideoCore` userland library directory to the link search path.

fn main() {
    println!("cargo:rerun-if-env-changed=VC_LIB_DIR");
    let dir = std::env::var("VC_LIB_DIR").unwrap_or_else(|_| "/opt/vc/lib".to_owned());
    println!("cargo:rustc-link-search=native={dir}");
}
