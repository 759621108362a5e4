//! `scalepad resources` – list resource names and their API paths.

use scalepad_core::ResourceKind;

pub fn run_resources() {
    println!("{:<16} {}", "NAME", "PATH");
    for kind in ResourceKind::ALL {
        println!("{:<16} {}", kind.name(), kind.base_path());
    }
}
