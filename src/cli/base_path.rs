//! Base-path command - print where hashed assets are served from
//!
//! ecverify base-path [--base P] [--assets-prefix P] [--assets-dir D]

use ecverify::validate::{asset_base_path, SiteConfig};

pub fn run(site: SiteConfig) {
    println!("{}", asset_base_path(&site));
}
