//! artfetch library
//!
//! Gathers host information through per-platform probes and renders it
//! beside ASCII art in the terminal.

pub mod aggregator;
pub mod ascii;
pub mod cli;
pub mod collectors;
pub mod config;
pub mod data;
pub mod display;
pub mod error;
pub mod platform;
pub mod utils;

pub use aggregator::gather_info;
pub use ascii::ArtRepository;
pub use config::Config;
pub use data::InfoRecord;
pub use error::{FetchError, Result};
pub use platform::{Platform, PlatformContext};

/// Art key for a gathered record: the forced system, else one derived from the
/// platform. On Linux an exact match for the os-release id comes first, since
/// names like `Debian GNU/Linux` contain more than one key.
pub fn select_art_system(
    forced: Option<&str>,
    info: &InfoRecord,
    ctx: &PlatformContext,
    repo: &ArtRepository,
) -> String {
    if let Some(system) = forced.map(str::trim).filter(|s| !s.is_empty()) {
        return system.to_string();
    }

    match ctx.platform {
        Platform::Linux if !data::is_unknown(&info.distro_id) && repo.has_exact_art(&info.distro_id) => {
            info.distro_id.clone()
        }
        Platform::Linux if !data::is_unknown(&info.distro) && repo.has_art(&info.distro) => {
            info.distro.clone()
        }
        platform => platform.art_key().to_string(),
    }
}
