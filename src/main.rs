use artfetch::cli::{init_logging, Cli};
use artfetch::config::{load_config, resolve_ascii_dir};
use artfetch::{display, gather_info, select_art_system, ArtRepository, InfoRecord, PlatformContext};
use clap::Parser;
use std::io::{self, Write};
use std::panic::{self, AssertUnwindSafe};
use tracing::{debug, error};

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = load_config(cli.config.as_deref());
    let repo = ArtRepository::new(resolve_ascii_dir(cli.ascii_dir.as_deref(), &config));

    let stdout = io::stdout();
    let mut out = stdout.lock();

    if cli.list_systems {
        for system in repo.list_available_systems() {
            if writeln!(out, "{}", system).is_err() {
                break;
            }
        }
        return;
    }

    let ctx = PlatformContext::detect();
    debug!(platform = %ctx.platform, arch = %ctx.arch, "detected platform");

    let mut info = panic::catch_unwind(AssertUnwindSafe(|| gather_info(&ctx))).unwrap_or_else(|_| {
        error!("gathering system information panicked, showing an empty report");
        InfoRecord::unknown(&ctx)
    });

    if let Some(name) = cli.name.as_deref().map(str::trim).filter(|name| !name.is_empty()) {
        info.hostname = name.to_string();
    }

    let system = select_art_system(cli.system.as_deref(), &info, &ctx, &repo);
    debug!(system = %system, dir = %repo.dir().display(), "selected art");
    let art = repo.get_art(&system);

    for line in display::render(&info, &art, &config, &ctx) {
        if let Err(err) = writeln!(out, "{}", line) {
            debug!(error = %err, "stdout closed");
            break;
        }
    }
    let _ = write!(out, "\x1b[0m");
    let _ = out.flush();
}
