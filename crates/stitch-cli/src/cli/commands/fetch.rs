//! `stitch <url> [dir]` – download every segment of a playlist and merge them.

use anyhow::Result;
use std::io::{self, Write};
use stitch_core::config::StitchConfig;
use stitch_core::engine::{Progress, SegmentState};
use stitch_core::fetch::CurlFetcher;
use stitch_core::registry::JobRegistry;
use stitch_core::session::{Session, SessionEvent, SessionOptions};

use crate::cli::FetchArgs;

pub fn run_fetch(registry: &mut JobRegistry, cfg: &StitchConfig, args: FetchArgs) -> Result<()> {
    let Some(url) = args.url else {
        anyhow::bail!("a manifest URL is required");
    };

    let mut options = SessionOptions::from_config(cfg);
    if let Some(dir) = args.output_dir {
        options.output_dir = dir;
    }
    if let Some(tool) = args.remux_tool {
        options.remux_tool = tool;
    }
    options.overwrite = args.overwrite;

    let fetcher = CurlFetcher::from_config(&cfg.fetch);
    let outcome = Session::new(fetcher, registry, options).run(
        &url,
        args.working_dir.as_deref(),
        print_event,
    )?;

    println!("Merge was successful");
    println!("Video saved at {}", outcome.output.display());
    if let Some(err) = outcome.cleanup_error {
        eprintln!("warning: could not clean up job {}: {}", outcome.job.working_dir, err);
    }
    Ok(())
}

fn print_event(event: SessionEvent<'_>) {
    match event {
        SessionEvent::JobOpened { working_dir, .. } => {
            println!("Working directory: {}", working_dir.display());
        }
        SessionEvent::ManifestParsed { segments } => {
            println!("Playlist has {segments} segment(s)");
        }
        SessionEvent::Progress(p) => print_progress(p),
        SessionEvent::Merging { output } => {
            println!("Merging into {}", output.display());
        }
        SessionEvent::ToolOutput(line) => println!("{line}"),
    }
}

fn print_progress(p: &Progress) {
    print!(
        "\r  Downloading {:>5.1}%  ({}/{})  ",
        p.percent, p.completed, p.total
    );
    let _ = io::stdout().flush();
    if p.is_done() || p.state == SegmentState::Failed {
        println!();
    }
}
