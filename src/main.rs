//! CLI front end: run one fetch, report the payload, write it to disk.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::mpsc;

use anyhow::{bail, Context, Result};

use meowfetch::{codec, progress, FetchConfig, FetchPipeline, TokenSlot};

fn main() -> Result<()> {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let first = args.next();

    if first.as_deref() == Some("--progress-preview") {
        let output = args
            .next()
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("progress.gif"));
        return write_progress_preview(&output);
    }

    let output = first
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("cat.gif"));

    let mut config = FetchConfig::default();
    if let Ok(endpoint) = std::env::var("MEOWFETCH_ENDPOINT") {
        config.endpoint = endpoint;
    }

    let pipeline = FetchPipeline::new(config);
    let slot = TokenSlot::new();
    let (tx, rx) = mpsc::channel();

    let token = pipeline.start(tx);
    slot.make_current(&token);

    let reply = rx.recv().context("fetch worker disappeared")?;
    if !slot.is_current(&reply.token) {
        bail!("stale fetch reply");
    }

    let Some(result) = reply.result else {
        bail!("Failed.");
    };

    println!(
        "{} KB in {} s ({} frames, {:?} loop)",
        result.formatted_loading_size(),
        result.estimated_loading_time() as u64,
        result.archived.frame_count(),
        result.archived.duration(),
    );

    fs::write(&output, result.archived.bytes())
        .with_context(|| format!("writing {}", output.display()))?;

    // Keep the untouched download next to the optimized one; it is the
    // payload a share/upload step would send.
    let original_path = output.with_extension("orig.gif");
    fs::write(&original_path, &result.original_bytes)
        .with_context(|| format!("writing {}", original_path.display()))?;

    println!("wrote {} and {}", output.display(), original_path.display());
    Ok(())
}

fn write_progress_preview(output: &Path) -> Result<()> {
    let animation = progress::progress_bar_animation((144, 2), progress::DEFAULT_FRAME_COUNT)?;
    let archived = codec::encode(&animation)?;
    fs::write(output, archived.bytes())
        .with_context(|| format!("writing {}", output.display()))?;
    println!("wrote {}", output.display());
    Ok(())
}
