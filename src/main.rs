use std::path::PathBuf;
use std::sync::Arc;
use std::time::{ Duration, Instant };

use anyhow::Context;
use clap::Parser;

use phong_tracer::buffer::PixelBuffer;
use phong_tracer::consts::OUT_FILE;
use phong_tracer::parallel;
use phong_tracer::renderer::Renderer;
use phong_tracer::scene_file;

/// Renders a scene description to a PPM image.
#[derive(Parser)]
#[clap(author, version, about)]
struct Args {
    /// Path to the scene description JSON.
    scene: PathBuf,

    /// Where to write the rendered PPM image.
    #[clap(short, long, default_value = OUT_FILE)]
    output: PathBuf,

    /// Number of worker threads; 1 renders on the calling thread.
    #[clap(short, long, default_value_t = 1)]
    threads: usize,

    /// Overrides the scene's maximum reflection recursion depth.
    #[clap(short, long)]
    depth: Option<u32>,
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let args = Args::parse();

    let loaded = scene_file::load_scene(&args.scene)
        .with_context(|| format!("loading scene {:?}", args.scene))?;

    let depth = args.depth.unwrap_or(loaded.max_recursion_depth);
    let renderer = Arc::new(Renderer::new(
        Arc::new(loaded.scene),
        Arc::new(loaded.camera),
        depth,
    ));

    log::info!(
        "rendering {}x{} at recursion depth {} with {} thread(s)",
        loaded.width, loaded.height, depth, args.threads
    );

    let start = Instant::now();
    let buffer = if args.threads > 1 {
        parallel::parallel_render(&renderer, loaded.width, loaded.height,
            args.threads)
    } else {
        let mut buffer = PixelBuffer::new(loaded.width, loaded.height);
        renderer.render_with_progress(
            &mut buffer,
            Duration::from_secs(1),
            &mut || log::info!("still rendering, {:.1}s elapsed",
                start.elapsed().as_secs_f64()),
        );
        buffer
    };
    log::info!("rendered in {:.1}s", start.elapsed().as_secs_f64());

    buffer.save(&args.output)
        .with_context(|| format!("saving render to {:?}", args.output))?;
    log::info!("saved render to {:?}", args.output);

    Ok(())
}
