use std::path::PathBuf;
use std::process;

use anyhow::{ Context, Result };
use clap::Parser;

use phong_raycaster::consts::{ DEFAULT_WIDTH, DEFAULT_HEIGHT,
    DEFAULT_PPM_FILE, DEFAULT_BMP_FILE };
use phong_raycaster::parallel::RenderContext;
use phong_raycaster::scene::Scene;

/// Renders a scene of Phong-shaded spheres with shadows and writes it out as
/// PPM and BMP images.
#[derive(Parser, Debug)]
#[clap(author, version, about)]
struct Args {
    /// Image width in pixels [default: 800, or the scene file's width]
    #[clap(long)]
    width: Option<usize>,

    /// Image height in pixels [default: 600, or the scene file's height]
    #[clap(long)]
    height: Option<usize>,

    /// Number of render threads [default: available parallelism]
    #[clap(short, long)]
    threads: Option<usize>,

    /// JSON scene description; renders the built-in scene if omitted
    #[clap(short, long)]
    scene: Option<PathBuf>,

    /// Where to write the PPM image
    #[clap(long, default_value = DEFAULT_PPM_FILE)]
    ppm: PathBuf,

    /// Where to write the BMP image
    #[clap(long, default_value = DEFAULT_BMP_FILE)]
    bmp: PathBuf,
}

fn load_scene(args: &Args) -> Result<Scene> {
    let mut scene = match args.scene {
        Some(ref path) => Scene::load(path)
            .with_context(|| format!("Failed to load scene {}", path.display()))?,
        None => Scene::reference(DEFAULT_WIDTH, DEFAULT_HEIGHT),
    };

    if let Some(width) = args.width {
        scene.camera.width = width;
    }
    if let Some(height) = args.height {
        scene.camera.height = height;
    }

    scene.validate().context("Cannot render scene")?;

    Ok(scene)
}

fn thread_count(args: &Args) -> usize {
    args.threads.unwrap_or_else(|| {
        std::thread::available_parallelism()
            .map(|n| n.get())
            .unwrap_or(1)
    })
}

fn main() -> Result<()> {
    env_logger::Builder::new()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let args = Args::parse();

    log::info!("Raycaster with Phong lighting and shadows");

    let scene = load_scene(&args)?;
    let mut context = RenderContext::new(scene.world, scene.camera);
    context.render(thread_count(&args)).context("Render failed")?;

    let (ppm, bmp) = context.save_images(&args.ppm, &args.bmp);
    if ppm.is_err() || bmp.is_err() {
        process::exit(1);
    }

    log::info!("Done!");
    Ok(())
}
