mod script;

use anyhow::Context;
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;
use walkthrough_kernel::{Displacement, Navigator, Obstruction, Settings, resolve, run};
use walkthrough_render::{DebugTextRenderer, FrameView, RenderView, Renderer};
use walkthrough_scene::{Scene, demo_scene, load_scene, load_scene_or_empty};

use script::{InputScript, OutputFormat, ScriptedHost};

#[derive(Parser)]
#[command(name = "walkthrough-cli", about = "Headless first-person walkthrough")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Walk through a scene with scripted input, one report line per frame
    Walk {
        /// Scene file (YAML); the built-in demo scene when omitted
        #[arg(long)]
        scene: Option<PathBuf>,
        /// Settings file (YAML)
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Number of frames to run
        #[arg(short, long, default_value = "60")]
        ticks: u64,
        /// Keys held for the whole walk, e.g. `--hold w --hold f`
        #[arg(long)]
        hold: Vec<String>,
        /// Timed key events (YAML list of {frame, key, pressed})
        #[arg(long)]
        script: Option<PathBuf>,
        /// Emit JSON lines instead of text
        #[arg(long)]
        json: bool,
        /// Dump the final frame with the text renderer
        #[arg(long)]
        render: bool,
    },
    /// Load a scene file strictly and summarise it
    CheckScene {
        path: PathBuf,
        /// Settings file (YAML), used for the spawn clearance check
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn load_settings(path: Option<&PathBuf>) -> anyhow::Result<Settings> {
    match path {
        Some(path) => Settings::load(path)
            .with_context(|| format!("loading settings from {}", path.display())),
        None => Ok(Settings::default()),
    }
}

fn walk(
    scene: &Scene,
    settings: Settings,
    ticks: u64,
    script: InputScript,
    format: OutputFormat,
    render: bool,
) -> anyhow::Result<()> {
    let mut navigator = Navigator::new(settings.navigation, settings.bindings, scene.spawn());
    let mut host = ScriptedHost::new(script, std::io::stdout().lock(), format);

    let frames = run(&mut navigator, scene, &mut host, Some(ticks));
    host.finish().context("writing frame reports")?;
    tracing::info!(frames, "walk finished");

    if render {
        let view = RenderView::from_pose(navigator.pose());
        let text = DebugTextRenderer::new().render(&FrameView {
            frame: navigator.frame(),
            scene,
            view: &view,
            highlights: navigator.highlights(),
        });
        print!("{text}");
    }
    Ok(())
}

/// What would cancel every move from the spawn point, if anything.
fn spawn_obstruction(scene: &Scene, clearance: f32) -> Option<Obstruction> {
    resolve(scene, scene.spawn().position, Displacement::ZERO, clearance).obstruction
}

fn check_scene(path: &Path, settings: &Settings) -> anyhow::Result<()> {
    let scene = load_scene(path).with_context(|| format!("checking {}", path.display()))?;
    let spawn = scene.spawn();
    println!(
        "{}: {} objects ({} hittable)",
        path.display(),
        scene.object_count(),
        scene.hittable_ids().len()
    );
    println!(
        "spawn: ({:.2}, {:.2}, {:.2}) yaw={:.3}",
        spawn.position.x, spawn.position.y, spawn.position.z, spawn.yaw
    );

    let clearance = settings.navigation.clearance;
    match spawn_obstruction(&scene, clearance) {
        Some(o) => println!(
            "warning: spawn is within clearance {clearance} of {} ({:.3}); every move will be cancelled",
            o.object, o.distance
        ),
        None => println!("spawn clearance: ok"),
    }

    for placed in scene.objects() {
        let p = placed.world_position;
        println!(
            "  [{}] {} {:?} at ({:.2}, {:.2}, {:.2})",
            placed.object.id.short(),
            placed.object.name,
            placed.object.tag,
            p.x,
            p.y,
            p.z
        );
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Info => {
            println!("walkthrough-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("input: {}", walkthrough_input::crate_info());
            println!("scene: {}", walkthrough_scene::crate_info());
            println!("kernel: {}", walkthrough_kernel::crate_info());
            println!("render: {}", walkthrough_render::crate_info());
            let settings = Settings::default();
            println!(
                "defaults: speed={} turn_rate={:.5} clearance={}",
                settings.navigation.speed,
                settings.navigation.turn_rate(),
                settings.navigation.clearance
            );
            for (key, action) in settings.bindings.iter() {
                println!("  {key:<10} {action:?}");
            }
        }
        Commands::Walk {
            scene,
            config,
            ticks,
            hold,
            script,
            json,
            render,
        } => {
            let settings = load_settings(config.as_ref())?;
            let scene = match scene {
                Some(path) => load_scene_or_empty(path),
                None => demo_scene(),
            };
            let script = match script {
                Some(path) => InputScript::load(&path)?,
                None => InputScript::default(),
            }
            .with_held(hold.as_slice());
            let format = if json {
                OutputFormat::Json
            } else {
                OutputFormat::Text
            };
            walk(&scene, settings, ticks, script, format, render)?;
        }
        Commands::CheckScene { path, config } => {
            let settings = load_settings(config.as_ref())?;
            check_scene(&path, &settings)?;
        }
    }

    Ok(())
}
