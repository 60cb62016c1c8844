//! Headless streaming driver: walks a camera across the world, streams
//! chunks in and out around it, applies raycast edits, and drains the
//! rebuild stack once per tick.

mod config;

use std::error::Error;
use std::path::PathBuf;

use clap::Parser;

use crate::config::EngineConfig;
use karst_blocks::{Block, BlockPalette};
use karst_edit::raycast_first_hit;
use karst_geom::Vec3;
use karst_runtime::ChunkManager;
use karst_world::{ChunkCoord, World, WorldGenMode};

/// Rebuild budget per tick. Streaming floods the stack on startup and after
/// large camera jumps; everything above the budget waits for the next tick.
const MAX_REBUILDS_PER_TICK: usize = 64;

#[derive(Parser, Debug)]
#[command(name = "karst", about = "Voxel chunk streaming and greedy meshing, headless")]
struct Args {
    /// Engine config TOML; built-in defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Ticks to simulate.
    #[arg(long, default_value_t = 240)]
    ticks: u32,
    /// Override the horizontal streaming radius, in chunks.
    #[arg(long)]
    radius: Option<i32>,
    /// Override the world seed.
    #[arg(long)]
    seed: Option<i32>,
    /// Use a flat stone world of this thickness instead of terrain.
    #[arg(long)]
    flat: Option<i32>,
    /// Camera speed in blocks per tick.
    #[arg(long, default_value_t = 0.75)]
    speed: f32,
}

fn main() -> Result<(), Box<dyn Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let mut cfg = match &args.config {
        Some(path) => EngineConfig::from_path(path)?,
        None => EngineConfig::default(),
    };
    if let Some(r) = args.radius {
        cfg.radius_xz = r;
    }
    if let Some(s) = args.seed {
        cfg.seed = s;
    }

    let palette = match cfg.palette.as_deref() {
        Some(path) => BlockPalette::from_path(path).unwrap_or_else(|e| {
            // degraded, not fatal: colors only matter to a renderer
            log::warn!("palette {path:?} unusable ({e}); using built-in colors");
            BlockPalette::default()
        }),
        None => BlockPalette::default(),
    };

    let mode = match args.flat {
        Some(thickness) => WorldGenMode::Flat { thickness },
        None => WorldGenMode::Normal,
    };
    let world = World::new(cfg.chunk_dim, cfg.seed, mode, cfg.r#gen.clone());
    let mut mgr = ChunkManager::new(cfg.pool_capacity, cfg.chunk_dim);

    log::info!(
        "world seed {} | chunk dim {} | pool {} | radius {}x{}",
        cfg.seed,
        cfg.chunk_dim,
        cfg.pool_capacity,
        cfg.radius_xz,
        cfg.radius_y
    );

    let mut cam = Vec3::new(0.5, (world.height_at(0, 0) + 12) as f32, 0.5);
    let mut place_types = Block::SOLID.into_iter().cycle();
    let mut rebuilt_total = 0usize;
    let mut edits_total = 0usize;

    for tick in 0..args.ticks {
        cam.x += args.speed;
        let center = ChunkCoord::of_world(
            cam.x.floor() as i32,
            cam.y.floor() as i32,
            cam.z.floor() as i32,
            cfg.chunk_dim,
        );
        let stats = mgr.stream_around(&world, center, cfg.radius_xz, cfg.radius_y);

        // Every few ticks aim down-forward and edit whatever the ray finds,
        // alternating removal and placement.
        if tick % 6 == 0 {
            let dir = Vec3::new(0.4, -1.0, 0.15).normalized();
            if let Some(hit) = raycast_first_hit(cam, dir, 64.0, |x, y, z| mgr.is_solid_at(x, y, z))
            {
                let applied = if tick % 12 == 0 {
                    mgr.remove_block_at(hit.bx, hit.by, hit.bz)
                } else {
                    let block = place_types.next().unwrap_or(Block::Grass);
                    match mgr.place_block_at(hit.px, hit.py, hit.pz, block) {
                        Ok(placed) => placed,
                        Err(e) => {
                            log::warn!("placement dropped: {e}");
                            false
                        }
                    }
                };
                if applied {
                    edits_total += 1;
                }
            }
        }

        let rebuilt = mgr.process_rebuilds(MAX_REBUILDS_PER_TICK);
        rebuilt_total += rebuilt;

        log::debug!(
            target: "frame",
            "tick {tick}: center ({}, {}, {}) +{} -{} deferred {} rebuilt {}",
            center.cx,
            center.cy,
            center.cz,
            stats.loaded,
            stats.unloaded,
            stats.skipped,
            rebuilt
        );
        if tick % 30 == 0 {
            log::info!(
                target: "frame",
                "tick {tick}: {} visible, {} retained, pool {}/{}, rebuilt {} so far",
                mgr.visible_count(),
                mgr.unloaded_count(),
                mgr.allocated_chunks(),
                mgr.pool_capacity(),
                rebuilt_total
            );
        }
    }

    // drain whatever the last tick left behind
    while mgr.has_pending_rebuilds() {
        rebuilt_total += mgr.process_rebuilds(MAX_REBUILDS_PER_TICK);
    }

    log::info!(
        "done: {} ticks, {} rebuilds, {} edits, {} visible chunks, {} retained",
        args.ticks,
        rebuilt_total,
        edits_total,
        mgr.visible_count(),
        mgr.unloaded_count()
    );
    for block in Block::SOLID {
        let vertices: usize = mgr
            .visible_chunks()
            .filter_map(|c| c.mesh(block))
            .map(|m| m.vertex_count())
            .sum();
        let color = palette.color(block);
        log::info!(
            "  {:<5} {:>9} vertices  (rgb {:.2} {:.2} {:.2})",
            block.name(),
            vertices,
            color.r,
            color.g,
            color.b
        );
    }
    Ok(())
}
