mod cli;

use std::path::PathBuf;

use bevy::log::{Level, LogPlugin};
use bevy::prelude::*;
use clap::Parser;
use ig_persistence::{list_presets, save_preset, save_settings};
use ig_world::{GenerationSettings, IgWorldPlugin, PipelineOutput, TerrainPipeline};

use crate::cli::CliArgs;

/// Arguments the app was launched with.
#[derive(Resource)]
struct LaunchArgs(CliArgs);

/// Whether generation should still run this launch.
#[derive(Resource, Debug, Default, Clone, Copy, PartialEq, Eq)]
enum LaunchState {
    #[default]
    Ready,
    Stopped,
}

/// Outcome of a completed generation.
#[derive(Resource, Debug)]
struct GenerationReport {
    seed: u32,
    saved_to: Option<PathBuf>,
}

fn main() -> AppExit {
    let args = CliArgs::parse();
    let level = if args.verbose { Level::DEBUG } else { Level::INFO };

    let mut app = build_app(args);
    app.add_plugins((
        MinimalPlugins,
        LogPlugin {
            level,
            ..default()
        },
    ));

    // One pass through the schedules is a full run.
    app.finish();
    app.cleanup();
    app.update();
    app.should_exit().unwrap_or(AppExit::Success)
}

fn build_app(args: CliArgs) -> App {
    let mut app = App::new();
    app.add_plugins(IgWorldPlugin)
        .insert_resource(LaunchArgs(args))
        .init_resource::<LaunchState>()
        .add_systems(
            Startup,
            (
                apply_launch_args,
                generate.run_if(resource_equals(LaunchState::Ready)),
            )
                .chain(),
        );
    app
}

fn apply_launch_args(
    args: Res<LaunchArgs>,
    mut settings: ResMut<GenerationSettings>,
    mut state: ResMut<LaunchState>,
    mut exit: EventWriter<AppExit>,
) {
    let args = &args.0;

    if args.list_presets {
        *state = LaunchState::Stopped;
        match list_presets(&args.presets_dir) {
            Ok(presets) if presets.is_empty() => {
                info!("No presets in {}", args.presets_dir.display());
                exit.send(AppExit::Success);
            }
            Ok(presets) => {
                for path in presets {
                    info!("{}", path.display());
                }
                exit.send(AppExit::Success);
            }
            Err(e) => {
                error!("Failed to list {}: {}", args.presets_dir.display(), e);
                exit.send(AppExit::error());
            }
        }
        return;
    }

    match args.resolve_settings() {
        Ok(resolved) => {
            if let Some(path) = &args.preset {
                info!("Loaded preset '{}' from {}", resolved.name, path.display());
            }
            *settings = resolved;
        }
        Err(e) => {
            error!("Failed to load settings: {}", e);
            *state = LaunchState::Stopped;
            exit.send(AppExit::error());
        }
    }
}

fn generate(
    mut commands: Commands,
    args: Res<LaunchArgs>,
    settings: Res<GenerationSettings>,
    mut exit: EventWriter<AppExit>,
) {
    let result = TerrainPipeline::new(&settings).and_then(|pipeline| {
        let output = pipeline.run()?;
        Ok((pipeline, output))
    });
    let (pipeline, output) = match result {
        Ok(done) => done,
        Err(e) => {
            error!("Generation failed: {}", e);
            exit.send(AppExit::error());
            return;
        }
    };
    log_summary(&output);

    let mut saved_to = None;
    if let Some(target) = &args.0.save {
        let mut used = pipeline.settings().clone();
        used.seed = pipeline.seed();
        let saved = match target {
            Some(path) => save_settings(path, &used).map(|()| path.clone()),
            None => save_preset(&args.0.presets_dir, &used),
        };
        match saved {
            Ok(path) => saved_to = Some(path),
            Err(e) => {
                error!("Failed to save settings: {}", e);
                exit.send(AppExit::error());
            }
        }
    }

    let report = GenerationReport {
        seed: pipeline.seed(),
        saved_to,
    };
    match &report.saved_to {
        Some(path) => info!("Finished seed {}, settings saved to {}", report.seed, path.display()),
        None => info!("Finished seed {}", report.seed),
    }
    commands.insert_resource(report);
}

fn log_summary(output: &PipelineOutput) {
    match output {
        PipelineOutput::Raster(buffer) => {
            let mut colors: Vec<_> = buffer.pixels().to_vec();
            colors.sort_unstable();
            colors.dedup();
            info!(
                "Raster {}x{} with {} distinct colors",
                buffer.size(),
                buffer.size(),
                colors.len()
            );
        }
        PipelineOutput::Voxels(terrain) => {
            for region in terrain.regions() {
                info!(
                    "{:>14}: {:>6} cells, {:>7} vertices",
                    region.name,
                    region.cell_count,
                    region.mesh.vertex_count()
                );
            }
            info!(
                "Voxel terrain: {} cells, {} vertices, {} triangles",
                terrain.total_cells(),
                terrain.total_vertex_count(),
                terrain.total_triangle_count()
            );
        }
    }
}
