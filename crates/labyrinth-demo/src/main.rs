mod camera;
mod maze;
mod viewer;

use anyhow::Result;

use labyrinth_engine::assets::Assets;
use labyrinth_engine::config::DrawerConfig;
use labyrinth_engine::device::GpuInit;
use labyrinth_engine::logging::{LoggingConfig, init_logging};
use labyrinth_engine::window::{Runtime, RuntimeConfig};

use crate::maze::Maze;
use crate::viewer::MazeViewer;

fn main() -> Result<()> {
    init_logging(LoggingConfig::default());

    let maze = Maze::parse(maze::LAYOUT)?;
    log::info!("maze {}x{}", maze.width(), maze.depth());

    let drawer_config = DrawerConfig {
        assets: Assets::from_root(concat!(env!("CARGO_MANIFEST_DIR"), "/assets")),
        ..DrawerConfig::default()
    };

    Runtime::run(
        RuntimeConfig {
            title: "Labyrinth".to_string(),
            ..RuntimeConfig::default()
        },
        GpuInit::default(),
        drawer_config,
        MazeViewer::new(maze),
    )
}
