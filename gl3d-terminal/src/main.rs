/// GL3D Terminal Demo - Rotating Mesh
///
/// Usage: gl3d-terminal [path/to/mesh.obj]
///
/// Renders the OBJ file (or a cube) in the terminal. A `gl3d.toml` in the
/// working directory overrides the view settings; without it the camera
/// frames the mesh. With `RUST_LOG` set, logs go to `gl3d-terminal.log`.
///
/// Controls:
///   - WASD / Q / E: Move the camera, +/-: Zoom
///   - Mouse drag: Look around
///   - Arrow keys: Rotate the mesh, R: Toggle spin
///   - P: Toggle projection, C: Toggle first/third person
///   - ESC / Ctrl+C: Quit
use anyhow::Result;
use gl3d_core::ViewConfig;
use gl3d_terminal::{framing_camera, init_logging, load_config, load_mesh_or_cube, LoggingConfig, TerminalApp};
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    init_logging(LoggingConfig {
        log_file: std::env::var_os("RUST_LOG").map(|_| PathBuf::from("gl3d-terminal.log")),
        ..LoggingConfig::default()
    });

    let mesh_path = std::env::args_os().nth(1).map(PathBuf::from);
    let mesh = load_mesh_or_cube(mesh_path.as_deref())?;

    let app = match load_config(Path::new("gl3d.toml"))? {
        Some(config) => TerminalApp::new(mesh, &config)?,
        None => {
            let config = ViewConfig::default();
            let camera = framing_camera(&mesh, &config);
            TerminalApp::new(mesh, &config)?.with_camera(camera)
        }
    };

    app.run()?;

    println!("Thank you for using GL3D Terminal!");
    Ok(())
}
