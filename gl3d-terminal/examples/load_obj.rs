/// Example: Load and render an OBJ file in the terminal
///
/// Usage: cargo run --example load_obj -- path/to/file.obj
use anyhow::Result;
use gl3d_core::{ViewConfig, Vec3};
use gl3d_terminal::{framing_camera, load_mesh_or_cube, TerminalApp};
use std::env;
use std::path::PathBuf;

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();

    let path = args.get(1).map(PathBuf::from);
    if path.is_none() {
        eprintln!("Usage: {} <obj-file>", args[0]);
        eprintln!("\nNo OBJ file provided, using default cube...");
    }

    let mesh = load_mesh_or_cube(path.as_deref())?;
    println!("Loaded {} vertices, {} faces", mesh.vertex_count(), mesh.face_count());
    if let Some((min, max)) = mesh.bounds() {
        let size: Vec3 = max.sub(min);
        println!("Bounds: {:.2} x {:.2} x {:.2}", size.x, size.y, size.z);
    }
    println!("Starting terminal renderer (press Esc to quit)...");
    std::thread::sleep(std::time::Duration::from_secs(1));

    let config = ViewConfig::default();
    let camera = framing_camera(&mesh, &config);
    TerminalApp::new(mesh, &config)?.with_camera(camera).run()
}
