use stlview::app;
use stlview::config::{CameraConfig, CliArgs, ViewerConfig};
use stlview::error::ViewerError;
use stlview::loaders::{self, MeshSource};
use stlview::rendering::ShaderPair;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let args = match CliArgs::parse(std::env::args().skip(1)) {
        Ok(args) => args,
        Err(e) => {
            eprintln!("{e}");
            eprintln!("{}", CliArgs::USAGE);
            std::process::exit(2);
        }
    };
    if args.help {
        println!("{}", CliArgs::USAGE);
        return;
    }

    if let Err(e) = run(args) {
        log::error!("{e}");
        std::process::exit(1);
    }
}

fn run(args: CliArgs) -> Result<(), ViewerError> {
    let mut config = match &args.config {
        Some(path) => ViewerConfig::load(path)?,
        None => ViewerConfig::default(),
    };
    let source = args.mesh_source();
    if args.config.is_none() && source == MeshSource::Triangle {
        config.camera = CameraConfig::triangle_demo();
    }
    config.apply_cli(&args);

    if args.mesh.is_none() && !args.triangle {
        log::info!("no mesh file given, showing the built-in triangle");
    }
    let mesh = loaders::load(&source)?;
    let shaders = shader_sources(&config, &source)?;

    app::run(config, mesh, shaders)
}

/// Explicit shader paths are read from disk; otherwise the built-in pair
/// matching the mesh source is used (flat for the triangle, Phong for
/// models).
fn shader_sources(config: &ViewerConfig, source: &MeshSource) -> Result<ShaderPair, ViewerError> {
    match (&config.vertex_shader, &config.fragment_shader) {
        (Some(vertex), Some(fragment)) => ShaderPair::from_files(vertex, fragment),
        (None, None) => Ok(match source {
            MeshSource::Triangle => ShaderPair::flat(),
            MeshSource::Stl(_) => ShaderPair::phong(),
        }),
        _ => Err(ViewerError::Config(
            "vertex and fragment shader paths must be given together".into(),
        )),
    }
}
