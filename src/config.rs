use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ViewerError;
use crate::loaders::MeshSource;

/// Viewer settings, loadable from a JSON file. Command line flags override
/// whatever the file (or the defaults) provide.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub clear_color: [f32; 4],
    /// Paths to shader sources on disk; when absent the built-in pair for
    /// the mesh source is used.
    pub vertex_shader: Option<PathBuf>,
    pub fragment_shader: Option<PathBuf>,
    pub camera: CameraConfig,
    pub light_position: [f32; 3],
    pub light_color: [f32; 3],
    pub object_color: [f32; 3],
    /// Optional fixed delay per frame, on top of vsync.
    pub frame_delay_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    pub position: [f32; 3],
    pub target: [f32; 3],
    pub up: [f32; 3],
    pub fov_y_deg: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            width: 1920,
            height: 1080,
            title: "STL Viewer".into(),
            clear_color: [0.1, 0.1, 0.1, 1.0],
            vertex_shader: None,
            fragment_shader: None,
            camera: CameraConfig::default(),
            light_position: [10.0, 0.0, 0.0],
            light_color: [1.0, 1.0, 1.0],
            object_color: [0.0, 1.0, 0.0],
            frame_delay_ms: None,
        }
    }
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            position: [20.0, 20.0, 20.0],
            target: [0.0, 0.0, 0.0],
            up: [0.0, 0.0, 1.0],
            fov_y_deg: 45.0,
            z_near: 0.1,
            z_far: 200.0,
        }
    }
}

impl CameraConfig {
    /// Close-up camera for the unit-sized triangle demo; the regular
    /// default is framed for model-scale meshes.
    pub fn triangle_demo() -> Self {
        Self {
            position: [0.0, 0.0, 2.0],
            up: [0.0, 1.0, 0.0],
            ..Self::default()
        }
    }
}

impl ViewerConfig {
    pub fn load(path: &Path) -> Result<Self, ViewerError> {
        let text = fs::read_to_string(path).map_err(|e| {
            ViewerError::Config(format!("failed to read config {}: {e}", path.display()))
        })?;
        serde_json::from_str(&text).map_err(|e| {
            ViewerError::Config(format!("failed to parse config {}: {e}", path.display()))
        })
    }

    pub fn apply_cli(&mut self, args: &CliArgs) {
        if let Some(width) = args.width {
            self.width = width;
        }
        if let Some(height) = args.height {
            self.height = height;
        }
        if let Some(fov) = args.fov {
            self.camera.fov_y_deg = fov;
        }
        if let Some(path) = &args.vertex_shader {
            self.vertex_shader = Some(path.clone());
        }
        if let Some(path) = &args.fragment_shader {
            self.fragment_shader = Some(path.clone());
        }
    }

    pub fn aspect(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }
}

/// Parsed command line. One optional positional argument names an STL file;
/// without it (or with `--triangle`) the built-in triangle demo runs.
#[derive(Debug, Default)]
pub struct CliArgs {
    pub mesh: Option<PathBuf>,
    pub triangle: bool,
    pub config: Option<PathBuf>,
    pub width: Option<u32>,
    pub height: Option<u32>,
    pub fov: Option<f32>,
    pub vertex_shader: Option<PathBuf>,
    pub fragment_shader: Option<PathBuf>,
    pub help: bool,
}

impl CliArgs {
    pub const USAGE: &'static str = "\
usage: stlview [OPTIONS] [MODEL.stl]

  MODEL.stl            STL file to display (default: built-in triangle)
  --triangle           force the built-in triangle demo
  --config <path>      JSON config file
  --width <pixels>     window width
  --height <pixels>    window height
  --fov <degrees>      vertical field of view
  --vert <path>        vertex shader source file
  --frag <path>        fragment shader source file
  -h, --help           show this help";

    pub fn parse<I: IntoIterator<Item = String>>(args: I) -> Result<Self, ViewerError> {
        let mut parsed = Self::default();
        let mut it = args.into_iter();

        fn value(
            it: &mut impl Iterator<Item = String>,
            flag: &str,
        ) -> Result<String, ViewerError> {
            it.next()
                .ok_or_else(|| ViewerError::Config(format!("missing value for {flag}")))
        }

        while let Some(arg) = it.next() {
            match arg.as_str() {
                "--triangle" => parsed.triangle = true,
                "--config" => parsed.config = Some(PathBuf::from(value(&mut it, "--config")?)),
                "--width" => {
                    let v = value(&mut it, "--width")?;
                    parsed.width = Some(v.parse().map_err(|_| {
                        ViewerError::Config(format!("invalid --width value '{v}'"))
                    })?);
                }
                "--height" => {
                    let v = value(&mut it, "--height")?;
                    parsed.height = Some(v.parse().map_err(|_| {
                        ViewerError::Config(format!("invalid --height value '{v}'"))
                    })?);
                }
                "--fov" => {
                    let v = value(&mut it, "--fov")?;
                    parsed.fov = Some(v.parse().map_err(|_| {
                        ViewerError::Config(format!("invalid --fov value '{v}'"))
                    })?);
                }
                "--vert" => {
                    parsed.vertex_shader = Some(PathBuf::from(value(&mut it, "--vert")?));
                }
                "--frag" => {
                    parsed.fragment_shader = Some(PathBuf::from(value(&mut it, "--frag")?));
                }
                "-h" | "--help" => parsed.help = true,
                other if other.starts_with('-') => {
                    return Err(ViewerError::Config(format!("unknown option '{other}'")));
                }
                other => {
                    if parsed.mesh.is_some() {
                        return Err(ViewerError::Config(
                            "only one mesh file may be given".into(),
                        ));
                    }
                    parsed.mesh = Some(PathBuf::from(other));
                }
            }
        }

        if parsed.triangle && parsed.mesh.is_some() {
            return Err(ViewerError::Config(
                "--triangle and a mesh file are mutually exclusive".into(),
            ));
        }
        Ok(parsed)
    }

    pub fn mesh_source(&self) -> MeshSource {
        match &self.mesh {
            Some(path) if !self.triangle => MeshSource::Stl(path.clone()),
            _ => MeshSource::Triangle,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<CliArgs, ViewerError> {
        CliArgs::parse(args.iter().map(|s| s.to_string()))
    }

    #[test]
    fn defaults_match_the_original_viewer() {
        let config = ViewerConfig::default();
        assert_eq!((config.width, config.height), (1920, 1080));
        assert_eq!(config.camera.up, [0.0, 0.0, 1.0]);
        assert_eq!(config.object_color, [0.0, 1.0, 0.0]);
    }

    #[test]
    fn partial_config_file_fills_in_defaults() {
        let config: ViewerConfig =
            serde_json::from_str(r#"{ "width": 800, "camera": { "fov_y_deg": 60.0 } }"#).unwrap();
        assert_eq!(config.width, 800);
        assert_eq!(config.height, 1080);
        assert_eq!(config.camera.fov_y_deg, 60.0);
        assert_eq!(config.camera.z_far, 200.0);
    }

    #[test]
    fn cli_overrides_config_values() {
        let args = parse(&["--width", "640", "--height", "480", "--fov", "90"]).unwrap();
        let mut config = ViewerConfig::default();
        config.apply_cli(&args);
        assert_eq!((config.width, config.height), (640, 480));
        assert_eq!(config.camera.fov_y_deg, 90.0);
    }

    #[test]
    fn positional_argument_selects_an_stl_source() {
        let args = parse(&["teapot.stl"]).unwrap();
        assert_eq!(args.mesh_source(), MeshSource::Stl(PathBuf::from("teapot.stl")));
        assert_eq!(parse(&[]).unwrap().mesh_source(), MeshSource::Triangle);
        assert_eq!(parse(&["--triangle"]).unwrap().mesh_source(), MeshSource::Triangle);
    }

    #[test]
    fn bad_arguments_are_rejected() {
        assert!(parse(&["--width", "abc"]).is_err());
        assert!(parse(&["--nonsense"]).is_err());
        assert!(parse(&["a.stl", "b.stl"]).is_err());
        assert!(parse(&["--triangle", "a.stl"]).is_err());
        assert!(parse(&["--config"]).is_err());
    }
}
