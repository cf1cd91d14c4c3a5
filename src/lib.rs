//! Minimal OpenGL viewer: compiles a vertex/fragment shader pair, uploads a
//! mesh (built-in triangle or an STL model) once, and draws it every frame
//! with a look-at camera.
//!
//! The pure parts (camera math, mesh model, loaders, config) live in the
//! library so they can be tested without a GL context; everything touching
//! the GPU goes through [`rendering::Renderer`].

pub mod app;
pub mod camera;
pub mod config;
pub mod error;
pub mod loaders;
pub mod mesh;
pub mod rendering;
pub mod window;
