#![warn(clippy::all, rust_2018_idioms)]

pub mod app;
pub mod caption;
pub mod capture;
pub mod components;
pub mod compositor;
pub mod config;
pub mod document;
pub mod editor;
pub mod error;
pub mod export;
pub mod generation;
pub mod geometry;
pub mod history;
pub mod id_generator;
pub mod input;
pub mod layer;
pub mod panels;
pub mod perspective;
pub mod prompt_assist;
pub mod prompts;
pub mod raster;
pub mod renderer;
pub mod session;
pub mod shape;
pub mod snap;
pub mod state;
pub mod style;
pub mod text;
pub mod tool;
pub mod tool_options;
pub mod util;
pub mod view;

pub use app::SketchApp;
pub use config::AppConfig;
pub use document::Document;
pub use editor::Editor;
pub use history::History;
pub use input::{InputEvent, InputLocation};
pub use layer::{Layer, LayerId, LayerStore};
pub use renderer::Renderer;
pub use shape::{Shape, ShapeId, ShapeKind};
pub use tool::ToolKind;
