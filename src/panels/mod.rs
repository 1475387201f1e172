mod central_panel;
mod layers_panel;
mod prompt_panel;
mod status_bar;
mod tools_panel;

pub use central_panel::central_panel;
pub use layers_panel::layers_panel;
pub use prompt_panel::prompt_panel;
pub use status_bar::status_bar;
pub use tools_panel::tools_panel;
