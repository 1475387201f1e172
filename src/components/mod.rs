mod comparison_slider;
mod tool_button;

pub use comparison_slider::{ComparisonSlider, split_at};
pub use tool_button::ToolButton;
