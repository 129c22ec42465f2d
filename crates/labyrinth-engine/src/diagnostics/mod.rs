//! On-demand diagnostics: device info dump and screenshots.

mod info;
mod screenshot;

pub use info::{format_device_info, write_device_info};
pub use screenshot::{next_screenshot_path, save_screenshot};
