use std::fmt::Write as _;
use std::path::Path;

use anyhow::{Context, Result};

use crate::gfx::DeviceInfo;

/// Plain-text report of the graphics device.
pub fn format_device_info(info: &DeviceInfo) -> String {
    let mut out = String::new();
    // Writing into a String cannot fail.
    let _ = writeln!(out, "Graphics Info");
    let _ = writeln!(out, "Version: {}", info.version);
    let _ = writeln!(out, "Shading Language: {}", info.shading_language);
    let _ = writeln!(out, "Renderer: {}", info.renderer);
    let _ = writeln!(out, "Vendor: {}", info.vendor);
    let _ = writeln!(out, "Extensions: {}", info.extensions.join(" "));
    out
}

/// Overwrites `path` with the device report.
pub fn write_device_info(path: &Path, info: &DeviceInfo) -> Result<()> {
    std::fs::write(path, format_device_info(info))
        .with_context(|| format!("failed to write {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info() -> DeviceInfo {
        DeviceInfo {
            version: "wgpu Vulkan".into(),
            shading_language: "WGSL".into(),
            renderer: "Test GPU".into(),
            vendor: "0x1234".into(),
            extensions: vec!["DEPTH_CLIP_CONTROL".into(), "FLOAT32_FILTERABLE".into()],
        }
    }

    #[test]
    fn report_lists_every_field() {
        let text = format_device_info(&info());
        assert_eq!(
            text,
            "Graphics Info\n\
             Version: wgpu Vulkan\n\
             Shading Language: WGSL\n\
             Renderer: Test GPU\n\
             Vendor: 0x1234\n\
             Extensions: DEPTH_CLIP_CONTROL FLOAT32_FILTERABLE\n"
        );
    }

    #[test]
    fn write_overwrites_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("glinfo.txt");
        std::fs::write(&path, "stale contents that are longer than the report itself ....").unwrap();

        write_device_info(&path, &info()).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("Graphics Info\n"));
        assert!(!text.contains("stale"));
    }

    #[test]
    fn unwritable_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing").join("glinfo.txt");
        assert!(write_device_info(&path, &info()).is_err());
    }
}
