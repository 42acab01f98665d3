//! Rendering of the pairing payload as a scannable QR code.

use wablast_core::error::BlastError;

/// Render the payload as a compact terminal QR using Unicode half-blocks.
///
/// Packs two module rows into each text line with `▀`, `▄`, `█`, and
/// space, halving the printed height.
pub fn render_terminal(payload: &str) -> Result<String, BlastError> {
    use qrcode::{Color, EcLevel, QrCode};

    let code = QrCode::with_error_correction_level(payload.as_bytes(), EcLevel::L)
        .map_err(|e| BlastError::Session(format!("qr encode failed: {e}")))?;

    let width = code.width();
    let colors = code.into_colors();
    let dark_at = |row: usize, col: usize| row < width && colors[row * width + col] == Color::Dark;

    let mut out = String::with_capacity((width + 1) * (width / 2 + 1));
    for row in (0..width).step_by(2) {
        for col in 0..width {
            let top = dark_at(row, col);
            let bottom = dark_at(row + 1, col);
            out.push(match (top, bottom) {
                (true, true) => '█',
                (true, false) => '▀',
                (false, true) => '▄',
                (false, false) => ' ',
            });
        }
        out.push('\n');
    }

    Ok(out)
}

/// Render the payload as PNG bytes with a 4-module white quiet zone on
/// every side.
pub fn render_png(payload: &str) -> Result<Vec<u8>, BlastError> {
    use image::{ImageBuffer, Luma};
    use qrcode::{Color, EcLevel, QrCode};

    const MODULE_PX: u32 = 8;
    const QUIET_MODULES: u32 = 4;

    let code = QrCode::with_error_correction_level(payload.as_bytes(), EcLevel::L)
        .map_err(|e| BlastError::Session(format!("qr encode failed: {e}")))?;

    let modules = code.width() as u32;
    let size = (modules + QUIET_MODULES * 2) * MODULE_PX;

    let img = ImageBuffer::from_fn(size, size, |x, y| {
        let mx = x / MODULE_PX;
        let my = y / MODULE_PX;
        let in_code = mx >= QUIET_MODULES
            && my >= QUIET_MODULES
            && mx < modules + QUIET_MODULES
            && my < modules + QUIET_MODULES;
        if in_code {
            match code[(
                (mx - QUIET_MODULES) as usize,
                (my - QUIET_MODULES) as usize,
            )] {
                Color::Dark => Luma([0u8]),
                Color::Light => Luma([255u8]),
            }
        } else {
            Luma([255u8])
        }
    });

    let mut buf = std::io::Cursor::new(Vec::new());
    img.write_to(&mut buf, image::ImageFormat::Png)
        .map_err(|e| BlastError::Session(format!("png encode failed: {e}")))?;

    Ok(buf.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_terminal_uses_half_blocks() {
        let out = render_terminal("pair:abc123").unwrap();
        assert!(!out.is_empty());
        assert!(out.chars().any(|c| "▀▄█".contains(c)));
        let line_len = out.lines().next().unwrap().chars().count();
        assert!(out.lines().all(|l| l.chars().count() == line_len));
    }

    #[test]
    fn test_render_png_magic_bytes() {
        let png = render_png("pair:abc123").unwrap();
        // PNG magic bytes.
        assert_eq!(&png[..4], &[0x89, 0x50, 0x4E, 0x47]);
    }
}
