use std::path::{Path, PathBuf};

use once_cell::sync::OnceCell;
use plotters::style::FontStyle;

/// Family name every chart asks plotters for.
pub const FONT_FAMILY: &str = "sans-serif";

const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans.ttf",
    "/usr/share/fonts/TTF/DejaVuSans.ttf",
    "/usr/share/fonts/dejavu-sans-fonts/DejaVuSans.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Regular.ttf",
    "/usr/share/fonts/noto/NotoSans-Regular.ttf",
    "/usr/share/fonts/truetype/noto/NotoSans-Regular.ttf",
    "/System/Library/Fonts/Supplemental/Arial.ttf",
    "/Library/Fonts/Arial.ttf",
    "C:\\Windows\\Fonts\\arial.ttf",
];

static REGISTERED: OnceCell<Option<&'static str>> = OnceCell::new();

/// Register a font with plotters once per process. Returns the family to
/// draw text with, or `None` when no usable font file was found; charts are
/// then drawn without any text.
pub fn ensure_font(preferred: Option<&Path>) -> Option<&'static str> {
    *REGISTERED.get_or_init(|| register_first(preferred))
}

fn register_first(preferred: Option<&Path>) -> Option<&'static str> {
    let candidates = preferred
        .map(Path::to_path_buf)
        .into_iter()
        .chain(SYSTEM_FONTS.iter().map(PathBuf::from));

    for path in candidates {
        let Ok(bytes) = std::fs::read(&path) else {
            continue;
        };
        // plotters keeps registered font data for the life of the process.
        let bytes: &'static [u8] = Box::leak(bytes.into_boxed_slice());
        match plotters::style::register_font(FONT_FAMILY, FontStyle::Normal, bytes) {
            Ok(()) => {
                tracing::debug!(font = %path.display(), "registered chart font");
                return Some(FONT_FAMILY);
            }
            Err(_) => tracing::warn!(font = %path.display(), "ignoring unreadable font file"),
        }
    }

    tracing::warn!("no usable font found; charts will be rendered without text");
    None
}
