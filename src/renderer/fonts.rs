//! Font discovery for the HUD overlay

use femtovg::{Canvas, FontId, renderer::OpenGl};

/// Load a HUD font with fallbacks. An empty result disables the HUD rather
/// than stopping the simulation.
pub fn load_fonts(canvas: &mut Canvas<OpenGl>) -> Vec<FontId> {
    let mut fonts = Vec::new();

    // Monospace keeps the parameter columns aligned
    let mono_paths = [
        "/usr/share/fonts/truetype/dejavu/DejaVuSansMono.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationMono-Regular.ttf",
        "/usr/share/fonts/truetype/ubuntu/UbuntuMono-R.ttf",
        "/usr/share/fonts/TTF/DejaVuSansMono.ttf",
        "/usr/share/fonts/dejavu/DejaVuSansMono.ttf",
        "/System/Library/Fonts/Menlo.ttc",
        "C:\\Windows\\Fonts\\consola.ttf",
    ];

    for path in &mono_paths {
        if let Ok(font) = canvas.add_font(path) {
            fonts.push(font);
            break;
        }
    }

    let fallback_paths = [
        "/usr/share/fonts/truetype/dejavu/DejaVuSans.ttf",
        "/usr/share/fonts/truetype/liberation/LiberationSans-Regular.ttf",
        "/usr/share/fonts/TTF/DejaVuSans.ttf",
    ];

    for path in &fallback_paths {
        if let Ok(font) = canvas.add_font(path) {
            fonts.push(font);
        }
    }

    if fonts.is_empty() {
        if let Ok(entries) = std::fs::read_dir("/usr/share/fonts/truetype") {
            'search: for entry in entries.flatten() {
                if !entry.path().is_dir() {
                    continue;
                }
                let Ok(sub_entries) = std::fs::read_dir(entry.path()) else {
                    continue;
                };
                for sub_entry in sub_entries.flatten() {
                    let path = sub_entry.path();
                    if path.extension().map(|e| e == "ttf").unwrap_or(false) {
                        if let Ok(font) = canvas.add_font(&path) {
                            fonts.push(font);
                            break 'search;
                        }
                    }
                }
            }
        }
    }

    if fonts.is_empty() {
        log::warn!("No HUD font found; install dejavu-fonts or liberation-fonts to see the overlay");
    }

    fonts
}
