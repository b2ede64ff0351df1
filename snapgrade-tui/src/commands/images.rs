use std::path::Path;

use tracing::debug;

use snapgrade_core::{CandidateFile, ScanService};

/// Guesses a MIME type from the file's leading bytes.
pub fn sniff_mime(bytes: &[u8]) -> String {
    infer::get(bytes)
        .map(|kind| kind.mime_type().to_string())
        .unwrap_or_else(|| "application/octet-stream".to_string())
}

/// Reads one file from disk into a selection candidate.
pub async fn load_candidate(path: &Path) -> Result<CandidateFile, String> {
    let data = tokio::fs::read(path)
        .await
        .map_err(|e| format!("Could not read {}: {}", path.display(), e))?;
    let mime_type = sniff_mime(&data);
    debug!("{} sniffed as {}", path.display(), mime_type);

    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());

    Ok(CandidateFile {
        name,
        mime_type,
        data,
    })
}

/// Handle "add <path> [path...]".
pub async fn handle_add(args: &[&str], service: &mut ScanService) -> String {
    if args.is_empty() {
        return "Usage: add <path> [path...]".to_string();
    }

    let mut out = String::new();
    let mut files = Vec::with_capacity(args.len());
    for raw in args {
        match load_candidate(Path::new(raw)).await {
            Ok(file) => files.push(file),
            Err(msg) => out.push_str(&format!("{}\n", msg)),
        }
    }
    if files.is_empty() {
        out.push_str("Nothing was added.");
        return out;
    }

    match service.add_files(files) {
        Ok(added) => {
            out.push_str(&format!(
                "Added {} image(s); {} selected.",
                added,
                service.selection().len()
            ));
        }
        Err(e) => out.push_str(&e.to_string()),
    }
    out
}

/// Handle "remove <n>", where n is the 1-based position shown by `list`.
pub fn handle_remove(args: &[&str], service: &mut ScanService) -> String {
    let Some(position) = args.first().and_then(|s| s.parse::<usize>().ok()) else {
        return "Usage: remove <n>".to_string();
    };
    if position == 0 {
        return "Image numbers start at 1.".to_string();
    }
    match service.remove_image(position - 1) {
        Ok(()) => format!("Removed image {}; {} left.", position, service.selection().len()),
        Err(e) => e.to_string(),
    }
}

pub fn list(service: &ScanService) -> String {
    let selection = service.selection();
    if selection.is_empty() {
        return "No images selected.".to_string();
    }
    let mut out = format!(
        "{} image(s) selected ({} mode):\n",
        selection.len(),
        if selection.bulk_mode() { "bulk" } else { "single" }
    );
    for (i, img) in selection.images().iter().enumerate() {
        out.push_str(&format!(
            "  {}. {} ({}, {} bytes)\n",
            i + 1,
            img.display_name(),
            img.mime_type(),
            img.len()
        ));
    }
    out
}

/// Handle "bulk <on|off>". Switching modes empties the selection.
pub fn handle_bulk(args: &[&str], service: &mut ScanService) -> String {
    let bulk = match args.first().copied() {
        Some("on") => true,
        Some("off") => false,
        _ => return "Usage: bulk <on|off>".to_string(),
    };
    if service.selection().bulk_mode() == bulk {
        return format!("Bulk mode is already {}.", if bulk { "on" } else { "off" });
    }

    let had_images = !service.selection().is_empty();
    service.set_bulk_mode(bulk);
    let mut out = if bulk {
        "Bulk mode on: added images accumulate.".to_string()
    } else {
        "Bulk mode off: each add replaces the selection.".to_string()
    };
    if had_images {
        out.push_str(" Selection cleared.");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use snapgrade_core::AppConfig;

    const PNG_MAGIC: [u8; 8] = [0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A];

    fn scratch_file(name: &str, bytes: &[u8]) -> std::path::PathBuf {
        let path = std::env::temp_dir().join(format!("snapgrade-{}-{}", std::process::id(), name));
        std::fs::write(&path, bytes).unwrap();
        path
    }

    #[test]
    fn test_sniff_mime() {
        assert_eq!(sniff_mime(&PNG_MAGIC), "image/png");
        assert_eq!(sniff_mime(&[0xFF, 0xD8, 0xFF, 0xE0]), "image/jpeg");
        assert_eq!(sniff_mime(b"plain text"), "application/octet-stream");
    }

    #[tokio::test]
    async fn test_add_list_remove() {
        let png = scratch_file("a.png", &PNG_MAGIC);
        let txt = scratch_file("notes.txt", b"not an image");
        let mut svc = ScanService::from_config(&AppConfig::default());
        svc.set_bulk_mode(true);

        let png_arg = png.to_string_lossy().into_owned();
        let txt_arg = txt.to_string_lossy().into_owned();
        let out = handle_add(&[png_arg.as_str(), txt_arg.as_str(), "/no/such/file.png"], &mut svc).await;
        assert!(out.contains("Could not read /no/such/file.png"));
        assert!(out.contains("Added 1 image(s); 1 selected."));

        let listing = list(&svc);
        assert!(listing.contains("1. snapgrade-"));
        assert!(listing.contains("image/png, 8 bytes"));

        assert_eq!(handle_remove(&["0"], &mut svc), "Image numbers start at 1.");
        assert!(handle_remove(&["1"], &mut svc).starts_with("Removed image 1"));
        assert_eq!(list(&svc), "No images selected.");

        let out = handle_add(&[txt_arg.as_str()], &mut svc).await;
        assert!(out.contains("Please select valid image files"));

        let _ = std::fs::remove_file(png);
        let _ = std::fs::remove_file(txt);
    }
}
