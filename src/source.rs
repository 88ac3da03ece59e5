//! Page and narration script acquisition

use crate::{Error, Result};
use std::cmp::Ordering;
use std::fs::File;
use std::path::{Path, PathBuf};

/// Image file extensions picked up from folders and archives
pub const IMAGE_EXTENSIONS: [&str; 4] = ["jpg", "jpeg", "png", "webp"];

/// Narration used when no script file is given
pub const DEFAULT_NARRATION: &str = "Welcome. This is an automated manga to video demo. \
Replace this narration with your own script file for better results.";

/// Where the pages come from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Source {
    /// A folder of page images (not searched recursively)
    Folder(PathBuf),
    /// A CBZ (zip) archive of page images
    Cbz(PathBuf),
}

impl Source {
    /// Resolve the ordered page list
    ///
    /// Archives are extracted below `workspace`.
    pub fn images(&self, workspace: &Path) -> Result<Vec<PathBuf>> {
        match self {
            Source::Folder(dir) => collect_images_from_dir(dir),
            Source::Cbz(archive) => extract_cbz(archive, &workspace.join("cbz_extract")),
        }
    }
}

/// Whether `path` has one of [`IMAGE_EXTENSIONS`] (case-insensitive)
pub fn is_image_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let e = e.to_ascii_lowercase();
            IMAGE_EXTENSIONS.contains(&e.as_str())
        })
        .unwrap_or(false)
}

/// List the images directly inside `dir` in natural file-name order
pub fn collect_images_from_dir(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(Error::source_at(dir, "input folder not found"));
    }

    let mut images = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_file() && is_image_path(&path) {
            images.push(path);
        }
    }

    if images.is_empty() {
        return Err(Error::source_at(dir, "no images found in folder"));
    }
    sort_natural(&mut images);
    tracing::info!(count = images.len(), dir = %dir.display(), "images collected");
    Ok(images)
}

/// Extract a CBZ archive into `out_dir` and list its images in natural order
///
/// Images are collected recursively and ordered by file name only.
pub fn extract_cbz(archive_path: &Path, out_dir: &Path) -> Result<Vec<PathBuf>> {
    if !archive_path.is_file() {
        return Err(Error::source_at(archive_path, "CBZ not found"));
    }

    let file = File::open(archive_path)?;
    let mut archive = zip::ZipArchive::new(file)
        .map_err(|e| Error::source_at(archive_path, format!("not a readable CBZ: {}", e)))?;

    std::fs::create_dir_all(out_dir)?;
    for i in 0..archive.len() {
        let mut entry = archive
            .by_index(i)
            .map_err(|e| Error::source_at(archive_path, format!("corrupt entry #{}: {}", i, e)))?;

        let Some(relative) = entry.enclosed_name() else {
            return Err(Error::source_at(
                archive_path,
                format!("entry escapes the extraction directory: {}", entry.name()),
            ));
        };
        let dest = out_dir.join(relative);

        if entry.is_dir() {
            std::fs::create_dir_all(&dest)?;
            continue;
        }
        if let Some(parent) = dest.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&dest)?;
        std::io::copy(&mut entry, &mut out)?;
    }

    let mut images = Vec::new();
    collect_recursive(out_dir, &mut images)?;
    if images.is_empty() {
        return Err(Error::source_at(archive_path, "no images found inside CBZ"));
    }
    sort_natural(&mut images);
    tracing::info!(
        count = images.len(),
        archive = %archive_path.display(),
        "images extracted"
    );
    Ok(images)
}

fn collect_recursive(dir: &Path, images: &mut Vec<PathBuf>) -> Result<()> {
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            collect_recursive(&path, images)?;
        } else if path.is_file() && is_image_path(&path) {
            images.push(path);
        }
    }
    Ok(())
}

/// One run of a natural sort key
#[derive(Debug, Clone)]
pub enum KeyPart {
    Text(String),
    Number(String),
}

impl PartialEq for KeyPart {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for KeyPart {}

impl Ord for KeyPart {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (KeyPart::Number(a), KeyPart::Number(b)) => {
                let a = a.trim_start_matches('0');
                let b = b.trim_start_matches('0');
                a.len().cmp(&b.len()).then_with(|| a.cmp(b))
            }
            (KeyPart::Text(a), KeyPart::Text(b)) => a.cmp(b),
            (KeyPart::Number(_), KeyPart::Text(_)) => Ordering::Less,
            (KeyPart::Text(_), KeyPart::Number(_)) => Ordering::Greater,
        }
    }
}

impl PartialOrd for KeyPart {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Split a name into lowercase text runs and numeric runs
///
/// `page2.png` sorts before `page10.png`.
pub fn natural_sort_key(name: &str) -> Vec<KeyPart> {
    let mut parts = Vec::new();
    let mut current = String::new();
    let mut in_digits = false;

    for c in name.chars() {
        let digit = c.is_ascii_digit();
        if digit != in_digits && !current.is_empty() {
            parts.push(make_part(std::mem::take(&mut current), in_digits));
        }
        in_digits = digit;
        current.push(c);
    }
    if !current.is_empty() {
        parts.push(make_part(current, in_digits));
    }
    parts
}

fn make_part(run: String, digits: bool) -> KeyPart {
    if digits {
        KeyPart::Number(run)
    } else {
        KeyPart::Text(run.to_lowercase())
    }
}

fn sort_natural(paths: &mut [PathBuf]) {
    paths.sort_by_cached_key(|p| {
        natural_sort_key(&p.file_name().map(|n| n.to_string_lossy()).unwrap_or_default())
    });
}

/// Read the narration text, falling back to `default_text` when no file is given
pub fn read_script(script_path: Option<&Path>, default_text: &str) -> Result<String> {
    let Some(path) = script_path else {
        return Ok(default_text.to_string());
    };
    if !path.is_file() {
        return Err(Error::source_at(path, "script file not found"));
    }

    let text = std::fs::read_to_string(path)
        .map_err(|e| Error::source_at(path, format!("cannot read script as UTF-8: {}", e)))?;
    let text = text.trim();
    if text.is_empty() {
        return Err(Error::source_at(path, "script file is empty"));
    }
    Ok(text.to_string())
}
