//! Font discovery for packet rendering.
//!
//! Two families are used: a proportional body family (required) and a monospace family
//! (optional) for example data and code.  Roboto and Roboto Mono are preferred, with DejaVu Sans
//! and DejaVu Sans Mono accepted in their place.  Directories are searched in this order, and the
//! first directory holding a complete family wins:
//!
//! 1. the directory passed to [`load_fonts`], if any,
//! 2. `PACKET_PDF_FONTS_DIR`,
//! 3. `assets/fonts` next to the running executable,
//! 4. `assets/fonts` in this crate's manifest directory,
//! 5. the usual system font directories.

use std::env;
use std::io;
use std::path::{Path, PathBuf};

use genpdf::error::{Error, ErrorKind};
use genpdf::fonts::{FontData, FontFamily};
use log::{debug, warn};

/// Environment variable naming an extra font directory.
pub const FONTS_DIR_ENV: &str = "PACKET_PDF_FONTS_DIR";

/// System directories that commonly hold the DejaVu fonts.
const SYSTEM_FONT_DIRS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu",
    "/usr/share/fonts/dejavu",
    "/usr/share/fonts/TTF",
    "/usr/local/share/fonts",
];

/// A font family and the files of its regular, bold, italic and bold italic styles.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FamilyFiles {
    pub name: &'static str,
    pub files: [&'static str; 4],
}

pub const ROBOTO: FamilyFiles = FamilyFiles {
    name: "Roboto",
    files: [
        "Roboto-Regular.ttf",
        "Roboto-Bold.ttf",
        "Roboto-Italic.ttf",
        "Roboto-BoldItalic.ttf",
    ],
};

pub const ROBOTO_MONO: FamilyFiles = FamilyFiles {
    name: "RobotoMono",
    files: [
        "RobotoMono-Regular.ttf",
        "RobotoMono-Bold.ttf",
        "RobotoMono-Italic.ttf",
        "RobotoMono-BoldItalic.ttf",
    ],
};

pub const DEJAVU_SANS: FamilyFiles = FamilyFiles {
    name: "DejaVuSans",
    files: [
        "DejaVuSans.ttf",
        "DejaVuSans-Bold.ttf",
        "DejaVuSans-Oblique.ttf",
        "DejaVuSans-BoldOblique.ttf",
    ],
};

pub const DEJAVU_SANS_MONO: FamilyFiles = FamilyFiles {
    name: "DejaVuSansMono",
    files: [
        "DejaVuSansMono.ttf",
        "DejaVuSansMono-Bold.ttf",
        "DejaVuSansMono-Oblique.ttf",
        "DejaVuSansMono-BoldOblique.ttf",
    ],
};

/// Accepted body families, most preferred first.
pub const BODY_FAMILIES: &[FamilyFiles] = &[ROBOTO, DEJAVU_SANS];
/// Accepted monospace families, most preferred first.
pub const MONO_FAMILIES: &[FamilyFiles] = &[ROBOTO_MONO, DEJAVU_SANS_MONO];

/// The font families loaded for one render.
pub struct FontSet {
    pub body: FontFamily<FontData>,
    /// `None` when no monospace family was found; callers fall back to the body family.
    pub mono: Option<FontFamily<FontData>>,
}

/// Directory where the fonts are expected inside the source tree.
pub fn bundled_fonts_source_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("assets/fonts")
}

fn font_directory_candidates(explicit: Option<&Path>) -> Vec<PathBuf> {
    let mut candidates: Vec<PathBuf> = Vec::new();
    let mut push = |candidate: PathBuf| {
        if !candidates.contains(&candidate) {
            candidates.push(candidate);
        }
    };

    if let Some(path) = explicit {
        push(path.to_path_buf());
    }

    if let Some(path) = env::var_os(FONTS_DIR_ENV).filter(|value| !value.is_empty()) {
        push(PathBuf::from(path));
    }

    if let Some(bin_dir) = env::current_exe()
        .ok()
        .and_then(|exe| exe.parent().map(Path::to_path_buf))
    {
        push(bin_dir.join("assets/fonts"));
    }

    push(bundled_fonts_source_dir());
    for dir in SYSTEM_FONT_DIRS {
        push(PathBuf::from(dir));
    }
    candidates
}

fn missing_family_files(directory: &Path, family: &FamilyFiles) -> Vec<&'static str> {
    family
        .files
        .iter()
        .copied()
        .filter(|name| !directory.join(name).is_file())
        .collect()
}

/// Finds the first candidate directory holding every style of one of `families`.
fn resolve_family_directory(
    candidates: &[PathBuf],
    families: &[FamilyFiles],
) -> Result<(PathBuf, FamilyFiles), Error> {
    let mut attempts = Vec::new();

    for candidate in candidates {
        if !candidate.is_dir() {
            attempts.push(format!("{} (directory missing)", candidate.display()));
            continue;
        }

        let mut gaps = Vec::new();
        for family in families {
            let missing = missing_family_files(candidate, family);
            if missing.is_empty() {
                return Ok((candidate.clone(), *family));
            }
            gaps.push(format!("{} [{}]", family.name, missing.join(", ")));
        }
        attempts.push(format!(
            "{} (missing {})",
            candidate.display(),
            gaps.join("; ")
        ));
    }

    let preferred = families.first().map_or("?", |family| family.name);
    Err(Error::new(
        format!(
            "Unable to locate the '{}' font family. Checked: {}. Set {} to a directory containing {}-Regular.ttf and its Bold, Italic and BoldItalic variants.",
            preferred,
            attempts.join(", "),
            FONTS_DIR_ENV,
            preferred
        ),
        io::Error::new(io::ErrorKind::NotFound, "font family not found"),
    ))
}

fn load_family(
    candidates: &[PathBuf],
    families: &[FamilyFiles],
) -> Result<FontFamily<FontData>, Error> {
    let (directory, family) = resolve_family_directory(candidates, families)?;
    debug!(
        "loading font family '{}' from {}",
        family.name,
        directory.display()
    );

    let load = |file: &str| {
        FontData::load(directory.join(file), None).map_err(|err| {
            Error::new(
                format!(
                    "Failed to load font family '{}' from {}: {}",
                    family.name,
                    directory.display(),
                    err
                ),
                io::Error::new(io::ErrorKind::Other, err.to_string()),
            )
        })
    };
    let [regular, bold, italic, bold_italic] = family.files;

    Ok(FontFamily {
        regular: load(regular)?,
        bold: load(bold)?,
        italic: load(italic)?,
        bold_italic: load(bold_italic)?,
    })
}

/// Returns whether `err` means the fonts were not found, as opposed to found but unreadable.
pub fn fonts_missing(err: &Error) -> bool {
    matches!(
        err.kind(),
        ErrorKind::IoError(io_err)
            if io_err.kind() == io::ErrorKind::NotFound
                || io_err.kind() == io::ErrorKind::PermissionDenied
    )
}

/// Loads the body family and, when available, the monospace family.
pub fn load_fonts(explicit_dir: Option<&Path>) -> Result<FontSet, Error> {
    let candidates = font_directory_candidates(explicit_dir);
    let body = load_family(&candidates, BODY_FAMILIES)?;

    let mono = match load_family(&candidates, MONO_FAMILIES) {
        Ok(mono) => Some(mono),
        Err(err) if fonts_missing(&err) => {
            warn!("Monospace fonts unavailable ({err}); example data will use the body family.");
            None
        }
        Err(err) => return Err(err),
    };

    Ok(FontSet { body, mono })
}

/// Indicates whether a body font family can be found without an explicit directory.
pub fn default_fonts_available() -> bool {
    resolve_family_directory(&font_directory_candidates(None), BODY_FAMILIES).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch_family(dir: &Path, family: &FamilyFiles) {
        for file in family.files {
            std::fs::write(dir.join(file), b"").unwrap();
        }
    }

    #[test]
    fn explicit_directory_is_searched_first() {
        let explicit = PathBuf::from("/opt/packet-fonts");
        let candidates = font_directory_candidates(Some(&explicit));
        assert_eq!(candidates.first(), Some(&explicit));
        assert!(candidates.contains(&bundled_fonts_source_dir()));
        assert_eq!(
            candidates.last(),
            SYSTEM_FONT_DIRS.last().map(PathBuf::from).as_ref()
        );
    }

    #[test]
    fn missing_directories_report_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let err = resolve_family_directory(&[dir.path().join("absent")], BODY_FAMILIES)
            .unwrap_err();
        assert!(fonts_missing(&err));
        assert!(err.to_string().contains("directory missing"));
    }

    #[test]
    fn incomplete_directories_list_missing_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("Roboto-Regular.ttf"), b"").unwrap();
        let err = resolve_family_directory(&[dir.path().to_path_buf()], BODY_FAMILIES)
            .unwrap_err();
        let message = err.to_string();
        assert!(message.contains("Roboto-Bold.ttf"));
        assert!(message.contains("DejaVuSans-Oblique.ttf"));
        assert!(!message.contains("Roboto-Regular.ttf,"));
    }

    #[test]
    fn dejavu_is_accepted_when_roboto_is_absent() {
        let dir = tempfile::tempdir().unwrap();
        touch_family(dir.path(), &DEJAVU_SANS);
        let (found, family) =
            resolve_family_directory(&[dir.path().to_path_buf()], BODY_FAMILIES).unwrap();
        assert_eq!(found, dir.path());
        assert_eq!(family, DEJAVU_SANS);
    }

    #[test]
    fn roboto_is_preferred_within_a_directory() {
        let dir = tempfile::tempdir().unwrap();
        touch_family(dir.path(), &DEJAVU_SANS_MONO);
        touch_family(dir.path(), &ROBOTO_MONO);
        let (_, family) =
            resolve_family_directory(&[dir.path().to_path_buf()], MONO_FAMILIES).unwrap();
        assert_eq!(family, ROBOTO_MONO);
    }

    #[test]
    fn earlier_directories_win_over_preferred_families() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        touch_family(first.path(), &DEJAVU_SANS);
        touch_family(second.path(), &ROBOTO);
        let candidates = [first.path().to_path_buf(), second.path().to_path_buf()];
        let (found, _) = resolve_family_directory(&candidates, BODY_FAMILIES).unwrap();
        assert_eq!(found, first.path());
    }
}
