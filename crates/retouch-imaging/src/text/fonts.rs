// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Font discovery and family/style resolution.
//
// Font files are found by scanning directories, indexed by the family and
// style encoded in their file names (`DejaVuSans-BoldOblique.ttf`), and only
// parsed the first time a face is actually needed.

use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use ab_glyph::FontVec;
use retouch_core::FontStyle;
use retouch_core::config::FontSettings;
use retouch_core::error::{Result, RetouchError};
use tracing::{debug, info, warn};

const FONT_EXTENSIONS: [&str; 3] = ["ttf", "otf", "ttc"];

/// Family name callers use to ask for the configured default.
const DEFAULT_ALIAS: &str = "default";

/// A parsed font plus the style of the face it came from.
#[derive(Clone)]
pub struct ResolvedFont {
    pub font: Arc<FontVec>,
    pub family: String,
    /// The face's own style. May differ from the requested style when the
    /// family has no matching variant.
    pub style: FontStyle,
}

impl std::fmt::Debug for ResolvedFont {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedFont")
            .field("family", &self.family)
            .field("style", &self.style)
            .finish_non_exhaustive()
    }
}

enum FaceSource {
    /// Parsed on first use; the outcome is cached either way.
    File {
        path: PathBuf,
        loaded: OnceLock<std::result::Result<Arc<FontVec>, String>>,
    },
    Memory(Arc<FontVec>),
}

struct FontFace {
    family: String,
    key: String,
    style: FontStyle,
    source: FaceSource,
}

impl FontFace {
    fn load(&self) -> std::result::Result<Arc<FontVec>, String> {
        match &self.source {
            FaceSource::Memory(font) => Ok(Arc::clone(font)),
            FaceSource::File { path, loaded } => loaded
                .get_or_init(|| {
                    let data = std::fs::read(path)
                        .map_err(|err| format!("{}: {err}", path.display()))?;
                    let font = FontVec::try_from_vec(data)
                        .map_err(|_| format!("{}: not a parseable font", path.display()))?;
                    debug!(path = %path.display(), "Font face loaded");
                    Ok(Arc::new(font))
                })
                .clone(),
        }
    }
}

/// An index of available font faces.
pub struct FontBook {
    default_family: String,
    faces: Vec<FontFace>,
}

impl std::fmt::Debug for FontBook {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FontBook")
            .field("default_family", &self.default_family)
            .field("faces", &self.faces.len())
            .finish()
    }
}

impl FontBook {
    /// A book with no faces. Every resolution fails until something is
    /// registered.
    pub fn empty(default_family: impl Into<String>) -> Self {
        Self {
            default_family: default_family.into(),
            faces: Vec::new(),
        }
    }

    /// Scan `settings.search_dirs` recursively. Missing directories are
    /// skipped.
    pub fn discover(settings: &FontSettings) -> Self {
        let mut book = Self::empty(settings.default_family.clone());
        let mut paths = Vec::new();
        for dir in &settings.search_dirs {
            collect_font_files(dir, &mut paths);
        }
        paths.sort();
        paths.dedup();

        for path in paths {
            let Some(stem) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };
            let (family, style) = parse_face_name(stem);
            book.faces.push(FontFace {
                key: family_key(&family),
                family,
                style,
                source: FaceSource::File {
                    path,
                    loaded: OnceLock::new(),
                },
            });
        }

        info!(
            faces = book.faces.len(),
            dirs = settings.search_dirs.len(),
            "Font discovery complete"
        );
        book
    }

    /// Add a face from raw TrueType/OpenType bytes.
    ///
    /// # Errors
    ///
    /// `InvalidParameter` if the bytes are not a font.
    pub fn register(&mut self, family: &str, style: FontStyle, data: Vec<u8>) -> Result<()> {
        let font = FontVec::try_from_vec(data).map_err(|_| {
            RetouchError::InvalidParameter(format!("font data for {family:?} could not be parsed"))
        })?;
        self.faces.push(FontFace {
            family: family.to_string(),
            key: family_key(family),
            style,
            source: FaceSource::Memory(Arc::new(font)),
        });
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    pub fn default_family(&self) -> &str {
        &self.default_family
    }

    /// Pick the best available face for `family` in `style`.
    ///
    /// Preference: the family in the requested style, the family's plain
    /// face, any face of the family, then the same three steps for the
    /// default family, then any installed face. Faces that fail to parse are
    /// skipped.
    ///
    /// # Errors
    ///
    /// `FontUnavailable` when no face can be loaded at all.
    pub fn resolve(&self, family: &str, style: FontStyle) -> Result<ResolvedFont> {
        for face in self.candidates(family, style) {
            match face.load() {
                Ok(font) => {
                    if face.key != family_key(family) {
                        debug!(requested = family, using = %face.family, "Font family substituted");
                    }
                    return Ok(ResolvedFont {
                        font,
                        family: face.family.clone(),
                        style: face.style,
                    });
                }
                Err(reason) => warn!(%reason, "Skipping unusable font face"),
            }
        }
        Err(RetouchError::FontUnavailable(format!(
            "no usable font for family {family:?} ({} faces indexed)",
            self.faces.len()
        )))
    }

    /// Faces ordered by preference for the request.
    fn candidates(&self, family: &str, style: FontStyle) -> Vec<&FontFace> {
        let default = family_key(&self.default_family);
        let requested = family_key(family);
        let wanted = if requested.is_empty() || requested == DEFAULT_ALIAS {
            default.clone()
        } else {
            requested
        };

        let rank = |face: &FontFace| -> u8 {
            let tier = |key: &str, base: u8| -> Option<u8> {
                if face.key != key {
                    None
                } else if face.style == style {
                    Some(base)
                } else if face.style == FontStyle::Plain {
                    Some(base + 1)
                } else {
                    Some(base + 2)
                }
            };
            tier(&wanted, 0)
                .or_else(|| tier(&default, 3))
                .unwrap_or(if face.style == FontStyle::Plain { 6 } else { 7 })
        };

        let mut ranked: Vec<(u8, &FontFace)> = self.faces.iter().map(|f| (rank(f), f)).collect();
        ranked.sort_by_key(|(r, _)| *r);
        ranked.into_iter().map(|(_, face)| face).collect()
    }
}

/// Lowercase with everything but letters and digits removed, so
/// `"DejaVu Sans"` and `"DejaVuSans"` compare equal.
pub fn family_key(family: &str) -> String {
    family
        .chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

/// Split a font file stem into family and style.
///
/// `DejaVuSans-BoldOblique` → (`DejaVuSans`, BoldItalic). A stem without a
/// recognised style suffix is a plain face of a family named after the
/// whole stem.
fn parse_face_name(stem: &str) -> (String, FontStyle) {
    if let Some((family, suffix)) = stem.rsplit_once(['-', '_'])
        && !family.is_empty()
        && let Some(style) = style_suffix(suffix)
    {
        return (family.to_string(), style);
    }
    (stem.to_string(), FontStyle::Plain)
}

fn style_suffix(suffix: &str) -> Option<FontStyle> {
    let s = suffix.to_ascii_lowercase();
    let bold = s.contains("bold");
    let italic = s.contains("italic") || s.contains("oblique");
    match (bold, italic) {
        (true, true) => Some(FontStyle::BoldItalic),
        (true, false) => Some(FontStyle::Bold),
        (false, true) => Some(FontStyle::Italic),
        _ if matches!(s.as_str(), "regular" | "book" | "roman" | "normal" | "r") => {
            Some(FontStyle::Plain)
        }
        _ => None,
    }
}

fn collect_font_files(dir: &Path, out: &mut Vec<PathBuf>) {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            debug!(dir = %dir.display(), error = %err, "Font directory not readable");
            return;
        }
    };
    for entry in entries.flatten() {
        let path = entry.path();
        let Ok(file_type) = entry.file_type() else {
            continue;
        };
        if file_type.is_dir() {
            collect_font_files(&path, out);
        } else if path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| FONT_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
        {
            out.push(path);
        }
    }
}

/// DejaVu Sans, bundled so rendering tests do not depend on host fonts.
#[cfg(test)]
pub(crate) const TEST_FONT: &[u8] = include_bytes!("../../testdata/DejaVuSans.ttf");

#[cfg(test)]
mod tests {
    use super::*;

    fn fake_book(files: &[&str], default_family: &str) -> (tempfile::TempDir, FontBook) {
        let dir = tempfile::tempdir().unwrap();
        let nested = dir.path().join("truetype").join("misc");
        std::fs::create_dir_all(&nested).unwrap();
        for name in files {
            std::fs::write(nested.join(name), b"not really a font").unwrap();
        }
        std::fs::write(nested.join("README.txt"), b"ignored").unwrap();
        let settings = FontSettings {
            search_dirs: vec![dir.path().to_path_buf(), PathBuf::from("/nonexistent/fonts")],
            default_family: default_family.into(),
        };
        let book = FontBook::discover(&settings);
        (dir, book)
    }

    fn names(faces: &[&FontFace]) -> Vec<String> {
        faces
            .iter()
            .map(|f| format!("{}:{}", f.family, f.style.keyword()))
            .collect()
    }

    #[test]
    fn face_names_parse_family_and_style() {
        assert_eq!(
            parse_face_name("DejaVuSans-BoldOblique"),
            ("DejaVuSans".into(), FontStyle::BoldItalic)
        );
        assert_eq!(
            parse_face_name("LiberationSerif-Regular"),
            ("LiberationSerif".into(), FontStyle::Plain)
        );
        assert_eq!(
            parse_face_name("Ubuntu_Italic"),
            ("Ubuntu".into(), FontStyle::Italic)
        );
        assert_eq!(
            parse_face_name("Noto-Sans-Mono"),
            ("Noto-Sans-Mono".into(), FontStyle::Plain)
        );
        assert_eq!(parse_face_name("-Bold"), ("-Bold".into(), FontStyle::Plain));
    }

    #[test]
    fn family_keys_ignore_case_and_spacing() {
        assert_eq!(family_key("DejaVu Sans"), family_key("dejavu-sans"));
        assert_eq!(family_key("  Liberation_Mono "), "liberationmono");
    }

    #[test]
    fn discovery_walks_subdirectories() {
        let (_dir, book) = fake_book(&["Serif-Bold.ttf", "Serif.TTF", "Mono.otf"], "Mono");
        assert_eq!(book.len(), 3);
        assert_eq!(book.default_family(), "Mono");
    }

    #[test]
    fn candidates_follow_preference_order() {
        let (_dir, book) = fake_book(
            &[
                "Serif-Bold.ttf",
                "Serif-Italic.ttf",
                "Serif.ttf",
                "Sans.ttf",
                "Sans-Bold.ttf",
                "Other-Italic.ttf",
            ],
            "Sans",
        );

        let bold_serif = book.candidates("Serif", FontStyle::Bold);
        assert_eq!(
            names(&bold_serif)[..5],
            ["Serif:bold", "Serif:normal", "Serif:italic", "Sans:bold", "Sans:normal"]
        );

        let missing = book.candidates("Comic", FontStyle::Plain);
        assert_eq!(names(&missing)[..2], ["Sans:normal", "Sans:bold"]);

        let default = book.candidates("default", FontStyle::Bold);
        assert_eq!(names(&default)[0], "Sans:bold");
    }

    #[test]
    fn unparseable_faces_are_skipped_until_nothing_is_left() {
        let (_dir, book) = fake_book(&["Broken.ttf"], "Broken");
        assert!(matches!(
            book.resolve("Broken", FontStyle::Plain),
            Err(RetouchError::FontUnavailable(_))
        ));
    }

    #[test]
    fn empty_book_has_no_font() {
        let book = FontBook::empty("DejaVu Sans");
        assert!(book.is_empty());
        assert!(matches!(
            book.resolve("default", FontStyle::Bold),
            Err(RetouchError::FontUnavailable(_))
        ));
    }

    #[test]
    fn register_rejects_non_font_bytes() {
        let mut book = FontBook::empty("x");
        assert!(matches!(
            book.register("x", FontStyle::Plain, vec![1, 2, 3]),
            Err(RetouchError::InvalidParameter(_))
        ));
        assert!(book.is_empty());
    }

    #[test]
    fn registered_faces_resolve_without_touching_disk() {
        let mut book = FontBook::empty("DejaVu Sans");
        book.register("DejaVu Sans", FontStyle::Plain, TEST_FONT.to_vec())
            .unwrap();
        let resolved = book.resolve("dejavu sans", FontStyle::Italic).unwrap();
        assert_eq!(resolved.family, "DejaVu Sans");
        assert_eq!(resolved.style, FontStyle::Plain);
    }

    #[test]
    fn discovered_fixture_resolves_any_request() {
        let settings = FontSettings {
            search_dirs: vec![Path::new(env!("CARGO_MANIFEST_DIR")).join("testdata")],
            default_family: "DejaVu Sans".into(),
        };
        let book = FontBook::discover(&settings);
        assert_eq!(book.len(), 1);

        let resolved = book.resolve("No Such Family 1234", FontStyle::BoldItalic);
        let resolved = resolved.unwrap();
        assert_eq!(family_key(&resolved.family), "dejavusans");
        // Cached after the first parse.
        assert!(book.resolve("default", FontStyle::Plain).is_ok());
    }
}
