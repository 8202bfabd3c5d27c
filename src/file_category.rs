/// File categorization by extension.
///
/// A [`CategoryTable`] maps the five fixed categories to the lowercase
/// extensions they accept. The table is built once and handed to the
/// organizer; nothing mutates it afterwards.
///
/// # Examples
///
/// ```
/// use dirsort::file_category::{Category, CategoryTable};
///
/// let table = CategoryTable::default();
/// assert_eq!(table.classify("report.PDF"), Some(Category::Documents));
/// assert_eq!(table.classify("photo.jpeg"), Some(Category::Images));
/// assert_eq!(table.classify("notes"), None);
/// ```
use serde::Serialize;
use std::collections::HashSet;
use std::fmt;

/// One of the fixed destination buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    /// Text and office documents (PDF, DOCX, TXT, etc.)
    Documents,
    /// Raster images (JPG, PNG, GIF, etc.)
    Images,
    /// Audio (MP3, WAV)
    Music,
    /// Video containers (MP4, MKV, etc.)
    Videos,
    /// Compressed archives (ZIP, 7Z, etc.)
    Archives,
}

impl Category {
    /// Every category, in table order.
    pub const ALL: [Category; 5] = [
        Category::Documents,
        Category::Images,
        Category::Music,
        Category::Videos,
        Category::Archives,
    ];

    /// Returns the subdirectory name for this category.
    ///
    /// ```
    /// use dirsort::file_category::Category;
    ///
    /// assert_eq!(Category::Music.dir_name(), "music");
    /// assert_eq!(Category::Archives.dir_name(), "archives");
    /// ```
    pub fn dir_name(&self) -> &'static str {
        match self {
            Category::Documents => "documents",
            Category::Images => "images",
            Category::Music => "music",
            Category::Videos => "videos",
            Category::Archives => "archives",
        }
    }

    /// Extensions recognized for this category, dot included.
    fn standard_extensions(&self) -> &'static [&'static str] {
        match self {
            Category::Documents => &[".pdf", ".docx", ".doc", ".txt", ".rtf"],
            Category::Images => &[".jpg", ".jpeg", ".png", ".gif", ".bmp"],
            Category::Music => &[".mp3", ".wav"],
            Category::Videos => &[".mp4", ".avi", ".mov", ".mkv"],
            Category::Archives => &[".zip", ".rar", ".7z", ".tar", ".gz"],
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// Returns the extension of `file_name`: everything from the last `.` to the end.
///
/// The result is empty when the name has no `.` or ends with one. Case is
/// preserved; [`CategoryTable::classify`] lowercases before lookup.
///
/// ```
/// use dirsort::file_category::extension_of;
///
/// assert_eq!(extension_of("archive.tar.GZ"), ".GZ");
/// assert_eq!(extension_of("README"), "");
/// assert_eq!(extension_of("trailing."), "");
/// ```
pub fn extension_of(file_name: &str) -> &str {
    match file_name.rfind('.') {
        Some(idx) if idx + 1 < file_name.len() => &file_name[idx..],
        _ => "",
    }
}

/// A category together with the extensions it accepts.
#[derive(Debug, Clone)]
struct CategoryRule {
    category: Category,
    extensions: HashSet<String>,
}

/// Immutable mapping from category to recognized extensions.
#[derive(Debug, Clone)]
pub struct CategoryTable {
    rules: Vec<CategoryRule>,
}

impl CategoryTable {
    /// Builds the standard five-category table.
    pub fn standard() -> Self {
        let rules = Category::ALL
            .iter()
            .map(|&category| CategoryRule {
                category,
                extensions: category
                    .standard_extensions()
                    .iter()
                    .map(|ext| ext.to_string())
                    .collect(),
            })
            .collect();
        Self { rules }
    }

    /// Maps an extension (dot included) to its category.
    ///
    /// Matching is exact on the whole token after lowercasing, so `.do`
    /// does not match `.doc`.
    pub fn category_for_extension(&self, ext: &str) -> Option<Category> {
        if ext.is_empty() {
            return None;
        }
        let ext = ext.to_lowercase();
        self.rules
            .iter()
            .find(|rule| rule.extensions.contains(&ext))
            .map(|rule| rule.category)
    }

    /// Classifies a file name by its extension.
    pub fn classify(&self, file_name: &str) -> Option<Category> {
        self.category_for_extension(extension_of(file_name))
    }

    /// Iterates over each category and its extensions.
    pub fn iter(&self) -> impl Iterator<Item = (Category, &HashSet<String>)> {
        self.rules.iter().map(|rule| (rule.category, &rule.extensions))
    }

    /// Returns true if no extension belongs to more than one category.
    pub fn is_disjoint(&self) -> bool {
        let mut seen = HashSet::new();
        self.rules
            .iter()
            .flat_map(|rule| rule.extensions.iter())
            .all(|ext| seen.insert(ext.as_str()))
    }
}

impl Default for CategoryTable {
    fn default() -> Self {
        Self::standard()
    }
}
