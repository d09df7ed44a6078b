/// Extension-based file categories used by the by-type strategy.
///
/// The table is fixed: every known extension maps to exactly one category,
/// anything else lands in [`Category::Other`].
///
/// # Examples
///
/// ```
/// use dirsort::file_category::{Category, FileMapper};
///
/// let mapper = FileMapper::default();
/// assert_eq!(mapper.extension_to_category(".png"), Some(Category::Image));
/// assert_eq!(mapper.categorize(".mp3"), Category::Audio);
/// assert_eq!(mapper.categorize(".xyz"), Category::Other);
/// ```
use std::collections::HashMap;

/// Represents a broad file category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Category {
    /// Image files (PNG, JPG, GIF, etc.)
    Image,
    /// Document files (PDF, DOCX, TXT, etc.)
    Document,
    /// Spreadsheet files (XLSX, CSV, ODS, etc.)
    Spreadsheet,
    /// Presentation files (PPTX, ODP, KEY, etc.)
    Presentation,
    /// Video files (MP4, MKV, AVI, etc.)
    Video,
    /// Audio files (MP3, WAV, FLAC, etc.)
    Audio,
    /// Archive files (ZIP, RAR, 7Z, etc.)
    Archive,
    /// Source code and markup files
    Code,
    /// Installers and executables
    Executable,
    /// Font files (TTF, OTF, WOFF, etc.)
    Font,
    /// Unknown or uncategorized files
    Other,
}

impl Category {
    /// Returns the folder label for this category.
    ///
    /// ```
    /// use dirsort::file_category::Category;
    ///
    /// assert_eq!(Category::Image.dir_name(), "Images");
    /// assert_eq!(Category::Other.dir_name(), "Others");
    /// ```
    pub fn dir_name(&self) -> &'static str {
        match self {
            Category::Image => "Images",
            Category::Document => "Documents",
            Category::Spreadsheet => "Spreadsheets",
            Category::Presentation => "Presentations",
            Category::Video => "Videos",
            Category::Audio => "Audio",
            Category::Archive => "Archives",
            Category::Code => "Code",
            Category::Executable => "Executables",
            Category::Font => "Fonts",
            Category::Other => "Others",
        }
    }
}

const STANDARD_EXTENSIONS: &[(Category, &[&str])] = &[
    (
        Category::Image,
        &["jpg", "jpeg", "png", "gif", "bmp", "tiff", "webp", "svg", "ico", "heic"],
    ),
    (
        Category::Document,
        &["pdf", "doc", "docx", "txt", "rtf", "odt", "pages"],
    ),
    (Category::Spreadsheet, &["xls", "xlsx", "csv", "ods", "numbers"]),
    (Category::Presentation, &["ppt", "pptx", "odp", "key"]),
    (
        Category::Video,
        &["mp4", "avi", "mkv", "mov", "wmv", "flv", "webm", "m4v"],
    ),
    (
        Category::Audio,
        &["mp3", "wav", "flac", "aac", "ogg", "wma", "m4a"],
    ),
    (
        Category::Archive,
        &["zip", "rar", "7z", "tar", "gz", "bz2", "xz"],
    ),
    (
        Category::Code,
        &["py", "js", "html", "css", "cpp", "java", "php", "rb", "go", "rs"],
    ),
    (
        Category::Executable,
        &["exe", "msi", "deb", "rpm", "dmg", "pkg", "app"],
    ),
    (Category::Font, &["ttf", "otf", "woff", "woff2", "eot"]),
];

/// Maps file extensions to categories.
#[derive(Debug, Clone)]
pub struct FileMapper {
    extension_map: HashMap<String, Category>,
}

impl FileMapper {
    /// Creates a new `FileMapper` with the standard table.
    pub fn new() -> Self {
        let mut mapper = Self {
            extension_map: HashMap::new(),
        };
        for (category, extensions) in STANDARD_EXTENSIONS {
            for ext in *extensions {
                mapper.add_extension_mapping(ext, *category);
            }
        }
        mapper
    }

    /// Adds a file extension to category mapping. A leading dot is optional.
    pub fn add_extension_mapping(&mut self, ext: &str, category: Category) {
        self.extension_map.insert(normalize(ext), category);
    }

    /// Maps a file extension (with or without its leading dot) to a category.
    pub fn extension_to_category(&self, ext: &str) -> Option<Category> {
        self.extension_map.get(&normalize(ext)).copied()
    }

    /// Returns the category for an extension, `Category::Other` when unknown.
    pub fn categorize(&self, ext: &str) -> Category {
        self.extension_to_category(ext).unwrap_or(Category::Other)
    }
}

impl Default for FileMapper {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize(ext: &str) -> String {
    ext.trim_start_matches('.').to_lowercase()
}
