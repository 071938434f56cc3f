use std::path::Path;

/// Extensions the pipeline knows how to reduce, with their leading dot.
pub const SUPPORTED_EXTENSIONS: &[&str] = &[
    ".py", ".js", ".jsx", ".ts", ".tsx", ".c", ".cpp", ".h", ".hpp",
];

/// Group of extensions sharing a comment marker and a reduction strategy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub enum LanguageFamily {
    Python,
    JavaScriptFamily,
    CFamily,
    Other,
}

/// Concrete grammar inside a family
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dialect {
    Python,
    JavaScript,
    Jsx,
    TypeScript,
    Tsx,
    C,
    Cpp,
    Unknown,
}

impl Dialect {
    /// Detect dialect from a bare extension (no leading dot)
    pub fn from_extension(ext: &str) -> Self {
        match ext {
            "py" => Dialect::Python,
            "js" => Dialect::JavaScript,
            "jsx" => Dialect::Jsx,
            "ts" => Dialect::TypeScript,
            "tsx" => Dialect::Tsx,
            "c" | "h" => Dialect::C,
            "cpp" | "hpp" => Dialect::Cpp,
            _ => Dialect::Unknown,
        }
    }

    /// Detect dialect from a slash-separated virtual path
    pub fn from_path(path: &str) -> Self {
        Self::from_extension(&extension_of(path))
    }

    pub fn family(self) -> LanguageFamily {
        match self {
            Dialect::Python => LanguageFamily::Python,
            Dialect::JavaScript | Dialect::Jsx | Dialect::TypeScript | Dialect::Tsx => {
                LanguageFamily::JavaScriptFamily
            }
            Dialect::C | Dialect::Cpp => LanguageFamily::CFamily,
            Dialect::Unknown => LanguageFamily::Other,
        }
    }

    /// Tag used on markdown code fences
    pub fn fence_tag(self) -> &'static str {
        match self {
            Dialect::Python => "python",
            Dialect::JavaScript => "javascript",
            Dialect::Jsx => "jsx",
            Dialect::TypeScript => "typescript",
            Dialect::Tsx => "tsx",
            Dialect::C => "c",
            Dialect::Cpp => "cpp",
            Dialect::Unknown => "",
        }
    }

    /// Tree-sitter grammar for this dialect, if one is bundled
    pub fn tree_sitter_language(self) -> Option<tree_sitter::Language> {
        match self {
            Dialect::Python => Some(tree_sitter_python::LANGUAGE.into()),
            Dialect::JavaScript | Dialect::Jsx => Some(tree_sitter_javascript::LANGUAGE.into()),
            Dialect::TypeScript => Some(tree_sitter_typescript::LANGUAGE_TYPESCRIPT.into()),
            Dialect::Tsx => Some(tree_sitter_typescript::LANGUAGE_TSX.into()),
            Dialect::C => Some(tree_sitter_c::LANGUAGE.into()),
            Dialect::Cpp => Some(tree_sitter_cpp::LANGUAGE.into()),
            Dialect::Unknown => None,
        }
    }
}

impl LanguageFamily {
    pub fn from_path(path: &str) -> Self {
        Dialect::from_path(path).family()
    }

    /// Line-comment marker written in front of each digest section header
    pub fn comment_marker(self) -> &'static str {
        match self {
            LanguageFamily::Python => "#",
            LanguageFamily::JavaScriptFamily | LanguageFamily::CFamily => "//",
            LanguageFamily::Other => "",
        }
    }
}

/// Extension of the last path segment without the dot, or an empty string.
pub fn extension_of(path: &str) -> String {
    Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .unwrap_or("")
        .to_string()
}
