use std::fmt::Display;

/// The highlighting class taxonomy
pub mod classes;

/// Lexer token-type bindings
pub mod bindings;

/// Oracle solutions for lexed token streams
pub mod formatter;

pub use bindings::{to_oracle_binding, Bindings, BASE_BINDINGS};
pub use classes::{HighlightClass, NUM_CLASSES};
pub use formatter::{char_level_classes, OracleFormatter, OracleSolution};

/// Languages with oracle bindings
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash)]
pub enum Language {
    /// Java
    Java,
    /// Kotlin
    Kotlin,
    /// Python 3
    Python3,
    /// JavaScript
    JavaScript,
    /// C#
    CSharp,
    /// C++
    Cpp,
}

impl Language {
    /// The unique string token that identifies this language
    pub fn as_str(&self) -> &'static str {
        match self {
            Language::Java => "java",
            Language::Kotlin => "kotlin",
            Language::Python3 => "python3",
            Language::JavaScript => "javascript",
            Language::CSharp => "csharp",
            Language::Cpp => "cpp",
        }
    }

    /// The token-type bindings for this language
    pub fn bindings(&self) -> &'static Bindings {
        // Every supported lexer shares the same token-type hierarchy
        &BASE_BINDINGS
    }
}

impl TryFrom<&str> for Language {
    type Error = LanguageError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "java" => Ok(Language::Java),
            "kotlin" => Ok(Language::Kotlin),
            "python3" => Ok(Language::Python3),
            "javascript" => Ok(Language::JavaScript),
            "csharp" => Ok(Language::CSharp),
            "cpp" => Ok(Language::Cpp),
            _ => Err(LanguageError::Unsupported(value.to_string())),
        }
    }
}

impl Display for Language {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Language Error
#[derive(thiserror::Error, Debug, PartialEq, Eq)]
pub enum LanguageError {
    /// No bindings exist for the given language
    #[error("{0} is not a valid language")]
    Unsupported(String),
}
