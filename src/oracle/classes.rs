use std::fmt::Display;

use serde::{Deserialize, Serialize};

/// The number of highlighting classes in the taxonomy
pub const NUM_CLASSES: usize = 12;

/// Highlighting classes shared by every supported language
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Ord, PartialOrd, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum HighlightClass {
    /// Anything without a dedicated class (operators, punctuation, plain names)
    Any,
    /// Keywords
    Keyword,
    /// Numeric and other non-string literals
    Literal,
    /// String and character literals
    StringLiteral,
    /// Comments
    Comment,
    /// The name in a class declaration
    ClassDeclarator,
    /// The name in a function declaration
    FunctionDeclarator,
    /// The name in a variable declaration
    VariableDeclarator,
    /// A reference to a type
    TypeIdentifier,
    /// A reference to a function
    FunctionIdentifier,
    /// A reference to a field
    FieldIdentifier,
    /// Annotations and decorators
    AnnotationDeclarator,
}

impl HighlightClass {
    /// Every class, ordered by id
    pub const ALL: [HighlightClass; NUM_CLASSES] = [
        HighlightClass::Any,
        HighlightClass::Keyword,
        HighlightClass::Literal,
        HighlightClass::StringLiteral,
        HighlightClass::Comment,
        HighlightClass::ClassDeclarator,
        HighlightClass::FunctionDeclarator,
        HighlightClass::VariableDeclarator,
        HighlightClass::TypeIdentifier,
        HighlightClass::FunctionIdentifier,
        HighlightClass::FieldIdentifier,
        HighlightClass::AnnotationDeclarator,
    ];

    /// The label id used by the models
    pub fn id(&self) -> usize {
        *self as usize
    }

    /// Look up a class by label id
    pub fn from_id(id: usize) -> Option<Self> {
        Self::ALL.get(id).copied()
    }

    /// The upper-case name of the class
    pub fn as_str(&self) -> &'static str {
        match self {
            HighlightClass::Any => "ANY",
            HighlightClass::Keyword => "KEYWORD",
            HighlightClass::Literal => "LITERAL",
            HighlightClass::StringLiteral => "STRING_LITERAL",
            HighlightClass::Comment => "COMMENT",
            HighlightClass::ClassDeclarator => "CLASS_DECLARATOR",
            HighlightClass::FunctionDeclarator => "FUNCTION_DECLARATOR",
            HighlightClass::VariableDeclarator => "VARIABLE_DECLARATOR",
            HighlightClass::TypeIdentifier => "TYPE_IDENTIFIER",
            HighlightClass::FunctionIdentifier => "FUNCTION_IDENTIFIER",
            HighlightClass::FieldIdentifier => "FIELD_IDENTIFIER",
            HighlightClass::AnnotationDeclarator => "ANNOTATION_DECLARATOR",
        }
    }
}

impl Display for HighlightClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
