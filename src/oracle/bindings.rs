use std::collections::HashMap;

use lazy_static::lazy_static;

use super::HighlightClass::{self, *};

/// A mapping from lexer token-type names to highlighting classes
pub type Bindings = HashMap<&'static str, HighlightClass>;

lazy_static! {
    /// Bindings for the hierarchical lexer token types (`Token.Keyword`, `Token.Name.Class`, ...)
    pub static ref BASE_BINDINGS: Bindings = HashMap::from([
        // Keywords
        ("Token.Keyword", Keyword),
        ("Token.Keyword.Constant", Keyword),
        ("Token.Keyword.Declaration", Keyword),
        ("Token.Keyword.Namespace", Keyword),
        ("Token.Keyword.Pseudo", Keyword),
        ("Token.Keyword.Reserved", Keyword),
        ("Token.Keyword.Type", Keyword),
        // Names
        ("Token.Name", Any),
        ("Token.Name.Attribute", FieldIdentifier),
        ("Token.Name.Builtin", Any),
        ("Token.Name.Builtin.Pseudo", Keyword),
        ("Token.Name.Class", ClassDeclarator),
        ("Token.Name.Constant", VariableDeclarator),
        ("Token.Name.Decorator", AnnotationDeclarator),
        ("Token.Name.Entity", Any),
        ("Token.Name.Exception", TypeIdentifier),
        ("Token.Name.Function", FunctionIdentifier),
        ("Token.Name.Function.Magic", FunctionIdentifier),
        ("Token.Name.Label", Keyword),
        ("Token.Name.Namespace", Keyword),
        ("Token.Name.Other", Any),
        ("Token.Name.Property", Any),
        ("Token.Name.Tag", Any),
        ("Token.Name.Variable", Any),
        ("Token.Name.Variable.Class", Any),
        ("Token.Name.Variable.Global", Any),
        ("Token.Name.Variable.Instance", Any),
        ("Token.Name.Variable.Magic", Any),
        // Literals
        ("Token.Literal", Literal),
        ("Token.Literal.Date", Any),
        ("Token.Literal.String", StringLiteral),
        ("Token.Literal.String.Affix", StringLiteral),
        ("Token.Literal.String.Backtick", StringLiteral),
        ("Token.Literal.String.Char", StringLiteral),
        ("Token.Literal.String.Delimiter", StringLiteral),
        ("Token.Literal.String.Doc", StringLiteral),
        ("Token.Literal.String.Double", StringLiteral),
        ("Token.Literal.String.Escape", StringLiteral),
        ("Token.Literal.String.Heredoc", StringLiteral),
        ("Token.Literal.String.Interpol", StringLiteral),
        ("Token.Literal.String.Other", StringLiteral),
        ("Token.Literal.String.Regex", StringLiteral),
        ("Token.Literal.String.Single", StringLiteral),
        ("Token.Literal.String.Symbol", StringLiteral),
        ("Token.Literal.Number", Literal),
        ("Token.Literal.Number.Bin", Literal),
        ("Token.Literal.Number.Float", Literal),
        ("Token.Literal.Number.Hex", Literal),
        ("Token.Literal.Number.Integer", Literal),
        ("Token.Literal.Number.Integer.Long", Literal),
        ("Token.Literal.Number.Oct", Literal),
        // Operators and punctuation
        ("Token.Operator", Any),
        ("Token.Operator.Word", Keyword),
        ("Token.Punctuation", Any),
        ("Token.Punctuation.Marker", Any),
        // Comments (hashbangs are not highlighted as comments)
        ("Token.Comment", Comment),
        ("Token.Comment.Hashbang", Any),
        ("Token.Comment.Multiline", Comment),
        ("Token.Comment.Preproc", Comment),
        ("Token.Comment.PreprocFile", Comment),
        ("Token.Comment.Single", Comment),
        ("Token.Comment.Special", Comment),
        // Generic
        ("Token.Generic", Any),
        ("Token.Generic.Deleted", Any),
        ("Token.Generic.Emph", Any),
        ("Token.Generic.Error", Any),
        ("Token.Generic.Heading", Any),
        ("Token.Generic.Inserted", Any),
        ("Token.Generic.Output", Any),
        ("Token.Generic.Prompt", Any),
        ("Token.Generic.Strong", Any),
        ("Token.Generic.Subheading", Any),
        ("Token.Generic.Traceback", Any),
        // Others
        ("Token", Any),
        ("Token.Text", Any),
        ("Token.Text.Whitespace", Any),
        ("Token.Error", Any),
        ("Token.Other", Any),
    ]);
}

/// Map a lexer token-type name to its highlighting class.
///
/// Unknown names fall back to [`HighlightClass::Any`] and emit a warning.
pub fn to_oracle_binding(token_type: &str, bindings: &Bindings) -> HighlightClass {
    match bindings.get(token_type) {
        Some(class) => *class,
        None => {
            log::warn!("Unrecognised lexer token type {}", token_type);

            Any
        }
    }
}
