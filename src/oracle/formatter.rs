use serde::{Deserialize, Serialize};

use super::{bindings::to_oracle_binding, Bindings, HighlightClass};

/// A lexed token paired with its reference highlighting class
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OracleSolution {
    /// The source text of the token
    pub text: String,

    /// The lexer token-type name
    pub token_type: String,

    /// The class the token type is bound to
    pub class: HighlightClass,
}

/// Turns a lexed token stream into oracle solutions using a binding table
#[derive(Clone, Debug)]
pub struct OracleFormatter {
    bindings: &'static Bindings,
}

impl OracleFormatter {
    /// Create a formatter over the given bindings
    pub fn new(bindings: &'static Bindings) -> Self {
        Self { bindings }
    }

    /// Bind every `(token_type, text)` pair, preserving order
    pub fn format<I, T, S>(&self, tokens: I) -> Vec<OracleSolution>
    where
        I: IntoIterator<Item = (T, S)>,
        T: Into<String>,
        S: Into<String>,
    {
        tokens
            .into_iter()
            .map(|(token_type, text)| {
                let token_type = token_type.into();
                let class = to_oracle_binding(&token_type, self.bindings);

                OracleSolution {
                    text: text.into(),
                    token_type,
                    class,
                }
            })
            .collect()
    }
}

/// Expand token-level solutions into one class per character of the source
pub fn char_level_classes(solutions: &[OracleSolution]) -> Vec<HighlightClass> {
    solutions
        .iter()
        .flat_map(|solution| std::iter::repeat(solution.class).take(solution.text.chars().count()))
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::oracle::BASE_BINDINGS;

    #[test]
    fn formats_tokens_in_order() {
        let formatter = OracleFormatter::new(&BASE_BINDINGS);

        let solutions = formatter.format([
            ("Token.Keyword", "class"),
            ("Token.Text.Whitespace", " "),
            ("Token.Name.Class", "Foo"),
            ("Token.Unheard.Of", "?"),
        ]);

        let classes: Vec<_> = solutions.iter().map(|s| s.class).collect();

        assert_eq!(
            classes,
            vec![
                HighlightClass::Keyword,
                HighlightClass::Any,
                HighlightClass::ClassDeclarator,
                HighlightClass::Any,
            ]
        );
        assert_eq!(solutions[2].text, "Foo");
        assert_eq!(solutions[2].token_type, "Token.Name.Class");
    }

    #[test]
    fn expands_to_characters() {
        let formatter = OracleFormatter::new(&BASE_BINDINGS);
        let solutions = formatter.format([("Token.Keyword", "if"), ("Token.Punctuation", "(")]);

        assert_eq!(
            char_level_classes(&solutions),
            vec![
                HighlightClass::Keyword,
                HighlightClass::Keyword,
                HighlightClass::Any
            ]
        );
    }
}
