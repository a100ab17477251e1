use crate::error::{QueryError, Result};
use crate::expr::{self, Expr, ExprError};

/// Characters whose presence turns unknown text into an expression.
pub const EXPRESSION_CHARS: [char; 6] = ['+', '-', '*', '/', '(', ')'];

/// Classified form of a user-typed axis or query string.
#[derive(Debug, Clone, PartialEq)]
pub enum ParameterSpec {
    /// Exact name of a known column.
    ColumnRef(String),
    Expression(DerivedExpression),
    Unrecognized(String),
}

impl ParameterSpec {
    /// The text the user typed, trimmed.
    pub fn text(&self) -> &str {
        match self {
            ParameterSpec::ColumnRef(name) => name,
            ParameterSpec::Expression(e) => &e.text,
            ParameterSpec::Unrecognized(text) => text,
        }
    }

    pub fn is_recognized(&self) -> bool {
        !matches!(self, ParameterSpec::Unrecognized(_))
    }
}

/// An arithmetic expression over known columns, parsed once at
/// classification time. A parse failure is kept so that every row skips.
#[derive(Debug, Clone, PartialEq)]
pub struct DerivedExpression {
    text: String,
    columns: Vec<String>,
    tree: std::result::Result<Expr, ExprError>,
}

impl DerivedExpression {
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Known columns appearing anywhere in the text. A row missing any of
    /// them is skipped.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn tree(&self) -> std::result::Result<&Expr, &ExprError> {
        self.tree.as_ref()
    }
}

/// Decide what `text` refers to.
///
/// Empty text is rejected. An exact column name always wins, even when it
/// contains operator characters. Otherwise text with an operator or
/// parenthesis is an expression over the known columns it contains, and
/// anything else is unrecognized.
pub fn classify(text: &str, known_columns: &[String]) -> Result<ParameterSpec> {
    let text = text.trim();
    if text.is_empty() {
        return Err(QueryError::EmptyParameter);
    }

    if known_columns.iter().any(|c| c == text) {
        return Ok(ParameterSpec::ColumnRef(text.to_string()));
    }

    if text.contains(EXPRESSION_CHARS) {
        let columns: Vec<String> = known_columns
            .iter()
            .filter(|c| !c.is_empty() && text.contains(c.as_str()))
            .cloned()
            .collect();
        let tree = expr::parse(text, &columns);
        if let Err(e) = &tree {
            log::debug!("expression '{text}' does not parse: {e}");
        }
        return Ok(ParameterSpec::Expression(DerivedExpression {
            text: text.to_string(),
            columns,
            tree,
        }));
    }

    Ok(ParameterSpec::Unrecognized(text.to_string()))
}
