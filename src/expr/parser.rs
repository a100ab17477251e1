use super::{BinaryOp, Constant, Expr, ExprError, Function};

/// Parse `input` into an expression tree.
///
/// `columns` are the column names that may appear in the text. They are
/// matched before ordinary identifiers (longest first), so names such as
/// `B-V` or `2mass_k` are read as one column and not as arithmetic.
/// Constant and function names are reserved: a column called `e` or `abs`
/// is not reachable from an expression.
pub fn parse(input: &str, columns: &[String]) -> Result<Expr, ExprError> {
    let columns: Vec<String> = columns
        .iter()
        .filter(|c| !is_reserved(c))
        .cloned()
        .collect();
    let tokens = tokenize(input, &columns)?;
    let mut pos = 0;
    let expr = parse_sum(&tokens, &mut pos)?;
    if let Some((token, at)) = tokens.get(pos) {
        return Err(ExprError::UnexpectedToken {
            found: token.describe(),
            pos: *at,
        });
    }
    Ok(expr)
}

#[derive(Debug, Clone, PartialEq)]
enum Token {
    Number(f64),
    Column(String),
    Ident(String),
    Plus,
    Minus,
    Star,
    Slash,
    LParen,
    RParen,
    Comma,
}

impl Token {
    fn describe(&self) -> String {
        match self {
            Token::Number(v) => format!("number {v}"),
            Token::Column(c) => format!("column '{c}'"),
            Token::Ident(i) => format!("name '{i}'"),
            Token::Plus => "'+'".into(),
            Token::Minus => "'-'".into(),
            Token::Star => "'*'".into(),
            Token::Slash => "'/'".into(),
            Token::LParen => "'('".into(),
            Token::RParen => "')'".into(),
            Token::Comma => "','".into(),
        }
    }
}

fn is_reserved(name: &str) -> bool {
    Constant::from_ident(name).is_some() || Function::from_ident(name).is_some()
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_'
}

/// Tokens paired with the char offset they start at.
fn tokenize(input: &str, columns: &[String]) -> Result<Vec<(Token, usize)>, ExprError> {
    let chars: Vec<char> = input.chars().collect();

    let mut bound: Vec<Vec<char>> = columns
        .iter()
        .filter(|c| !c.is_empty())
        .map(|c| c.chars().collect())
        .collect();
    bound.sort_by(|a, b| b.len().cmp(&a.len()));

    let mut tokens = Vec::new();
    let mut i = 0;
    while i < chars.len() {
        let c = chars[i];
        if c.is_whitespace() {
            i += 1;
            continue;
        }

        if let Some(name) = match_column(&chars, i, &bound) {
            let len = name.len();
            tokens.push((Token::Column(name.iter().collect()), i));
            i += len;
            continue;
        }

        let single = match c {
            '+' => Some(Token::Plus),
            '-' => Some(Token::Minus),
            '*' => Some(Token::Star),
            '/' => Some(Token::Slash),
            '(' => Some(Token::LParen),
            ')' => Some(Token::RParen),
            ',' => Some(Token::Comma),
            _ => None,
        };
        if let Some(token) = single {
            tokens.push((token, i));
            i += 1;
            continue;
        }

        if c.is_ascii_digit() || (c == '.' && chars.get(i + 1).is_some_and(char::is_ascii_digit)) {
            let start = i;
            i = scan_number(&chars, i);
            let text: String = chars[start..i].iter().collect();
            let value = text
                .parse::<f64>()
                .map_err(|_| ExprError::InvalidNumber(text.clone()))?;
            tokens.push((Token::Number(value), start));
            continue;
        }

        if is_ident_char(c) {
            let start = i;
            while i < chars.len() && is_ident_char(chars[i]) {
                i += 1;
            }
            tokens.push((Token::Ident(chars[start..i].iter().collect()), start));
            continue;
        }

        return Err(ExprError::UnexpectedChar { ch: c, pos: i });
    }
    Ok(tokens)
}

/// Longest bound column starting at `i` that is not the prefix of a longer
/// identifier (`a` must not match inside `abs`).
fn match_column<'a>(chars: &[char], i: usize, bound: &'a [Vec<char>]) -> Option<&'a Vec<char>> {
    bound.iter().find(|name| {
        let end = i + name.len();
        if end > chars.len() || chars[i..end] != name[..] {
            return false;
        }
        let last_is_ident = name.last().is_some_and(|&c| is_ident_char(c));
        !(last_is_ident && chars.get(end).is_some_and(|&c| is_ident_char(c)))
    })
}

/// Digits, optional fraction, optional exponent. Returns the end offset.
fn scan_number(chars: &[char], mut i: usize) -> usize {
    while i < chars.len() && chars[i].is_ascii_digit() {
        i += 1;
    }
    if i < chars.len() && chars[i] == '.' {
        i += 1;
        while i < chars.len() && chars[i].is_ascii_digit() {
            i += 1;
        }
    }
    if i < chars.len() && (chars[i] == 'e' || chars[i] == 'E') {
        let mut j = i + 1;
        if j < chars.len() && (chars[j] == '+' || chars[j] == '-') {
            j += 1;
        }
        if j < chars.len() && chars[j].is_ascii_digit() {
            while j < chars.len() && chars[j].is_ascii_digit() {
                j += 1;
            }
            i = j;
        }
    }
    i
}

fn peek(tokens: &[(Token, usize)], pos: usize) -> Option<&Token> {
    tokens.get(pos).map(|(t, _)| t)
}

fn parse_sum(tokens: &[(Token, usize)], pos: &mut usize) -> Result<Expr, ExprError> {
    let mut left = parse_product(tokens, pos)?;
    loop {
        let op = match peek(tokens, *pos) {
            Some(Token::Plus) => BinaryOp::Add,
            Some(Token::Minus) => BinaryOp::Sub,
            _ => break,
        };
        *pos += 1;
        let right = parse_product(tokens, pos)?;
        left = Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        };
    }
    Ok(left)
}

fn parse_product(tokens: &[(Token, usize)], pos: &mut usize) -> Result<Expr, ExprError> {
    let mut left = parse_unary(tokens, pos)?;
    loop {
        let op = match peek(tokens, *pos) {
            Some(Token::Star) => BinaryOp::Mul,
            Some(Token::Slash) => BinaryOp::Div,
            _ => break,
        };
        *pos += 1;
        let right = parse_unary(tokens, pos)?;
        left = Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        };
    }
    Ok(left)
}

fn parse_unary(tokens: &[(Token, usize)], pos: &mut usize) -> Result<Expr, ExprError> {
    match peek(tokens, *pos) {
        Some(Token::Minus) => {
            *pos += 1;
            Ok(Expr::Negate(Box::new(parse_unary(tokens, pos)?)))
        }
        Some(Token::Plus) => {
            *pos += 1;
            parse_unary(tokens, pos)
        }
        _ => parse_atom(tokens, pos),
    }
}

fn parse_atom(tokens: &[(Token, usize)], pos: &mut usize) -> Result<Expr, ExprError> {
    let Some((token, at)) = tokens.get(*pos) else {
        return Err(ExprError::UnexpectedEnd);
    };
    *pos += 1;
    match token {
        Token::Number(v) => Ok(Expr::Literal(*v)),
        Token::Column(name) => Ok(Expr::Column(name.clone())),
        Token::Ident(name) => {
            if peek(tokens, *pos) == Some(&Token::LParen) {
                let function =
                    Function::from_ident(name).ok_or_else(|| ExprError::UnknownFunction(name.clone()))?;
                *pos += 1;
                let args = parse_args(tokens, pos)?;
                check_arity(function, args.len())?;
                return Ok(Expr::Call { function, args });
            }
            Constant::from_ident(name)
                .map(Expr::Constant)
                .ok_or_else(|| ExprError::UnknownName(name.clone()))
        }
        Token::LParen => {
            let inner = parse_sum(tokens, pos)?;
            expect_close(tokens, pos)?;
            Ok(inner)
        }
        other => Err(ExprError::UnexpectedToken {
            found: other.describe(),
            pos: *at,
        }),
    }
}

/// Arguments after an opening parenthesis, through the closing one.
fn parse_args(tokens: &[(Token, usize)], pos: &mut usize) -> Result<Vec<Expr>, ExprError> {
    let mut args = Vec::new();
    if peek(tokens, *pos) == Some(&Token::RParen) {
        *pos += 1;
        return Ok(args);
    }
    loop {
        args.push(parse_sum(tokens, pos)?);
        if peek(tokens, *pos) == Some(&Token::Comma) {
            *pos += 1;
            continue;
        }
        expect_close(tokens, pos)?;
        return Ok(args);
    }
}

fn expect_close(tokens: &[(Token, usize)], pos: &mut usize) -> Result<(), ExprError> {
    match tokens.get(*pos) {
        Some((Token::RParen, _)) => {
            *pos += 1;
            Ok(())
        }
        Some((other, at)) => Err(ExprError::UnexpectedToken {
            found: other.describe(),
            pos: *at,
        }),
        None => Err(ExprError::UnexpectedEnd),
    }
}

fn check_arity(function: Function, got: usize) -> Result<(), ExprError> {
    let (min, max) = function.arity();
    if got < min || max.is_some_and(|max| got > max) {
        return Err(ExprError::Arity { function, got });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cols(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    fn col(name: &str) -> Box<Expr> {
        Box::new(Expr::Column(name.into()))
    }

    #[test]
    fn precedence_and_associativity() {
        let expr = parse("a - b * 2 - 1", &cols(&["a", "b"])).expect("parses");
        let expected = Expr::Binary {
            op: BinaryOp::Sub,
            left: Box::new(Expr::Binary {
                op: BinaryOp::Sub,
                left: col("a"),
                right: Box::new(Expr::Binary {
                    op: BinaryOp::Mul,
                    left: col("b"),
                    right: Box::new(Expr::Literal(2.0)),
                }),
            }),
            right: Box::new(Expr::Literal(1.0)),
        };
        assert_eq!(expr, expected);
    }

    #[test]
    fn unary_minus_and_parentheses() {
        let expr = parse("-(a + 1)", &cols(&["a"])).expect("parses");
        assert_eq!(
            expr,
            Expr::Negate(Box::new(Expr::Binary {
                op: BinaryOp::Add,
                left: col("a"),
                right: Box::new(Expr::Literal(1.0)),
            }))
        );
    }

    #[test]
    fn functions_and_constants() {
        let expr = parse("log10(vrot) * pi + max(a, b, e)", &cols(&["vrot", "a", "b"])).expect("parses");
        assert_eq!(expr.columns(), vec!["vrot", "a", "b"]);
    }

    #[test]
    fn constants_and_functions_shadow_columns() {
        let expr = parse("e * 2 + abs(x)", &cols(&["e", "abs", "x"])).expect("parses");
        assert_eq!(expr.columns(), vec!["x"]);
        assert_eq!(
            parse("pi", &cols(&["pi"])),
            Ok(Expr::Constant(Constant::Pi))
        );
    }

    #[test]
    fn column_names_with_operator_characters() {
        let expr = parse("B-V + 1", &cols(&["B", "V", "B-V"])).expect("parses");
        assert_eq!(expr.columns(), vec!["B-V"]);
    }

    #[test]
    fn bound_column_does_not_match_inside_identifier() {
        let expr = parse("abs(a)", &cols(&["a"])).expect("parses");
        assert_eq!(
            expr,
            Expr::Call {
                function: Function::Abs,
                args: vec![Expr::Column("a".into())],
            }
        );
    }

    #[test]
    fn scientific_notation() {
        assert_eq!(parse("1.5e-3", &[]), Ok(Expr::Literal(0.0015)));
        assert_eq!(parse(".5", &[]), Ok(Expr::Literal(0.5)));
    }

    #[test]
    fn rejects_names_outside_the_whitelist() {
        assert_eq!(
            parse("x + 1", &cols(&["a"])),
            Err(ExprError::UnknownName("x".into()))
        );
        assert_eq!(
            parse("__import__(a)", &cols(&["a"])),
            Err(ExprError::UnknownFunction("__import__".into()))
        );
        assert!(matches!(
            parse("a.real", &cols(&["a"])),
            Err(ExprError::UnexpectedChar { ch: '.', .. })
        ));
    }

    #[test]
    fn malformed_input() {
        assert_eq!(parse("(a + 1", &cols(&["a"])), Err(ExprError::UnexpectedEnd));
        assert_eq!(parse("a +", &cols(&["a"])), Err(ExprError::UnexpectedEnd));
        assert!(matches!(
            parse("a b", &cols(&["a", "b"])),
            Err(ExprError::UnexpectedToken { pos: 2, .. })
        ));
        assert!(matches!(parse("a ** 2", &cols(&["a"])), Err(ExprError::UnexpectedToken { .. })));
    }

    #[test]
    fn arity_is_checked() {
        assert_eq!(
            parse("sqrt(a, a)", &cols(&["a"])),
            Err(ExprError::Arity {
                function: Function::Sqrt,
                got: 2
            })
        );
        assert!(parse("min()", &[]).is_err());
        assert!(parse("count()", &[]).is_ok());
    }
}
