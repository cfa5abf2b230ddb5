/// One token of the boolean query grammar.
///
/// Operators: `!` (NOT) > `&&` (AND) > `||` (OR), with parentheses for
/// grouping. Anything else is an operand term.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryToken {
    Term(String),
    And,
    Or,
    Not,
    LParen,
    RParen,
}

impl QueryToken {
    fn precedence(&self) -> Option<u8> {
        match self {
            QueryToken::Not => Some(3),
            QueryToken::And => Some(2),
            QueryToken::Or => Some(1),
            _ => None,
        }
    }
}

/// Scan a query string into tokens.
///
/// Whitespace is insignificant. `&&` and `||` are matched greedily, so
/// they are recognized even when adjacent to other operator characters
/// (`!(` and `a&&b` both lex correctly). An operand runs until
/// whitespace, a parenthesis, or the start of an operator.
pub fn tokenize_query(input: &str) -> Vec<QueryToken> {
    let mut tokens = Vec::new();
    let mut rest = input;

    while let Some(ch) = rest.chars().next() {
        if ch.is_whitespace() {
            rest = &rest[ch.len_utf8()..];
            continue;
        }
        if ch == '(' {
            tokens.push(QueryToken::LParen);
            rest = &rest[1..];
            continue;
        }
        if ch == ')' {
            tokens.push(QueryToken::RParen);
            rest = &rest[1..];
            continue;
        }
        if rest.starts_with("&&") {
            tokens.push(QueryToken::And);
            rest = &rest[2..];
            continue;
        }
        if rest.starts_with("||") {
            tokens.push(QueryToken::Or);
            rest = &rest[2..];
            continue;
        }
        if ch == '!' {
            tokens.push(QueryToken::Not);
            rest = &rest[1..];
            continue;
        }

        // Operand: consume until a separator or operator start
        let mut end = 0;
        for (i, c) in rest.char_indices() {
            if c.is_whitespace() || matches!(c, '(' | ')' | '!') {
                break;
            }
            if rest[i..].starts_with("&&") || rest[i..].starts_with("||") {
                break;
            }
            end = i + c.len_utf8();
        }
        tokens.push(QueryToken::Term(rest[..end].to_string()));
        rest = &rest[end..];
    }

    tokens
}

/// Shunting-yard conversion to postfix.
///
/// AND/OR are left-associative; NOT is right-associative, so a run of
/// NOTs stays in source order until a lower-precedence operator arrives.
pub fn to_postfix(tokens: Vec<QueryToken>) -> Vec<QueryToken> {
    let mut output = Vec::with_capacity(tokens.len());
    let mut stack: Vec<QueryToken> = Vec::new();

    for token in tokens {
        match token {
            QueryToken::Term(_) => output.push(token),
            QueryToken::LParen => stack.push(token),
            QueryToken::RParen => {
                while let Some(top) = stack.pop() {
                    if top == QueryToken::LParen {
                        break;
                    }
                    output.push(top);
                }
            }
            _ => {
                let prec = token.precedence().unwrap();
                while let Some(top_prec) = stack.last().and_then(QueryToken::precedence) {
                    if top_prec > prec || (top_prec == prec && token != QueryToken::Not) {
                        output.push(stack.pop().unwrap());
                    } else {
                        break;
                    }
                }
                stack.push(token);
            }
        }
    }

    // Unmatched `(` left on the stack is not an operator; drop it so
    // "(a" evaluates like "a" instead of leaking a paren downstream
    while let Some(op) = stack.pop() {
        if op.precedence().is_some() {
            output.push(op);
        }
    }
    output
}
