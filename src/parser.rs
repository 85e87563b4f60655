// 🏗️ Passback Params Parser
//
// The upstream feed ships LTI passback parameters as the text of a key/value
// literal, e.g. {'oauth_consumer_key': '', 'lis_result_sourcedid': 'course-v1:...'}.
// The blob is untrusted input, so it goes through this small literal grammar
// and nothing else.

use crate::error::FieldError;
use crate::fields::display_value;
use nom::{
    branch::alt,
    bytes::complete::{escaped_transform, tag, take_while_m_n},
    character::complete::{char, digit0, digit1, multispace0, none_of, one_of},
    combinator::{all_consuming, cut, map, map_opt, opt, recognize, value},
    error::{context, ErrorKind, ParseError, VerboseError, VerboseErrorKind},
    multi::{many0_count, separated_list0},
    sequence::{delimited, pair, preceded, separated_pair, tuple},
    IResult,
};
use regex::Regex;
use serde_json::Value;
use std::sync::LazyLock;

type ParseResult<'a, T> = IResult<&'a str, T, VerboseError<&'a str>>;

static SERVICE_URL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^https?://[^\s/$.?#].[^\s]*$").expect("static service url pattern")
});

/// Keys every passback blob must carry.
pub const REQUIRED_KEYS: [&str; 3] = [
    "oauth_consumer_key",
    "lis_result_sourcedid",
    "lis_outcome_service_url",
];

// ============================================================================
// LITERAL AST
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    None,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<Literal>),
    Tuple(Vec<Literal>),
    Dict(Vec<(Literal, Literal)>),
}

impl Literal {
    pub fn type_name(&self) -> &'static str {
        match self {
            Literal::None => "NoneType",
            Literal::Bool(_) => "bool",
            Literal::Int(_) => "int",
            Literal::Float(_) => "float",
            Literal::Str(_) => "str",
            Literal::List(_) => "list",
            Literal::Tuple(_) => "tuple",
            Literal::Dict(_) => "dict",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Literal::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Literal::None)
    }

    /// Emptiness in the literal's own terms: None, False, 0, '' and empty containers.
    pub fn is_truthy(&self) -> bool {
        match self {
            Literal::None => false,
            Literal::Bool(b) => *b,
            Literal::Int(i) => *i != 0,
            Literal::Float(f) => *f != 0.0,
            Literal::Str(s) => !s.is_empty(),
            Literal::List(items) | Literal::Tuple(items) => !items.is_empty(),
            Literal::Dict(entries) => !entries.is_empty(),
        }
    }

    /// Plain text form: strings unquoted, everything else as written.
    pub fn to_text(&self) -> String {
        match self {
            Literal::Str(s) => s.clone(),
            other => other.to_string(),
        }
    }
}

impl std::fmt::Display for Literal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Literal::None => write!(f, "None"),
            Literal::Bool(true) => write!(f, "True"),
            Literal::Bool(false) => write!(f, "False"),
            Literal::Int(i) => write!(f, "{}", i),
            Literal::Float(x) => write!(f, "{:?}", x),
            Literal::Str(s) => write!(f, "'{}'", s.replace('\\', "\\\\").replace('\'', "\\'")),
            Literal::List(items) => {
                write!(f, "[")?;
                write_items(f, items)?;
                write!(f, "]")
            }
            Literal::Tuple(items) => {
                write!(f, "(")?;
                write_items(f, items)?;
                if items.len() == 1 {
                    write!(f, ",")?;
                }
                write!(f, ")")
            }
            Literal::Dict(entries) => {
                write!(f, "{{")?;
                for (i, (k, v)) in entries.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}: {}", k, v)?;
                }
                write!(f, "}}")
            }
        }
    }
}

fn write_items(f: &mut std::fmt::Formatter<'_>, items: &[Literal]) -> std::fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, ", ")?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

// ============================================================================
// PUBLIC API
// ============================================================================

/// Parse a complete literal; trailing input is an error.
///
/// Errors are a single line, e.g. `expected '}' at offset 7, found end of input (in closing brace)`.
pub fn parse_literal(input: &str) -> Result<Literal, String> {
    match all_consuming(|i| literal(i, 0))(input) {
        Ok((_, lit)) => Ok(lit),
        Err(nom::Err::Error(e)) | Err(nom::Err::Failure(e)) => Err(describe_error(input, &e)),
        Err(nom::Err::Incomplete(_)) => Err("Incomplete input".to_string()),
    }
}

/// Parsed passback mapping. Later duplicate keys shadow earlier ones.
#[derive(Debug, Clone, PartialEq)]
pub struct PassbackParams {
    entries: Vec<(Literal, Literal)>,
}

impl PassbackParams {
    pub fn get(&self, key: &str) -> Option<&Literal> {
        self.entries
            .iter()
            .rev()
            .find(|(k, _)| k.as_str() == Some(key))
            .map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The three passback sub-fields carried into the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassbackFields {
    pub oauth_consumer_key: String,
    pub lis_result_sourcedid: String,
    pub lis_outcome_service_url: String,
}

/// Turn the raw `passback_params` value into a mapping.
pub fn parse_passback_params(raw: &Value) -> Result<PassbackParams, FieldError> {
    let text = match raw {
        Value::Null => return Err(FieldError::new("passback_params", "passback_params is empty")),
        Value::String(s) if s.is_empty() => {
            return Err(FieldError::new("passback_params", "passback_params is empty"))
        }
        Value::String(s) => s,
        other => {
            return Err(FieldError::new(
                "passback_params",
                format!(
                    "Failed to parse passback_params: expected literal text, got: {}",
                    display_value(other)
                ),
            ))
        }
    };

    match parse_literal(text) {
        Ok(Literal::Dict(entries)) => Ok(PassbackParams { entries }),
        Ok(other) => Err(FieldError::new(
            "passback_params",
            format!("Parsed value is not a dictionary: {}", other.type_name()),
        )),
        Err(e) => Err(FieldError::new(
            "passback_params",
            format!("Failed to parse passback_params: {}", e),
        )),
    }
}

/// Check required keys and sub-field formats. Collects every violation.
pub fn validate_passback_params_dict(params: &PassbackParams) -> Vec<FieldError> {
    let mut errors = Vec::new();

    for key in REQUIRED_KEYS {
        match params.get(key) {
            None => errors.push(FieldError::new(
                "passback_params",
                format!("Missing required field in passback_params: {}", key),
            )),
            Some(v) if v.is_none() => errors.push(FieldError::new(
                "passback_params",
                format!("Field {} in passback_params is null", key),
            )),
            Some(_) => {}
        }
    }

    if let Some(sourcedid) = params.get("lis_result_sourcedid").filter(|v| v.is_truthy()) {
        let well_formed = sourcedid.as_str().map(|s| s.contains(':')).unwrap_or(false);
        if !well_formed {
            errors.push(FieldError::new(
                "passback_params",
                format!("Invalid lis_result_sourcedid format: {}", sourcedid.to_text()),
            ));
        }
    }

    if let Some(url) = params.get("lis_outcome_service_url").filter(|v| v.is_truthy()) {
        let text = url.to_text();
        if !SERVICE_URL_RE.is_match(&text) {
            errors.push(FieldError::new(
                "passback_params",
                format!("Invalid lis_outcome_service_url format: {}", text),
            ));
        }
    }

    errors
}

/// Validate and extract in one step.
pub fn extract_passback_fields(params: &PassbackParams) -> Result<PassbackFields, Vec<FieldError>> {
    let errors = validate_passback_params_dict(params);
    if !errors.is_empty() {
        return Err(errors);
    }

    let text_of = |key: &str| params.get(key).map(Literal::to_text).unwrap_or_default();
    Ok(PassbackFields {
        oauth_consumer_key: text_of("oauth_consumer_key"),
        lis_result_sourcedid: text_of("lis_result_sourcedid"),
        lis_outcome_service_url: text_of("lis_outcome_service_url"),
    })
}

// ============================================================================
// GRAMMAR
// ============================================================================

/// Deepest container nesting accepted. Deeper input fails instead of recursing.
pub const MAX_NESTING: usize = 100;

fn literal<'a>(input: &'a str, depth: usize) -> ParseResult<'a, Literal> {
    delimited(
        multispace0,
        alt((
            |i: &'a str| dict(i, depth),
            |i: &'a str| list(i, depth),
            |i: &'a str| parenthesized(i, depth),
            map(string, Literal::Str),
            keyword,
            number,
        )),
        multispace0,
    )(input)
}

/// Step one container level down, or fail hard past `MAX_NESTING`.
fn nested(input: &str, depth: usize) -> ParseResult<'_, usize> {
    if depth >= MAX_NESTING {
        return Err(nom::Err::Failure(VerboseError {
            errors: vec![(input, VerboseErrorKind::Context("too many nested containers"))],
        }));
    }
    Ok((input, depth + 1))
}

fn keyword(input: &str) -> ParseResult<'_, Literal> {
    alt((
        value(Literal::None, tag("None")),
        value(Literal::Bool(true), tag("True")),
        value(Literal::Bool(false), tag("False")),
    ))(input)
}

fn number(input: &str) -> ParseResult<'_, Literal> {
    let (rest, text) = recognize(tuple((
        opt(one_of("+-")),
        digit1,
        opt(pair(char('.'), digit0)),
        opt(tuple((one_of("eE"), opt(one_of("+-")), digit1))),
    )))(input)?;

    if text.contains(['.', 'e', 'E']) {
        match text.parse::<f64>() {
            Ok(f) => Ok((rest, Literal::Float(f))),
            Err(_) => Err(nom::Err::Error(VerboseError::from_error_kind(
                input,
                ErrorKind::Float,
            ))),
        }
    } else {
        match text.parse::<i64>() {
            Ok(i) => Ok((rest, Literal::Int(i))),
            Err(_) => Err(nom::Err::Error(VerboseError::from_error_kind(
                input,
                ErrorKind::Digit,
            ))),
        }
    }
}

/// `digits` hex digits naming a Unicode scalar value.
fn hex_code_point<'a>(digits: usize) -> impl FnMut(&'a str) -> ParseResult<'a, char> {
    map_opt(
        take_while_m_n(digits, digits, |c: char| c.is_ascii_hexdigit()),
        |hex: &str| u32::from_str_radix(hex, 16).ok().and_then(char::from_u32),
    )
}

fn octal_escape(input: &str) -> ParseResult<'_, char> {
    map_opt(
        take_while_m_n(1, 3, |c: char| ('0'..='7').contains(&c)),
        |oct: &str| u32::from_str_radix(oct, 8).ok().and_then(char::from_u32),
    )(input)
}

fn escape_sequence(input: &str) -> ParseResult<'_, char> {
    alt((
        value('\n', char('n')),
        value('\r', char('r')),
        value('\t', char('t')),
        value('\u{07}', char('a')),
        value('\u{08}', char('b')),
        value('\u{0b}', char('v')),
        value('\u{0c}', char('f')),
        value('\\', char('\\')),
        value('\'', char('\'')),
        value('"', char('"')),
        preceded(char('x'), hex_code_point(2)),
        preceded(char('u'), hex_code_point(4)),
        preceded(char('U'), hex_code_point(8)),
        octal_escape,
    ))(input)
}

fn single_quoted(input: &str) -> ParseResult<'_, String> {
    delimited(
        char('\''),
        map(
            opt(escaped_transform(none_of("\\'\n"), '\\', escape_sequence)),
            Option::unwrap_or_default,
        ),
        cut(context("closing quote", char('\''))),
    )(input)
}

fn double_quoted(input: &str) -> ParseResult<'_, String> {
    delimited(
        char('"'),
        map(
            opt(escaped_transform(none_of("\\\"\n"), '\\', escape_sequence)),
            Option::unwrap_or_default,
        ),
        cut(context("closing quote", char('"'))),
    )(input)
}

// Raw strings keep backslashes as written; `\'` still does not close the string.
fn raw_single_quoted(input: &str) -> ParseResult<'_, String> {
    delimited(
        char('\''),
        map(
            recognize(many0_count(alt((
                recognize(pair(char('\\'), none_of("\n"))),
                recognize(none_of("\\'\n")),
            )))),
            String::from,
        ),
        cut(context("closing quote", char('\''))),
    )(input)
}

fn raw_double_quoted(input: &str) -> ParseResult<'_, String> {
    delimited(
        char('"'),
        map(
            recognize(many0_count(alt((
                recognize(pair(char('\\'), none_of("\n"))),
                recognize(none_of("\\\"\n")),
            )))),
            String::from,
        ),
        cut(context("closing quote", char('"'))),
    )(input)
}

/// Quoted string with an optional `u`/`U` or raw `r`/`R` prefix.
fn string(input: &str) -> ParseResult<'_, String> {
    alt((
        preceded(one_of("rR"), alt((raw_single_quoted, raw_double_quoted))),
        preceded(opt(one_of("uU")), alt((single_quoted, double_quoted))),
    ))(input)
}

fn list<'a>(input: &'a str, depth: usize) -> ParseResult<'a, Literal> {
    let (input, _) = char('[')(input)?;
    let (input, depth) = nested(input, depth)?;
    let (input, items) = separated_list0(char(','), |i: &'a str| literal(i, depth))(input)?;
    let (input, _) = opt(char(','))(input)?;
    let (input, _) = multispace0(input)?;
    let (input, _) = cut(context("closing bracket", char(']')))(input)?;
    Ok((input, Literal::List(items)))
}

/// `(x)` is just `x`; `()`, `(x,)` and `(x, y)` are tuples.
fn parenthesized<'a>(input: &'a str, depth: usize) -> ParseResult<'a, Literal> {
    let (input, _) = char('(')(input)?;
    let (input, depth) = nested(input, depth)?;
    let (input, items) = separated_list0(char(','), |i: &'a str| literal(i, depth))(input)?;
    let (input, trailing) = opt(char(','))(input)?;
    let (input, _) = multispace0(input)?;
    let (input, _) = cut(context("closing parenthesis", char(')')))(input)?;

    let lit = match items.as_slice() {
        [single] if trailing.is_none() => single.clone(),
        _ => Literal::Tuple(items),
    };
    Ok((input, lit))
}

fn dict<'a>(input: &'a str, depth: usize) -> ParseResult<'a, Literal> {
    let (input, _) = char('{')(input)?;
    let (input, depth) = nested(input, depth)?;
    let (input, entries) = separated_list0(
        char(','),
        separated_pair(
            |i: &'a str| literal(i, depth),
            char(':'),
            |i: &'a str| literal(i, depth),
        ),
    )(input)?;
    let (input, _) = opt(char(','))(input)?;
    let (input, _) = multispace0(input)?;
    let (input, _) = cut(context("closing brace", char('}')))(input)?;
    Ok((input, Literal::Dict(entries)))
}

/// One-line rendering of a parse failure: innermost error, its offset,
/// then the enclosing contexts.
fn describe_error(input: &str, err: &VerboseError<&str>) -> String {
    let Some((at, kind)) = err.errors.first() else {
        return "invalid syntax".to_string();
    };

    let mut message = match kind {
        VerboseErrorKind::Char(c) => format!("expected {:?}", c),
        VerboseErrorKind::Context(ctx) => ctx.to_string(),
        VerboseErrorKind::Nom(ErrorKind::Eof) => "unexpected trailing input".to_string(),
        VerboseErrorKind::Nom(_) => "invalid syntax".to_string(),
    };

    message.push_str(&format!(" at offset {}", input.len().saturating_sub(at.len())));
    match at.chars().next() {
        Some(c) => message.push_str(&format!(", found {:?}", c)),
        None => message.push_str(", found end of input"),
    }

    let contexts: Vec<&str> = err
        .errors
        .iter()
        .skip(1)
        .filter_map(|(_, kind)| match kind {
            VerboseErrorKind::Context(ctx) => Some(*ctx),
            _ => None,
        })
        .collect();
    if !contexts.is_empty() {
        message.push_str(&format!(" (in {})", contexts.join(", ")));
    }

    message
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const VALID_BLOB: &str = "{'oauth_consumer_key': '', \
        'lis_result_sourcedid': 'course-v1:SkillFactory+DST-3.0+28FEB2021:lms.skillfactory.ru-ca3ecf8e5f284c329eb7bd529e1a9f7e', \
        'lis_outcome_service_url': 'https://lms.skillfactory.ru/courses/course-v1:SkillFactory+DST-3.0+28FEB2021/xblock/block-v1:SkillFactory+DST-3.0+28FEB2021+type@lti+block@ca3ecf8e5f284c329eb7bd529e1a9f7e/handler_noauth/grade_handler'}";

    #[test]
    fn test_parse_scalars() {
        assert_eq!(parse_literal("None").unwrap(), Literal::None);
        assert_eq!(parse_literal("True").unwrap(), Literal::Bool(true));
        assert_eq!(parse_literal(" -17 ").unwrap(), Literal::Int(-17));
        assert_eq!(parse_literal("3.5").unwrap(), Literal::Float(3.5));
        assert_eq!(parse_literal("'it\\'s'").unwrap(), Literal::Str("it's".to_string()));
        assert_eq!(parse_literal("\"\"").unwrap(), Literal::Str(String::new()));
    }

    #[test]
    fn test_parse_containers() {
        assert_eq!(
            parse_literal("[1, 'a', None,]").unwrap(),
            Literal::List(vec![
                Literal::Int(1),
                Literal::Str("a".to_string()),
                Literal::None
            ])
        );
        assert_eq!(parse_literal("(1)").unwrap(), Literal::Int(1));
        assert_eq!(
            parse_literal("(1,)").unwrap(),
            Literal::Tuple(vec![Literal::Int(1)])
        );
        assert_eq!(parse_literal("{}").unwrap(), Literal::Dict(vec![]));
        assert_eq!(
            parse_literal("{'a': {'b': [True]}}").unwrap(),
            Literal::Dict(vec![(
                Literal::Str("a".to_string()),
                Literal::Dict(vec![(
                    Literal::Str("b".to_string()),
                    Literal::List(vec![Literal::Bool(true)])
                )])
            )])
        );
    }

    #[test]
    fn test_parse_rejects_code() {
        assert!(parse_literal("__import__('os').system('ls')").is_err());
        assert!(parse_literal("{'a': 1").is_err());
        assert!(parse_literal("{'a': 1} extra").is_err());
        assert!(parse_literal("").is_err());
    }

    #[test]
    fn test_passback_params_valid_blob() {
        let params = parse_passback_params(&json!(VALID_BLOB)).unwrap();
        assert_eq!(params.len(), 3);

        let fields = extract_passback_fields(&params).unwrap();
        assert_eq!(fields.oauth_consumer_key, "");
        assert!(fields.lis_result_sourcedid.starts_with("course-v1:"));
        assert!(fields.lis_outcome_service_url.starts_with("https://"));
    }

    #[test]
    fn test_passback_params_empty_and_non_mapping() {
        let err = parse_passback_params(&Value::Null).unwrap_err();
        assert_eq!(err.reason, "passback_params is empty");

        let err = parse_passback_params(&json!("['a', 'b']")).unwrap_err();
        assert_eq!(err.reason, "Parsed value is not a dictionary: list");
    }

    #[test]
    fn test_passback_params_parse_error_is_reported() {
        let err = parse_passback_params(&json!("{'oauth_consumer_key': ")).unwrap_err();
        assert_eq!(err.field, "passback_params");
        assert!(err.reason.starts_with("Failed to parse passback_params: "));
        assert!(err.reason.len() > "Failed to parse passback_params: ".len());
        assert!(!err.reason.contains('\n'));
    }

    #[test]
    fn test_parse_error_is_one_line() {
        assert_eq!(
            parse_literal("{'a': 1").unwrap_err(),
            "expected '}' at offset 7, found end of input (in closing brace)"
        );

        let err = parse_literal("{'oauth_consumer_key': 'k\\q'}").unwrap_err();
        assert!(!err.contains('\n'), "{}", err);
        assert!(err.contains("closing quote"), "{}", err);

        let err = parse_literal("{'a': 1} extra").unwrap_err();
        assert!(err.starts_with("unexpected trailing input at offset 9"), "{}", err);
    }

    #[test]
    fn test_deep_nesting_rejected_not_recursed() {
        let depth = 10_000;
        let blob = "[".repeat(depth) + &"]".repeat(depth);

        let err = parse_passback_params(&json!(blob)).unwrap_err();

        assert_eq!(err.field, "passback_params");
        assert!(err.reason.contains("too many nested containers"), "{}", err.reason);
        assert!(!err.reason.contains('\n'));

        let dicts = "{'a': ".repeat(depth) + "1" + &"}".repeat(depth);
        assert!(parse_literal(&dicts).unwrap_err().contains("too many nested containers"));
    }

    #[test]
    fn test_nesting_limit_boundary() {
        let at_limit = "[".repeat(MAX_NESTING) + &"]".repeat(MAX_NESTING);
        assert!(parse_literal(&at_limit).is_ok());

        let past_limit = "(".repeat(MAX_NESTING + 1) + &")".repeat(MAX_NESTING + 1);
        assert!(parse_literal(&past_limit).is_err());
    }

    #[test]
    fn test_repr_escapes_and_prefixes() {
        let params = parse_passback_params(&json!(
            "{'oauth_consumer_key': 'k\\x7f', 'lis_result_sourcedid': 'a:b', 'lis_outcome_service_url': 'https://x.org/a'}"
        ))
        .unwrap();
        let fields = extract_passback_fields(&params).unwrap();
        assert_eq!(fields.oauth_consumer_key, "k\u{7f}");

        assert_eq!(
            parse_literal("'caf\\u00e9 \\U0001F600'").unwrap(),
            Literal::Str("caf\u{e9} \u{1F600}".to_string())
        );
        assert_eq!(
            parse_literal("'\\0\\012\\a'").unwrap(),
            Literal::Str("\0\n\u{07}".to_string())
        );
        assert_eq!(parse_literal("u'key'").unwrap(), Literal::Str("key".to_string()));
        assert_eq!(parse_literal("U\"key\"").unwrap(), Literal::Str("key".to_string()));
        assert_eq!(
            parse_literal("r'a\\d\\'b'").unwrap(),
            Literal::Str("a\\d\\'b".to_string())
        );
    }

    #[test]
    fn test_invalid_escapes_rejected() {
        assert!(parse_literal("'\\ud800'").is_err());
        assert!(parse_literal("'\\U00110000'").is_err());
        assert!(parse_literal("'\\x7'").is_err());
        assert!(parse_literal("'\\q'").is_err());
    }

    #[test]
    fn test_validate_collects_all_violations() {
        let params = parse_passback_params(&json!(
            "{'oauth_consumer_key': None, 'lis_result_sourcedid': 'no-separator'}"
        ))
        .unwrap();

        let errors = validate_passback_params_dict(&params);
        let reasons: Vec<String> = errors.iter().map(|e| e.reason.clone()).collect();

        assert_eq!(errors.len(), 3);
        assert!(reasons.contains(&"Field oauth_consumer_key in passback_params is null".to_string()));
        assert!(reasons.contains(
            &"Missing required field in passback_params: lis_outcome_service_url".to_string()
        ));
        assert!(reasons.contains(&"Invalid lis_result_sourcedid format: no-separator".to_string()));
    }

    #[test]
    fn test_validate_service_url_pattern() {
        let params = parse_passback_params(&json!(
            "{'oauth_consumer_key': 'k', 'lis_result_sourcedid': 'a:b', 'lis_outcome_service_url': 'ftp://host/x'}"
        ))
        .unwrap();

        let errors = validate_passback_params_dict(&params);
        assert_eq!(errors.len(), 1);
        assert!(errors[0].reason.contains("Invalid lis_outcome_service_url format"));
    }

    #[test]
    fn test_non_string_sourcedid_rejected() {
        let params = parse_passback_params(&json!(
            "{'oauth_consumer_key': 'k', 'lis_result_sourcedid': 42, 'lis_outcome_service_url': 'http://x.org/a'}"
        ))
        .unwrap();

        let errors = validate_passback_params_dict(&params);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].reason, "Invalid lis_result_sourcedid format: 42");
    }
}
