use nom::{
    branch::alt,
    bytes::complete::{is_not, tag, take_until, take_while1},
    character::complete::char,
    sequence::{delimited, pair, separated_pair},
    IResult,
};
use tracing::trace;

use super::{MarkupAttributes, MarkupNode};
use std::collections::HashMap;

/// Parse a markup string into a tree rooted at a synthetic `document` node.
pub fn document(text: &str) -> MarkupNode {
    parse(text, "document")
}

/// Parse a markup string into a tree rooted at a synthetic node named
/// `tag_name`. Never fails: constructs that are not recognized as tags or
/// attributes are dropped, and whatever remains is extracted best-effort.
///
/// Child spans are matched against the *nearest* closing tag of the same
/// name, not the balanced one, so a tag containing a same-named child is
/// split at the child's closing tag. Consumers rely on this shape; do not
/// replace it with stack-based matching.
pub fn parse(text: &str, tag_name: &str) -> MarkupNode {
    let mut children = Vec::new();
    // Working copy of the text with every matched child span removed, so
    // that a child's attributes are never scanned as the parent's.
    let mut stripped = String::with_capacity(text.len());
    let mut rest = text;
    while let Some(idx) = rest.find('<') {
        stripped.push_str(&rest[..idx]);
        rest = &rest[idx..];
        match child_span(rest) {
            Ok((after, (name, inner))) => {
                trace!("matched <{}> span of {} bytes", name, rest.len() - after.len());
                children.push(parse(inner, name));
                rest = after;
            }
            Err(_) => {
                trace!("stray '<' at byte {}, kept as text", text.len() - rest.len());
                stripped.push('<');
                rest = &rest[1..];
            }
        }
    }
    stripped.push_str(rest);
    MarkupNode {
        tag_name: tag_name.to_string(),
        attributes: MarkupAttributes(attributes(&stripped)),
        children,
    }
}

/// Attempt to parse a string as a valid tag or attribute name
fn word(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_')(input)
}

/// Match a complete tag span at the start of the input: `<name .../>` or
/// `<name ...>...</name>`, closing at the first `</name>` that follows.
/// Returns the matched name and the span's text exclusive of the `<name`
/// prefix and the trailing `/>` or `</name>`, which is exactly the text
/// the child node is parsed from.
fn child_span(input: &str) -> IResult<&str, (&str, &str)> {
    let (rest, (_, name)) = pair(char('<'), word)(input)?;
    let (rest, head) = take_until(">")(rest)?;
    let (rest, _) = char('>')(rest)?;
    if let Some(inner) = head.strip_suffix('/') {
        return Ok((rest, (name, inner)));
    }
    let close = format!("</{}>", name);
    let (rest, _) = take_until(close.as_str())(rest)?;
    let (rest, _) = tag(close.as_str())(rest)?;
    let inner_start = 1 + name.len();
    let inner_end = input.len() - rest.len() - close.len();
    Ok((rest, (name, &input[inner_start..inner_end])))
}

#[cfg(test)]
#[test]
fn test_child_span() {
    let data = r#"<item a="1"/>after"#;
    assert_eq!(child_span(data).unwrap(), ("after", ("item", r#" a="1""#)));

    let data = r#"<outer x="1"><inner/></outer>after"#;
    assert_eq!(
        child_span(data).unwrap(),
        ("after", ("outer", r#" x="1"><inner/>"#))
    );

    // Nearest close wins over the balanced one
    let data = r#"<a><a/></a></a>"#;
    assert_eq!(child_span(data).unwrap(), ("</a>", ("a", "><a/>")));

    // Unterminated tags are not spans
    assert!(child_span("<a>no close").is_err());
    assert!(child_span("<no end").is_err());
    assert!(child_span("plain text").is_err());
}

/// Parse a single `name="value"` pair; the value may be empty and must not
/// contain `<`, `>` or `=`
fn attribute(input: &str) -> IResult<&str, (&str, &str)> {
    let value = alt((is_not("<>=\""), tag("")));
    separated_pair(word, char('='), delimited(char('"'), value, char('"')))(input)
}

/// Scan text left to right for attribute pairs, skipping anything else.
/// Later occurrences of a name overwrite earlier ones.
fn attributes(text: &str) -> HashMap<String, String> {
    let mut attrs = HashMap::new();
    let mut rest = text;
    while !rest.is_empty() {
        match attribute(rest) {
            Ok((after, (name, value))) => {
                attrs.insert(name.to_string(), value.to_string());
                rest = after;
            }
            Err(_) => {
                let mut chars = rest.chars();
                chars.next();
                rest = chars.as_str();
            }
        }
    }
    attrs
}

#[cfg(test)]
#[test]
fn test_attributes() {
    let found = attributes(r#" a="1"  b=""  junk >< c="three""#);
    let target = HashMap::from([
        ("a".to_string(), "1".to_string()),
        ("b".to_string(), "".to_string()),
        ("c".to_string(), "three".to_string()),
    ]);
    assert_eq!(found, target);

    // Last occurrence of a repeated name wins
    let found = attributes(r#"k="1" k="2""#);
    assert_eq!(found, HashMap::from([("k".to_string(), "2".to_string())]));

    assert!(attributes("no pairs here").is_empty());
    assert!(attributes("").is_empty());
}
