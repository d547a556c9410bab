use std::fmt::{self, Write};

use crate::display::display_byte_literal;

/// A parsing expression. Sub-patterns are exclusively owned by their parent
/// node; `Rule` is the only way to express recursive structure and is
/// resolved by name against a [`Grammar`](crate::Grammar) at match time.
#[derive(Clone, PartialEq, Eq, Debug)]
pub enum Pattern {
    /// Matches the empty string.
    Empty,
    /// Matches this exact byte sequence.
    Literal(Box<[u8]>),
    /// Matches whatever the named rule matches.
    Rule(Box<str>),
    Sequence(Box<Pattern>, Box<Pattern>),
    /// Ordered: the fallback is attempted only if the primary fails.
    Choice(Box<Pattern>, Box<Pattern>),
    ZeroOrMore(Box<Pattern>),
    OneOrMore(Box<Pattern>),
    Maybe(Box<Pattern>),
    /// Positive lookahead, consumes nothing.
    And(Box<Pattern>),
    /// Negative lookahead, consumes nothing.
    Not(Box<Pattern>),
}

impl Pattern {
    pub fn literal(text: impl AsRef<[u8]>) -> Pattern {
        Pattern::Literal(text.as_ref().into())
    }
    pub fn rule(name: impl Into<Box<str>>) -> Pattern {
        Pattern::Rule(name.into())
    }
    pub fn sequence(first: Pattern, second: Pattern) -> Pattern {
        Pattern::Sequence(Box::new(first), Box::new(second))
    }
    pub fn choice(primary: Pattern, fallback: Pattern) -> Pattern {
        Pattern::Choice(Box::new(primary), Box::new(fallback))
    }
    pub fn star(self) -> Pattern {
        Pattern::ZeroOrMore(Box::new(self))
    }
    pub fn plus(self) -> Pattern {
        Pattern::OneOrMore(Box::new(self))
    }
    pub fn maybe(self) -> Pattern {
        Pattern::Maybe(Box::new(self))
    }
    pub fn ahead(self) -> Pattern {
        Pattern::And(Box::new(self))
    }
    pub fn not_ahead(self) -> Pattern {
        Pattern::Not(Box::new(self))
    }

    /// Folds a list into left-nested `Sequence` nodes. An empty list
    /// collapses to `Empty`.
    pub fn seq_of(patterns: impl IntoIterator<Item = Pattern>) -> Pattern {
        let mut iter = patterns.into_iter();
        let Some(first) = iter.next() else {
            return Pattern::Empty;
        };
        iter.fold(first, Pattern::sequence)
    }

    /// Folds a list into left-nested `Choice` nodes. An empty list
    /// collapses to `Empty`.
    pub fn one_of(patterns: impl IntoIterator<Item = Pattern>) -> Pattern {
        let mut iter = patterns.into_iter();
        let Some(first) = iter.next() else {
            return Pattern::Empty;
        };
        iter.fold(first, Pattern::choice)
    }
}

impl Pattern {
    // binding strength, loosest to tightest; atoms never need parentheses
    fn binding(&self) -> u8 {
        match self {
            Pattern::Choice(..) => 0,
            Pattern::Sequence(..) => 1,
            Pattern::And(_) | Pattern::Not(_) => 2,
            Pattern::ZeroOrMore(_) | Pattern::OneOrMore(_) | Pattern::Maybe(_) => 3,
            Pattern::Empty | Pattern::Literal(_) | Pattern::Rule(_) => 4,
        }
    }

    /// Writes the pattern in inline notation: `ε`, quoted literals, bare
    /// rule names, ` `, ` | `, postfix `*` `+` `?`, prefix `&` `!`.
    /// Parentheses appear only where nesting requires them.
    pub fn display_into(&self, buf: &mut dyn Write) -> fmt::Result {
        self.display_into_binding(buf, 0)
    }

    fn display_into_binding(&self, buf: &mut dyn Write, min: u8) -> fmt::Result {
        let parens = self.binding() < min;
        if parens {
            buf.write_char('(')?;
        }
        match self {
            Pattern::Empty => buf.write_char('ε')?,
            Pattern::Literal(bytes) => display_byte_literal(buf, "\"", bytes)?,
            Pattern::Rule(name) => buf.write_str(name)?,
            Pattern::Sequence(first, second) => {
                first.display_into_binding(buf, 1)?;
                buf.write_char(' ')?;
                second.display_into_binding(buf, 1)?;
            }
            Pattern::Choice(primary, fallback) => {
                primary.display_into_binding(buf, 0)?;
                buf.write_str(" | ")?;
                fallback.display_into_binding(buf, 0)?;
            }
            Pattern::ZeroOrMore(inner) => {
                inner.display_into_binding(buf, 4)?;
                buf.write_char('*')?;
            }
            Pattern::OneOrMore(inner) => {
                inner.display_into_binding(buf, 4)?;
                buf.write_char('+')?;
            }
            Pattern::Maybe(inner) => {
                inner.display_into_binding(buf, 4)?;
                buf.write_char('?')?;
            }
            Pattern::And(inner) => {
                buf.write_char('&')?;
                inner.display_into_binding(buf, 2)?;
            }
            Pattern::Not(inner) => {
                buf.write_char('!')?;
                inner.display_into_binding(buf, 2)?;
            }
        }
        if parens {
            buf.write_char(')')?;
        }
        Ok(())
    }

    /// Writes the pattern as an indented tree, one node per line.
    pub fn display_into_indent(&self, buf: &mut dyn Write, indent: u32) -> fmt::Result {
        for _ in 0..indent {
            buf.write_str("  ")?;
        }
        match self {
            Pattern::Empty => writeln!(buf, "Empty"),
            Pattern::Literal(bytes) => {
                buf.write_str("Literal(")?;
                display_byte_literal(buf, "\"", bytes)?;
                writeln!(buf, ")")
            }
            Pattern::Rule(name) => writeln!(buf, "Rule({name})"),
            Pattern::Sequence(first, second) => {
                writeln!(buf, "Sequence")?;
                first.display_into_indent(buf, indent + 1)?;
                second.display_into_indent(buf, indent + 1)
            }
            Pattern::Choice(primary, fallback) => {
                writeln!(buf, "Choice")?;
                primary.display_into_indent(buf, indent + 1)?;
                fallback.display_into_indent(buf, indent + 1)
            }
            Pattern::ZeroOrMore(inner) => {
                writeln!(buf, "ZeroOrMore")?;
                inner.display_into_indent(buf, indent + 1)
            }
            Pattern::OneOrMore(inner) => {
                writeln!(buf, "OneOrMore")?;
                inner.display_into_indent(buf, indent + 1)
            }
            Pattern::Maybe(inner) => {
                writeln!(buf, "Maybe")?;
                inner.display_into_indent(buf, indent + 1)
            }
            Pattern::And(inner) => {
                writeln!(buf, "And")?;
                inner.display_into_indent(buf, indent + 1)
            }
            Pattern::Not(inner) => {
                writeln!(buf, "Not")?;
                inner.display_into_indent(buf, indent + 1)
            }
        }
    }
}

impl fmt::Display for Pattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.display_into(f)
    }
}

#[test]
fn test_display_atoms() {
    assert_eq!(Pattern::Empty.to_string(), "ε");
    assert_eq!(Pattern::literal("woo").to_string(), "\"woo\"");
    assert_eq!(Pattern::literal("a\n").to_string(), "\"a\\n\"");
    assert_eq!(Pattern::rule("value").to_string(), "value");
}

#[test]
fn test_display_parentheses() {
    let choice = Pattern::choice(Pattern::literal("a"), Pattern::literal("b"));
    let seq = Pattern::sequence(choice.clone(), Pattern::literal("c"));
    assert_eq!(seq.to_string(), "(\"a\" | \"b\") \"c\"");
    assert_eq!(seq.star().to_string(), "((\"a\" | \"b\") \"c\")*");

    let flat = Pattern::one_of([
        Pattern::literal("a"),
        Pattern::literal("b"),
        Pattern::literal("c"),
    ]);
    assert_eq!(flat.to_string(), "\"a\" | \"b\" | \"c\"");

    assert_eq!(choice.clone().not_ahead().to_string(), "!(\"a\" | \"b\")");
    assert_eq!(Pattern::literal("a").star().maybe().to_string(), "(\"a\"*)?");
    assert_eq!(
        Pattern::literal("a").maybe().not_ahead().to_string(),
        "!\"a\"?"
    );
    assert_eq!(
        Pattern::literal("a").not_ahead().star().to_string(),
        "(!\"a\")*"
    );
}

#[test]
fn test_display_indent() {
    let pattern = Pattern::sequence(
        Pattern::rule("value"),
        Pattern::choice(Pattern::literal("!"), Pattern::Empty).star(),
    );
    let mut buf = String::new();
    pattern.display_into_indent(&mut buf, 0).unwrap();
    let expected = "\
Sequence
  Rule(value)
  ZeroOrMore
    Choice
      Literal(\"!\")
      Empty
";
    assert_eq!(buf, expected);
}

#[test]
fn test_fold_sugar() {
    let folded = Pattern::seq_of([
        Pattern::literal("a"),
        Pattern::literal("b"),
        Pattern::literal("c"),
    ]);
    let nested = Pattern::sequence(
        Pattern::sequence(Pattern::literal("a"), Pattern::literal("b")),
        Pattern::literal("c"),
    );
    assert_eq!(folded, nested);

    assert_eq!(Pattern::seq_of([]), Pattern::Empty);
    assert_eq!(Pattern::one_of([]), Pattern::Empty);
    assert_eq!(Pattern::one_of([Pattern::rule("a")]), Pattern::rule("a"));
}
