use pegma::grammar::Grammar;
use pegma::pattern::Pattern;

use crate::MatchResult;

/// Matches `pattern` against the suffix of `input` starting at `position`.
///
/// The returned length is relative to `position`. Matching is a pure
/// function of its arguments: ordered choice backtracks to the original
/// position, sequences never reconsider an element once it has matched, and
/// there is no memoization. A rule name that `grammar` does not define is an
/// ordinary `Failure`, indistinguishable from a non-match. Left-recursive
/// grammars recurse at the same position until the call stack is exhausted;
/// avoiding them is the caller's responsibility.
pub fn match_pattern(
    grammar: &Grammar,
    pattern: &Pattern,
    input: &[u8],
    position: u32,
) -> MatchResult {
    debug_assert!(position as usize <= input.len());
    Matcher { grammar, input }.pattern(pattern, position)
}

/// [`match_pattern`] starting at the beginning of the input.
pub fn match_prefix(grammar: &Grammar, pattern: &Pattern, input: &[u8]) -> MatchResult {
    match_pattern(grammar, pattern, input, 0)
}

struct Matcher<'a> {
    grammar: &'a Grammar,
    input: &'a [u8],
}

impl<'a> Matcher<'a> {
    #[inline]
    fn remaining(&self, position: u32) -> &'a [u8] {
        &self.input[position as usize..]
    }

    fn pattern(&self, pattern: &Pattern, position: u32) -> MatchResult {
        match pattern {
            Pattern::Empty => MatchResult::Success(0),
            Pattern::Literal(bytes) => {
                if self.remaining(position).starts_with(bytes) {
                    MatchResult::Success(bytes.len() as u32)
                } else {
                    MatchResult::Failure
                }
            }
            Pattern::Rule(name) => match self.grammar.find_rule(name) {
                Some(handle) => self.pattern(&self.grammar[handle].body, position),
                None => MatchResult::Failure,
            },
            Pattern::Sequence(first, second) => {
                let MatchResult::Success(first_length) = self.pattern(first, position) else {
                    return MatchResult::Failure;
                };
                match self.pattern(second, position + first_length) {
                    MatchResult::Success(second_length) => {
                        MatchResult::Success(first_length + second_length)
                    }
                    MatchResult::Failure => MatchResult::Failure,
                }
            }
            Pattern::Choice(primary, fallback) => match self.pattern(primary, position) {
                success @ MatchResult::Success(_) => success,
                MatchResult::Failure => self.pattern(fallback, position),
            },
            Pattern::ZeroOrMore(inner) => MatchResult::Success(self.repeat(inner, position)),
            Pattern::OneOrMore(inner) => match self.pattern(inner, position) {
                MatchResult::Success(first_length) => {
                    let mut total = first_length;
                    if first_length != 0 {
                        total += self.repeat(inner, position + first_length);
                    }
                    MatchResult::Success(total)
                }
                MatchResult::Failure => MatchResult::Failure,
            },
            Pattern::Maybe(inner) => match self.pattern(inner, position) {
                success @ MatchResult::Success(_) => success,
                MatchResult::Failure => MatchResult::Success(0),
            },
            Pattern::And(inner) => match self.pattern(inner, position) {
                MatchResult::Success(_) => MatchResult::Success(0),
                MatchResult::Failure => MatchResult::Failure,
            },
            Pattern::Not(inner) => match self.pattern(inner, position) {
                MatchResult::Success(_) => MatchResult::Failure,
                MatchResult::Failure => MatchResult::Success(0),
            },
        }
    }

    // greedy accumulation; a zero-length success would repeat forever, so
    // the loop stops after it
    fn repeat(&self, inner: &Pattern, position: u32) -> u32 {
        let mut position = position;
        let mut total = 0;
        while let MatchResult::Success(length) = self.pattern(inner, position) {
            total += length;
            position += length;
            if length == 0 {
                break;
            }
        }
        total
    }
}

#[cfg(test)]
use pegma::grammar::Rule;

#[cfg(test)]
fn empty_grammar() -> Grammar {
    Grammar::new("start", [])
}

#[cfg(test)]
fn check(grammar: &Grammar, pattern: &Pattern, input: &str, expected: MatchResult) {
    assert_eq!(match_prefix(grammar, pattern, input.as_bytes()), expected);
}

#[cfg(test)]
fn arithmetic() -> Grammar {
    let operator = |a: &str, b: &str| Pattern::one_of([Pattern::literal(a), Pattern::literal(b)]);
    Grammar::new(
        "sum",
        [
            Rule::new(
                "sum",
                Pattern::sequence(
                    Pattern::rule("product"),
                    Pattern::sequence(operator("+", "-"), Pattern::rule("product")).star(),
                ),
            ),
            Rule::new(
                "product",
                Pattern::sequence(
                    Pattern::rule("value"),
                    Pattern::sequence(operator("*", "/"), Pattern::rule("value")).star(),
                ),
            ),
            Rule::new(
                "value",
                Pattern::choice(
                    Pattern::rule("digit").plus(),
                    Pattern::seq_of([
                        Pattern::literal("("),
                        Pattern::rule("sum"),
                        Pattern::literal(")"),
                    ]),
                ),
            ),
            Rule::new(
                "digit",
                Pattern::one_of((b'0'..=b'9').map(|digit| Pattern::literal([digit]))),
            ),
        ],
    )
}

#[test]
fn test_empty() {
    let grammar = empty_grammar();
    check(&grammar, &Pattern::Empty, "", MatchResult::Success(0));
    check(&grammar, &Pattern::Empty, "abc", MatchResult::Success(0));
}

#[test]
fn test_literal() {
    let grammar = empty_grammar();
    let the = Pattern::literal("the");
    check(&grammar, &the, "the", MatchResult::Success(3));
    check(&grammar, &the, "there", MatchResult::Success(3));
    // input shorter than the literal
    check(&grammar, &the, "th", MatchResult::Failure);
    check(&grammar, &the, "The", MatchResult::Failure);
    check(&grammar, &the, "", MatchResult::Failure);

    check(&grammar, &Pattern::literal(""), "anything", MatchResult::Success(0));
    check(&grammar, &Pattern::literal(""), "", MatchResult::Success(0));
}

#[test]
fn test_match_at_position() {
    let grammar = empty_grammar();
    let pattern = Pattern::literal("he");
    assert_eq!(
        match_pattern(&grammar, &pattern, b"the", 1),
        MatchResult::Success(2)
    );
    assert_eq!(
        match_pattern(&grammar, &pattern, b"the", 0),
        MatchResult::Failure
    );
    assert_eq!(
        match_pattern(&grammar, &pattern, b"the", 3),
        MatchResult::Failure
    );
}

#[test]
fn test_sequence() {
    let grammar = empty_grammar();
    let pattern = Pattern::sequence(Pattern::literal("ab"), Pattern::literal("cd"));
    check(&grammar, &pattern, "abcd", MatchResult::Success(4));
    check(&grammar, &pattern, "abcdef", MatchResult::Success(4));
    check(&grammar, &pattern, "abxx", MatchResult::Failure);
    check(&grammar, &pattern, "xbcd", MatchResult::Failure);
    check(&grammar, &pattern, "ab", MatchResult::Failure);
}

#[test]
fn test_sequence_commits() {
    // the first element matches "a" and is never reconsidered, even though
    // taking the "ab" alternative would let the whole sequence succeed
    let grammar = empty_grammar();
    let head = Pattern::choice(Pattern::literal("a"), Pattern::literal("ab"));
    let pattern = Pattern::sequence(head, Pattern::literal("c"));
    check(&grammar, &pattern, "abc", MatchResult::Failure);
    check(&grammar, &pattern, "ac", MatchResult::Success(2));
}

#[test]
fn test_choice_is_ordered() {
    let grammar = empty_grammar();

    let pattern = Pattern::choice(Pattern::literal("a"), Pattern::literal("ab"));
    // the primary wins even though the fallback would match more
    check(&grammar, &pattern, "ab", MatchResult::Success(1));

    let pattern = Pattern::choice(Pattern::literal("x"), Pattern::literal("ab"));
    check(&grammar, &pattern, "ab", MatchResult::Success(2));
    check(&grammar, &pattern, "zz", MatchResult::Failure);
}

#[test]
fn test_zero_or_more() {
    let grammar = empty_grammar();
    let pattern = Pattern::literal("ab").star();
    check(&grammar, &pattern, "ababx", MatchResult::Success(4));
    check(&grammar, &pattern, "x", MatchResult::Success(0));
    check(&grammar, &pattern, "", MatchResult::Success(0));
}

#[test]
fn test_one_or_more() {
    let grammar = empty_grammar();
    let pattern = Pattern::literal("ab").plus();
    check(&grammar, &pattern, "ababx", MatchResult::Success(4));
    check(&grammar, &pattern, "x", MatchResult::Failure);
    check(&grammar, &pattern, "", MatchResult::Failure);
}

#[test]
fn test_repetition_stops_when_not_advancing() {
    let grammar = empty_grammar();

    check(&grammar, &Pattern::Empty.star(), "aaa", MatchResult::Success(0));
    check(&grammar, &Pattern::Empty.plus(), "aaa", MatchResult::Success(0));

    // the optional keeps succeeding with length zero once its inner
    // pattern stops matching
    let pattern = Pattern::literal("a").maybe().star();
    check(&grammar, &pattern, "aab", MatchResult::Success(2));
    check(&grammar, &pattern, "b", MatchResult::Success(0));

    let pattern = Pattern::literal("a").maybe().plus();
    check(&grammar, &pattern, "aab", MatchResult::Success(2));
    check(&grammar, &pattern, "", MatchResult::Success(0));
}

#[test]
fn test_maybe() {
    let grammar = empty_grammar();
    let pattern = Pattern::literal("ab").maybe();
    check(&grammar, &pattern, "abab", MatchResult::Success(2));
    check(&grammar, &pattern, "x", MatchResult::Success(0));
    check(&grammar, &pattern, "", MatchResult::Success(0));
}

#[test]
fn test_lookahead() {
    let grammar = empty_grammar();

    let pattern = Pattern::literal("ab").ahead();
    check(&grammar, &pattern, "abab", MatchResult::Success(0));
    check(&grammar, &pattern, "x", MatchResult::Failure);

    let pattern = Pattern::literal("ab").not_ahead();
    check(&grammar, &pattern, "abab", MatchResult::Failure);
    check(&grammar, &pattern, "x", MatchResult::Success(0));
}

#[test]
fn test_lookahead_in_sequence() {
    let grammar = empty_grammar();
    // the lookahead inspects "ab" without consuming it
    let pattern = Pattern::sequence(Pattern::literal("ab").ahead(), Pattern::literal("abc"));
    check(&grammar, &pattern, "abc", MatchResult::Success(3));
}

#[test]
fn test_rule_resolution() {
    let grammar = Grammar::new(
        "start",
        [
            Rule::new(
                "start",
                Pattern::sequence(Pattern::rule("letter"), Pattern::rule("letter")),
            ),
            Rule::new(
                "letter",
                Pattern::choice(Pattern::literal("a"), Pattern::literal("b")),
            ),
        ],
    );
    check(&grammar, &Pattern::rule("start"), "ab", MatchResult::Success(2));
    check(&grammar, &Pattern::rule("start"), "ba", MatchResult::Success(2));
    check(&grammar, &Pattern::rule("start"), "ax", MatchResult::Failure);
}

#[test]
fn test_undefined_rule_is_a_plain_failure() {
    let grammar = empty_grammar();
    check(&grammar, &Pattern::rule("X"), "anything", MatchResult::Failure);
    check(&grammar, &Pattern::rule("X"), "", MatchResult::Failure);
}

#[test]
fn test_rule_shadowing() {
    let grammar = Grammar::new(
        "a",
        [
            Rule::new("a", Pattern::literal("first")),
            Rule::new("a", Pattern::literal("second")),
        ],
    );
    check(&grammar, &Pattern::rule("a"), "first", MatchResult::Success(5));
    check(&grammar, &Pattern::rule("a"), "second", MatchResult::Failure);
}

#[test]
fn test_recursive_grammar() {
    // balanced parentheses around a single "x"
    let grammar = Grammar::new(
        "nest",
        [Rule::new(
            "nest",
            Pattern::choice(
                Pattern::seq_of([
                    Pattern::literal("("),
                    Pattern::rule("nest"),
                    Pattern::literal(")"),
                ]),
                Pattern::literal("x"),
            ),
        )],
    );
    check(&grammar, &Pattern::rule("nest"), "x", MatchResult::Success(1));
    check(&grammar, &Pattern::rule("nest"), "(((x)))", MatchResult::Success(7));
    check(&grammar, &Pattern::rule("nest"), "((x)", MatchResult::Failure);
}

#[test]
fn test_negative_lookahead_at_end_of_input() {
    let grammar = Grammar::new(
        "start",
        [
            Rule::new("start", Pattern::rule("symbol").not_ahead()),
            Rule::new(
                "symbol",
                Pattern::sequence(Pattern::rule("value"), Pattern::literal("!")),
            ),
            Rule::new(
                "value",
                Pattern::choice(Pattern::literal("woo"), Pattern::literal("the")),
            ),
        ],
    );
    let start = Pattern::rule("start");
    check(&grammar, &start, "", MatchResult::Success(0));
    check(&grammar, &start, "th!", MatchResult::Success(0));
    check(&grammar, &start, "the!", MatchResult::Failure);
    check(&grammar, &start, "woo!", MatchResult::Failure);
}

#[test]
fn test_arithmetic() {
    let grammar = arithmetic();
    let sum = Pattern::rule("sum");

    // the trailing "-025" is consumed as a second term of the outer sum
    let input = "(1+2*3+((88)/44))-025";
    assert_eq!(
        match_prefix(&grammar, &sum, input.as_bytes()),
        MatchResult::Success(input.len() as u32)
    );

    check(&grammar, &sum, "2*(3+4)xyz", MatchResult::Success(7));
    check(&grammar, &sum, "12", MatchResult::Success(2));
    check(&grammar, &sum, "+", MatchResult::Failure);
    check(&grammar, &sum, "(1", MatchResult::Failure);
}
