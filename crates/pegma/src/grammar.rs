use std::fmt::{self, Write};
use std::ops::Index;

use cranelift_entity::{entity_impl, PrimaryMap};

use crate::pattern::Pattern;

#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct RuleHandle(u32);

entity_impl! { RuleHandle }

impl RuleHandle {
    pub fn name(self, cx: &Grammar) -> &str {
        &cx.get_rule(self).unwrap().name
    }
}

#[derive(Clone, Debug)]
pub struct Rule {
    pub name: Box<str>,
    pub body: Pattern,
}

impl Rule {
    pub fn new(name: impl Into<Box<str>>, body: Pattern) -> Rule {
        Rule {
            name: name.into(),
            body,
        }
    }

    pub fn display_into(&self, buf: &mut dyn Write) -> fmt::Result {
        write!(buf, "{} -> ", self.name)?;
        self.body.display_into(buf)
    }
}

impl fmt::Display for Rule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.display_into(f)
    }
}

/// An ordered rule table plus a start-symbol name. Immutable once built.
///
/// The start symbol is caller metadata; matching always begins from whatever
/// pattern the caller hands to the engine.
pub struct Grammar {
    start: Box<str>,
    rules: PrimaryMap<RuleHandle, Rule>,
}

impl Grammar {
    /// Construction performs no validation: rules may shadow each other,
    /// reference names that do not exist, or be left-recursive.
    pub fn new(start: impl Into<Box<str>>, rules: impl IntoIterator<Item = Rule>) -> Grammar {
        let mut map = PrimaryMap::new();
        for rule in rules {
            map.push(rule);
        }
        Grammar {
            start: start.into(),
            rules: map,
        }
    }

    pub fn start(&self) -> &str {
        &self.start
    }

    /// The first rule with a matching name wins; later duplicates are
    /// shadowed, not an error.
    pub fn find_rule(&self, name: &str) -> Option<RuleHandle> {
        self.rules
            .iter()
            .find(|(_, rule)| &*rule.name == name)
            .map(|(handle, _)| handle)
    }

    pub fn get_rule(&self, handle: RuleHandle) -> Option<&Rule> {
        self.rules.get(handle)
    }

    pub fn rules(&self) -> impl Iterator<Item = (RuleHandle, &Rule)> {
        self.rules.iter()
    }

    pub fn display_into(&self, buf: &mut dyn Write) -> fmt::Result {
        writeln!(buf, "Start: {}", self.start)?;
        writeln!(buf, "Rules:")?;
        for (_, rule) in self.rules.iter() {
            buf.write_str("  ")?;
            rule.display_into(buf)?;
            buf.write_char('\n')?;
        }
        Ok(())
    }
}

impl Index<RuleHandle> for Grammar {
    type Output = Rule;
    fn index(&self, index: RuleHandle) -> &Rule {
        &self.rules[index]
    }
}

impl fmt::Display for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.display_into(f)
    }
}

#[cfg(test)]
fn sample() -> Grammar {
    Grammar::new(
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
    )
}

#[test]
fn test_find_rule() {
    let grammar = sample();

    let symbol = grammar.find_rule("symbol").unwrap();
    assert_eq!(symbol.name(&grammar), "symbol");
    assert_eq!(grammar.find_rule("nope"), None);

    // repeated lookups resolve to the same rule
    assert_eq!(grammar.find_rule("symbol"), Some(symbol));
}

#[test]
fn test_find_rule_shadowing() {
    let grammar = Grammar::new(
        "a",
        [
            Rule::new("a", Pattern::literal("first")),
            Rule::new("a", Pattern::literal("second")),
        ],
    );

    let handle = grammar.find_rule("a").unwrap();
    assert_eq!(grammar[handle].body, Pattern::literal("first"));
}

#[test]
fn test_display() {
    let expected = "\
Start: start
Rules:
  start -> !symbol
  symbol -> value \"!\"
  value -> \"woo\" | \"the\"
";
    assert_eq!(sample().to_string(), expected);
}
