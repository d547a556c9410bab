use std::path::Path;

use bstr::ByteSlice;
use pegma::{Grammar, Pattern, Rule};
use pegma_runtime::{match_pattern, MatchResult};

trait IoError<T> {
    fn pretty_error(self, path: &Path, message: &str) -> Result<T, ()>;
}

impl<T> IoError<T> for std::io::Result<T> {
    fn pretty_error(self, path: &Path, message: &str) -> Result<T, ()> {
        self.map_err(|e| {
            let path = path.display();
            eprintln!("{message} `{path}`\n  {e}");
        })
    }
}

fn main() {
    if run().is_err() {
        std::process::exit(1);
    }
}

struct StdoutSink;

impl std::fmt::Write for StdoutSink {
    fn write_str(&mut self, s: &str) -> std::fmt::Result {
        use std::io::Write as _;
        std::io::stdout()
            .write_all(s.as_bytes())
            .map_err(|_| std::fmt::Error)
    }
}

struct Demo {
    name: &'static str,
    sample: &'static str,
    build: fn() -> Grammar,
}

const DEMOS: &[Demo] = &[
    Demo {
        name: "lookahead",
        sample: "th!",
        build: lookahead,
    },
    Demo {
        name: "arith",
        sample: "(1+2*3+((88)/44))-025",
        build: arithmetic,
    },
];

// start succeeds (consuming nothing) exactly when the input does not open
// with a terminated value
fn lookahead() -> Grammar {
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

#[allow(unused_must_use)]
fn run() -> Result<(), ()> {
    let args = std::env::args().skip(1).collect::<Vec<_>>();

    let mut demo_name = "lookahead";
    let mut do_rules = false;
    let mut do_tree = false;
    let mut position = 0u32;
    let mut file: Option<&Path> = None;
    let mut inputs = Vec::new();

    let mut iter = args.iter().map(String::as_str);
    while let Some(arg) = iter.next() {
        match arg {
            "--demo" => demo_name = iter.next().expect("Expected argument"),
            "--rules" => do_rules = true,
            "--tree" => do_tree = true,
            "--position" => {
                position = iter
                    .next()
                    .expect("Expected argument")
                    .parse::<u32>()
                    .expect("Expected number");
            }
            "--file" => file = Some(Path::new(iter.next().expect("Expected argument"))),
            _ => inputs.push(arg),
        }
    }

    let Some(demo) = DEMOS.iter().find(|demo| demo.name == demo_name) else {
        eprintln!("Unknown demo `{demo_name}`");
        eprint!("Available:");
        for demo in DEMOS {
            eprint!(" {}", demo.name);
        }
        eprintln!();
        return Err(());
    };

    let input = match file {
        Some(path) => {
            if !inputs.is_empty() {
                eprintln!("Cannot combine --file with an input argument");
                return Err(());
            }
            std::fs::read_to_string(path).pretty_error(path, "Failed to read")?
        }
        None => match inputs.len() {
            0 => demo.sample.to_owned(),
            1 => inputs.pop().unwrap().to_owned(),
            _ => {
                eprintln!("Only one input may be provided");
                return Err(());
            }
        },
    };

    let grammar = (demo.build)();

    if do_rules {
        print!("{grammar}");
    }
    if do_tree {
        for (_, rule) in grammar.rules() {
            println!("rule {}:", rule.name);
            rule.body.display_into_indent(&mut StdoutSink, 1);
        }
    }

    let bytes = input.as_bytes();
    if position as usize > bytes.len() {
        eprintln!("Position {position} is past the end of the input");
        return Err(());
    }

    let start = Pattern::rule(grammar.start());
    let result = match_pattern(&grammar, &start, bytes, position);

    println!("{result}");
    if let MatchResult::Success(length) = result {
        let end = position as usize + length as usize;
        println!("matched `{}`", bytes[position as usize..end].as_bstr());
    }

    Ok(())
}
