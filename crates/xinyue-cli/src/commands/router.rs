//! Parses REPL input lines into engine commands.

use xinyue_core::backend::{Backend, SearchTarget};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReplCommand {
    Search { keyword: String, target: SearchTarget },
    Local { keyword: String },
    Next,
    Previous,
    Page(usize),
    Transfer(usize),
    Help,
    Quit,
}

/// Verbs that complete in the REPL.
pub const VERBS: &[&str] = &[
    "search", "quark", "baidu", "uc", "xunlei", "all", "local", "next", "prev", "page",
    "transfer", "help", "quit",
];

/// Parses one line; `Err` carries a usage hint for the user.
pub fn parse(line: &str) -> Result<ReplCommand, String> {
    let line = line.trim();
    let (verb, rest) = match line.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb, rest.trim()),
        None => (line, ""),
    };

    match verb.to_ascii_lowercase().as_str() {
        "next" | "n" | "1" => Ok(ReplCommand::Next),
        "prev" | "p" | "0" => Ok(ReplCommand::Previous),
        "help" | "?" => Ok(ReplCommand::Help),
        "quit" | "exit" => Ok(ReplCommand::Quit),
        "search" | "s" => Ok(ReplCommand::Search {
            keyword: rest.to_string(),
            target: SearchTarget::default(),
        }),
        "all" => Ok(ReplCommand::Search {
            keyword: rest.to_string(),
            target: SearchTarget::FullNetwork,
        }),
        "local" | "find" => Ok(ReplCommand::Local {
            keyword: rest.to_string(),
        }),
        "page" => number(rest, "page <number>").map(ReplCommand::Page),
        "transfer" | "t" => number(rest, "transfer <index>").map(ReplCommand::Transfer),
        other => match other.parse::<Backend>().ok().and_then(SearchTarget::narrow) {
            Some(target) => Ok(ReplCommand::Search {
                keyword: rest.to_string(),
                target,
            }),
            None => Err(format!("Unknown command '{}'. Type 'help' for usage.", verb)),
        },
    }
}

fn number(text: &str, usage: &str) -> Result<usize, String> {
    text.parse::<usize>()
        .map_err(|_| format!("Usage: {}", usage))
}

pub const HELP: &str = "\
search <keyword>     search Quark
baidu|uc|xunlei <kw> search one drive
all <keyword>        search every drive
local <keyword>      search the service index
next | prev          turn pages (also 1 / 0)
page <n>             jump to a page
transfer <n>         transfer the n-th result
quit                 leave";
