use std::borrow::Cow::{self, Borrowed, Owned};

use anyhow::Result;
use colored::Colorize;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use xinyue_application::SearchEngine;

use super::router::{self, HELP, ReplCommand, VERBS};

/// Completes and highlights the leading command verb.
#[derive(Clone)]
struct ReplHelper;

impl Helper for ReplHelper {}

impl Completer for ReplHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line = &line[..pos];
        if line.contains(' ') {
            return Ok((0, vec![]));
        }

        let candidates = VERBS
            .iter()
            .filter(|verb| verb.starts_with(line))
            .map(|verb| Pair {
                display: verb.to_string(),
                replacement: verb.to_string(),
            })
            .collect();
        Ok((0, candidates))
    }
}

impl Highlighter for ReplHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        match line.split_once(' ') {
            Some((verb, rest)) if VERBS.contains(&verb) => {
                Owned(format!("{} {}", verb.bright_cyan(), rest))
            }
            _ => Borrowed(line),
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        true
    }
}

impl Hinter for ReplHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &Context<'_>) -> Option<String> {
        let line = &line[..pos];
        if line.is_empty() || line.contains(' ') {
            return None;
        }
        VERBS
            .iter()
            .find(|verb| verb.starts_with(line) && verb.len() > line.len())
            .map(|verb| verb[line.len()..].to_string())
    }
}

impl Validator for ReplHelper {}

fn print_block(text: &str) {
    for line in text.lines() {
        println!("{}", line.bright_blue());
    }
    println!();
}

/// Runs one parsed command; returns `false` when the REPL should stop.
async fn dispatch(engine: &SearchEngine, identity: &str, command: ReplCommand) -> bool {
    match command {
        ReplCommand::Search { keyword, target } => {
            for reply in engine.search(identity, &keyword, target).await {
                print_block(&reply);
            }
        }
        ReplCommand::Local { keyword } => {
            for reply in engine.local_search(identity, &keyword).await {
                print_block(&reply);
            }
        }
        ReplCommand::Next => match engine.next_page(identity).await {
            Some(page) => print_block(&page),
            None => println!("{}", "Nothing to page through".bright_black()),
        },
        ReplCommand::Previous => match engine.previous_page(identity).await {
            Some(page) => print_block(&page),
            None => println!("{}", "Nothing to page through".bright_black()),
        },
        ReplCommand::Page(page) => print_block(&engine.render(identity, page).await),
        ReplCommand::Transfer(index) => {
            for reply in engine.transfer(identity, index).await {
                print_block(&reply);
            }
        }
        ReplCommand::Help => println!("{}", HELP.bright_black()),
        ReplCommand::Quit => return false,
    }
    true
}

/// Interactive loop; commands run one at a time for a single identity.
pub async fn run(engine: &SearchEngine, identity: &str) -> Result<()> {
    let mut rl = Editor::new()?;
    rl.set_helper(Some(ReplHelper));

    println!("{}", "=== Xinyue ===".bright_magenta().bold());
    println!(
        "{}",
        "Type 'search <keyword>' to begin, 'help' for commands, or 'quit' to exit.".bright_black()
    );
    println!();

    loop {
        match rl.readline(">> ") {
            Ok(line) => {
                let trimmed = line.trim();
                if trimmed.is_empty() {
                    continue;
                }
                let _ = rl.add_history_entry(trimmed);

                match router::parse(trimmed) {
                    Ok(command) => {
                        if !dispatch(engine, identity, command).await {
                            println!("{}", "Goodbye!".bright_green());
                            break;
                        }
                    }
                    Err(usage) => println!("{}", usage.yellow()),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("{}", "CTRL-C detected. Type 'quit' to exit.".yellow());
            }
            Err(ReadlineError::Eof) => {
                println!("{}", "CTRL-D detected. Exiting...".bright_green());
                break;
            }
            Err(err) => {
                tracing::error!("Readline failed: {:?}", err);
                break;
            }
        }
    }

    Ok(())
}
