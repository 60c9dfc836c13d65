//! Interactive terminal shell.

use anyhow::Result;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{Context, Editor, Helper};
use tracing::debug;

use crate::commands::shell::AgentShell;
use crate::commands::CommandRegistry;
use crate::complete;
use crate::config::loader::get_data_dir;
use crate::tui::{BOLD, CLEAR_SCREEN, DIM, RESET};

/// Tab completion backed by the same resolver as `/api/autocomplete`.
struct ShellHelper {
    registry: CommandRegistry,
}

impl Completer for ShellHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let upto = &line[..pos];
        let completion = complete::resolve_before_cursor(upto, &self.registry);
        // The prefix is always a suffix of the text before the cursor, so the
        // replacement starts that many bytes back.
        let start = pos - completion.prefix.len();
        let candidates = completion
            .suggestions
            .into_iter()
            .map(|s| Pair {
                display: s.clone(),
                replacement: s,
            })
            .collect();
        Ok((start, candidates))
    }
}

impl Hinter for ShellHelper {
    type Hint = String;
}

impl Highlighter for ShellHelper {}
impl Validator for ShellHelper {}
impl Helper for ShellHelper {}

fn print_banner(shell: &AgentShell) {
    let t = &shell.theme;
    let flag = |b: bool| if b { "ON" } else { "OFF" };
    println!("{}╭──────────────────────────────────────────────────╮{}", t.accent, RESET);
    println!(
        "{}│{} {}{}{}{}",
        t.accent, RESET, t.primary, BOLD, shell.config.name, RESET
    );
    println!(
        "{}│{} {}Provider: {} | Model: {}{}",
        t.accent, RESET, t.secondary, shell.config.provider, shell.config.model_name, RESET
    );
    println!(
        "{}│{} {}Memory: {} | RAG: {}{}",
        t.accent,
        RESET,
        t.secondary,
        flag(shell.config.enable_memory),
        flag(shell.config.enable_rag),
        RESET
    );
    println!("{}╰──────────────────────────────────────────────────╯{}", t.accent, RESET);
    println!(
        "{}Type '//help' for commands, tab to complete, 'exit' to quit.{}",
        DIM, RESET
    );
}

/// Run the interactive loop until the user exits.
pub async fn run_repl(shell: &mut AgentShell) -> Result<()> {
    let mut editor: Editor<ShellHelper, DefaultHistory> = Editor::new()?;
    editor.set_helper(Some(ShellHelper {
        registry: CommandRegistry::new(),
    }));

    let history_path = get_data_dir().join("history.txt");
    let _ = editor.load_history(&history_path);

    print_banner(shell);

    let prompt = format!("{}❯{} ", shell.theme.accent, RESET);
    loop {
        match editor.readline(&prompt) {
            Ok(line) => {
                let input = line.trim();
                if input.is_empty() {
                    continue;
                }
                let _ = editor.add_history_entry(input);

                match input {
                    "exit" | "quit" | "q" => break,
                    "clear" => {
                        print!("{}", CLEAR_SCREEN);
                        continue;
                    }
                    _ => {}
                }

                if input.starts_with("//") {
                    match shell.dispatch(input).await {
                        Ok(out) => println!("{}", out),
                        Err(e) => println!("{}", shell.theme.err(&e.to_string())),
                    }
                    continue;
                }

                debug!("chat input ({} chars)", input.len());
                match shell.chat(input, &shell.session_id).await {
                    Ok(reply) => {
                        println!(
                            "{}{}{}{}: {}",
                            shell.theme.primary, BOLD, shell.config.name, RESET, reply
                        );
                    }
                    Err(e) => println!("{}", shell.theme.err(&format!("{:#}", e))),
                }
            }
            Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => break,
            Err(e) => {
                println!("{}", shell.theme.err(&format!("Input error: {}", e)));
                break;
            }
        }
    }

    let _ = editor.save_history(&history_path);
    println!("{}", shell.theme.dim("Goodbye."));
    Ok(())
}
