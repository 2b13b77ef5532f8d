//! Line-oriented terminal presenter
//!
//! Prints new transcript entries as they arrive and reprints from scratch
//! when a new session replaces the history.

use crate::offers::OfferCard;
use crate::runtime::TranscriptObserver;
use crate::state_machine::{ChatMessage, Role, SessionView};
use std::io::{self, Write};
use std::sync::Mutex;

const NEW_SESSION_BANNER: &str = "--- Nouvelle conversation ---";
const TERMINAL_NOTICE: &str = "(Conversation terminée. Tapez /new pour recommencer.)";

/// What a line of user input asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Quit,
    NewSession,
    /// 1-based index into the current quick replies
    QuickReply(usize),
    Text(String),
}

pub fn parse_command(line: &str) -> Command {
    let trimmed = line.trim();
    match trimmed {
        "/quit" | "/exit" => Command::Quit,
        "/new" => Command::NewSession,
        _ => trimmed
            .strip_prefix('/')
            .and_then(|n| n.parse::<usize>().ok())
            .filter(|n| *n >= 1)
            .map_or_else(|| Command::Text(line.to_string()), Command::QuickReply),
    }
}

/// What `/<n>` picks, in display order: offer cards first, then any other
/// quick replies
pub fn numbered_choices(view: &SessionView) -> Vec<&str> {
    let mut choices: Vec<&str> = view.offer_cards.iter().map(|card| card.value).collect();
    choices.extend(
        view.quick_replies
            .iter()
            .map(String::as_str)
            .filter(|option| !view.offer_cards.iter().any(|card| card.value == *option)),
    );
    choices
}

/// Renders session updates to any writer
pub struct TerminalPresenter<W: Write + Send> {
    state: Mutex<RenderState<W>>,
}

struct RenderState<W> {
    out: W,
    generation: u64,
    /// Messages of the current generation already printed
    printed: usize,
}

impl<W: Write + Send> TerminalPresenter<W> {
    pub fn new(out: W) -> Self {
        Self {
            state: Mutex::new(RenderState {
                out,
                generation: 0,
                printed: 0,
            }),
        }
    }

    pub fn into_inner(self) -> W {
        match self.state.into_inner() {
            Ok(state) => state.out,
            Err(poisoned) => poisoned.into_inner().out,
        }
    }
}

impl<W: Write> RenderState<W> {
    fn render(&mut self, view: &SessionView) -> io::Result<()> {
        if view.generation != self.generation || view.messages.len() < self.printed {
            if self.generation != 0 {
                writeln!(self.out)?;
                writeln!(self.out, "{NEW_SESSION_BANNER}")?;
            }
            self.generation = view.generation;
            self.printed = 0;
        }

        for message in view.messages.iter().skip(self.printed) {
            write_message(&mut self.out, message)?;
        }
        self.printed = view.messages.len();

        if view.is_terminal {
            writeln!(self.out, "{TERMINAL_NOTICE}")?;
        } else if !view.sending {
            for (i, choice) in numbered_choices(view).into_iter().enumerate() {
                match view.offer_cards.get(i) {
                    Some(card) => write_card(&mut self.out, i + 1, card)?,
                    None => writeln!(self.out, "  [/{}] {choice}", i + 1)?,
                }
            }
        }

        self.out.flush()
    }
}

fn speaker(role: Role) -> &'static str {
    match role {
        Role::Assistant => "Conseiller",
        Role::User => "Vous",
    }
}

fn write_message(out: &mut impl Write, message: &ChatMessage) -> io::Result<()> {
    let mut lines = message.text.lines();
    let first = lines.next().unwrap_or_default();
    writeln!(out, "{} > {first}", speaker(message.role))?;
    for line in lines {
        writeln!(out, "    {line}")?;
    }
    Ok(())
}

fn write_card(out: &mut impl Write, index: usize, card: &OfferCard) -> io::Result<()> {
    writeln!(out, "  [/{index}] {} ({})", card.title, card.subtitle)?;
    for feature in card.features {
        writeln!(out, "        - {feature}")?;
    }
    writeln!(out, "        {}", card.price)
}

impl<W: Write + Send> TranscriptObserver for TerminalPresenter<W> {
    fn transcript_updated(&self, view: &SessionView) {
        let Ok(mut state) = self.state.lock() else {
            return;
        };
        if let Err(e) = state.render(view) {
            tracing::warn!(error = %e, "Failed to render transcript");
        }
    }
}
