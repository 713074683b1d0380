//! Slot editor session
//!
//! Line commands drive a [`SlotEditor`] over one loaded progression. Edits stay
//! in memory until `save` writes the slot sequence back in one replacement.

use colored::Colorize;
use eyre::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::debug;

use crate::app::App;
use crate::editor::SlotEditor;
use crate::prompts::EMPTY_SLOT;

/// Result of one input line
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Output(String),
    Error(String),
    Quit,
}

/// Interactive editor over one progression
pub struct EditSession<'a> {
    app: &'a App,
    progression_id: String,
    name: String,
    editor: SlotEditor,
    /// Set after a `quit` with unsaved changes; a second `quit` discards them
    quit_armed: bool,
}

impl<'a> EditSession<'a> {
    /// Load the progression and start with no selection
    pub async fn load(app: &'a App, progression_id: &str) -> Result<Self> {
        debug!(%progression_id, "EditSession::load: called");
        let progression = app.get_progression(progression_id).await?;
        Ok(Self {
            app,
            progression_id: progression.id.clone(),
            name: progression.name.clone(),
            editor: SlotEditor::from_progression(&progression),
            quit_armed: false,
        })
    }

    pub fn editor(&self) -> &SlotEditor {
        &self.editor
    }

    /// Run the REPL main loop
    pub async fn run(&mut self) -> Result<()> {
        self.print_welcome();
        let mut rl = DefaultEditor::new().map_err(|e| eyre::eyre!("Failed to initialize readline: {}", e))?;

        loop {
            let readline = rl.readline(&format!("{} ", ">".bright_green()));
            match readline {
                Ok(line) => {
                    let input = line.trim();
                    if input.is_empty() {
                        continue;
                    }
                    let _ = rl.add_history_entry(input);

                    match self.execute(input).await {
                        Outcome::Output(text) => println!("{}", text),
                        Outcome::Error(text) => println!("{} {}", "!".red(), text.red()),
                        Outcome::Quit => break,
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!();
                    break;
                }
                Err(err) => {
                    return Err(eyre::eyre!("Readline error: {}", err));
                }
            }
        }

        if self.editor.is_dirty() {
            println!("{}", "Unsaved changes discarded.".dimmed());
        }
        Ok(())
    }

    fn print_welcome(&self) {
        println!();
        println!("{} {}", "Editing".bright_cyan().bold(), self.name.bright_cyan().bold());
        println!("ID: {}", self.progression_id);
        println!("Type {} for help, {} to quit", "help".yellow(), "quit".yellow());
        println!();
        println!("{}", self.render_slots());
    }

    /// Execute one command line
    pub async fn execute(&mut self, input: &str) -> Outcome {
        debug!(%input, "EditSession::execute: called");
        let mut parts = input.split_whitespace();
        let cmd = parts.next().unwrap_or("");
        let arg = parts.next();

        if !matches!(cmd, "quit" | "q" | "exit") {
            self.quit_armed = false;
        }

        match cmd {
            "help" | "h" => Outcome::Output(help_text()),
            "show" | "s" => Outcome::Output(self.render_slots()),
            "select" => match parse_index(arg) {
                Ok(index) => match self.editor.select(index) {
                    Ok(Some(i)) => Outcome::Output(format!("Selected slot {}", i)),
                    Ok(None) => Outcome::Output("Selection cleared".to_string()),
                    Err(e) => Outcome::Error(e.to_string()),
                },
                Err(msg) => Outcome::Error(msg),
            },
            "set" => match arg {
                Some(chord) => match self.editor.set_chord(chord) {
                    Ok(()) => Outcome::Output(self.render_slots()),
                    Err(e) => Outcome::Error(e.to_string()),
                },
                None => Outcome::Error("Usage: set CHORD".to_string()),
            },
            "clear" => match self.editor.delete_chord() {
                Ok(()) => Outcome::Output(self.render_slots()),
                Err(e) => Outcome::Error(e.to_string()),
            },
            "add" => {
                let index = self.editor.add_slot();
                Outcome::Output(format!("Added slot {}", index))
            }
            "del" => match self.editor.delete_slot() {
                Ok(_) => Outcome::Output(self.render_slots()),
                Err(e) => Outcome::Error(e.to_string()),
            },
            "move" => match parse_index(arg) {
                Ok(to) => match self.editor.move_selected(to) {
                    Ok(_) => Outcome::Output(self.render_slots()),
                    Err(e) => Outcome::Error(e.to_string()),
                },
                Err(msg) => Outcome::Error(msg),
            },
            "notes" => self.notes(),
            "save" => self.save().await,
            "quit" | "q" | "exit" => {
                if self.editor.is_dirty() && !self.quit_armed {
                    self.quit_armed = true;
                    Outcome::Output("Unsaved changes. Type quit again to discard them, or save first.".to_string())
                } else {
                    Outcome::Quit
                }
            }
            other => Outcome::Error(format!("Unknown command: {}. Type help for commands.", other)),
        }
    }

    /// Notes of the selected chord, or of every filled slot
    fn notes(&self) -> Outcome {
        if let Some(chord) = self.editor.selected_chord() {
            return match self.app.get_chord_notes(chord) {
                Ok(notes) => Outcome::Output(format!("{}: {}", chord, notes.join(" "))),
                Err(e) => Outcome::Error(e.message),
            };
        }

        let chords: Vec<String> = self.editor.chords().into_iter().flatten().collect();
        if chords.is_empty() {
            return Outcome::Output("No chords to spell.".to_string());
        }
        match self.app.get_progression_notes(&chords) {
            Ok(notes) => Outcome::Output(
                chords
                    .iter()
                    .zip(notes)
                    .map(|(chord, notes)| format!("{}: {}", chord, notes.join(" ")))
                    .collect::<Vec<_>>()
                    .join("\n"),
            ),
            Err(e) => Outcome::Error(e.message),
        }
    }

    async fn save(&mut self) -> Outcome {
        let slots = self.editor.slots().to_vec();
        match self.app.replace_slots(&self.progression_id, slots).await {
            Ok(progression) => {
                self.editor.mark_saved();
                Outcome::Output(format!("Saved {} slots", progression.len()))
            }
            Err(e) => Outcome::Error(e.message),
        }
    }

    fn render_slots(&self) -> String {
        if self.editor.is_empty() {
            return "(no slots)".to_string();
        }
        self.editor
            .slots()
            .iter()
            .enumerate()
            .map(|(i, slot)| {
                let marker = if self.editor.selected() == Some(i) { "*" } else { " " };
                format!("{} {}: {}", marker, i, slot.chord.as_deref().unwrap_or(EMPTY_SLOT))
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

fn parse_index(arg: Option<&str>) -> std::result::Result<i64, String> {
    let arg = arg.ok_or_else(|| "Expected a slot number".to_string())?;
    arg.parse::<i64>()
        .map_err(|_| format!("Expected a slot number, got '{}'", arg))
}

fn help_text() -> String {
    [
        "Commands:",
        "  select N   Select slot N (again to deselect)",
        "  set CHORD  Put CHORD in the selected slot",
        "  clear      Clear the selected slot",
        "  add        Append an empty slot",
        "  del        Delete the selected slot",
        "  move N     Move the selected slot to N",
        "  show       Show all slots",
        "  notes      Spell the selected chord, or all chords",
        "  save       Write slots back to the store",
        "  quit       Leave the editor",
    ]
    .join("\n")
}
