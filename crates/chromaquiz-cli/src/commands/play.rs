//! The `chromaquiz play` command.

use std::io::{self, BufRead, IsTerminal, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;

use anyhow::Result;
use colored::{ColoredString, Colorize};
use comfy_table::{Cell, Table};

use chromaquiz_core::engine::{GameEngine, GameHandle, Input};
use chromaquiz_core::feedback::{Feedback, Resolution};
use chromaquiz_core::model::{GameSettings, Mode};
use chromaquiz_core::palette::{option_count_for, Color};
use chromaquiz_core::round::RoundId;
use chromaquiz_core::session::{SessionStatus, ROUND_SECONDS};
use chromaquiz_core::stats::{Rating, SessionSummary};
use chromaquiz_core::traits::Presenter;
use chromaquiz_store::open_stats_store;

use super::{resolve_config, Overrides};

pub async fn execute(overrides: Overrides, config_path: Option<PathBuf>) -> Result<()> {
    let config = resolve_config(overrides, config_path.as_deref())?;
    let store = open_stats_store(config.stats_file.as_deref())?;
    let settings = config.settings();

    let board = Board::default();
    let presenter = TerminalPresenter::new(settings.mode, Arc::clone(&board));
    let (engine, handle) = GameEngine::new(settings, Box::new(presenter), Arc::new(store));

    print_intro(&settings);
    spawn_input(handle, board);

    let summaries = engine.run().await?;
    if let Some(best) = summaries.iter().map(|s| s.score).max() {
        println!(
            "\nThanks for playing! {} game(s), best score this run: {best}",
            summaries.len()
        );
    }
    Ok(())
}

fn print_intro(settings: &GameSettings) {
    println!("{}", "chromaquiz".bold());
    println!(
        "{} | {} | {} options | {}s per guess",
        settings.difficulty,
        settings.mode,
        option_count_for(settings.difficulty),
        ROUND_SECONDS
    );
    println!(
        "{}",
        "Answer with an option number or color name. r restarts, q quits.".dimmed()
    );
}

// ---------------------------------------------------------------------------
// Shared view state
// ---------------------------------------------------------------------------

/// What the input thread needs to know about the screen.
#[derive(Debug, Default)]
struct View {
    /// Round whose options are on screen and still answerable.
    round: Option<RoundId>,
    options: Vec<Color>,
    summary_shown: bool,
}

type Board = Arc<Mutex<View>>;

fn lock(board: &Board) -> MutexGuard<'_, View> {
    board.lock().unwrap_or_else(PoisonError::into_inner)
}

// ---------------------------------------------------------------------------
// Input
// ---------------------------------------------------------------------------

/// Read stdin lines on a dedicated thread and forward them as game input.
/// EOF quits.
fn spawn_input(handle: GameHandle, board: Board) {
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else {
                break;
            };
            let input = parse_line(&line, &lock(&board));
            match input {
                Some(input) => {
                    if !handle.send(input) {
                        return;
                    }
                }
                None if !line.trim().is_empty() => {
                    println!("{}", "Type an option number or name, r or q.".dimmed());
                }
                None => {}
            }
        }
        handle.quit();
    });
}

/// Map one line of player input onto a game input, given what is on screen.
fn parse_line(line: &str, view: &View) -> Option<Input> {
    let cmd = line.trim().to_lowercase();
    match cmd.as_str() {
        "q" | "quit" | "exit" => return Some(Input::Quit),
        "" | "r" | "y" if view.summary_shown => return Some(Input::PlayAgain),
        "r" | "restart" => return Some(Input::Interrupt),
        "" => return None,
        _ => {}
    }

    let round = view.round?;
    let color = match cmd.parse::<usize>() {
        Ok(n) => view.options.get(n.checked_sub(1)?)?,
        Err(_) => view.options.iter().find(|c| c.same_name(&cmd))?,
    };
    Some(Input::Guess {
        round,
        color: color.name.to_string(),
    })
}

// ---------------------------------------------------------------------------
// Terminal presenter
// ---------------------------------------------------------------------------

/// Renders the game as plain lines on stdout.
struct TerminalPresenter {
    mode: Mode,
    board: Board,
    /// The word currently on screen.
    word: String,
    /// Rewrite lines in place instead of appending.
    interactive: bool,
}

impl TerminalPresenter {
    fn new(mode: Mode, board: Board) -> Self {
        Self {
            mode,
            board,
            word: String::new(),
            interactive: io::stdout().is_terminal(),
        }
    }
}

fn paint(text: &str, color: &Color) -> ColoredString {
    match color.rgb() {
        Some((r, g, b)) => text.truecolor(r, g, b),
        None => text.normal(),
    }
}

fn flush() {
    // Nothing useful to do if the terminal went away.
    let _ = io::stdout().flush();
}

impl Presenter for TerminalPresenter {
    fn show_round(&mut self, text: &str, color: &Color) {
        *lock(&self.board) = View::default();
        self.word = text.to_string();

        println!();
        if let Some(banner) = self.mode.banner() {
            println!("{}", banner.yellow());
        }
        println!("{}", self.mode.prompt().bold());
        println!("\n    {}\n", paint(text, color).bold());
    }

    fn hide_color_reveal_word(&mut self) {
        if self.interactive {
            // The word sits three lines up, above a blank line and the status.
            print!("\x1b[3A\r\x1b[2K    {}\x1b[3B\r", self.word.bold());
            flush();
        } else {
            println!("    {}", self.word.bold());
        }
    }

    fn show_options(&mut self, round: RoundId, options: &[Color]) {
        {
            let mut view = lock(&self.board);
            view.round = Some(round);
            view.options = options.to_vec();
        }
        println!("Which color was it?");
        for (i, color) in options.iter().enumerate() {
            println!("  {}. {} {}", i + 1, paint("■", color), color.name);
        }
    }

    fn show_feedback(&mut self, feedback: &Feedback) {
        lock(&self.board).round = None;

        let headline = feedback.headline();
        let headline = match feedback.kind {
            Resolution::Correct => headline.green().bold(),
            Resolution::Wrong => headline.red().bold(),
            Resolution::Timeout => headline.yellow().bold(),
        };
        println!("\n{headline}");
        println!("{}", feedback.message);
        if feedback.cue.is_some() {
            print!("\x07");
            flush();
        }
    }

    fn show_summary(&mut self, summary: &SessionSummary) {
        lock(&self.board).summary_shown = true;

        let badge = match summary.rating() {
            Rating::Trophy => "🏆",
            Rating::Celebrate => "🎉",
            Rating::Encourage => "💪",
        };
        println!("\n{badge} {}", summary.headline().bold());

        let mut table = Table::new();
        table.set_header(vec!["Score", "Best", "Accuracy", "Max streak", "Answered"]);
        table.add_row(vec![
            Cell::new(summary.score),
            Cell::new(summary.best),
            Cell::new(format!("{}%", summary.accuracy_pct)),
            Cell::new(summary.max_streak),
            Cell::new(summary.total_answered),
        ]);
        println!("{table}");
        println!("{}", summary.remark());
        println!("{}", "Press Enter to play again, q to quit.".dimmed());
    }

    fn on_timer_tick(&mut self, seconds_left: u32) {
        let label = format!("{seconds_left}s");
        let label = if seconds_left <= 2 {
            label.red()
        } else {
            label.cyan()
        };
        if self.interactive {
            print!("\r  {label} ");
            if seconds_left == 0 {
                println!();
            }
            flush();
        } else {
            println!("  {label}");
        }
    }

    fn show_status(&mut self, status: &SessionStatus) {
        let streak = if status.combo_active {
            format!("{} 🔥", status.streak)
        } else {
            status.streak.to_string()
        };
        println!(
            "{}",
            format!(
                "Score {}  Streak {}  Accuracy {}%",
                status.score, streak, status.live_accuracy_pct
            )
            .dimmed()
        );
    }
}
