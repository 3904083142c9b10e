//! Line-oriented terminal frontend.

use anyhow::Result;
use llm_tictactoe_core::{
    AutomatedOutcome, Board, Coordinator, GameView, MoveOutcome, MoveService, Player, Position,
    Square,
};
use std::io::Write;
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tracing::{debug, info, instrument, warn};

const HELP: &str = "Commands:\n  \
    <row> <col>   place your mark (0-2 each, e.g. `1 1`)\n  \
    ai [text]     ask the LLM to move, with an optional instruction\n  \
    board         redraw the board\n  \
    reset         start a new game\n  \
    quit          leave";

/// Renders the game as text on any writer.
#[derive(Debug)]
pub struct TerminalView<W> {
    out: W,
    board: Board,
    trigger_enabled: bool,
}

impl<W: Write> TerminalView<W> {
    /// Creates a view that writes to `out`.
    pub fn new(out: W) -> Self {
        Self {
            out,
            board: Board::new(),
            trigger_enabled: true,
        }
    }

    /// Whether the `ai` command is currently available.
    pub fn trigger_enabled(&self) -> bool {
        self.trigger_enabled
    }

    /// The underlying writer.
    pub fn writer(&self) -> &W {
        &self.out
    }

    /// Prints the board as drawn so far.
    pub fn render(&mut self) {
        let text = self.board.display();
        self.emit(&format!("\n{}\n", text));
    }

    /// Prints a line of text.
    pub fn emit(&mut self, text: &str) {
        if let Err(e) = writeln!(self.out, "{}", text).and_then(|_| self.out.flush()) {
            warn!(error = %e, "Failed to write to terminal");
        }
    }
}

impl<W: Write> GameView for TerminalView<W> {
    fn draw_cell(&mut self, position: Position, player: Player) {
        self.board.set(position, Square::Occupied(player));
        self.emit(&format!("{} plays {}", player, position));
        self.render();
    }

    fn draw_terminal_banner(&mut self, message: &str) {
        self.emit(&format!("*** {} ***", message));
    }

    fn alert(&mut self, message: &str) {
        self.emit(&format!("! {}", message));
    }

    fn set_trigger_enabled(&mut self, enabled: bool) {
        self.trigger_enabled = enabled;
        if !enabled {
            self.emit("Waiting for the LLM...");
        }
    }

    fn clear(&mut self) {
        self.board = Board::new();
        self.emit("New game.");
        self.render();
    }
}

/// A parsed line of terminal input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Place the local player's mark.
    Move(Position),
    /// Ask the move service to play, optionally with a custom instruction.
    Automated(Option<String>),
    /// Redraw the board.
    Board,
    /// Start a new game.
    Reset,
    /// Print the command list.
    Help,
    /// Leave the session.
    Quit,
}

/// Parses one line of input.
///
/// Coordinates may be separated by whitespace or a comma.
pub fn parse_command(line: &str) -> Result<Command, String> {
    let line = line.trim();
    let (word, rest) = match line.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (line, ""),
    };

    match word.to_lowercase().as_str() {
        "" => Err("Type a move like `1 1`, or `help`".to_string()),
        "ai" => Ok(Command::Automated((!rest.is_empty()).then(|| rest.to_string()))),
        "board" => Ok(Command::Board),
        "reset" => Ok(Command::Reset),
        "help" | "?" => Ok(Command::Help),
        "quit" | "exit" => Ok(Command::Quit),
        _ => parse_coordinates(line).map(Command::Move),
    }
}

fn parse_coordinates(text: &str) -> Result<Position, String> {
    let parts: Vec<&str> = text
        .split(|c: char| c == ',' || c.is_whitespace())
        .filter(|s| !s.is_empty())
        .collect();
    let [row, col] = parts.as_slice() else {
        return Err(format!("Unrecognized command: {}", text));
    };
    let row: usize = row
        .parse()
        .map_err(|_| format!("Unrecognized command: {}", text))?;
    let col: usize = col
        .parse()
        .map_err(|_| format!("Unrecognized command: {}", text))?;
    Position::new(row, col).ok_or_else(|| "Row and column must be between 0 and 2".to_string())
}

/// Reads commands from `input` until `quit` or end of input.
#[instrument(skip_all)]
pub async fn run_session<W, R, S>(
    coordinator: &mut Coordinator<TerminalView<W>>,
    service: &S,
    input: R,
    default_instruction: &str,
) -> Result<()>
where
    W: Write,
    R: AsyncBufRead + Unpin,
    S: MoveService + ?Sized,
{
    info!("Starting terminal session");
    let intro = format!(
        "You are {}. The LLM plays {}.",
        coordinator.automated_player().opponent(),
        coordinator.automated_player()
    );
    coordinator.view_mut().emit(&intro);
    coordinator.view_mut().emit(HELP);
    coordinator.view_mut().render();

    let mut lines = input.lines();
    while let Some(line) = lines.next_line().await? {
        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(message) => {
                coordinator.view_mut().alert(&message);
                continue;
            }
        };
        debug!(?command, "Parsed command");

        match command {
            Command::Move(pos) => {
                if coordinator.handle_local_move(pos) == MoveOutcome::Ignored {
                    coordinator.view_mut().emit("That move was not accepted.");
                }
            }
            Command::Automated(instruction) => {
                let instruction = instruction.unwrap_or_else(|| default_instruction.to_string());
                let outcome = coordinator
                    .request_automated_move(service, instruction)
                    .await;
                if outcome == AutomatedOutcome::Applied(MoveOutcome::Ignored) {
                    coordinator.view_mut().emit("The LLM picked a square that is taken.");
                }
            }
            Command::Board => coordinator.view_mut().render(),
            Command::Reset => coordinator.reset(),
            Command::Help => coordinator.view_mut().emit(HELP),
            Command::Quit => break,
        }
    }

    info!("Terminal session finished");
    Ok(())
}
