//! Move coordination between the local player, the game and the move service.

use crate::game::Game;
use crate::position::Position;
use crate::protocol::{MoveReply, MoveRequest};
use crate::service::{MoveService, MoveServiceError};
use crate::types::{GameStatus, Player};
use crate::view::GameView;
use derive_more::{Display, Error};
use tracing::{debug, error, info, instrument, warn};

/// Result of applying a single move.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    /// Nothing changed: the square was occupied, the game was over, or local
    /// input is closed.
    Ignored,
    /// Mark placed; the returned player moves next.
    Continued(Player),
    /// Mark placed and the game ended.
    Finished(GameStatus),
}

/// Why an automated move was not requested.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, Error)]
pub enum RequestRejection {
    /// The player to move is not the automated player.
    #[display("It's not the LLM's ({}'s) turn!", _0)]
    NotAutomatedTurn(#[error(not(source))] Player),
    /// The game already has a terminal status.
    #[display("Game is already over!")]
    GameOver,
    /// Another request has not completed yet.
    #[display("A move request is already in progress")]
    InFlight,
}

/// Identifies one automated-move request.
///
/// Issued by [`Coordinator::begin_automated_request`]. A reply is only applied
/// when it carries the ticket of the request still outstanding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
#[display("#{}", _0)]
pub struct RequestTicket(u64);

/// A request handed to the move service, paired with its ticket.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
    ticket: RequestTicket,
    request: MoveRequest,
}

impl PendingRequest {
    /// Ticket to hand back to [`Coordinator::finish_automated_request`].
    pub fn ticket(&self) -> RequestTicket {
        self.ticket
    }

    /// The body to send.
    pub fn request(&self) -> &MoveRequest {
        &self.request
    }
}

/// Result of one automated-move exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AutomatedOutcome {
    /// Rejected before any request was sent.
    Rejected(RequestRejection),
    /// The service returned a move and it went through [`Coordinator::apply_move`].
    Applied(MoveOutcome),
    /// The service answered with an `{error}` body.
    ServiceError(String),
    /// Transport failure or a reply of the wrong shape.
    Failed(String),
    /// The reply answered a request that is no longer outstanding and was dropped.
    Stale(RequestTicket),
}

/// Owns a game and its view, and funnels every move through one path.
///
/// Local moves and automated moves share [`Coordinator::apply_move`]. At most
/// one automated request is outstanding: [`Coordinator::begin_automated_request`]
/// issues a ticket, and [`Coordinator::finish_automated_request`] applies only
/// the reply carrying that ticket. [`Coordinator::reset`] abandons it.
#[derive(Debug, Clone)]
pub struct Coordinator<V> {
    game: Game,
    view: V,
    automated: Player,
    accepting_local_input: bool,
    next_ticket: u64,
    in_flight: Option<RequestTicket>,
}

impl<V: GameView> Coordinator<V> {
    /// Creates a coordinator for a fresh game with O as the automated player.
    pub fn new(view: V) -> Self {
        Self::with_automated_player(view, Player::O)
    }

    /// Creates a coordinator whose automated player is `automated`.
    #[instrument(skip(view))]
    pub fn with_automated_player(view: V, automated: Player) -> Self {
        info!("Creating coordinator");
        Self {
            game: Game::new(),
            view,
            automated,
            accepting_local_input: true,
            next_ticket: 0,
            in_flight: None,
        }
    }

    /// The game being coordinated.
    pub fn game(&self) -> &Game {
        &self.game
    }

    /// The view being driven.
    pub fn view(&self) -> &V {
        &self.view
    }

    /// Mutable access to the view.
    pub fn view_mut(&mut self) -> &mut V {
        &mut self.view
    }

    /// The player whose moves come from the move service.
    pub fn automated_player(&self) -> Player {
        self.automated
    }

    /// False once the game has ended, until [`Coordinator::reset`].
    pub fn is_accepting_local_input(&self) -> bool {
        self.accepting_local_input
    }

    /// True between `begin_automated_request` and `finish_automated_request`.
    pub fn is_request_in_flight(&self) -> bool {
        self.in_flight.is_some()
    }

    /// Starts a new game on the same view.
    #[instrument(skip(self))]
    pub fn reset(&mut self) {
        info!("Resetting game");
        self.game.initialize();
        self.accepting_local_input = true;
        if let Some(ticket) = self.in_flight.take() {
            debug!(%ticket, "Abandoning outstanding request");
        }
        self.view.clear();
        self.view.set_pointer_enabled(true);
        self.view.set_trigger_enabled(true);
    }

    /// Handles a move from local input (pointer click or typed coordinates).
    ///
    /// Ignored once the game has ended.
    #[instrument(skip(self), fields(position = %pos))]
    pub fn handle_local_move(&mut self, pos: Position) -> MoveOutcome {
        if !self.accepting_local_input {
            debug!("Local input closed");
            return MoveOutcome::Ignored;
        }
        self.apply_move(pos)
    }

    /// Validates and applies a move for the player to move.
    ///
    /// Occupied squares and finished games are ignored without any message.
    /// A terminal move draws the outcome banner and closes local input;
    /// otherwise the turn passes to the opponent.
    #[instrument(skip(self), fields(position = %pos, player = %self.game.current_player()))]
    pub fn apply_move(&mut self, pos: Position) -> MoveOutcome {
        if self.game.status().is_terminal() {
            debug!("Game already over, ignoring move");
            return MoveOutcome::Ignored;
        }
        if !self.game.is_empty(pos) {
            debug!("Square occupied, ignoring move");
            return MoveOutcome::Ignored;
        }

        let player = self.game.current_player();
        self.game.place(pos, player);
        self.view.draw_cell(pos, player);
        debug!(snapshot = ?self.game.snapshot(), "Placed mark");

        let status = self.game.status();
        if let Some(message) = status.outcome_message() {
            info!(status = ?status, "Game over");
            self.view.draw_terminal_banner(&message);
            self.accepting_local_input = false;
            self.view.set_pointer_enabled(false);
            return MoveOutcome::Finished(status);
        }

        self.game.advance_turn();
        MoveOutcome::Continued(self.game.current_player())
    }

    /// Checks that an automated move may be requested and builds the request.
    ///
    /// On success a fresh ticket becomes the outstanding request and the
    /// trigger control is disabled. On rejection the operator is alerted and
    /// nothing changes.
    #[instrument(skip(self, instruction))]
    pub fn begin_automated_request(
        &mut self,
        instruction: impl Into<String>,
    ) -> Result<PendingRequest, RequestRejection> {
        if let Err(rejection) = self.check_automated_request() {
            warn!(%rejection, "Automated move request rejected");
            self.view.alert(&rejection.to_string());
            return Err(rejection);
        }

        let available_actions = self.game.legal_moves();
        // An in-progress board always has an empty square.
        debug_assert!(!available_actions.is_empty());

        let request = MoveRequest {
            game_state: self.game.snapshot(),
            available_actions,
            instruction: instruction.into(),
        };

        let ticket = RequestTicket(self.next_ticket);
        self.next_ticket += 1;
        self.in_flight = Some(ticket);
        self.view.set_trigger_enabled(false);
        info!(
            %ticket,
            turn = request.game_state.turn,
            actions = request.available_actions.len(),
            "Requesting automated move"
        );
        Ok(PendingRequest { ticket, request })
    }

    fn check_automated_request(&self) -> Result<(), RequestRejection> {
        // A finished game reports itself as over regardless of whose mark
        // would have been next.
        if self.game.status().is_terminal() {
            return Err(RequestRejection::GameOver);
        }
        if self.game.current_player() != self.automated {
            return Err(RequestRejection::NotAutomatedTurn(self.automated));
        }
        if self.in_flight.is_some() {
            return Err(RequestRejection::InFlight);
        }
        Ok(())
    }

    /// Applies the reply to the request identified by `ticket`.
    ///
    /// Replies to anything but the outstanding request (answered already,
    /// abandoned by [`Coordinator::reset`], or never issued) are dropped
    /// without touching the board. The trigger is re-enabled on every path
    /// unless a different request is still outstanding.
    #[instrument(skip(self, result), fields(ticket = %ticket))]
    pub fn finish_automated_request(
        &mut self,
        ticket: RequestTicket,
        result: Result<MoveReply, MoveServiceError>,
    ) -> AutomatedOutcome {
        if self.in_flight != Some(ticket) {
            warn!(outstanding = ?self.in_flight, "Dropping reply to a request that is not outstanding");
            if self.in_flight.is_none() {
                self.view.set_trigger_enabled(true);
            }
            return AutomatedOutcome::Stale(ticket);
        }
        self.in_flight = None;

        let outcome = match result {
            Ok(MoveReply::Move(pos)) => {
                info!(position = %pos, "Received move from service");
                AutomatedOutcome::Applied(self.apply_move(pos))
            }
            Ok(MoveReply::Error(message)) => {
                error!(error = %message, "Move service reported an error");
                self.view.alert(&format!("Error from LLM: {}", message));
                AutomatedOutcome::ServiceError(message)
            }
            Ok(MoveReply::Unexpected(body)) => {
                error!(body = %body, "Unexpected response format from service");
                let message = "Unexpected response from server.".to_string();
                self.view.alert(&message);
                AutomatedOutcome::Failed(message)
            }
            Err(err) => {
                error!(error = %err, "Move service request failed");
                let message = format!("Network or server error: {}", err.kind);
                self.view.alert(&message);
                AutomatedOutcome::Failed(message)
            }
        };

        self.view.set_trigger_enabled(true);
        outcome
    }

    /// Runs one full automated-move exchange against `service`.
    #[instrument(skip(self, service, instruction))]
    pub async fn request_automated_move<S>(
        &mut self,
        service: &S,
        instruction: impl Into<String>,
    ) -> AutomatedOutcome
    where
        S: MoveService + ?Sized,
    {
        let pending = match self.begin_automated_request(instruction) {
            Ok(pending) => pending,
            Err(rejection) => return AutomatedOutcome::Rejected(rejection),
        };
        let result = service.request_move(pending.request()).await;
        self.finish_automated_request(pending.ticket(), result)
    }
}
