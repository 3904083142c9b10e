//! Rendering collaborator driven by the coordinator.

use crate::position::Position;
use crate::types::Player;

/// What the coordinator needs from a frontend.
///
/// Frontends draw; they never mutate game state. Local input reaches the
/// game through [`crate::Coordinator::handle_local_move`].
pub trait GameView {
    /// Draws `player`'s mark in a cell.
    fn draw_cell(&mut self, position: Position, player: Player);

    /// Shows the final outcome, e.g. `"X wins!"`.
    fn draw_terminal_banner(&mut self, message: &str);

    /// Shows a message to the operator.
    fn alert(&mut self, message: &str);

    /// Enables or disables the control that requests an automated move.
    fn set_trigger_enabled(&mut self, enabled: bool);

    /// Subscribes or unsubscribes local pointer input.
    fn set_pointer_enabled(&mut self, _enabled: bool) {}

    /// Wipes the board after a reset.
    fn clear(&mut self) {}
}

/// A call made on a [`RecordingView`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    /// `draw_cell`
    CellDrawn {
        /// Cell drawn.
        position: Position,
        /// Mark drawn.
        player: Player,
    },
    /// `draw_terminal_banner`
    Banner(String),
    /// `alert`
    Alert(String),
    /// `set_trigger_enabled`
    TriggerEnabled(bool),
    /// `set_pointer_enabled`
    PointerEnabled(bool),
    /// `clear`
    Cleared,
}

/// Headless view that records every call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordingView {
    events: Vec<ViewEvent>,
    trigger_enabled: bool,
    pointer_enabled: bool,
}

impl Default for RecordingView {
    fn default() -> Self {
        Self {
            events: Vec::new(),
            trigger_enabled: true,
            pointer_enabled: true,
        }
    }
}

impl RecordingView {
    /// All recorded calls in order.
    pub fn events(&self) -> &[ViewEvent] {
        &self.events
    }

    /// Messages passed to `alert`.
    pub fn alerts(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ViewEvent::Alert(m) => Some(m.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Messages passed to `draw_terminal_banner`.
    pub fn banners(&self) -> Vec<&str> {
        self.events
            .iter()
            .filter_map(|e| match e {
                ViewEvent::Banner(m) => Some(m.as_str()),
                _ => None,
            })
            .collect()
    }

    /// Current state of the trigger control.
    pub fn trigger_enabled(&self) -> bool {
        self.trigger_enabled
    }

    /// Current state of the pointer subscription.
    pub fn pointer_enabled(&self) -> bool {
        self.pointer_enabled
    }
}

impl GameView for RecordingView {
    fn draw_cell(&mut self, position: Position, player: Player) {
        self.events.push(ViewEvent::CellDrawn { position, player });
    }

    fn draw_terminal_banner(&mut self, message: &str) {
        self.events.push(ViewEvent::Banner(message.to_string()));
    }

    fn alert(&mut self, message: &str) {
        self.events.push(ViewEvent::Alert(message.to_string()));
    }

    fn set_trigger_enabled(&mut self, enabled: bool) {
        self.trigger_enabled = enabled;
        self.events.push(ViewEvent::TriggerEnabled(enabled));
    }

    fn set_pointer_enabled(&mut self, enabled: bool) {
        self.pointer_enabled = enabled;
        self.events.push(ViewEvent::PointerEnabled(enabled));
    }

    fn clear(&mut self) {
        self.events.push(ViewEvent::Cleared);
    }
}
