//! Prompt assembly: persona instruction, prior history, new user turn.

use sophia_core::Turn;

/// The fixed persona instruction, addressed to `name`.
#[must_use]
pub fn persona_instruction(name: &str) -> String {
    format!(
        "You are Soph_IA, a warm, empathetic, and supportive virtual friend. \
         Always reply in French, with kindness and positivity. \
         Address {name} directly. Avoid repetition."
    )
}

/// Build the turns sent to the completion endpoint.
///
/// `history` must not contain `message`; it is appended here as the final
/// user turn.
#[must_use]
pub fn build_prompt(name: &str, history: &[Turn], message: &str) -> Vec<Turn> {
    let mut turns = Vec::with_capacity(history.len() + 2);
    turns.push(Turn::system(persona_instruction(name)));
    turns.extend_from_slice(history);
    turns.push(Turn::user(message));
    turns
}
