//! Prompt construction for the completion endpoint.
//!
//! Exactly two messages per request: a system message encoding the task
//! constraints (JSON-array-only output, suggestion count, required fields,
//! ownership filter) and a user message serializing the collection as a
//! compact textual list plus any caller-supplied focus.

use serde::Serialize;

use crate::collection::CollectionItem;
use crate::config::{OwnershipFilter, PromptVariant};

/// One chat message in the completion request body.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: &'static str,
    pub content: String,
}

/// Caller-supplied prompt parameters.
#[derive(Debug, Clone, Default)]
pub struct PromptParams {
    /// Free-text focus/preference appended to the user message.
    pub focus: String,
    /// Player count, used by the Simple variant only.
    pub players: Option<u32>,
}

/// Serialize the collection as `Name: {name} ID: {id} Rating: {rating}`
/// entries joined by `" ; "`. Unrated items show `N/A`.
pub fn collection_summary(collection: &[CollectionItem]) -> String {
    collection
        .iter()
        .map(|game| {
            format!(
                "Name: {} ID: {} Rating: {}",
                game.name,
                game.id,
                game.rating.as_deref().unwrap_or("N/A")
            )
        })
        .collect::<Vec<_>>()
        .join(" ; ")
}

/// Build the two-message prompt for one recommendation request.
pub fn build_messages(
    collection: &[CollectionItem],
    params: &PromptParams,
    variant: PromptVariant,
    ownership: OwnershipFilter,
) -> Vec<ChatMessage> {
    let mut user_content = format!(
        "Here's my board game collection:\n {}.",
        collection_summary(collection)
    );
    if !params.focus.trim().is_empty() {
        user_content.push_str(" Focus on: ");
        user_content.push_str(params.focus.trim());
    }
    if variant == PromptVariant::Simple {
        if let Some(players) = params.players {
            user_content.push_str(&format!(" We will be {players} players."));
        }
    }

    vec![
        ChatMessage {
            role: "system",
            content: system_prompt(variant, ownership),
        },
        ChatMessage {
            role: "user",
            content: user_content,
        },
    ]
}

fn system_prompt(variant: PromptVariant, ownership: OwnershipFilter) -> String {
    let ownership_clause = match ownership {
        OwnershipFilter::Owned => "they already own",
        OwnershipFilter::Unowned => "they dont own but could buy",
    };
    match variant {
        PromptVariant::Full => format!(
            "You are an AI that recommends board games based on the user's collection \
             (including their personal ratings), only recommend games {ownership_clause} \
             and take their rating into consideration (10.0 is max, 0.0 is minimum, N/A \
             means they have not rated yet). You must reply in JSON ONLY! Never return \
             anything but the JSON, and give 1 to 8 suggestions for each reply. You must \
             return JSON with the game ID, the game name, a single sentence summary of \
             the game, a sentence about what makes this game unique, and a single \
             sentence of why you recommend this game for the group. Example JSON \
             response: [{{\"id\": \"12345\", \"name\": \"Sample Game\", \"summary\": \
             \"A quick summary\", \"unique\": \"What makes this game unique\", \
             \"reason\": \"Your reason for recommending it, why does it fit what the \
             user asks for, make each recommendation unique and try not to repeat \
             yourself, don't mention the users rating, they already know it.\"}}]"
        ),
        PromptVariant::Simple => format!(
            "You are an AI that recommends board games based on the user's collection, \
             only recommend games {ownership_clause}. You must reply in JSON ONLY! Never \
             return anything but the JSON, and give 1 to 4 suggestions for each reply. \
             You must return JSON with the game ID, the game name, a single sentence \
             summary of the game, and a single sentence of why you recommend this game \
             for the group. Example JSON response: [{{\"id\": \"12345\", \"name\": \
             \"Sample Game\", \"summary\": \"A quick summary\", \"reason\": \"Your \
             reason for recommending it.\"}}]"
        ),
    }
}
