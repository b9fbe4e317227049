// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Prompt templates for story generation.
//!
//! Every generation prompt ends with the same output contract: a `[STORY]`
//! block followed by a `[CHOICES]` block of exactly three numbered choices.
//! The parser in `services::story` accepts that format plus two laxer
//! variants models sometimes produce.

use crate::models::StoryCreationParams;

/// Output contract appended to every generation prompt.
const FORMAT_CONTRACT: &str = "\
FORMAT:
[STORY]
(Your dynamic, creative chapter organized for maximum visual and emotional impact)
[/STORY]

[CHOICES]
1. (First compelling choice naturally emerging from your story)
2. (Second unique choice based on the situation you created)
3. (Third distinctive choice offering different narrative path)
[/CHOICES]";

/// Shared storytelling rules for opening chapters.
pub const STORY_SYSTEM_PROMPT: &str = "\
You are a storytelling genius who creates BINGE-WORTHY interactive fiction.

STORY MASTERY RULES:
1. CONTEXT FIRST - Give readers enough background to care about what happens
2. INTRIGUE over action - Create mysteries, secrets, or goals that drive the plot
3. MEANINGFUL CHOICES - Each decision shapes the story direction significantly
4. PLOT MOMENTUM - Something important should happen or be revealed every chapter
5. EMOTIONAL HOOKS - Make readers invested in the character's goals and relationships

WRITING APPROACH:
- Start with a SITUATION, not an action scene
- Establish CLEAR STAKES - what the character wants or needs
- Create IMMEDIATE INTRIGUE - questions that need answers
- Use CONCRETE DETAILS - specific, relatable scenarios

CHOICE REQUIREMENTS:
1. Create 3 distinct choices that lead to DIFFERENT story paths and outcomes
2. Each choice should unlock new plot elements, characters, or revelations
3. Avoid combat-heavy or repetitive scenario choices
4. Include choices that appeal to different player motivations (social, strategic, bold)";

/// Shared storytelling rules for continuations.
pub const CONTINUATION_SYSTEM_PROMPT: &str = "\
You are a storytelling genius continuing BINGE-WORTHY interactive fiction.

STORY CONTINUATION RULES:
1. PICK UP directly from the last story segment and the player's choice
2. RESPECT previous story elements - maintain consistency
3. ADVANCE the plot meaningfully - reveal new information or create new situations
4. ESCALATE stakes or tension in some way
5. END with another pivotal moment requiring a meaningful player choice

WRITING APPROACH:
- SHOW the immediate consequences of the player's choice
- INTRODUCE new elements (characters, locations, revelations)
- MAINTAIN the established tone and setting
- REMEMBER the character's motivations and traits

CHOICE REQUIREMENTS:
1. Create 3 distinct choices that lead to DIFFERENT story paths and outcomes
2. Each choice should unlock new plot elements, characters, or revelations
3. Avoid combat-heavy or repetitive scenario choices";

/// Pronoun set to write the protagonist with.
pub fn gender_pronouns(character_gender: &str) -> &'static str {
    match character_gender {
        "male" => "he/him/his",
        "female" => "she/her/hers",
        _ => "they/them/their",
    }
}

/// Prose describing how the character's origin should shape the story.
pub fn origin_profile(character_origin: &str, character_name: &str) -> String {
    match character_origin {
        "reincarnated" => format!(
            "{} was reincarnated from another world with knowledge of a past life. \
             That knowledge should provide unconventional solutions and surprising \
             foresight, setting them apart from others.",
            character_name
        ),
        "weak" => format!(
            "{} starts with major disadvantages and is considered weak in this world. \
             They must rely on cunning, grit and resourcefulness; small gains should \
             feel significant.",
            character_name
        ),
        "hidden" => format!(
            "{} has hidden talents or a secret background not apparent to others. \
             Hint at it subtly; let it surface unexpectedly and draw unwanted attention.",
            character_name
        ),
        "genius" => format!(
            "{} is naturally talented and learns much faster than others, yet still \
             faces challenges from jealousy, inexperience or overconfidence.",
            character_name
        ),
        "fallen" => format!(
            "{} once held high status but has fallen from grace and must rebuild. \
             Show the struggle to regain standing and the conflict of past versus present.",
            character_name
        ),
        _ => format!(
            "{} has an ordinary background with no special advantages. Progress comes \
             from hard work and mentorship, making achievements feel earned.",
            character_name
        ),
    }
}

/// System prompt for generating the opening chapter.
pub fn opening_system_prompt(
    params: &StoryCreationParams,
    big_story_goal: Option<&str>,
    arc_goal: Option<&str>,
) -> String {
    let mut prompt = format!(
        "{base}\n\nUse {pronouns} pronouns for {name}.\n\
         Setting: {setting}. Tone: {tone}.\n\n{origin}",
        base = STORY_SYSTEM_PROMPT,
        pronouns = gender_pronouns(&params.character_gender),
        name = params.character_name,
        setting = params.setting,
        tone = params.tone,
        origin = origin_profile(&params.character_origin, &params.character_name),
    );

    if let Some(goal) = big_story_goal {
        prompt.push_str(&format!(
            "\n\nMAIN CHARACTER GOAL: {}'s ultimate goal is to {}",
            params.character_name, goal
        ));
    }
    if let Some(arc) = arc_goal {
        prompt.push_str(&format!(
            "\n\nThis is the initial arc of the journey. Its immediate objective: {} \
             Every chapter in this arc should contribute to that objective.",
            arc
        ));
    }

    prompt.push_str("\n\n");
    prompt.push_str(FORMAT_CONTRACT);
    prompt
}

/// User prompt for generating the opening chapter.
pub fn opening_user_prompt(params: &StoryCreationParams) -> String {
    format!(
        "Create the opening chapter for {name}'s {setting} story with a {origin} \
         background.\n\n\
         CREATIVE MANDATE:\n\
         - Make this chapter feel fresh and unpredictable\n\
         - Show {name}'s personality through actions and dialogue\n\
         - Include a unique conflict or challenge, not just rival mockery\n\
         - End with compelling choices that emerge naturally from your story",
        name = params.character_name,
        setting = params.setting,
        origin = params.character_origin,
    )
}

/// System prompt for continuing a story.
pub fn continuation_system_prompt(
    character_name: &str,
    character_gender: &str,
    big_story_goal: Option<&str>,
    arc_goal: Option<&str>,
) -> String {
    let mut prompt = format!(
        "{base}\n\nUse {pronouns} pronouns for {name}.",
        base = CONTINUATION_SYSTEM_PROMPT,
        pronouns = gender_pronouns(character_gender),
        name = character_name,
    );

    if let Some(goal) = big_story_goal {
        prompt.push_str(&format!(
            "\n\nMAIN CHARACTER GOAL: {}'s ultimate goal is to {}",
            character_name, goal
        ));
    }
    if let Some(arc) = arc_goal {
        prompt.push_str(&format!("\n\nCURRENT ARC GOAL:\n- {}", arc));
    }

    prompt.push_str("\n\n");
    prompt.push_str(FORMAT_CONTRACT);
    prompt
}

/// User prompt for continuing a story.
pub fn continuation_user_prompt(
    character_name: &str,
    previous_content: &str,
    selected_choice: &str,
) -> String {
    format!(
        "Continue {name}'s story:\n\n\
         PREVIOUS STORY:\n{previous}\n\n\
         CHOSEN ACTION:\n{choice}\n\n\
         Show the immediate consequences and progression that naturally follow from \
         this choice, with clear cause and effect, character development, and a fresh \
         conflict or discovery. End at a natural decision point.",
        name = character_name,
        previous = previous_content,
        choice = selected_choice,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn params() -> StoryCreationParams {
        StoryCreationParams {
            character_name: "Mira".to_string(),
            character_gender: "female".to_string(),
            setting: "cultivation".to_string(),
            tone: "adventure".to_string(),
            character_origin: "hidden".to_string(),
            user_id: None,
        }
    }

    #[test]
    fn test_pronoun_mapping() {
        assert_eq!(gender_pronouns("male"), "he/him/his");
        assert_eq!(gender_pronouns("female"), "she/her/hers");
        assert_eq!(gender_pronouns("non-binary"), "they/them/their");
        assert_eq!(gender_pronouns("unspecified"), "they/them/their");
    }

    #[test]
    fn test_opening_prompt_includes_goals_and_contract() {
        let prompt = opening_system_prompt(
            &params(),
            Some("seek immortality"),
            Some("Survive the outer disciple training."),
        );

        assert!(prompt.contains("she/her/hers"));
        assert!(prompt.contains("ultimate goal is to seek immortality"));
        assert!(prompt.contains("Survive the outer disciple training."));
        assert!(prompt.ends_with("[/CHOICES]"));
    }

    #[test]
    fn test_opening_prompt_without_goals() {
        let prompt = opening_system_prompt(&params(), None, None);
        assert!(!prompt.contains("MAIN CHARACTER GOAL"));
        assert!(prompt.contains("[STORY]"));
    }

    #[test]
    fn test_continuation_user_prompt_embeds_context() {
        let prompt = continuation_user_prompt("Mira", "She opened the gate.", "Step through");
        assert!(prompt.contains("PREVIOUS STORY:\nShe opened the gate."));
        assert!(prompt.contains("CHOSEN ACTION:\nStep through"));
    }

    #[test]
    fn test_origin_profile_mentions_character() {
        for origin in ["reincarnated", "weak", "hidden", "genius", "fallen", "normal"] {
            let profile = origin_profile(origin, "Mira");
            assert!(profile.contains("Mira"), "missing name for {}", origin);
        }
    }
}
