// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Story planning: long-term goals and per-arc objectives.
//!
//! Cultivation stories get a randomly chosen big story goal, and each arc
//! draws an objective from the themed pool matching that goal. Arcs already
//! in the history are skipped until the pool is exhausted, then the pool
//! resets.

use rand::seq::SliceRandom;

const CULTIVATION_GOALS: &[&str] = &[
    "Revenge on the Sect Leader who betrayed their family.",
    "Seek immortality and uncover ancient cultivation secrets.",
    "Regain lost memories from a past life.",
    "Unite the fractured martial clans under one rule.",
    "Recover the legendary artifact sealed by ancient cultivators.",
];

const REVENGE_ARCS: &[&str] = &[
    "Take the sect entrance exam and earn qualification.",
    "Survive the sect's brutal outer disciple training.",
    "Win the internal sect tournament to rise in rank.",
    "Investigate rumors about the betrayer's past.",
    "Challenge an inner disciple to gain attention.",
    "Uncover a hidden traitor among sect elders.",
    "Rescue a captured ally from a rival sect.",
    "Gain the title of Core Disciple.",
];

const IMMORTALITY_ARCS: &[&str] = &[
    "Master the Foundation Building stage.",
    "Find and decode ancient cultivation manuals.",
    "Survive the life-and-death trials of the inner disciples.",
    "Train under a mysterious hidden master.",
    "Discover an ancient relic said to lead to immortality.",
    "Face a Heart Demon Trial.",
    "Create a unique cultivation technique.",
    "Enter the secret realm opened once every century.",
];

const PAST_LIFE_ARCS: &[&str] = &[
    "Recover fragmented memories from a past life.",
    "Seek remnants of past life treasures.",
    "Battle old enemies who once defeated you.",
    "Uncover the secrets behind your past death.",
    "Rebuild your lost cultivation base.",
    "Reclaim the title once held in your past life.",
    "Find your past life's inheritance trial.",
    "Face the clan that destroyed your old self.",
];

const UNITE_CLANS_ARCS: &[&str] = &[
    "Travel to different sects and clans to build alliances.",
    "Survive assassination attempts from rival clans.",
    "Prove your strength in inter-sect tournaments.",
    "Unite small sects under your banner through diplomacy or duels.",
    "Expose corruption inside the leading martial sects.",
    "Save a declining sect to gain loyalty.",
    "Defeat rival clan leaders in open duels.",
    "Establish your own martial alliance.",
];

const ARTIFACT_ARCS: &[&str] = &[
    "Decode ancient maps pointing to the artifact.",
    "Survive forbidden secret realm trials.",
    "Battle rival treasure hunters.",
    "Defeat ancient beasts guarding the artifact.",
    "Solve the riddles of ancient cultivators.",
    "Fight through illusion arrays protecting the artifact.",
    "Gather scattered relic fragments across territories.",
    "Unlock the artifact's hidden powers step-by-step.",
];

/// Fallback when every generation path has failed.
pub const FALLBACK_ARC_GOAL: &str = "Survive the sect's brutal outer disciple training.";

/// Pick a big story goal for a setting.
pub fn big_story_goal(setting: &str) -> String {
    if setting == "cultivation" {
        CULTIVATION_GOALS
            .choose(&mut rand::thread_rng())
            .unwrap_or(&CULTIVATION_GOALS[0])
            .to_string()
    } else {
        "Become the strongest cultivator.".to_string()
    }
}

/// Pick a fresh arc goal for the theme of `big_story_goal`.
///
/// Arcs in `arc_history` are skipped; an exhausted pool resets.
pub fn new_arc_goal(big_story_goal: &str, arc_history: &[String]) -> String {
    let pool = arc_pool(theme_for_goal(big_story_goal));

    let available: Vec<&&str> = pool
        .iter()
        .filter(|arc| !arc_history.iter().any(|used| used == **arc))
        .collect();

    let chosen = if available.is_empty() {
        tracing::info!(goal = big_story_goal, "Arc pool exhausted, resetting");
        pool.choose(&mut rand::thread_rng())
    } else {
        available.choose(&mut rand::thread_rng()).copied()
    };

    chosen.unwrap_or(&FALLBACK_ARC_GOAL).to_string()
}

/// Map a big story goal to its arc-pool theme by keyword.
fn theme_for_goal(big_story_goal: &str) -> &'static str {
    let goal = big_story_goal.to_lowercase();
    if goal.contains("revenge") {
        "revenge"
    } else if goal.contains("immortality") {
        "immortality"
    } else if goal.contains("past life") {
        "past_life"
    } else if goal.contains("unite") {
        "unite_martial_clans"
    } else if goal.contains("artifact") {
        "recover_legendary_artifact"
    } else {
        tracing::debug!(goal = big_story_goal, "No matching theme, defaulting to revenge");
        "revenge"
    }
}

fn arc_pool(theme: &str) -> &'static [&'static str] {
    match theme {
        "immortality" => IMMORTALITY_ARCS,
        "past_life" => PAST_LIFE_ARCS,
        "unite_martial_clans" => UNITE_CLANS_ARCS,
        "recover_legendary_artifact" => ARTIFACT_ARCS,
        _ => REVENGE_ARCS,
    }
}
