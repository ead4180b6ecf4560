// Sanctuary Review: pre-publication content moderation for short posts.
//
// This is the library root. Each module corresponds to a stage of the
// moderation pipeline: text -> {lexicon match, sentiment scores} -> decision.

pub mod config;
pub mod decision;
pub mod lexicon;
pub mod moderation;
pub mod output;
pub mod sentiment;

#[cfg(feature = "web")]
pub mod web;
