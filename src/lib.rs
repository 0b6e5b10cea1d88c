//! veo-studio library crate.
//!
//! Text/image-to-video generation on top of the Gemini API (Veo): a provider
//! agnostic lifecycle manager in [`generation`], the HTTP adapter in [`veo`],
//! and the command-line front end in [`cli`].

pub mod cli;
pub mod config;
pub mod generation;
pub mod veo;
