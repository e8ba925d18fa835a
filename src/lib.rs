//! Ubot Library
//!
//! Command dispatch core for a multi-account Telegram userbot.
//!
//! This crate provides the core functionality for:
//! - Tracking started accounts and their command prefixes
//! - Persisting prefix changes across restarts
//! - Matching messages against command aliases and splitting arguments
//! - Routing matched commands to handlers

pub mod account;
pub mod commands;
pub mod config;
