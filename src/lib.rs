//! # Storefront Telegram Bot
//!
//! A Telegram bot that serves a three-level product catalog
//! (category → subcategory → product) through inline keyboards. Customers
//! browse and page through products one at a time; a single configured
//! admin manages the catalog from the same chat interface.

pub mod bot;
pub mod config;
pub mod db;
pub mod dialogue;
pub mod payload;
pub mod session;
