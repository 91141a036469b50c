//! Pageforge Library
//!
//! This library provides the core functionality of the Pageforge page
//! builder: the section template catalog, theme presets, the composition
//! store with its override map, the inline-edit engine over an arena DOM,
//! and the framework code generators.

// Module declarations
pub mod canvas;
pub mod cli;
pub mod codegen;
pub mod config;
pub mod dom;
pub mod editor;
pub mod models;
pub mod registry;
pub mod themes;

#[cfg(feature = "web")]
pub mod annotation;
#[cfg(feature = "web")]
pub mod web;
