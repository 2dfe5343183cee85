//! Core domain models for traffic accounting.
//!
//! This module defines the fundamental data structures used throughout the engine,
//! representing traffic dots, evaluated rates, chart points and sites.

pub mod domain;
pub mod numeric;
