//! Column metadata resolution.
//!
//! Each header column resolves once per job, with the first source that has
//! an answer winning: caller hints, then the domain dictionary, then keyword
//! heuristics on the raw name, then defaults (`string`, humanized label,
//! empty description).

pub mod dictionary;
pub mod error;
pub mod heuristics;
pub mod hints;
pub mod humanize;
pub mod resolver;
