// Copyright (c) 2025 - Cowboy AI, Inc.
//! Property-Based Tests Module
//!
//! - `round_trip`: snapshot encode/decode and store restarts
//! - `selectors`: selector arity and operator complements

mod round_trip;
mod selectors;
