//! Deterministic lexicon-based sentiment scoring for Chinese social-media text.
//!
//! The scorer is a pure rule engine: weighted term tables, negation markers,
//! and intensity modifiers, with no I/O and no statistical model. Same input
//! and same lexicon always produce the same score, bit for bit.

pub mod lexicon;
pub mod scorer;

pub use lexicon::{Lexicon, LexiconEntry, Polarity, WeightClass};
pub use scorer::{Scorer, SentimentScore};
