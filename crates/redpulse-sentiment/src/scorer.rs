//! The lexicon scoring function.

use redpulse_core::SentimentLabel;

use crate::lexicon::{Lexicon, Polarity};

/// Score applied to positive contributions in a negated segment.
const NEGATED_POSITIVE_SCALE: f64 = 0.5;
/// Score applied to negative contributions in a negated segment.
///
/// Negation dampens rather than flips polarity, and dampens negative terms
/// harder than positive ones (0.3 vs 0.5).
const NEGATED_NEGATIVE_SCALE: f64 = 0.3;

/// Sentence-terminal and listing punctuation used to split text into
/// sentence-like segments.
const SEGMENT_DELIMITERS: &[char] = &['。', '！', '？', '!', '?', '；', ';', '，', ',', '、'];

/// A sentiment score in `[0, 1]` (0 most negative, 1 most positive) with its
/// label band.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SentimentScore {
    pub value: f64,
    pub label: SentimentLabel,
}

impl SentimentScore {
    fn neutral() -> Self {
        SentimentScore {
            value: 0.5,
            label: SentimentLabel::Neutral,
        }
    }

    fn from_value(value: f64) -> Self {
        let value = value.clamp(0.0, 1.0);
        SentimentScore {
            value,
            label: SentimentLabel::from_score(value),
        }
    }
}

/// Pure, deterministic lexicon scorer. No I/O, no state beyond the shared
/// read-only lexicon.
#[derive(Debug, Clone, Copy)]
pub struct Scorer {
    lexicon: &'static Lexicon,
}

impl Default for Scorer {
    fn default() -> Self {
        Self::new()
    }
}

impl Scorer {
    /// A scorer over the built-in lexicon.
    #[must_use]
    pub fn new() -> Self {
        Scorer {
            lexicon: Lexicon::builtin(),
        }
    }

    #[must_use]
    pub fn with_lexicon(lexicon: &'static Lexicon) -> Self {
        Scorer { lexicon }
    }

    /// Score a text. Empty or whitespace-only input is neutral (0.5).
    ///
    /// The text is lowercased, trimmed, and split into segments on
    /// sentence-terminal/listing punctuation. Per segment, every lexicon term
    /// contributes `occurrences × weight × intensity` to a positive or
    /// negative accumulator; a negation marker anywhere in the segment scales
    /// positive contributions by 0.5 and negative ones by 0.3. The final
    /// score is `positive / (positive + negative)`, or 0.5 when no term
    /// matched at all.
    #[must_use]
    pub fn score(&self, text: &str) -> SentimentScore {
        let folded = text.to_lowercase();
        let folded = folded.trim();
        if folded.is_empty() {
            return SentimentScore::neutral();
        }

        let mut positive_sum = 0.0_f64;
        let mut negative_sum = 0.0_f64;

        for segment in folded
            .split(SEGMENT_DELIMITERS)
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            let negated = self
                .lexicon
                .negation_markers
                .iter()
                .any(|marker| segment.contains(marker));

            let multiplier = self
                .lexicon
                .intensity_tiers
                .iter()
                .find(|tier| tier.markers.iter().any(|m| segment.contains(m)))
                .map_or(1.0, |tier| tier.multiplier);

            for entry in &self.lexicon.entries {
                let occurrences = segment.matches(entry.term).count();
                if occurrences == 0 {
                    continue;
                }
                #[allow(clippy::cast_precision_loss)]
                let contribution = occurrences as f64 * entry.class.weight() * multiplier;
                match entry.polarity {
                    Polarity::Positive => {
                        positive_sum += if negated {
                            contribution * NEGATED_POSITIVE_SCALE
                        } else {
                            contribution
                        };
                    }
                    Polarity::Negative => {
                        negative_sum += if negated {
                            contribution * NEGATED_NEGATIVE_SCALE
                        } else {
                            contribution
                        };
                    }
                }
            }
        }

        let total = positive_sum + negative_sum;
        if total == 0.0 {
            return SentimentScore::neutral();
        }
        SentimentScore::from_value(positive_sum / total)
    }
}
