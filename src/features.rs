use regex::Regex;

use crate::tokenizer::TokenPair;

/// Sentinel substituted for context positions before the sentence start.
pub const BOS: &str = "BOS";
/// Sentinel substituted for context positions past the sentence end.
pub const EOS: &str = "EOS";

/// Marker identifying current-word identity features, which are exempt
/// from frequency pruning.
pub const IDENTITY_MARKER: &str = "curW";

pub const CONTAINS_NUM: &str = "containsNum";
pub const CONTAINS_HYPHEN: &str = "containshyphen";
pub const CONTAINS_UPPERCASE: &str = "containsUppercase";

/// Fixed emission order for the three orthographic indicators. The output
/// files must be byte-stable across runs, so the order is pinned.
pub const INDICATOR_ORDER: [&str; 3] = [CONTAINS_NUM, CONTAINS_HYPHEN, CONTAINS_UPPERCASE];

/// Per-token state of one orthographic indicator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndicatorState {
    /// The token is not rare; the indicator was never a candidate.
    NotApplicable,
    /// Rare token, indicator false.
    False,
    /// Rare token, indicator true but pruned from the kept-feature set.
    TruePruned,
    /// Rare token, indicator true and retained.
    TrueKept,
}

impl IndicatorState {
    /// Weight the indicator serializes with: `1` only when true and kept,
    /// `0` for every other state on a rare token, and no field at all on
    /// non-rare tokens.
    pub fn weight(self) -> Option<u8> {
        match self {
            IndicatorState::NotApplicable => None,
            IndicatorState::TrueKept => Some(1),
            IndicatorState::False | IndicatorState::TruePruned => Some(0),
        }
    }
}

/// Context attributes for one token, with sentence-boundary sentinels
/// already substituted.
#[derive(Debug, Clone)]
pub struct TokenContext {
    pub word: String,
    pub prev_tag: String,
    pub prev_two_tags: String,
    pub prev_word: String,
    pub prev2_word: String,
    pub next_word: String,
    pub next2_word: String,
}

impl TokenContext {
    /// Builds the context for the token at `word_idx` of `sentence`.
    ///
    /// At the sentence start the previous word and tag are `BOS` and the
    /// joined tag bigram is `BOS+BOS`; at index 1 only the two-back slots
    /// fall back to `BOS`. Symmetrically, `EOS` stands in for the next and
    /// two-forward words at the sentence end.
    pub fn at(sentence: &[TokenPair], word_idx: usize) -> Self {
        let last = sentence.len() - 1;

        let (prev_word, prev_tag, prev2_word, prev_two_tags) = if word_idx == 0 {
            (
                BOS.to_string(),
                BOS.to_string(),
                BOS.to_string(),
                format!("{}+{}", BOS, BOS),
            )
        } else if word_idx == 1 {
            let prev = &sentence[word_idx - 1];
            (
                prev.word.clone(),
                prev.tag.clone(),
                BOS.to_string(),
                format!("{}+{}", BOS, prev.tag),
            )
        } else {
            let prev = &sentence[word_idx - 1];
            let prev2 = &sentence[word_idx - 2];
            (
                prev.word.clone(),
                prev.tag.clone(),
                prev2.word.clone(),
                format!("{}+{}", prev2.tag, prev.tag),
            )
        };

        let (next_word, next2_word) = if word_idx == last {
            (EOS.to_string(), EOS.to_string())
        } else if word_idx == last - 1 {
            (sentence[word_idx + 1].word.clone(), EOS.to_string())
        } else {
            (
                sentence[word_idx + 1].word.clone(),
                sentence[word_idx + 2].word.clone(),
            )
        };

        TokenContext {
            word: sentence[word_idx].word.clone(),
            prev_tag,
            prev_two_tags,
            prev_word,
            prev2_word,
            next_word,
            next2_word,
        }
    }
}

/// Builds per-token candidate feature lists.
/// Context features are always emitted; orthographic and affix features are
/// gated behind rarity so common words do not blow up the feature space.
pub struct FeatureBuilder {
    digit: Regex,
    uppercase: Regex,
    hyphen: Regex,
}

impl Default for FeatureBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl FeatureBuilder {
    /// Creates a new instance of [`FeatureBuilder`] with its compiled
    /// orthographic character-class patterns.
    pub fn new() -> Self {
        FeatureBuilder {
            digit: Regex::new(r"\d").unwrap(),
            uppercase: Regex::new(r"[A-Z]").unwrap(),
            hyphen: Regex::new(r"-").unwrap(),
        }
    }

    /// Produces the ordered candidate feature list for one token in context.
    ///
    /// The identity feature comes first; when `is_rare` is set, character
    /// prefixes and suffixes (lengths 1 through 4, capped at the word
    /// length) and the true orthographic indicators follow; the six context
    /// features close the list in a fixed declared order. The gold tag is
    /// never an input here.
    pub fn candidate_features(&self, ctx: &TokenContext, is_rare: bool) -> Vec<String> {
        let mut feats = vec![format!("{}={}", IDENTITY_MARKER, ctx.word)];

        if is_rare {
            for prefix in affixes(&ctx.word, Affix::Prefix) {
                feats.push(format!("pref={}", prefix));
            }
            for suffix in affixes(&ctx.word, Affix::Suffix) {
                feats.push(format!("suf={}", suffix));
            }
            for (label, pattern) in [
                (CONTAINS_NUM, &self.digit),
                (CONTAINS_HYPHEN, &self.hyphen),
                (CONTAINS_UPPERCASE, &self.uppercase),
            ] {
                // Present-only-when-true at the candidate stage; the
                // explicit 0 encoding happens at serialization time.
                if pattern.is_match(&ctx.word) {
                    feats.push(label.to_string());
                }
            }
        }

        feats.push(format!("prevT={}", ctx.prev_tag));
        feats.push(format!("prevTwoTags={}", ctx.prev_two_tags));
        feats.push(format!("prevW={}", ctx.prev_word));
        feats.push(format!("prev2W={}", ctx.prev2_word));
        feats.push(format!("nextW={}", ctx.next_word));
        feats.push(format!("next2W={}", ctx.next2_word));
        feats
    }
}

#[derive(Clone, Copy)]
enum Affix {
    Prefix,
    Suffix,
}

/// Character prefixes or suffixes of lengths 1 through 4. A short word
/// yields fewer affixes, never padded or duplicated ones.
fn affixes(word: &str, kind: Affix) -> Vec<String> {
    let chars: Vec<char> = word.chars().collect();
    (1..=chars.len().min(4))
        .map(|n| match kind {
            Affix::Prefix => chars[..n].iter().collect(),
            Affix::Suffix => chars[chars.len() - n..].iter().collect(),
        })
        .collect()
}
