use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};
use std::error::Error;
use std::io;
use std::path::Path;

use rayon::prelude::*;
use serde::Serialize;

use crate::features::{FeatureBuilder, IndicatorState, TokenContext, IDENTITY_MARKER};
use crate::serializer;
use crate::tokenizer::{Sentence, Tokenizer};

/// Which corpus split an export refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Split {
    Train,
    Test,
}

/// One token's feature record for a single corpus pass.
#[derive(Debug, Clone)]
pub struct TokenRecord {
    /// 1-based sentence number within the corpus.
    pub sentence_number: usize,
    /// 0-based word index within the sentence.
    pub word_index: usize,
    pub word: String,
    pub tag: String,
    pub is_rare: bool,
    /// Every feature this token could contribute, before global pruning.
    pub candidate_features: Vec<String>,
    /// The candidates that survived pruning; filled by projection.
    pub kept_features: Vec<String>,
}

impl TokenRecord {
    /// Resolves the tri-state of one orthographic indicator for this token.
    pub fn indicator_state(&self, label: &str) -> IndicatorState {
        if !self.is_rare {
            IndicatorState::NotApplicable
        } else if self.kept_features.iter().any(|f| f == label) {
            IndicatorState::TrueKept
        } else if self.candidate_features.iter().any(|f| f == label) {
            IndicatorState::TruePruned
        } else {
            IndicatorState::False
        }
    }
}

/// Run summary printed by the CLI after a successful build.
#[derive(Debug, Serialize)]
pub struct ExtractionStats {
    pub vocabulary_size: usize,
    pub num_features: usize,
    pub num_kept_features: usize,
    pub num_train_tokens: usize,
    pub num_test_tokens: usize,
}

/// Corpus struct holding the frozen vocabulary, the feature-frequency
/// tables, and the projected train/test token records.
///
/// The vocabulary and the kept-feature set are computed exclusively from
/// training data and are read-only by the time the test pass runs, so test
/// data can never influence feature selection.
pub struct Corpus {
    train_voc: Vec<(String, usize)>,
    init_feats: Vec<(String, usize)>,
    kept_feats: Vec<(String, usize)>,
    train_records: Vec<TokenRecord>,
    test_records: Vec<TokenRecord>,
}

impl Corpus {
    /// Builds the full feature space from a training corpus and projects
    /// both corpora through it.
    ///
    /// # Arguments
    /// * `train_lines` - Raw training corpus lines (`word/tag` tokens).
    /// * `test_lines` - Raw test corpus lines in the same format.
    /// * `rare_threshold` - Words with a training count below this are rare.
    /// * `feat_threshold` - Candidate features seen fewer than this many
    ///   times in training are pruned, identity features excepted.
    ///
    /// # Errors
    /// Returns an error if either corpus contains a malformed token.
    pub fn build(
        train_lines: &[String],
        test_lines: &[String],
        rare_threshold: usize,
        feat_threshold: usize,
    ) -> Result<Corpus, Box<dyn Error>> {
        let tokenizer = Tokenizer::new();
        let builder = FeatureBuilder::new();

        let train_sentences = tokenizer.parse(train_lines)?;
        let train_voc = ranked_counts(
            train_sentences
                .iter()
                .flatten()
                .map(|pair| pair.word.clone()),
        );
        let voc_counts: HashMap<String, usize> = train_voc.iter().cloned().collect();

        let mut train_records =
            generate_records(&builder, &train_sentences, &voc_counts, rare_threshold);

        let init_feats = ranked_counts(
            train_records
                .iter()
                .flat_map(|record| record.candidate_features.iter().cloned()),
        );

        // A feature survives on raw training frequency, except identity
        // features, which are always retained so every token keeps at least
        // one discriminating feature under aggressive pruning.
        let kept_feats: Vec<(String, usize)> = init_feats
            .iter()
            .filter(|(label, count)| *count >= feat_threshold || label.contains(IDENTITY_MARKER))
            .cloned()
            .collect();
        let kept_set: HashSet<String> = kept_feats.iter().map(|(label, _)| label.clone()).collect();

        project_records(&mut train_records, &kept_set);

        let test_sentences = tokenizer.parse(test_lines)?;
        let mut test_records =
            generate_records(&builder, &test_sentences, &voc_counts, rare_threshold);
        project_records(&mut test_records, &kept_set);

        Ok(Corpus {
            train_voc,
            init_feats,
            kept_feats,
            train_records,
            test_records,
        })
    }

    /// Writes `train_voc`, `init_feats`, `kept_feats` and `feature_summary`
    /// into `output_dir`.
    pub fn save_feature_tables(&self, output_dir: &Path) -> io::Result<()> {
        serializer::write_counts(&output_dir.join("train_voc"), &self.train_voc)?;
        serializer::write_counts(&output_dir.join("init_feats"), &self.init_feats)?;
        serializer::write_counts(&output_dir.join("kept_feats"), &self.kept_feats)?;
        serializer::write_summary(
            &output_dir.join("feature_summary"),
            self.init_feats.len(),
            self.kept_feats.len(),
        )
    }

    /// Writes one split's token records in the learner's vector format.
    pub fn save_vectors(&self, output_dir: &Path, split: Split) -> io::Result<()> {
        let (records, file_name) = match split {
            Split::Train => (&self.train_records, "final_train.vectors.txt"),
            Split::Test => (&self.test_records, "final_test.vectors.txt"),
        };
        serializer::write_vectors(&output_dir.join(file_name), records)
    }

    pub fn stats(&self) -> ExtractionStats {
        ExtractionStats {
            vocabulary_size: self.train_voc.len(),
            num_features: self.init_feats.len(),
            num_kept_features: self.kept_feats.len(),
            num_train_tokens: self.train_records.len(),
            num_test_tokens: self.test_records.len(),
        }
    }

    pub fn train_vocabulary(&self) -> &[(String, usize)] {
        &self.train_voc
    }

    pub fn init_features(&self) -> &[(String, usize)] {
        &self.init_feats
    }

    pub fn kept_features(&self) -> &[(String, usize)] {
        &self.kept_feats
    }

    pub fn train_records(&self) -> &[TokenRecord] {
        &self.train_records
    }

    pub fn test_records(&self) -> &[TokenRecord] {
        &self.test_records
    }
}

/// Counts occurrences and ranks them most-common-first; ties keep
/// first-seen order so repeated runs produce identical files.
fn ranked_counts<I>(items: I) -> Vec<(String, usize)>
where
    I: IntoIterator<Item = String>,
{
    let mut counts: HashMap<String, usize> = HashMap::new();
    let mut order: Vec<String> = Vec::new();

    for item in items {
        match counts.entry(item) {
            Entry::Occupied(mut entry) => *entry.get_mut() += 1,
            Entry::Vacant(entry) => {
                order.push(entry.key().clone());
                entry.insert(1);
            }
        }
    }

    let mut ranked: Vec<(String, usize)> = order
        .into_iter()
        .map(|key| {
            let count = counts[&key];
            (key, count)
        })
        .collect();
    // Stable sort, so equal counts stay in first-seen order.
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked
}

/// Builds candidate feature records for every token of one corpus pass.
/// Sentences are independent once the vocabulary is frozen, so the pass
/// parallelizes per sentence; record order stays deterministic.
fn generate_records(
    builder: &FeatureBuilder,
    sentences: &[Sentence],
    voc_counts: &HashMap<String, usize>,
    rare_threshold: usize,
) -> Vec<TokenRecord> {
    sentences
        .par_iter()
        .enumerate()
        .flat_map_iter(|(idx, sentence)| {
            sentence.iter().enumerate().map(move |(word_idx, pair)| {
                let count = voc_counts.get(&pair.word).copied().unwrap_or(0);
                let is_rare = count < rare_threshold;
                let ctx = TokenContext::at(sentence, word_idx);
                TokenRecord {
                    sentence_number: idx + 1,
                    word_index: word_idx,
                    word: pair.word.clone(),
                    tag: pair.tag.clone(),
                    is_rare,
                    candidate_features: builder.candidate_features(&ctx, is_rare),
                    kept_features: Vec::new(),
                }
            })
        })
        .collect()
}

/// Pure projection of each record's candidates onto the kept-feature set.
fn project_records(records: &mut [TokenRecord], kept_set: &HashSet<String>) {
    for record in records {
        record.kept_features = record
            .candidate_features
            .iter()
            .filter(|feat| kept_set.contains(*feat))
            .cloned()
            .collect();
    }
}
