use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::corpus::TokenRecord;
use crate::features::INDICATOR_ORDER;

/// Writes a `<key> <count>` table, one entry per line.
pub fn write_counts(path: &Path, counts: &[(String, usize)]) -> io::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    for (key, count) in counts {
        writeln!(writer, "{} {}", key, count)?;
    }
    writer.flush()
}

/// Writes the two-line candidate/kept feature-type summary.
pub fn write_summary(path: &Path, num_features: usize, num_kept_features: usize) -> io::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    writeln!(writer, "Num of Features={}", num_features)?;
    writeln!(writer, "Num of Kept Features={}", num_kept_features)?;
    writer.flush()
}

/// Writes one corpus split in the learner's vector format, one token per
/// line.
pub fn write_vectors(path: &Path, records: &[TokenRecord]) -> io::Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);
    for record in records {
        writeln!(writer, "{}", vector_line(record))?;
    }
    writer.flush()
}

/// Renders one token record as
/// `<sentence>-<wordIndex>-<word> <tag> <feature> 1 ...`.
///
/// Kept features carry an explicit weight of 1. On rare tokens each of the
/// three orthographic indicators then appears exactly once: kept indicators
/// were already written with weight 1, every other state is appended with
/// an explicit 0. Non-rare tokens never carry the indicator fields.
pub fn vector_line(record: &TokenRecord) -> String {
    let mut fields = vec![
        format!(
            "{}-{}-{}",
            record.sentence_number, record.word_index, record.word
        ),
        record.tag.clone(),
    ];

    for feat in &record.kept_features {
        fields.push(format!("{} 1", feat));
    }

    for label in INDICATOR_ORDER {
        let state = record.indicator_state(label);
        if state.weight() == Some(0) {
            fields.push(format!("{} 0", label));
        }
    }

    fields.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::corpus::{Corpus, Split};
    use crate::features::INDICATOR_ORDER;

    use std::fs;

    use tempfile::tempdir;

    fn record(
        word: &str,
        tag: &str,
        is_rare: bool,
        candidates: &[&str],
        kept: &[&str],
    ) -> TokenRecord {
        TokenRecord {
            sentence_number: 1,
            word_index: 0,
            word: word.to_string(),
            tag: tag.to_string(),
            is_rare,
            candidate_features: candidates.iter().map(|s| s.to_string()).collect(),
            kept_features: kept.iter().map(|s| s.to_string()).collect(),
        }
    }

    fn indicator_occurrences(line: &str, label: &str) -> usize {
        line.split_whitespace().filter(|f| *f == label).count()
    }

    #[test]
    fn test_non_rare_line_has_no_indicators() {
        let rec = record(
            "The",
            "DT",
            false,
            &["curW=The", "prevT=BOS"],
            &["curW=The", "prevT=BOS"],
        );
        let line = vector_line(&rec);
        assert_eq!(line, "1-0-The DT curW=The 1 prevT=BOS 1");
        for label in INDICATOR_ORDER {
            assert_eq!(indicator_occurrences(&line, label), 0);
        }
    }

    #[test]
    fn test_rare_line_carries_each_indicator_exactly_once() {
        // containsNum was true and kept; the other two were false.
        let rec = record(
            "x9",
            "CD",
            true,
            &["curW=x9", "containsNum"],
            &["curW=x9", "containsNum"],
        );
        let line = vector_line(&rec);
        assert!(line.contains("containsNum 1"));
        assert!(line.contains("containshyphen 0"));
        assert!(line.contains("containsUppercase 0"));
        for label in INDICATOR_ORDER {
            assert_eq!(indicator_occurrences(&line, label), 1);
        }
    }

    #[test]
    fn test_true_but_pruned_indicator_serializes_as_zero() {
        let rec = record("x9", "CD", true, &["curW=x9", "containsNum"], &["curW=x9"]);
        let line = vector_line(&rec);
        assert!(line.contains("containsNum 0"));
        assert!(!line.contains("containsNum 1"));
    }

    #[test]
    fn test_count_table_and_summary_formats() -> Result<(), Box<dyn std::error::Error>> {
        let dir = tempdir()?;

        let counts = vec![("curW=The".to_string(), 3), ("prevT=BOS".to_string(), 2)];
        let table_path = dir.path().join("init_feats");
        write_counts(&table_path, &counts)?;
        assert_eq!(
            fs::read_to_string(&table_path)?,
            "curW=The 3\nprevT=BOS 2\n"
        );

        let summary_path = dir.path().join("feature_summary");
        write_summary(&summary_path, 10, 4)?;
        assert_eq!(
            fs::read_to_string(&summary_path)?,
            "Num of Features=10\nNum of Kept Features=4\n"
        );
        Ok(())
    }

    #[test]
    fn test_end_to_end_outputs_are_byte_identical_across_runs(
    ) -> Result<(), Box<dyn std::error::Error>> {
        let train: Vec<String> = [
            "The/DT cat/NN sat./VBD",
            "The/DT cat/NN purred/VBD",
            "A-1/NNP dog/NN ran/VBD",
        ]
        .iter()
        .map(|s| s.to_string())
        .collect();
        let test: Vec<String> = ["The/DT zebra/NN sat./VBD"]
            .iter()
            .map(|s| s.to_string())
            .collect();

        let files = [
            "train_voc",
            "init_feats",
            "kept_feats",
            "feature_summary",
            "final_train.vectors.txt",
            "final_test.vectors.txt",
        ];

        let mut outputs: Vec<Vec<String>> = Vec::new();
        for _ in 0..2 {
            let dir = tempdir()?;
            let corpus = Corpus::build(&train, &test, 2, 2)?;
            corpus.save_feature_tables(dir.path())?;
            corpus.save_vectors(dir.path(), Split::Train)?;
            corpus.save_vectors(dir.path(), Split::Test)?;

            let contents = files
                .iter()
                .map(|name| fs::read_to_string(dir.path().join(name)))
                .collect::<Result<Vec<_>, _>>()?;
            outputs.push(contents);
        }
        assert_eq!(outputs[0], outputs[1]);

        // Rare tokens carry all three indicators, non-rare lines none.
        let train_vectors = &outputs[0][4];
        for line in train_vectors.lines() {
            let rare = line.starts_with("1-2-sat.")
                || line.starts_with("2-2-purred")
                || line.starts_with("3-");
            for label in INDICATOR_ORDER {
                let expected = if rare { 1 } else { 0 };
                assert_eq!(
                    indicator_occurrences(line, label),
                    expected,
                    "indicator {} on line {}",
                    label,
                    line
                );
            }
        }
        Ok(())
    }

    #[test]
    fn test_unwritable_output_location_is_an_error() {
        let rec = record("The", "DT", false, &["curW=The"], &["curW=The"]);
        let missing = Path::new("/nonexistent-tagvec-dir/out.vectors.txt");
        assert!(write_vectors(missing, &[rec]).is_err());
    }
}
