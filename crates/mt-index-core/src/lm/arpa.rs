//! Reader for ARPA back-off model files.
//!
//! ```text
//! \data\
//! ngram 1=3
//! ngram 2=2
//!
//! \1-grams:
//! -1.0  the  -0.3
//! ...
//! \end\
//! ```
//!
//! Scores in the file are log10; they are stored as natural logs.

use std::f32::consts::LN_10;
use std::fs::File;
use std::io::{BufRead, BufReader, Lines};
use std::path::Path;
use std::time::Instant;

use super::backoff::{BackoffLanguageModel, BackoffModelBuilder};
use crate::constants::MAX_ORDER;
use crate::types::error::{IndexError, Result};
use crate::vocab::Vocabulary;
use crate::{log_error, log_info};

/// Line source that tracks 1-based line numbers.
struct LineReader<R> {
    lines: Lines<R>,
    line: usize,
}

impl<R: BufRead> LineReader<R> {
    fn new(reader: R) -> Self {
        Self { lines: reader.lines(), line: 0 }
    }

    /// Next line; running out of input is a format error.
    fn next_line(&mut self) -> Result<String> {
        match self.lines.next() {
            Some(line) => {
                self.line += 1;
                Ok(line?)
            }
            None => Err(IndexError::format(self.line, "premature end of file")),
        }
    }

    fn skip_until(&mut self, header: &str) -> Result<()> {
        while !self.next_line()?.starts_with(header) {}
        Ok(())
    }
}

/// Parse a log10 score, accepting the `-inf` literal some toolkits write.
fn parse_log10(literal: &str, line: usize) -> Result<f32> {
    let value = if literal == "-inf" {
        f32::NEG_INFINITY
    } else {
        literal
            .parse::<f32>()
            .map_err(|_| IndexError::InvalidNumericLiteral { line, literal: literal.to_string() })?
    };
    Ok(value * LN_10)
}

fn parse_count(literal: &str, line: usize) -> Result<usize> {
    literal
        .trim()
        .parse()
        .map_err(|_| IndexError::InvalidNumericLiteral { line, literal: literal.trim().to_string() })
}

/// `ngram k=count` lines following `\data\`, as counts by order.
fn read_counts<R: BufRead>(reader: &mut LineReader<R>) -> Result<Vec<usize>> {
    let mut counts = vec![0usize; MAX_ORDER];
    let mut order = 0;
    loop {
        let line = reader.next_line()?;
        let Some(rest) = line.strip_prefix("ngram") else {
            if order == 0 {
                return Err(IndexError::format(reader.line, "no n-gram counts after \\data\\"));
            }
            counts.truncate(order);
            return Ok(counts);
        };
        let (k, count) = rest
            .split_once('=')
            .ok_or_else(|| IndexError::format(reader.line, format!("malformed count line {:?}", line)))?;
        let k = parse_count(k, reader.line)?;
        if k == 0 || k > MAX_ORDER {
            return Err(IndexError::format(reader.line, format!("n-gram order {} outside 1..={}", k, MAX_ORDER)));
        }
        counts[k - 1] = parse_count(count, reader.line)?;
        order = order.max(k);
    }
}

/// Read an ARPA model from `reader`, interning its words into `vocab`.
/// Each order's table is sized from its header count times `multiplier`.
pub fn read_arpa<R: BufRead>(reader: R, vocab: &Vocabulary, name: &str, multiplier: f32) -> Result<BackoffLanguageModel> {
    let mut reader = LineReader::new(reader);
    reader.skip_until("\\data\\")?;
    let counts = read_counts(&mut reader)?;
    let mut builder = BackoffModelBuilder::new(name, &counts, multiplier)?;

    let mut ngram = Vec::with_capacity(counts.len());
    for (k, &count) in counts.iter().enumerate() {
        let order = k + 1;
        log_info!("reading {} {}-grams", count, order);
        reader.skip_until(&format!("\\{}-grams:", order))?;
        loop {
            let line = reader.next_line()?;
            let line = line.trim();
            if line.is_empty() || line == "\\end\\" {
                break;
            }
            let mut fields = line.split_whitespace();
            let prob = match fields.next() {
                Some(literal) => parse_log10(literal, reader.line)?,
                None => continue,
            };
            ngram.clear();
            ngram.extend(fields.by_ref().take(order).map(|word| vocab.intern(word)));
            if ngram.len() != order {
                return Err(IndexError::format(
                    reader.line,
                    format!("expected {} words in a {}-gram entry, found {}", order, order, ngram.len()),
                ));
            }
            let bow = fields.next().map(|literal| parse_log10(literal, reader.line)).transpose()?;
            builder.add(&ngram, prob, bow).inspect_err(|e| {
                log_error!("{}: line {}: {}", name, reader.line, e);
            })?;
        }
    }
    Ok(builder.build())
}

/// Open and read an ARPA file.
pub fn load_arpa(path: impl AsRef<Path>, vocab: &Vocabulary, multiplier: f32) -> Result<BackoffLanguageModel> {
    let path = path.as_ref();
    let started = Instant::now();
    let file = File::open(path)?;
    let name = format!("ARPA({})", path.display());
    let model = read_arpa(BufReader::new(file), vocab, &name, multiplier)?;
    log_info!(
        "loaded {} (order {}) in {:.3}s",
        path.display(),
        model.order(),
        started.elapsed().as_secs_f64()
    );
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{Cursor, Write};

    const MODEL: &str = "\
some preamble

\\data\\
ngram 1=4
ngram 2=2

\\1-grams:
-1.0\t<s>\t-0.5
-2.0\ta\t-0.25
-3.0\tb
-inf\t</s>

\\2-grams:
-0.5\t<s> a
-0.75\ta b

\\end\\
";

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-5
    }

    #[test]
    fn reads_counts_probabilities_and_back_offs() {
        let vocab = Vocabulary::new();
        let lm = read_arpa(Cursor::new(MODEL), &vocab, "mem", 1.7).unwrap();
        assert_eq!(lm.order(), 2);
        assert_eq!(lm.ngram_count(1), 4);
        assert_eq!(lm.ngram_count(2), 2);

        let a = vocab.id("a").unwrap();
        let b = vocab.id("b").unwrap();
        let ln10 = std::f64::consts::LN_10;
        assert!(close(lm.score(&[a, b]), -0.75 * ln10));
        // b has no back-off weight
        assert!(close(lm.score(&[b, a]), -2.0 * ln10));
        assert!(close(lm.score(&[a, a]), (-0.25 - 2.0) * ln10));
        assert_eq!(lm.score(&[crate::vocab::END]), f64::NEG_INFINITY);
        assert!(lm.relevant_prefix(&[a]));
        assert!(!lm.relevant_prefix(&[b]));
    }

    #[test]
    fn missing_data_section() {
        let err = read_arpa(Cursor::new("\\1-grams:\n-1.0 a\n"), &Vocabulary::new(), "x", 1.7).unwrap_err();
        assert!(matches!(err, IndexError::Format { .. }));
    }

    #[test]
    fn order_above_maximum() {
        let text = "\\data\\\nngram 11=1\n\n";
        let err = read_arpa(Cursor::new(text), &Vocabulary::new(), "x", 1.7).unwrap_err();
        assert!(matches!(err, IndexError::Format { line: 2, .. }));
    }

    #[test]
    fn bad_probability() {
        let text = "\\data\\\nngram 1=1\n\n\\1-grams:\nabc a\n\n\\end\\\n";
        let err = read_arpa(Cursor::new(text), &Vocabulary::new(), "x", 1.7).unwrap_err();
        match err {
            IndexError::InvalidNumericLiteral { line, literal } => {
                assert_eq!(line, 5);
                assert_eq!(literal, "abc");
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn truncated_section() {
        let text = "\\data\\\nngram 1=1\nngram 2=1\n\n\\1-grams:\n-1.0 a\n\n";
        let err = read_arpa(Cursor::new(text), &Vocabulary::new(), "x", 1.7).unwrap_err();
        assert!(matches!(err, IndexError::Format { .. }));
    }

    #[test]
    fn header_count_too_small() {
        let text = "\\data\\\nngram 1=1\n\n\\1-grams:\n-1.0 a\n-1.0 b\n-1.0 c\n\n\\end\\\n";
        let err = read_arpa(Cursor::new(text), &Vocabulary::new(), "x", 1.0).unwrap_err();
        assert!(matches!(err, IndexError::CapacityExhausted { .. }));
    }

    #[test]
    fn loads_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(MODEL.as_bytes()).unwrap();
        let vocab = Vocabulary::new();
        let lm = load_arpa(file.path(), &vocab, 1.7).unwrap();
        assert_eq!(lm.order(), 2);
        assert!(lm.name().starts_with("ARPA("));
    }
}
