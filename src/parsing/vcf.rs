//! Reader for VCF variant records.
//!
//! The header is parsed for `##contig` and `##FILTER` definitions and the sample
//! names of the `#CHROM` line. Each data line is turned into a [`Variant`] for a
//! single selected sample:
//!
//! | Column | Use |
//! |--------|-----|
//! | CHROM  | Chromosome name |
//! | POS    | 1-based position, stored 0-based |
//! | ID     | Kept for output |
//! | REF/ALT | Alleles, upper-cased |
//! | QUAL   | `.` means no quality |
//! | FILTER | `.` or `PASS` count as passing |
//! | FORMAT + sample | Only `GT` is read |
//!
//! Records that cannot be interpreted are logged, counted and skipped.

use std::io::BufRead;
use std::path::Path;

use tracing::{debug, warn};

use crate::core::variant::{Genotype, Variant};
use crate::parsing::{open_text, ParseError};
use crate::utils::validation::{check_contig_limit, is_valid_bases};

/// Number of fixed columns before the first sample
const FIXED_COLUMNS: usize = 9;

/// A `##contig` header definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderContig {
    pub name: String,
    pub length: Option<u64>,
}

/// Header lines relevant to comparison and output
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VcfHeader {
    pub contigs: Vec<HeaderContig>,
    /// Raw `##FILTER=<...>` lines
    pub filters: Vec<String>,
    pub samples: Vec<String>,
}

impl VcfHeader {
    /// Parse header text up to and including the `#CHROM` line
    ///
    /// # Errors
    ///
    /// Returns `ParseError::InvalidFormat` if the `#CHROM` line is missing or
    /// malformed, or `ParseError::TooManyContigs` if the limit is exceeded.
    pub fn parse(text: &str) -> Result<Self, ParseError> {
        let mut header = Self::default();
        let mut complete = false;

        for line in text.lines() {
            if line.starts_with("##contig=") {
                if let Some(contig) = parse_contig_line(line)? {
                    if check_contig_limit(header.contigs.len()).is_some() {
                        return Err(ParseError::TooManyContigs(header.contigs.len()));
                    }
                    header.contigs.push(contig);
                }
            } else if line.starts_with("##FILTER=") {
                header.filters.push(line.to_string());
            } else if line.starts_with("#CHROM") {
                header.samples = parse_column_line(line)?;
                complete = true;
                break;
            }
        }

        if !complete {
            return Err(ParseError::InvalidFormat(
                "No #CHROM line found in VCF header".to_string(),
            ));
        }
        Ok(header)
    }

    /// Column index of the named sample, or of the first sample
    ///
    /// # Errors
    ///
    /// Returns `ParseError::UnknownSample` if the name is absent, or
    /// `ParseError::InvalidFormat` if the file has no samples at all.
    pub fn sample_index(&self, sample: Option<&str>) -> Result<usize, ParseError> {
        match sample {
            Some(name) => self
                .samples
                .iter()
                .position(|s| s == name)
                .ok_or_else(|| ParseError::UnknownSample(name.to_string())),
            None if self.samples.is_empty() => Err(ParseError::InvalidFormat(
                "VCF has no sample columns".to_string(),
            )),
            None => Ok(0),
        }
    }
}

fn parse_column_line(line: &str) -> Result<Vec<String>, ParseError> {
    let columns: Vec<&str> = line.split('\t').collect();
    if columns.len() < FIXED_COLUMNS - 1 {
        return Err(ParseError::InvalidFormat(format!(
            "Header line has {} columns, expected at least 8",
            columns.len()
        )));
    }
    Ok(columns
        .iter()
        .skip(FIXED_COLUMNS)
        .map(|s| (*s).to_string())
        .collect())
}

/// Parse a single ##contig=<...> line
fn parse_contig_line(line: &str) -> Result<Option<HeaderContig>, ParseError> {
    // Format: ##contig=<ID=chr1,length=248956422,...>
    let content = line
        .strip_prefix("##contig=<")
        .and_then(|s| s.strip_suffix('>'))
        .ok_or_else(|| ParseError::InvalidFormat(format!("Invalid contig line: {line}")))?;

    let mut name = None;
    let mut length = None;

    for part in split_contig_fields(content) {
        if let Some((key, value)) = part.split_once('=') {
            let value = value.trim_matches('"');
            match key.trim() {
                "ID" => name = Some(value.to_string()),
                "length" => {
                    length = Some(value.parse().map_err(|_| {
                        ParseError::InvalidFormat(format!("Invalid contig length: {value}"))
                    })?);
                }
                _ => {}
            }
        }
    }

    // Skip malformed lines without ID
    Ok(name.map(|name| HeaderContig { name, length }))
}

/// Split contig fields, handling commas inside quoted values.
fn split_contig_fields(content: &str) -> Vec<&str> {
    let mut fields = Vec::new();
    let mut start = 0;
    let mut in_quotes = false;

    for (i, c) in content.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => {
                fields.push(&content[start..i]);
                // Safe: comma is 1 byte, so i + 1 is a valid char boundary
                start = i + 1;
            }
            _ => {}
        }
    }

    if start <= content.len() {
        fields.push(&content[start..]);
    }

    fields
}

/// How records are turned into variants
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReadOptions {
    /// Sample to read; the first sample when `None`
    pub sample: Option<String>,
    /// Trim alleles against REF on both sides
    pub ref_overlap: bool,
}

impl Default for ReadOptions {
    fn default() -> Self {
        Self {
            sample: None,
            ref_overlap: true,
        }
    }
}

/// Streaming reader yielding one [`Variant`] per usable data line
pub struct VcfReader<R> {
    inner: R,
    header: VcfHeader,
    sample_column: usize,
    ref_overlap: bool,
    line_number: usize,
    next_id: usize,
    skipped: usize,
    buffer: String,
}

impl<R: BufRead> VcfReader<R> {
    /// Read the header and position the reader on the first record
    ///
    /// # Errors
    ///
    /// Returns an error if the header cannot be read or the sample is unknown.
    pub fn new(mut inner: R, options: &ReadOptions) -> Result<Self, ParseError> {
        let mut text = String::new();
        let mut line_number = 0;
        loop {
            let mut line = String::new();
            if inner.read_line(&mut line)? == 0 {
                break;
            }
            line_number += 1;
            let is_column_line = line.starts_with("#CHROM");
            text.push_str(line.trim_end_matches(['\n', '\r']));
            text.push('\n');
            if is_column_line || !line.starts_with('#') {
                break;
            }
        }

        let header = VcfHeader::parse(&text)?;
        let sample_column = FIXED_COLUMNS + header.sample_index(options.sample.as_deref())?;

        Ok(Self {
            inner,
            header,
            sample_column,
            ref_overlap: options.ref_overlap,
            line_number,
            next_id: 0,
            skipped: 0,
            buffer: String::new(),
        })
    }

    #[must_use]
    pub fn header(&self) -> &VcfHeader {
        &self.header
    }

    /// Name of the sample being read
    #[must_use]
    pub fn sample(&self) -> &str {
        &self.header.samples[self.sample_column - FIXED_COLUMNS]
    }

    /// Records skipped as malformed so far
    #[must_use]
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    fn parse_line(&self, line: &str) -> Result<Variant, ParseError> {
        let malformed = |reason: String| ParseError::MalformedRecord {
            line: self.line_number,
            reason,
        };

        let fields: Vec<&str> = line.split('\t').collect();
        if fields.len() <= self.sample_column {
            return Err(malformed(format!(
                "expected at least {} columns, found {}",
                self.sample_column + 1,
                fields.len()
            )));
        }

        let chrom = fields[0];
        let position: u64 = fields[1]
            .parse()
            .ok()
            .filter(|&p| p > 0)
            .ok_or_else(|| malformed(format!("invalid position '{}'", fields[1])))?;

        let ref_seq = fields[3];
        if !is_valid_bases(ref_seq) {
            return Err(malformed(format!("invalid reference allele '{ref_seq}'")));
        }
        let alts: Vec<String> = match fields[4] {
            "." => Vec::new(),
            alt => alt.split(',').map(str::to_string).collect(),
        };

        let quality = match fields[5] {
            "." => None,
            qual => Some(
                qual.parse::<f32>()
                    .map_err(|_| malformed(format!("invalid quality '{qual}'")))?,
            ),
        };
        let filters: Vec<String> = match fields[6] {
            "." | "" => Vec::new(),
            filter => filter.split(';').map(str::to_string).collect(),
        };

        let gt_index = fields[8]
            .split(':')
            .position(|key| key == "GT")
            .ok_or_else(|| malformed("FORMAT has no GT field".to_string()))?;
        let gt_text = fields[self.sample_column]
            .split(':')
            .nth(gt_index)
            .unwrap_or(".");
        let genotype = Genotype::parse(gt_text).map_err(|e| malformed(e.to_string()))?;

        let variant = Variant::new(
            self.next_id,
            chrom,
            position - 1,
            ref_seq,
            alts,
            genotype,
            self.ref_overlap,
        )
        .map_err(|e| malformed(e.to_string()))?;

        Ok(variant
            .with_record_id(fields[2])
            .with_quality(quality)
            .with_filters(filters))
    }
}

impl<R: BufRead> Iterator for VcfReader<R> {
    type Item = Result<Variant, ParseError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            self.buffer.clear();
            match self.inner.read_line(&mut self.buffer) {
                Ok(0) => return None,
                Ok(_) => self.line_number += 1,
                Err(e) => return Some(Err(e.into())),
            }

            let line = self.buffer.trim_end_matches(['\n', '\r']);
            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            match self.parse_line(line) {
                Ok(variant) => {
                    self.next_id += 1;
                    return Some(Ok(variant));
                }
                Err(ParseError::MalformedRecord { line, reason }) => {
                    warn!(line, %reason, "Skipping malformed VCF record");
                    self.skipped += 1;
                }
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

/// Everything read from one VCF for one sample
#[derive(Debug, Clone)]
pub struct VcfInput {
    pub header: VcfHeader,
    pub sample: String,
    pub variants: Vec<Variant>,
    pub skipped: usize,
}

/// Read a whole VCF (plain or gzip) for the configured sample
///
/// # Errors
///
/// Returns `ParseError::Io` on read failure, `ParseError::UnknownSample` if the
/// sample is absent, or `ParseError::InvalidFormat` for a broken header.
pub fn read_vcf(path: &Path, options: &ReadOptions) -> Result<VcfInput, ParseError> {
    let reader = VcfReader::new(open_text(path)?, options)?;
    let input = collect(reader)?;
    debug!(
        path = %path.display(),
        sample = %input.sample,
        variants = input.variants.len(),
        skipped = input.skipped,
        "Read VCF"
    );
    Ok(input)
}

/// Drain a reader into a [`VcfInput`]
///
/// # Errors
///
/// Returns the first I/O error met while reading records.
pub fn collect<R: BufRead>(mut reader: VcfReader<R>) -> Result<VcfInput, ParseError> {
    let variants = reader.by_ref().collect::<Result<Vec<_>, _>>()?;
    Ok(VcfInput {
        sample: reader.sample().to_string(),
        skipped: reader.skipped(),
        header: reader.header,
        variants,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const VCF: &str = "##fileformat=VCFv4.2
##contig=<ID=chr1,length=1000>
##contig=<ID=chr2,length=500,assembly=\"GRCh38,p14\">
##FILTER=<ID=LowQual,Description=\"Low quality\">
#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO\tFORMAT\tNA1\tNA2
chr1\t100\trs1\tA\tG\t50\tPASS\t.\tGT:DP\t0/1:10\t1|1:12
chr1\t200\t.\tACG\tA\t.\tLowQual\t.\tGT\t1/1\t0/0
chr1\tabc\t.\tA\tG\t.\t.\t.\tGT\t0/1\t0/1
chr1\t300\t.\tA\tG,T\t.\t.\t.\tGT\t1/3\t0/1
chr2\t10\t.\tC\tT\t.\t.\t.\tGT:DP\t.:5\t1
";

    fn reader(sample: Option<&str>) -> VcfReader<&'static [u8]> {
        let options = ReadOptions {
            sample: sample.map(str::to_string),
            ..ReadOptions::default()
        };
        VcfReader::new(VCF.as_bytes(), &options).unwrap()
    }

    #[test]
    fn test_parse_header() {
        let reader = reader(None);
        let header = reader.header();
        assert_eq!(header.contigs.len(), 2);
        assert_eq!(header.contigs[0].name, "chr1");
        assert_eq!(header.contigs[0].length, Some(1000));
        assert_eq!(header.contigs[1].name, "chr2");
        assert_eq!(header.filters.len(), 1);
        assert_eq!(header.samples, vec!["NA1", "NA2"]);
        assert_eq!(reader.sample(), "NA1");
    }

    #[test]
    fn test_read_records_skips_malformed() {
        let input = collect(reader(None)).unwrap();

        // Bad POS and out-of-range GT index are skipped
        assert_eq!(input.skipped, 2);
        assert_eq!(input.variants.len(), 3);

        let snp = &input.variants[0];
        assert_eq!(snp.position, 99);
        assert_eq!(snp.record_id, "rs1");
        assert_eq!(snp.quality, Some(50.0));
        assert!(snp.is_heterozygous());

        let deletion = &input.variants[1];
        assert_eq!(deletion.filters, vec!["LowQual"]);
        assert_eq!((deletion.start, deletion.end), (200, 202));
        assert!(!deletion.passes_filter("PASS"));

        let no_call = &input.variants[2];
        assert!(no_call.is_no_call());
        assert_eq!(no_call.id, 2);
    }

    #[test]
    fn test_second_sample() {
        let input = collect(reader(Some("NA2"))).unwrap();
        assert_eq!(input.sample, "NA2");
        assert!(input.variants[0].genotype.phased);
        assert!(input.variants[1].is_hom_ref());
        // Haploid call
        assert_eq!(input.variants.last().unwrap().genotype.ploidy(), 1);
    }

    #[test]
    fn test_unknown_sample() {
        let options = ReadOptions {
            sample: Some("NA3".to_string()),
            ..ReadOptions::default()
        };
        assert!(matches!(
            VcfReader::new(VCF.as_bytes(), &options),
            Err(ParseError::UnknownSample(name)) if name == "NA3"
        ));
    }

    #[test]
    fn test_missing_column_line() {
        let result = VcfHeader::parse("##fileformat=VCFv4.2\n");
        assert!(matches!(result, Err(ParseError::InvalidFormat(_))));
    }

    #[test]
    fn test_parse_contig_line_quoted() {
        let contig = parse_contig_line("##contig=<ID=chr1,length=10,assembly=\"a,b\">")
            .unwrap()
            .unwrap();
        assert_eq!(contig.name, "chr1");
        assert_eq!(contig.length, Some(10));
        assert!(parse_contig_line("##contig=<length=10>").unwrap().is_none());
    }
}
