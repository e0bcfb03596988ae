use checksums::RollingDigest;
use logging::trace_delta;
use signature::FileSignature;

use crate::index::DeltaSignatureIndex;
use crate::script::{DeltaScript, DeltaToken};

/// Rolling digest over `source[start..start + len]`, or `None` when the
/// window would run past the end.
#[derive(Clone, Copy, Debug)]
struct Window {
    len: usize,
    digest: Option<RollingDigest>,
}

impl Window {
    fn at(source: &[u8], start: usize, len: usize) -> Self {
        let digest = source
            .get(start..start + len)
            .map(RollingDigest::from_bytes);
        Self { len, digest }
    }

    /// Slides the window from `start` to `start + 1`.
    fn slide(self, source: &[u8], start: usize) -> Self {
        let digest = self.digest.and_then(|digest| {
            let incoming = *source.get(start + self.len)?;
            digest.rolled(source[start], incoming).ok()
        });
        Self {
            len: self.len,
            digest,
        }
    }

    fn find(&self, source: &[u8], start: usize, index: &DeltaSignatureIndex) -> Option<usize> {
        let digest = self.digest?;
        index.find_match(digest, &source[start..start + self.len])
    }
}

/// Produces delta scripts by comparing source content against a signature index.
#[derive(Clone, Debug, Default)]
pub struct DeltaGenerator {
    whole_file: bool,
}

impl DeltaGenerator {
    /// Creates a generator that searches for block matches.
    #[must_use]
    pub const fn new() -> Self {
        Self { whole_file: false }
    }

    /// Disables matching; every script is a single literal.
    #[must_use]
    pub const fn whole_file(mut self, whole_file: bool) -> Self {
        self.whole_file = whole_file;
        self
    }

    /// Encodes `source` against `index`.
    ///
    /// Without an index, or in whole-file mode, the result is one literal
    /// token covering the source (no tokens for an empty source).
    #[must_use]
    pub fn generate(&self, source: &[u8], index: Option<&DeltaSignatureIndex>) -> DeltaScript {
        let script = match index {
            Some(index) if !self.whole_file => scan(source, index),
            _ => whole_file_script(source),
        };
        trace_delta!(
            tokens = script.tokens().len(),
            literal = script.literal_bytes(),
            matched = script.matched_bytes(),
            "encoded delta"
        );
        script
    }
}

/// One literal token covering `source`, or an empty script for empty input.
#[must_use]
pub fn whole_file_script(source: &[u8]) -> DeltaScript {
    if source.is_empty() {
        return DeltaScript::default();
    }
    DeltaScript::from_tokens(vec![DeltaToken::Literal(source.to_vec())])
}

/// Convenience helper that encodes `source` against `signature`.
#[must_use]
pub fn generate_delta(source: &[u8], signature: &FileSignature) -> DeltaScript {
    let index = DeltaSignatureIndex::from_signature(signature);
    DeltaGenerator::new().generate(source, index.as_ref())
}

fn scan(source: &[u8], index: &DeltaSignatureIndex) -> DeltaScript {
    let block_len = index.block_length();
    let tail_len = index.tail_length();

    let mut tokens = Vec::new();
    let mut literal_start = 0usize;
    let mut pos = 0usize;
    let mut full = Window::at(source, pos, block_len);
    let mut tail = tail_len.map(|len| Window::at(source, pos, len));

    while pos < source.len() {
        let found = full
            .find(source, pos, index)
            .or_else(|| tail.as_ref().and_then(|t| t.find(source, pos, index)));

        if let Some(position) = found {
            if literal_start < pos {
                tokens.push(DeltaToken::Literal(source[literal_start..pos].to_vec()));
            }
            let block = index.block(position);
            tokens.push(DeltaToken::Match {
                index: block.index(),
                len: block.len(),
            });
            pos += block.len();
            literal_start = pos;
            full = Window::at(source, pos, block_len);
            tail = tail_len.map(|len| Window::at(source, pos, len));
            continue;
        }

        full = full.slide(source, pos);
        tail = tail.map(|t| t.slide(source, pos));
        pos += 1;
    }

    if literal_start < source.len() {
        tokens.push(DeltaToken::Literal(source[literal_start..].to_vec()));
    }

    DeltaScript::from_tokens(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::apply::apply_delta;
    use checksums::ChecksumChoice;
    use signature::{SignatureLayoutParams, calculate_signature_layout, signature_from_bytes};
    use std::num::NonZeroU32;

    fn signature_for(data: &[u8], forced: Option<u32>) -> FileSignature {
        let layout = calculate_signature_layout(SignatureLayoutParams::new(
            data.len() as u64,
            forced.and_then(NonZeroU32::new),
            ChecksumChoice::Md5,
        ))
        .expect("layout");
        signature_from_bytes(data, layout, ChecksumChoice::Md5).expect("signature")
    }

    fn patterned(len: usize) -> Vec<u8> {
        (0..len).map(|i| (i.wrapping_mul(31) % 251) as u8).collect()
    }

    #[test]
    fn literals_only_when_nothing_matches() {
        let basis = vec![0u8; 2048];
        let signature = signature_for(&basis, None);
        let script = generate_delta(b"new data", &signature);
        assert_eq!(script.tokens(), &[DeltaToken::Literal(b"new data".to_vec())]);
        assert_eq!(script.literal_bytes(), 8);
    }

    #[test]
    fn identical_single_block_is_one_match() {
        let basis = patterned(100);
        let signature = signature_for(&basis, None);
        let script = generate_delta(&basis, &signature);
        assert_eq!(script.tokens(), &[DeltaToken::Match { index: 0, len: 100 }]);
    }

    #[test]
    fn appended_byte_yields_match_then_literal() {
        let basis = patterned(100);
        let mut source = basis.clone();
        source.push(b'!');
        let signature = signature_for(&basis, None);
        let script = generate_delta(&source, &signature);
        assert_eq!(
            script.tokens(),
            &[
                DeltaToken::Match { index: 0, len: 100 },
                DeltaToken::Literal(vec![b'!'])
            ]
        );
        assert_eq!(script.matched_bytes(), 100);
        assert_eq!(script.literal_bytes(), 1);
    }

    #[test]
    fn reordered_and_repeated_blocks_reconstruct() {
        let basis = patterned(64);
        let signature = signature_for(&basis, Some(16));
        let mut source = Vec::new();
        source.extend_from_slice(&basis[48..64]);
        source.extend_from_slice(b"xyz");
        source.extend_from_slice(&basis[0..16]);
        source.extend_from_slice(&basis[0..16]);

        let script = generate_delta(&source, &signature);
        assert_eq!(
            script.tokens(),
            &[
                DeltaToken::Match { index: 3, len: 16 },
                DeltaToken::Literal(b"xyz".to_vec()),
                DeltaToken::Match { index: 0, len: 16 },
                DeltaToken::Match { index: 0, len: 16 },
            ]
        );
        let rebuilt = apply_delta(&basis, signature.layout(), &script).expect("apply");
        assert_eq!(rebuilt, source);
    }

    #[test]
    fn insertion_in_the_middle_keeps_surrounding_matches() {
        let basis = patterned(4096);
        let signature = signature_for(&basis, Some(512));
        let mut source = basis[..2048].to_vec();
        source.extend_from_slice(b"inserted bytes");
        source.extend_from_slice(&basis[2048..]);

        let script = generate_delta(&source, &signature);
        assert_eq!(script.literal_bytes(), 14);
        assert_eq!(script.matched_bytes(), 4096);
        assert_eq!(
            apply_delta(&basis, signature.layout(), &script).expect("apply"),
            source
        );
    }

    #[test]
    fn whole_file_mode_emits_one_literal() {
        let basis = patterned(1000);
        let signature = signature_for(&basis, None);
        let index = DeltaSignatureIndex::from_signature(&signature);
        let script = DeltaGenerator::new()
            .whole_file(true)
            .generate(&basis, index.as_ref());
        assert_eq!(script.tokens(), &[DeltaToken::Literal(basis.clone())]);
    }

    #[test]
    fn empty_source_has_no_tokens() {
        let signature = signature_for(&patterned(10), None);
        assert!(generate_delta(&[], &signature).is_empty());
        assert!(whole_file_script(&[]).is_empty());
    }

    #[test]
    fn empty_basis_sends_everything_literally() {
        let signature = signature_for(&[], None);
        let source = patterned(50);
        let script = generate_delta(&source, &signature);
        assert_eq!(script.tokens(), &[DeltaToken::Literal(source)]);
    }
}
