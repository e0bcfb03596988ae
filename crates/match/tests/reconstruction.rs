//! Reconstruction and byte-accounting properties of the delta engine.

use std::io::{Seek, SeekFrom, Write};
use std::num::NonZeroU32;

use checksums::ChecksumChoice;
use matching::{DeltaToken, apply_delta, apply_delta_to_writer, generate_delta};
use proptest::prelude::*;
use signature::{
    FileSignature, SignatureLayoutParams, calculate_signature_layout, signature_from_bytes,
};

fn signature_for(data: &[u8], block: u32, checksum: ChecksumChoice) -> FileSignature {
    let layout = calculate_signature_layout(SignatureLayoutParams::new(
        data.len() as u64,
        NonZeroU32::new(block),
        checksum,
    ))
    .expect("layout");
    signature_from_bytes(data, layout, checksum).expect("signature")
}

/// Source built by editing the basis, so matches are likely.
fn edited_pair() -> impl Strategy<Value = (Vec<u8>, Vec<u8>)> {
    (
        proptest::collection::vec(any::<u8>(), 0..2048),
        proptest::collection::vec((any::<prop::sample::Index>(), 0u8..3, any::<u8>()), 0..8),
    )
        .prop_map(|(basis, edits)| {
            let mut source = basis.clone();
            for (at, op, byte) in edits {
                if source.is_empty() {
                    source.push(byte);
                    continue;
                }
                let i = at.index(source.len());
                match op {
                    0 => source.insert(i, byte),
                    1 => {
                        source.remove(i);
                    }
                    _ => source[i] = byte,
                }
            }
            (basis, source)
        })
}

proptest! {
    #[test]
    fn reconstruction_is_exact((basis, source) in edited_pair(), block in 1u32..300) {
        let signature = signature_for(&basis, block, ChecksumChoice::Md4);
        let script = generate_delta(&source, &signature);
        let rebuilt = apply_delta(&basis, signature.layout(), &script).expect("apply");
        prop_assert_eq!(&rebuilt, &source);
    }

    #[test]
    fn byte_accounting_holds((basis, source) in edited_pair(), block in 1u32..300) {
        let signature = signature_for(&basis, block, ChecksumChoice::Xxh3);
        let script = generate_delta(&source, &signature);
        prop_assert_eq!(script.literal_bytes() + script.matched_bytes(), source.len() as u64);
        prop_assert_eq!(script.total_bytes(), source.len() as u64);

        let mut previous_literal = false;
        for token in script.tokens() {
            let literal = token.is_literal();
            prop_assert!(!(literal && previous_literal), "adjacent literals must coalesce");
            prop_assert!(token.byte_len() > 0);
            previous_literal = literal;
        }
    }

    #[test]
    fn unrelated_content_reconstructs(
        basis in proptest::collection::vec(any::<u8>(), 0..1024),
        source in proptest::collection::vec(any::<u8>(), 0..1024),
    ) {
        let signature = signature_for(&basis, 64, ChecksumChoice::Md5);
        let script = generate_delta(&source, &signature);
        prop_assert_eq!(apply_delta(&basis, signature.layout(), &script).expect("apply"), source);
    }
}

#[test]
fn streaming_apply_from_a_file_matches_in_memory_apply() {
    let basis: Vec<u8> = (0..50_000u32).map(|i| (i % 253) as u8).collect();
    let mut source = basis[10_000..].to_vec();
    source.extend_from_slice(&basis[..10_000]);
    let tail = source.split_off(25_000);
    source.extend_from_slice(b"spliced");
    source.extend_from_slice(&tail);

    let signature = signature_for(&basis, 1000, ChecksumChoice::Sha256);
    let script = generate_delta(&source, &signature);
    assert!(script.matched_bytes() > 40_000);

    let mut file = tempfile::tempfile().expect("tempfile");
    file.write_all(&basis).expect("write basis");
    file.seek(SeekFrom::Start(0)).expect("rewind");

    let mut streamed = Vec::new();
    apply_delta_to_writer(&mut file, &mut streamed, signature.layout(), &script).expect("stream");
    assert_eq!(streamed, source);
}

#[test]
fn single_block_scenarios() {
    let basis = vec![42u8; 100];
    let signature = signature_for(&basis, 0, ChecksumChoice::Xxh128);
    assert_eq!(signature.blocks().len(), 1);

    let same = generate_delta(&basis, &signature);
    assert_eq!(same.tokens(), &[DeltaToken::Match { index: 0, len: 100 }]);

    let mut appended = basis.clone();
    appended.push(7);
    let script = generate_delta(&appended, &signature);
    assert_eq!(
        script.tokens(),
        &[
            DeltaToken::Match { index: 0, len: 100 },
            DeltaToken::Literal(vec![7])
        ]
    );
}
