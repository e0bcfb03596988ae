/// One instruction in a delta.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DeltaToken {
    /// Literal byte payload sent verbatim.
    Literal(Vec<u8>),
    /// Reference to a block of the pre-transfer destination content.
    Match {
        /// Zero-based index of the signature block being reused.
        index: u64,
        /// Number of bytes copied from the referenced block.
        len: usize,
    },
}

impl DeltaToken {
    /// Returns the number of bytes contributed by this token.
    #[must_use]
    pub fn byte_len(&self) -> usize {
        match self {
            Self::Literal(bytes) => bytes.len(),
            Self::Match { len, .. } => *len,
        }
    }

    /// Returns `true` when the token is a literal payload.
    #[must_use]
    pub const fn is_literal(&self) -> bool {
        matches!(self, Self::Literal(_))
    }
}

/// Ordered collection of [`DeltaToken`] values that reconstruct a source file.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct DeltaScript {
    tokens: Vec<DeltaToken>,
    total_bytes: u64,
    literal_bytes: u64,
}

impl DeltaScript {
    /// Creates a script from a token stream, deriving the byte totals.
    #[must_use]
    pub fn from_tokens(tokens: Vec<DeltaToken>) -> Self {
        let mut total_bytes = 0u64;
        let mut literal_bytes = 0u64;
        for token in &tokens {
            let len = token.byte_len() as u64;
            total_bytes += len;
            if token.is_literal() {
                literal_bytes += len;
            }
        }
        Self {
            tokens,
            total_bytes,
            literal_bytes,
        }
    }

    /// Returns the underlying token stream.
    #[must_use]
    pub fn tokens(&self) -> &[DeltaToken] {
        &self.tokens
    }

    /// Consumes the script and returns its token list.
    #[must_use]
    pub fn into_tokens(self) -> Vec<DeltaToken> {
        self.tokens
    }

    /// Returns the total number of bytes described by the script.
    #[must_use]
    pub const fn total_bytes(&self) -> u64 {
        self.total_bytes
    }

    /// Returns the number of bytes emitted as literals.
    #[must_use]
    pub const fn literal_bytes(&self) -> u64 {
        self.literal_bytes
    }

    /// Returns the number of bytes copied from destination blocks.
    #[must_use]
    pub const fn matched_bytes(&self) -> u64 {
        self.total_bytes - self.literal_bytes
    }

    /// Number of literal tokens.
    #[must_use]
    pub fn literal_token_count(&self) -> usize {
        self.tokens.iter().filter(|token| token.is_literal()).count()
    }

    /// Number of match tokens.
    #[must_use]
    pub fn match_token_count(&self) -> usize {
        self.tokens.len() - self.literal_token_count()
    }

    /// Returns `true` when the script does not contain any tokens.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}
