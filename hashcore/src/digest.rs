//! Common trait for incremental hashing

/// The Digest trait specifies an interface common to digest functions,
/// such as Hamsi and the Luffa family of digest functions.
pub trait Digest {
    /// Provide message data.
    ///
    /// # Arguments
    ///
    /// * input - A vector of message data
    fn input(&mut self, input: &[u8]);

    /// Retrieve the digest result. This method may be called multiple times.
    ///
    /// # Arguments
    ///
    /// * out - the vector to hold the result. Must be large enough to contain
    /// `output_bytes()`.
    fn result(&mut self, out: &mut [u8]);

    /// Reset the digest. This method must be called after result() and before
    /// supplying more data.
    fn reset(&mut self);

    /// Get the output size in bits.
    fn output_bits(&self) -> usize;

    /// Get the output size in bytes.
    fn output_bytes(&self) -> usize {
        (self.output_bits() + 7) / 8
    }

    /// Get the block size in bytes.
    fn block_size(&self) -> usize;

    /// Convenience function that feeds a string into a digest.
    ///
    /// # Arguments
    ///
    /// * `input` The string to feed into the digest
    fn input_str(&mut self, input: &str) {
        self.input(input.as_bytes());
    }

    /// Convenience function that retrieves the result of a digest as a
    /// string in hexadecimal format.
    fn result_str(&mut self) -> String {
        let mut buf = vec![0u8; self.output_bytes()];
        self.result(&mut buf);
        to_hex(&buf)
    }
}

fn to_hex(bytes: &[u8]) -> String {
    const ALPHABET: &[u8] = b"0123456789abcdef";
    let mut s = String::with_capacity(bytes.len() * 2);
    for b in bytes {
        s.push(ALPHABET[(b >> 4) as usize] as char);
        s.push(ALPHABET[(b & 0xf) as usize] as char);
    }
    s
}
