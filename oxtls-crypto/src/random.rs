//! Random number generator interface.

use crate::Result;

/// Random number generator trait.
///
/// Supplies the hello randoms, session IDs, premaster secrets, CBC
/// padding-free IVs and DH exponents. Implementations must be seeded from
/// a real entropy source; the engine treats the output as unpredictable.
pub trait Random: Send + Sync {
    /// Fill a buffer with random bytes.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying generator fails.
    fn fill(&self, dest: &mut [u8]) -> Result<()>;

    /// Generate a random byte vector of specified length.
    fn generate(&self, len: usize) -> Result<Vec<u8>> {
        let mut buf = vec![0u8; len];
        self.fill(&mut buf)?;
        Ok(buf)
    }
}
