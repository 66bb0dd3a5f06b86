use rand::Rng;

/// Number of hex digits after the prefix.
pub const SERIAL_HEX_DIGITS: usize = 8;

/// Formats `PREFIX-XXXXXXXX`.
///
/// A uniform `u32` printed as eight zero-padded hex digits gives each digit
/// an independent uniform draw over `0-9A-F`.
#[must_use]
pub fn random_serial<R: Rng + ?Sized>(prefix: &str, rng: &mut R) -> String {
    let body: u32 = rng.r#gen();
    format!("{}-{:08X}", prefix, body)
}
