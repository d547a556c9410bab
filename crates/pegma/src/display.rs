/// Escaping loop taken from the [u8]::utf8_chunks documentation example
pub fn display_byte_literal(
    buf: &mut dyn std::fmt::Write,
    delimiter: &str,
    bytes: &[u8],
) -> std::fmt::Result {
    buf.write_str(delimiter)?;
    for chunk in bytes.utf8_chunks() {
        for ch in chunk.valid().chars() {
            // Escapes \0, \t, \r, \n, \\, \', \", and uses \u{...} for non-printable characters.
            write!(buf, "{}", ch.escape_debug())?;
        }
        for byte in chunk.invalid() {
            write!(buf, "\\x{:02X}", byte)?;
        }
    }
    buf.write_str(delimiter)
}

#[test]
fn test_byte_literal() {
    let mut buf = String::new();
    display_byte_literal(&mut buf, "\"", b"a\n\"\xFF").unwrap();
    assert_eq!(buf, r#""a\n\"\xFF""#);
}
