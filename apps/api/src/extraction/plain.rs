/// Decodes bytes as UTF-8, silently dropping invalid sequences instead of
/// substituting U+FFFD.
pub fn decode_lossy(bytes: &[u8]) -> String {
    let mut out = String::with_capacity(bytes.len());
    for chunk in bytes.utf8_chunks() {
        out.push_str(chunk.valid());
    }
    out
}
