//! Invitation links.
//!
//! A link carries a 64-bit conversation id as eleven characters of URL-safe
//! base64 (`-` and `_` instead of `+` and `/`, no padding). Ten characters
//! hold six bits each and the last one holds the remaining four:
//!
//! ```text
//! https://gemelo.org/j/yv7K_sr-yvO   ->   0xcafecafecafecafe
//! ```

const BITS_PER_CHAR: u32 = 6;
const BITS_PER_ID: u32 = u64::BITS;
const FULL_CHARS: u32 = BITS_PER_ID / BITS_PER_CHAR;
const LAST_CHAR_BITS: u32 = BITS_PER_ID % BITS_PER_CHAR;

const REST_URL: &str = "://gemelo.org/j/";
const URL_PREFIX: &str = "https://gemelo.org/j/";

/// Length of an encoded link.
pub const ENCODED_LEN: usize = URL_PREFIX.len() + 11;

pub fn encode_invite_url(id: u64) -> String {
    let mut url = String::with_capacity(ENCODED_LEN);
    url.push_str(URL_PREFIX);

    let mut rest = id;
    for _ in 0..FULL_CHARS {
        url.push(encode_char((rest >> (BITS_PER_ID - BITS_PER_CHAR)) as u8));
        rest <<= BITS_PER_CHAR;
    }
    if LAST_CHAR_BITS > 0 {
        url.push(encode_char((rest >> (BITS_PER_ID - LAST_CHAR_BITS)) as u8));
    }
    url
}

/// Extracts the conversation id. Scheme and host match case-insensitively
/// and either `http` or `https` is accepted.
pub fn decode_invite_url(url: &str) -> Option<u64> {
    let rest = strip_prefix_no_case(url, "http")?;
    let rest = strip_prefix_no_case(rest, "s").unwrap_or(rest);
    let id_part = strip_prefix_no_case(rest, REST_URL)?;
    decode_id_part(id_part)
}

pub fn decode_id_part(part: &str) -> Option<u64> {
    let bytes = part.as_bytes();
    let expected = (FULL_CHARS + u32::from(LAST_CHAR_BITS > 0)) as usize;
    if bytes.len() != expected {
        return None;
    }

    let mut id = 0u64;
    for &ch in &bytes[..FULL_CHARS as usize] {
        id = (id << BITS_PER_CHAR) | u64::from(char_value(ch)?);
    }
    if LAST_CHAR_BITS > 0 {
        let value = char_value(bytes[FULL_CHARS as usize])?;
        if u32::from(value) >= 1 << LAST_CHAR_BITS {
            return None;
        }
        id = (id << LAST_CHAR_BITS) | u64::from(value);
    }
    Some(id)
}

fn strip_prefix_no_case<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        Some(&text[prefix.len()..])
    } else {
        None
    }
}

fn char_value(ch: u8) -> Option<u8> {
    match ch {
        b'A'..=b'Z' => Some(ch - b'A'),
        b'a'..=b'z' => Some(ch - b'a' + 26),
        b'0'..=b'9' => Some(ch - b'0' + 52),
        b'-' => Some(62),
        b'_' => Some(63),
        _ => None,
    }
}

fn encode_char(value: u8) -> char {
    let byte = match value {
        0..=25 => b'A' + value,
        26..=51 => b'a' + value - 26,
        52..=61 => b'0' + value - 52,
        62 => b'-',
        _ => b'_',
    };
    byte as char
}
