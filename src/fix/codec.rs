//! Wire codec for `tag=value<SOH>` frames.
//!
//! There is no length prefix, checksum or escaping. A value containing SOH
//! or `=` cannot be represented and will corrupt the frame.

use super::Message;

/// Field delimiter
pub const SOH: u8 = 0x01;

const SEPARATOR: u8 = b'=';

/// Decode a frame into a message.
///
/// Malformed fields (no `=`, empty or non-numeric tag, tag overflowing
/// `u32`) are skipped; the rest of the frame still decodes.
pub fn decode(bytes: &[u8]) -> Message {
    let mut msg = Message::new();

    for field in bytes.split(|b| *b == SOH) {
        if field.is_empty() {
            continue;
        }
        let Some(eq) = field.iter().position(|b| *b == SEPARATOR) else {
            continue;
        };
        let Some(tag) = parse_tag(&field[..eq]) else {
            continue;
        };
        msg.set(tag, String::from_utf8_lossy(&field[eq + 1..]));
    }

    msg
}

/// Encode a message as `tag=value<SOH>` fields in ascending tag order.
pub fn encode(msg: &Message) -> Vec<u8> {
    let mut out = Vec::with_capacity(msg.len() * 16);
    for (tag, value) in msg.iter() {
        out.extend_from_slice(tag.to_string().as_bytes());
        out.push(SEPARATOR);
        out.extend_from_slice(value.as_bytes());
        out.push(SOH);
    }
    out
}

fn parse_tag(raw: &[u8]) -> Option<u32> {
    if raw.is_empty() || !raw.iter().all(u8::is_ascii_digit) {
        return None;
    }
    std::str::from_utf8(raw).ok()?.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn frame(fields: &[&str]) -> Vec<u8> {
        let mut out = Vec::new();
        for field in fields {
            out.extend_from_slice(field.as_bytes());
            out.push(SOH);
        }
        out
    }

    #[test]
    fn test_empty_input() {
        assert!(decode(b"").is_empty());
        assert!(encode(&Message::new()).is_empty());
    }

    #[test]
    fn test_decode_new_order() {
        let msg = decode(&frame(&["8=FIX.4.4", "35=D", "55=AAPL", "54=1", "38=100", "44=150.0"]));
        assert_eq!(msg.len(), 6);
        assert_eq!(msg.get(35), Some("D"));
        assert_eq!(msg.get(44), Some("150.0"));
    }

    #[test]
    fn test_encode_ascending() {
        let msg = Message::new().with(108, "30").with(35, "A").with(98, "0");
        assert_eq!(encode(&msg), b"35=A\x0198=0\x01108=30\x01".to_vec());
    }

    #[test]
    fn test_skips_malformed_fields() {
        let msg = decode(&frame(&[
            "35=D",
            "garbage",
            "abc=1",
            "=nothing",
            "12x=3",
            "-5=neg",
            "99999999999=Value",
            "55=AAPL",
        ]));
        assert_eq!(msg.len(), 2);
        assert_eq!(msg.get(35), Some("D"));
        assert_eq!(msg.get(55), Some("AAPL"));
    }

    #[test]
    fn test_value_split_at_first_separator() {
        let msg = decode(&frame(&["58=a=b"]));
        assert_eq!(msg.get(58), Some("a=b"));
    }

    #[test]
    fn test_empty_value_kept() {
        let msg = decode(&frame(&["35=D", "55="]));
        assert_eq!(msg.get(55), Some(""));
    }

    #[test]
    fn test_missing_trailing_delimiter() {
        let msg = decode(b"35=0\x01112=abc");
        assert_eq!(msg.get(112), Some("abc"));
    }

    #[test]
    fn test_duplicate_tag_last_wins() {
        let msg = decode(&frame(&["55=A", "55=B"]));
        assert_eq!(msg.get(55), Some("B"));
    }

    fn value_strategy() -> impl Strategy<Value = String> {
        "[A-Za-z0-9 .:_/-]{1,16}"
    }

    proptest! {
        #[test]
        fn prop_round_trip(fields in prop::collection::btree_map(0u32..100_000, value_strategy(), 0..24)) {
            let msg: Message = fields.clone().into_iter().collect();
            let decoded = decode(&encode(&msg));
            prop_assert_eq!(decoded, msg);
        }

        #[test]
        fn prop_malformed_field_does_not_abort(
            fields in prop::collection::btree_map(1u32..1000, value_strategy(), 1..12),
            junk in "[A-Za-z]{1,8}",
            position in 0usize..12,
        ) {
            let msg: Message = fields.clone().into_iter().collect();
            let mut raw: Vec<Vec<u8>> = msg
                .iter()
                .map(|(tag, value)| format!("{}={}", tag, value).into_bytes())
                .collect();
            let at = position.min(raw.len());
            raw.insert(at, junk.into_bytes());

            let mut bytes = Vec::new();
            for field in raw {
                bytes.extend_from_slice(&field);
                bytes.push(SOH);
            }
            prop_assert_eq!(decode(&bytes), msg);
        }
    }
}
