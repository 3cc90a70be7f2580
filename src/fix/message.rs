use std::collections::BTreeMap;

use super::tags::{self, MsgType};

/// A FIX message: tag -> value, iterated in ascending tag order.
///
/// Tags are unique; setting a tag twice keeps the last value.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Message {
    fields: BTreeMap<u32, String>,
}

impl Message {
    pub fn new() -> Self {
        Self { fields: BTreeMap::new() }
    }

    pub fn set(&mut self, tag: u32, value: impl Into<String>) {
        self.fields.insert(tag, value.into());
    }

    /// Builder form of [`Message::set`].
    pub fn with(mut self, tag: u32, value: impl Into<String>) -> Self {
        self.set(tag, value);
        self
    }

    pub fn get(&self, tag: u32) -> Option<&str> {
        self.fields.get(&tag).map(String::as_str)
    }

    pub fn contains(&self, tag: u32) -> bool {
        self.fields.contains_key(&tag)
    }

    /// MsgType (35), if present and known.
    pub fn msg_type(&self) -> Option<MsgType> {
        self.get(tags::MSG_TYPE).and_then(MsgType::parse)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (u32, &str)> {
        self.fields.iter().map(|(tag, value)| (*tag, value.as_str()))
    }
}

impl FromIterator<(u32, String)> for Message {
    fn from_iter<I: IntoIterator<Item = (u32, String)>>(iter: I) -> Self {
        Self { fields: iter.into_iter().collect() }
    }
}

/// Human-readable form with `|` in place of SOH.
impl std::fmt::Display for Message {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for (tag, value) in self.iter() {
            write!(f, "{}={}|", tag, value)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_last_write_wins() {
        let mut msg = Message::new();
        msg.set(55, "AAPL");
        msg.set(55, "MSFT");
        assert_eq!(msg.get(55), Some("MSFT"));
        assert_eq!(msg.len(), 1);
    }

    #[test]
    fn test_iterates_in_tag_order() {
        let msg = Message::new().with(55, "X").with(8, "FIX.4.4").with(35, "D");
        let tags: Vec<u32> = msg.iter().map(|(tag, _)| tag).collect();
        assert_eq!(tags, vec![8, 35, 55]);
        assert_eq!(msg.to_string(), "8=FIX.4.4|35=D|55=X|");
    }

    #[test]
    fn test_msg_type() {
        assert_eq!(Message::new().with(35, "A").msg_type(), Some(MsgType::Logon));
        assert_eq!(Message::new().with(35, "ZZ").msg_type(), None);
        assert_eq!(Message::new().msg_type(), None);
    }
}
