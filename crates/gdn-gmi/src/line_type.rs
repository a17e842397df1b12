use std::fmt;

/// Classification of a single gemtext line.
///
/// Discriminants are stable so raw values coming from elsewhere can be
/// mapped back with [`LineType::from_raw`]. Anything outside the known set
/// becomes [`LineType::Unknown`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum LineType {
    #[default]
    Unknown = 0,
    Head1 = 1,
    Head2 = 2,
    Head3 = 3,
    Text = 4,
    Link = 5,
    PreStart = 6,
    PreBody = 7,
    PreEnd = 8,
    List = 9,
    Quote = 10,
}

impl LineType {
    /// All known line types in discriminant order.
    pub const ALL: [LineType; 11] = [
        LineType::Unknown,
        LineType::Head1,
        LineType::Head2,
        LineType::Head3,
        LineType::Text,
        LineType::Link,
        LineType::PreStart,
        LineType::PreBody,
        LineType::PreEnd,
        LineType::List,
        LineType::Quote,
    ];

    /// Map a raw tag value back to a line type. Never fails.
    pub fn from_raw(raw: i64) -> Self {
        usize::try_from(raw)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
            .unwrap_or(LineType::Unknown)
    }

    /// Canonical display name.
    pub fn name(self) -> &'static str {
        match self {
            LineType::Unknown => "Unknown",
            LineType::Head1 => "Head1",
            LineType::Head2 => "Head2",
            LineType::Head3 => "Head3",
            LineType::Text => "Text",
            LineType::Link => "Link",
            LineType::PreStart => "PreStart",
            LineType::PreBody => "PreBody",
            LineType::PreEnd => "PreEnd",
            LineType::List => "List",
            LineType::Quote => "Quote",
        }
    }

    /// True for the three lines that make up a preformatted block.
    pub fn is_preformatted(self) -> bool {
        matches!(
            self,
            LineType::PreStart | LineType::PreBody | LineType::PreEnd
        )
    }
}

impl From<i64> for LineType {
    fn from(raw: i64) -> Self {
        Self::from_raw(raw)
    }
}

impl fmt::Display for LineType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
