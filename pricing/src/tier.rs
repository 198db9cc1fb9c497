use std::fmt;

/// Creator / membership tier.
///
/// The data layer stores tiers as free-form labels; this is the closed set
/// the rules engine understands. Anything else parses to `None` and takes
/// the documented default path (base commission, no discount).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tier {
    Silver,
    Gold,
    Platinum,
}

impl Tier {
    pub fn parse(label: &str) -> Option<Tier> {
        match label {
            "silver" => Some(Tier::Silver),
            "gold" => Some(Tier::Gold),
            "platinum" => Some(Tier::Platinum),
            _ => None,
        }
    }

    pub fn from_label(label: Option<&str>) -> Option<Tier> {
        label.and_then(Tier::parse)
    }

    /// Gold and platinum members skip to the front of wait-lists.
    pub fn grants_priority(&self) -> bool {
        matches!(self, Tier::Gold | Tier::Platinum)
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Tier::Silver => "silver",
            Tier::Gold => "gold",
            Tier::Platinum => "platinum",
        };
        f.write_str(s)
    }
}

/// Pricing category of a listing (`a` is the premium bracket).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventTier {
    A,
    B,
    C,
}

impl EventTier {
    pub fn parse(label: &str) -> Option<EventTier> {
        match label {
            "a" => Some(EventTier::A),
            "b" => Some(EventTier::B),
            "c" => Some(EventTier::C),
            _ => None,
        }
    }

    pub fn from_label(label: Option<&str>) -> Option<EventTier> {
        label.and_then(EventTier::parse)
    }
}

impl fmt::Display for EventTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EventTier::A => "a",
            EventTier::B => "b",
            EventTier::C => "c",
        };
        f.write_str(s)
    }
}
