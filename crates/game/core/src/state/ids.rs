use core::fmt;

/// Which participant instantiated a party.
///
/// Origins are absolute: both peers of a networked match agree on them, unlike
/// [`super::Side`], which is relative to whoever is looking.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum PartyOrigin {
    /// Authoritative participant (or the local player in a local match).
    Host,
    /// Follower (or the computer opponent in a local match).
    Guest,
}

impl PartyOrigin {
    pub const fn other(self) -> Self {
        match self {
            PartyOrigin::Host => PartyOrigin::Guest,
            PartyOrigin::Guest => PartyOrigin::Host,
        }
    }
}

/// Battle-unique combatant identity, assigned at party initialization and
/// stable for the battle's lifetime.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct InstanceId {
    pub origin: PartyOrigin,
    pub slot: u8,
}

impl InstanceId {
    pub const fn new(origin: PartyOrigin, slot: u8) -> Self {
        Self { origin, slot }
    }

    pub const fn host(slot: u8) -> Self {
        Self::new(PartyOrigin::Host, slot)
    }

    pub const fn guest(slot: u8) -> Self {
        Self::new(PartyOrigin::Guest, slot)
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prefix = match self.origin {
            PartyOrigin::Host => 'h',
            PartyOrigin::Guest => 'g',
        };
        write!(f, "{}{}", prefix, self.slot)
    }
}
