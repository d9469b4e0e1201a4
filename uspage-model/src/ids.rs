//! Strongly typed entity ids.
//!
//! Every entity gets its own id newtype over the database's BIGSERIAL so
//! that a landing id can never be passed where a media id is expected.

use serde::{Deserialize, Serialize};

macro_rules! entity_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash,
            Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            pub fn new(value: i64) -> Self {
                Self(value)
            }

            pub fn value(&self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

entity_id!(
    /// Id of a registered user
    UserId
);
entity_id!(
    /// Id of a theme (system or user owned)
    ThemeId
);
entity_id!(
    /// Id of a couple landing page
    LandingId
);
entity_id!(
    /// Id of a yes/no invitation
    InvitationId
);
entity_id!(
    /// Id of an uploaded media item
    MediaId
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_serialize_transparently() {
        let id = LandingId::new(42);
        assert_eq!(serde_json::to_string(&id).unwrap(), "42");
        let back: LandingId = serde_json::from_str("42").unwrap();
        assert_eq!(back, id);
    }

    #[test]
    fn display_matches_inner_value() {
        assert_eq!(MediaId::new(7).to_string(), "7");
    }
}
