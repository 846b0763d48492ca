//! Fixed catalogs the generator draws from.
//!
//! Every catalog is a closed enum with a stable text label. The label is what
//! lands in the `details` payload and in the `event_type` / `game_zone`
//! columns. Each catalog samples uniformly via [`StandardUniform`], so
//! `rng.random::<Zone>()` picks one of the seven zones with equal odds.

use rand::Rng;
use rand::distr::{Distribution, StandardUniform};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// Generates a catalog enum with labels, an `ALL` table, `Display`, and a
/// uniform [`StandardUniform`] distribution.
macro_rules! catalog {
    (
        $(#[$meta:meta])*
        $name:ident {
            $(#[$first_meta:meta])*
            $first:ident => $first_label:literal,
            $($(#[$vmeta:meta])* $variant:ident => $label:literal,)*
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
        #[ts(export, export_to = "bindings/")]
        pub enum $name {
            $(#[$first_meta])*
            #[serde(rename = $first_label)]
            $first,
            $(
                $(#[$vmeta])*
                #[serde(rename = $label)]
                $variant,
            )*
        }

        impl $name {
            /// Every variant, in declaration order.
            pub const ALL: &'static [Self] = &[Self::$first $(, Self::$variant)*];

            /// Text label used in payloads and database columns.
            pub const fn as_str(self) -> &'static str {
                match self {
                    Self::$first => $first_label,
                    $(Self::$variant => $label,)*
                }
            }
        }

        impl core::fmt::Display for $name {
            fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl Distribution<$name> for StandardUniform {
            fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> $name {
                let pick = rng.random_range(0..$name::ALL.len());
                $name::ALL.get(pick).copied().unwrap_or($name::$first)
            }
        }
    };
}

catalog! {
    /// The kind of occurrence a [`GameEvent`](crate::GameEvent) records.
    EventType {
        /// Player started a session.
        Login => "login",
        /// Player ended a session.
        Logout => "logout",
        /// Player defeated another player.
        Kill => "kill",
        /// Player was defeated by another player.
        Death => "death",
        /// Player helped a teammate score a kill.
        Assist => "assist",
        /// Player captured an objective flag.
        CaptureFlag => "capture_flag",
        /// Player finished a quest.
        CompleteQuest => "complete_quest",
        /// Player bought an item from the shop.
        PurchaseItem => "purchase_item",
        /// Player reached the next level.
        LevelUp => "level_up",
        /// Player entered a match.
        JoinMatch => "join_match",
        /// Player left a match.
        LeaveMatch => "leave_match",
        /// Player unlocked an achievement.
        EarnAchievement => "earn_achievement",
        /// Player sent a chat message.
        SendMessage => "send_message",
        /// Player joined a clan.
        JoinClan => "join_clan",
    }
}

impl EventType {
    /// Whether the event names a second player (victim or killer).
    pub const fn requires_opponent(self) -> bool {
        matches!(self, Self::Kill | Self::Death)
    }
}

catalog! {
    /// A game location.
    Zone {
        /// Woodland map.
        Forest => "Forest",
        /// Underground map.
        Dungeon => "Dungeon",
        /// Fortress map.
        Castle => "Castle",
        /// Open sand map.
        Desert => "Desert",
        /// Frozen cavern map.
        IceCave => "Ice Cave",
        /// Lava map.
        Volcano => "Volcano",
        /// Urban hub.
        City => "City",
    }
}

catalog! {
    /// Weapon used for a kill.
    Weapon {
        /// Sword.
        Sword => "Sword",
        /// Bow.
        Bow => "Bow",
        /// Staff.
        Staff => "Staff",
        /// Dagger.
        Dagger => "Dagger",
        /// Axe.
        Axe => "Axe",
        /// Wand.
        Wand => "Wand",
        /// Shield.
        Shield => "Shield",
    }
}

catalog! {
    /// Reward granted on level-up.
    Reward {
        /// Gold coins.
        Gold => "gold",
        /// An item drop.
        Item => "item",
        /// A skill point.
        SkillPoint => "skill_point",
    }
}

catalog! {
    /// Quest difficulty tier.
    Difficulty {
        /// Easy.
        Easy => "Easy",
        /// Medium.
        Medium => "Medium",
        /// Hard.
        Hard => "Hard",
    }
}

catalog! {
    /// Shop catalog.
    ShopItem {
        /// Restores health.
        HealthPotion => "Health Potion",
        /// Restores mana.
        ManaPotion => "Mana Potion",
        /// Upgraded sword.
        SwordPlusOne => "Sword+1",
        /// Body armor.
        Armor => "Armor",
        /// Spell scroll.
        Scroll => "Scroll",
    }
}

catalog! {
    /// Client platform for a session.
    Platform {
        /// Desktop.
        Pc => "PC",
        /// Phone or tablet.
        Mobile => "Mobile",
        /// Home console.
        Console => "Console",
    }
}

catalog! {
    /// Currency used for purchases. Only gold exists today.
    Currency {
        /// In-game gold.
        Gold => "gold",
    }
}

catalog! {
    /// Marker carried by events without a dedicated payload.
    StandardMarker {
        /// The only marker value.
        StandardEvent => "standard_event",
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    use super::*;

    #[test]
    fn catalog_sizes() {
        assert_eq!(EventType::ALL.len(), 14);
        assert_eq!(Zone::ALL.len(), 7);
        assert_eq!(Weapon::ALL.len(), 7);
        assert_eq!(Reward::ALL.len(), 3);
        assert_eq!(Difficulty::ALL.len(), 3);
        assert_eq!(ShopItem::ALL.len(), 5);
        assert_eq!(Platform::ALL.len(), 3);
    }

    #[test]
    fn labels_match_serde_names() {
        for zone in Zone::ALL {
            let json = serde_json::to_string(zone).ok();
            assert_eq!(json, Some(format!("\"{}\"", zone.as_str())));
        }
        for event_type in EventType::ALL {
            let json = serde_json::to_string(event_type).ok();
            assert_eq!(json, Some(format!("\"{event_type}\"")));
        }
        assert_eq!(Zone::IceCave.as_str(), "Ice Cave");
        assert_eq!(ShopItem::SwordPlusOne.as_str(), "Sword+1");
        assert_eq!(EventType::CaptureFlag.as_str(), "capture_flag");
    }

    #[test]
    fn sampling_reaches_every_variant() {
        let mut rng = SmallRng::seed_from_u64(7);
        let mut seen = BTreeSet::new();
        for _ in 0..2_000 {
            seen.insert(rng.random::<EventType>());
        }
        assert_eq!(seen.len(), EventType::ALL.len());

        let zones: BTreeSet<Zone> = (0..500).map(|_| rng.random::<Zone>()).collect();
        assert_eq!(zones.len(), Zone::ALL.len());
    }

    #[test]
    fn only_kill_and_death_need_an_opponent() {
        let needing: Vec<EventType> = EventType::ALL
            .iter()
            .copied()
            .filter(|t| t.requires_opponent())
            .collect();
        assert_eq!(needing, vec![EventType::Kill, EventType::Death]);
    }
}
