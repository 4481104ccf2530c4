//! Daily bounties.
//!
//! Each calendar day gets three bounties drawn without replacement from
//! [`CATALOG`]. A bounty pays its XP once; the set is thrown away and
//! redrawn when the day changes.

use chrono::NaiveDate;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Number of bounties offered per day.
pub const BOUNTIES_PER_DAY: usize = 3;

/// How a bounty decides it is done.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BountyRule {
    /// Count qualifying sessions until `target`.
    SessionCount,
    /// One session of at least `target` seconds (work plus flow).
    MinWorkedSecs,
    /// Session finished before this local hour.
    BeforeHour(u32),
    /// Session finished at or after this local hour.
    FromHour(u32),
    /// Session completed without ever pausing.
    NoPause,
}

/// One entry of the fixed bounty catalog.
#[derive(Debug, Clone, Copy)]
pub struct CatalogEntry {
    pub id: &'static str,
    pub text: &'static str,
    pub rule: BountyRule,
    pub target: Option<u64>,
    pub xp: u64,
}

pub const CATALOG: &[CatalogEntry] = &[
    CatalogEntry {
        id: "marathon",
        text: "Marathon: Complete 4 sessions",
        rule: BountyRule::SessionCount,
        target: Some(4),
        xp: 100,
    },
    CatalogEntry {
        id: "deep_dive",
        text: "Deep Dive: Complete a 45m+ session",
        rule: BountyRule::MinWorkedSecs,
        target: Some(45 * 60),
        xp: 75,
    },
    CatalogEntry {
        id: "early_bird",
        text: "Early Bird: Finish a session before 9AM",
        rule: BountyRule::BeforeHour(9),
        target: None,
        xp: 50,
    },
    CatalogEntry {
        id: "night_owl",
        text: "Night Owl: Finish a session after 8PM",
        rule: BountyRule::FromHour(20),
        target: None,
        xp: 50,
    },
    CatalogEntry {
        id: "iron_will",
        text: "Iron Will: Complete a session without pausing",
        rule: BountyRule::NoPause,
        target: None,
        xp: 60,
    },
];

/// A bounty as persisted in the day's set.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bounty {
    pub id: String,
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target: Option<u64>,
    /// Progress of cumulative bounties.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current: Option<u64>,
    pub xp: u64,
    #[serde(default)]
    pub completed: bool,
}

impl Bounty {
    fn from_catalog(entry: &CatalogEntry) -> Self {
        Self {
            id: entry.id.to_string(),
            text: entry.text.to_string(),
            target: entry.target,
            current: (entry.rule == BountyRule::SessionCount).then_some(0),
            xp: entry.xp,
            completed: false,
        }
    }

    fn catalog_entry(&self) -> Option<&'static CatalogEntry> {
        CATALOG.iter().find(|e| e.id == self.id)
    }

    pub fn rule(&self) -> Option<BountyRule> {
        self.catalog_entry().map(|e| e.rule)
    }

    fn target_or_default(&self) -> Option<u64> {
        self.target.or_else(|| self.catalog_entry().and_then(|e| e.target))
    }
}

/// What the bounty rules look at after a completed work session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BountyContext {
    /// Counted work plus flow.
    pub worked: Duration,
    pub was_paused: bool,
    /// Local hour (0-23) at evaluation time.
    pub hour: u32,
}

/// The bounties for one calendar day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BountySet {
    /// `YYYY-MM-DD`; empty before the first draw.
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub list: Vec<Bounty>,
}

impl BountySet {
    /// Draw a fresh set for `today`.
    pub fn generate<R: Rng + ?Sized>(today: NaiveDate, rng: &mut R) -> Self {
        let list = CATALOG
            .choose_multiple(rng, BOUNTIES_PER_DAY)
            .map(Bounty::from_catalog)
            .collect();
        Self {
            date: date_key(today),
            list,
        }
    }

    pub fn is_for(&self, day: NaiveDate) -> bool {
        self.date == date_key(day)
    }

    /// Apply one completed work session. Returns the bounties that were
    /// completed by it; each pays out here and never again.
    pub fn evaluate(&mut self, ctx: &BountyContext) -> Vec<Bounty> {
        let mut newly_completed = Vec::new();

        for bounty in self.list.iter_mut().filter(|b| !b.completed) {
            let Some(rule) = bounty.rule() else {
                continue;
            };
            let target = bounty.target_or_default();

            let done = match rule {
                BountyRule::SessionCount => {
                    let current = bounty.current.unwrap_or(0).saturating_add(1);
                    bounty.current = Some(current);
                    target.is_some_and(|t| current >= t)
                }
                BountyRule::MinWorkedSecs => target.is_some_and(|t| ctx.worked.as_secs() >= t),
                BountyRule::BeforeHour(hour) => ctx.hour < hour,
                BountyRule::FromHour(hour) => ctx.hour >= hour,
                BountyRule::NoPause => !ctx.was_paused,
            };

            if done {
                bounty.completed = true;
                newly_completed.push(bounty.clone());
            }
        }

        newly_completed
    }
}

fn date_key(day: NaiveDate) -> String {
    day.format("%Y-%m-%d").to_string()
}
