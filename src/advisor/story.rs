use crate::advisor::curve::{value_at, Axis, Curve, CURVE_AXES};
use crate::advisor::profile::ProfileBook;
use crate::api::models::Hero;
use crate::draft::{DraftState, MAX_MINUTE};
use serde::Serialize;
use std::collections::BTreeMap;

/// Chart series run every five minutes through the mid game.
const SERIES_START: u32 = 5;
const SERIES_END: u32 = 40;
const SERIES_STEP: u32 = 5;

/// Push advantage that opens an objective window.
const WINDOW_THRESHOLD: i64 = 20;

#[derive(Debug, Serialize)]
pub struct TeamPair<T> {
    pub team1: T,
    pub team2: T,
}

/// Rounded per-axis team sums at one minute.
pub type AxisSums = BTreeMap<Axis, i64>;

/// minute -> team sum, for the three charted axes.
#[derive(Debug, Default, Serialize)]
pub struct TeamSeries {
    pub push: BTreeMap<u32, i64>,
    pub pickoff: BTreeMap<u32, i64>,
    pub fight: BTreeMap<u32, i64>,
}

#[derive(Debug, Serialize)]
pub struct PushWindow {
    pub start: u32,
    pub end: u32,
    pub label: String,
}

#[derive(Debug, Serialize)]
pub struct LaneNote {
    pub lane: &'static str,
    pub label: &'static str,
    pub reasons: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
pub struct ObjectiveSpike {
    pub minute: u32,
    pub label: &'static str,
}

/// Timing storyboard for a drafted game: lane positions, team power
/// composition at the chosen minute, push windows, lane reads, fixed
/// objective spikes and the chart series behind them.
#[derive(Debug, Serialize)]
pub struct Story {
    pub positions: TeamPair<Vec<u8>>,
    pub composition: TeamPair<AxisSums>,
    pub windows: Vec<PushWindow>,
    pub lanes: Vec<LaneNote>,
    pub spikes: Vec<ObjectiveSpike>,
    #[serde(rename = "__series")]
    pub series: TeamPair<TeamSeries>,
}

/// Sum every curve axis over a team at one minute. Values are already
/// rounded per hero, the sum is rounded again for the wire.
pub fn team_axes_at(curves: &[Curve], minute: u32) -> AxisSums {
    CURVE_AXES
        .iter()
        .map(|&axis| {
            let s: f64 = curves.iter().map(|c| value_at(c.axis(axis), minute)).sum();
            (axis, s.round() as i64)
        })
        .collect()
}

fn team_series(curves: &[Curve]) -> TeamSeries {
    let mut series = TeamSeries::default();
    let mut m = SERIES_START;
    while m <= SERIES_END {
        let sums = team_axes_at(curves, m);
        series.push.insert(m, sums[&Axis::Push]);
        series.pickoff.insert(m, sums[&Axis::Pickoff]);
        series.fight.insert(m, sums[&Axis::Fight]);
        m += SERIES_STEP;
    }
    series
}

/// Provided roles win; missing or null slots fall back to slot order.
fn fill_positions(roles: &[Option<u8>]) -> Vec<u8> {
    if roles.is_empty() {
        return (1..=5).collect();
    }
    roles
        .iter()
        .take(5)
        .enumerate()
        .map(|(i, r)| r.unwrap_or(i as u8 + 1))
        .collect()
}

/// Build the storyboard. Total by design: unknown heroes and missing
/// profiles degrade to defaults and an out-of-range minute clamps, so a
/// draft in any state still renders.
pub fn storyboard(heroes: &[Hero], book: &ProfileBook, draft: &DraftState) -> Story {
    let minute = draft.minute.min(MAX_MINUTE);

    let curves = |picks: &[crate::draft::DraftPick]| -> Vec<Curve> {
        picks
            .iter()
            .map(|p| book.resolve_pick(p, heroes).curve_or_default())
            .collect()
    };
    let team1 = curves(&draft.teams.team1);
    let team2 = curves(&draft.teams.team2);

    let series1 = team_series(&team1);
    let series2 = team_series(&team2);

    let mut windows = Vec::new();
    let mut m = SERIES_START;
    while m + SERIES_STEP <= SERIES_END {
        let d = series1.push[&m] - series2.push[&m];
        if d.abs() >= WINDOW_THRESHOLD {
            windows.push(PushWindow {
                start: m,
                end: m + SERIES_STEP,
                label: if d > 0 {
                    "T1 Push Window".to_string()
                } else {
                    "T2 Push Window".to_string()
                },
            });
        }
        m += SERIES_STEP;
    }

    Story {
        positions: TeamPair {
            team1: fill_positions(&draft.roles.team1),
            team2: fill_positions(&draft.roles.team2),
        },
        composition: TeamPair {
            team1: team_axes_at(&team1, minute),
            team2: team_axes_at(&team2, minute),
        },
        windows,
        lanes: vec![
            LaneNote {
                lane: "Safe",
                label: "Even",
                reasons: vec!["Farm secured vs mild pressure"],
            },
            LaneNote {
                lane: "Mid",
                label: "Skill/Runes",
                reasons: vec!["Rune control matters"],
            },
            LaneNote {
                lane: "Off",
                label: "Risk",
                reasons: vec!["Higher enemy kill threat early"],
            },
        ],
        spikes: vec![
            ObjectiveSpike { minute: 8, label: "Roshan earliest" },
            ObjectiveSpike { minute: 20, label: "Tormentor" },
        ],
        series: TeamPair { team1: series1, team2: series2 },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisor::profile::default_profile;
    use crate::api::models::HeroRole;
    use crate::draft::{DraftPick, DraftTeams};
    use crate::matrix::builder::HeroId;

    fn hero(id: HeroId, roles: &[HeroRole]) -> Hero {
        Hero {
            id,
            name: format!("Hero {}", id),
            roles: roles.to_vec(),
            icon: String::new(),
        }
    }

    fn draft(team1: &[HeroId], team2: &[HeroId], minute: u32) -> DraftState {
        let side = |ids: &[HeroId]| {
            ids.iter()
                .map(|&hero_id| DraftPick { hero_id, profile: None })
                .collect()
        };
        DraftState {
            minute,
            teams: DraftTeams { team1: side(team1), team2: side(team2) },
            ..DraftState::default()
        }
    }

    #[test]
    fn positions_default_to_slot_order() {
        let story = storyboard(&[], &ProfileBook::default(), &draft(&[], &[], 15));
        assert_eq!(story.positions.team1, vec![1, 2, 3, 4, 5]);
        assert_eq!(story.positions.team2, vec![1, 2, 3, 4, 5]);
    }

    #[test]
    fn provided_roles_override_slots() {
        let mut d = draft(&[], &[], 15);
        d.roles.team1 = vec![Some(3), None, Some(1)];
        let story = storyboard(&[], &ProfileBook::default(), &d);
        assert_eq!(story.positions.team1, vec![3, 2, 1]);
    }

    #[test]
    fn composition_sums_resolved_curves() {
        let heroes = vec![hero(1, &[]), hero(2, &[])];
        let story = storyboard(&heroes, &ProfileBook::default(), &draft(&[1, 2], &[], 10));
        // two default curves: fight 25 each at minute 10
        assert_eq!(story.composition.team1[&Axis::Fight], 50);
        assert_eq!(story.composition.team2[&Axis::Fight], 0);
        // all seven axes are present
        assert_eq!(story.composition.team1.len(), CURVE_AXES.len());
    }

    #[test]
    fn series_covers_five_through_forty() {
        let heroes = vec![hero(1, &[])];
        let story = storyboard(&heroes, &ProfileBook::default(), &draft(&[1], &[], 15));
        let minutes: Vec<u32> = story.series.team1.push.keys().copied().collect();
        assert_eq!(minutes, vec![5, 10, 15, 20, 25, 30, 35, 40]);
        assert_eq!(story.series.team1.fight.len(), 8);
    }

    #[test]
    fn push_windows_flag_sustained_advantage() {
        // flat 30-push heroes against an empty side
        let heroes: Vec<Hero> = (1..=5).map(|id| hero(id, &[])).collect();
        let mut book = ProfileBook::default();
        for h in &heroes {
            let mut p = default_profile(h);
            p.curve = Curve { push: vec![30], ..Curve::default() };
            book.profiles_by_hero.insert(h.id, vec![p]);
        }
        let story = storyboard(&heroes, &book, &draft(&[1, 2, 3, 4, 5], &[], 15));
        assert_eq!(story.windows.len(), 7);
        assert_eq!(story.windows[0].start, 5);
        assert_eq!(story.windows[0].end, 10);
        assert!(story.windows.iter().all(|w| w.label == "T1 Push Window"));

        let mirrored = storyboard(&heroes, &book, &draft(&[], &[1, 2, 3, 4, 5], 15));
        assert!(mirrored.windows.iter().all(|w| w.label == "T2 Push Window"));
    }

    #[test]
    fn close_push_values_open_no_windows() {
        let heroes = vec![hero(1, &[]), hero(2, &[])];
        // identical defaults on both sides cancel out
        let story = storyboard(&heroes, &ProfileBook::default(), &draft(&[1], &[2], 15));
        assert!(story.windows.is_empty());
    }

    #[test]
    fn lanes_and_spikes_are_static_reads() {
        let story = storyboard(&[], &ProfileBook::default(), &draft(&[], &[], 15));
        assert_eq!(story.lanes.len(), 3);
        assert_eq!(story.lanes[0].lane, "Safe");
        assert_eq!(story.spikes[0].minute, 8);
        assert_eq!(story.spikes[0].label, "Roshan earliest");
        assert_eq!(story.spikes[1].minute, 20);
    }

    #[test]
    fn out_of_range_minute_clamps_instead_of_failing() {
        let heroes = vec![hero(1, &[])];
        let wild = storyboard(&heroes, &ProfileBook::default(), &draft(&[1], &[], 200));
        let capped = storyboard(&heroes, &ProfileBook::default(), &draft(&[1], &[], 60));
        assert_eq!(
            wild.composition.team1[&Axis::Fight],
            capped.composition.team1[&Axis::Fight]
        );
    }

    #[test]
    fn wire_shape_keeps_the_series_key() {
        let heroes = vec![hero(1, &[])];
        let story = storyboard(&heroes, &ProfileBook::default(), &draft(&[1], &[], 15));
        let v = serde_json::to_value(&story).unwrap();
        assert!(v["__series"]["team1"]["push"]["5"].is_number());
        assert!(v["composition"]["team1"]["fight"].is_number());
        assert!(v["positions"]["team1"].is_array());
    }
}
