use crate::advisor::context::{
    context_contrib_for, context_score_for, enemy_gain_if_they_pick, ContextContrib,
};
use crate::advisor::curve::{combat_total, curve_value, Axis, AxisDeltas};
use crate::advisor::items::{apply_items_until, likely_items, LikelyItem};
use crate::advisor::profile::{default_profile, Profile, ProfileBook};
use crate::advisor::tags::{
    Tag, AURA_COMMIT_TAGS, COUNTER_RULES, NEED_PRIORITY, SYNERGY_THEMES, WANT_TAGS,
};
use crate::api::models::Hero;
use crate::draft::DraftState;
use crate::error::AppError;
use crate::matrix::builder::HeroId;
use crate::matrix::snapshot::MatrixSnapshot;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

/// Suggestions returned per list.
pub const SUGGESTION_LIMIT: usize = 6;

/// Unfilled tags surfaced as team needs.
pub const TEAM_NEEDS_LIMIT: usize = 3;

#[derive(Debug, Serialize)]
pub struct CoverageEntry {
    pub tag: Tag,
    pub ok: bool,
}

#[derive(Debug, Serialize)]
pub struct AllySuggestion {
    pub hero_id: HeroId,
    pub name: String,
    pub icon: String,
    #[serde(rename = "profileId")]
    pub profile_id: String,
    pub profile: Profile,
    pub deltas: AxisDeltas,
    #[serde(rename = "deltasByMinute")]
    pub deltas_by_minute: BTreeMap<u32, AxisDeltas>,
    #[serde(rename = "itemsLikely")]
    pub items_likely: Vec<LikelyItem>,
    pub reasons: Vec<String>,
    #[serde(rename = "contextScore")]
    pub context_score: i64,
    #[serde(rename = "contextContrib")]
    pub context_contrib: ContextContrib,
    #[serde(skip_serializing)]
    pub score: f64,
}

#[derive(Debug, Serialize)]
pub struct BanSuggestion {
    pub hero_id: HeroId,
    pub name: String,
    pub icon: String,
    pub deltas: AxisDeltas,
    pub reasons: Vec<String>,
    #[serde(rename = "itemsLikely")]
    pub items_likely: Vec<LikelyItem>,
    #[serde(rename = "enemyContextGain")]
    pub enemy_context_gain: i64,
    #[serde(skip_serializing)]
    pub score: f64,
}

/// Full advisor answer for one draft state.
#[derive(Debug, Serialize)]
pub struct Advice {
    pub minute: u32,
    pub coverage: Vec<CoverageEntry>,
    #[serde(rename = "teamNeeds")]
    pub team_needs: Vec<Tag>,
    #[serde(rename = "allySuggestions")]
    pub ally_suggestions: Vec<AllySuggestion>,
    #[serde(rename = "banSuggestions")]
    pub ban_suggestions: Vec<BanSuggestion>,
}

/// Profile a candidate hero would most usefully play against the
/// current tag situation. Fit points: 8 per unclaimed want tag, 6 per
/// matching synergy theme, 5 per live counter, combat strength at the
/// current minute over 100, and 0.5 for leading with position 1. Ties
/// keep the earlier (learned) profile.
fn best_profile_for(
    hero: &Hero,
    book: &ProfileBook,
    your_tags: &BTreeSet<Tag>,
    enemy_tags: &BTreeSet<Tag>,
    now: u32,
) -> Profile {
    let fit = |p: &Profile| -> f64 {
        let mut s = 0.0;
        for tag in &WANT_TAGS {
            if !your_tags.contains(tag) && p.tags.contains(tag) {
                s += 8.0;
            }
        }
        for theme in &SYNERGY_THEMES {
            if your_tags.contains(&theme.tag) && p.tags.contains(&theme.tag) {
                s += 6.0;
            }
        }
        for rule in &COUNTER_RULES {
            if enemy_tags.contains(&rule.enemy) && p.tags.contains(&rule.answer) {
                s += 5.0;
            }
        }
        s += combat_total(&curve_value(&p.curve_or_default(), now)) / 100.0;
        if p.positions.first() == Some(&1) {
            s += 0.5;
        }
        s
    };

    let mut list = book.resolve(hero).into_iter();
    let Some(first) = list.next() else {
        return default_profile(hero);
    };
    let mut best_fit = fit(&first);
    let mut best = first;
    for p in list {
        let f = fit(&p);
        if f > best_fit {
            best_fit = f;
            best = p;
        }
    }
    best
}

fn reasons_for(profile: &Profile, your_tags: &BTreeSet<Tag>, enemy_tags: &BTreeSet<Tag>) -> Vec<String> {
    let mut reasons = Vec::new();
    for tag in &WANT_TAGS {
        if !your_tags.contains(tag) && profile.tags.contains(tag) {
            reasons.push(format!("+{}", tag.words()));
        }
    }
    for theme in &SYNERGY_THEMES {
        if your_tags.contains(&theme.tag) && profile.tags.contains(&theme.tag) {
            reasons.push(theme.label.to_string());
        }
    }
    for rule in &COUNTER_RULES {
        if enemy_tags.contains(&rule.enemy) && profile.tags.contains(&rule.answer) {
            reasons.push(rule.label.to_string());
        }
    }
    if let Some(&pos) = profile.positions.first() {
        reasons.push(format!("Fits Pos {}", pos));
    }
    reasons
}

/// Picks already committed to aura items, which saturate further aura
/// purchases.
fn team_aura_count(team: &[Profile]) -> usize {
    team.iter()
        .filter(|p| AURA_COMMIT_TAGS.iter().any(|t| p.tags.contains(t)))
        .count()
}

fn push_of(deltas: &AxisDeltas) -> f64 {
    deltas.get(&Axis::Push).copied().unwrap_or(0.0)
}

/// Score the draft and return ranked ally and ban suggestions.
///
/// Team 1 is the side being advised. Missing pick profiles resolve
/// through the book; a missing matrix zeroes every context term instead
/// of failing.
pub fn advise(
    heroes: &[Hero],
    book: &ProfileBook,
    draft: &DraftState,
    matrix: Option<&MatrixSnapshot>,
    ctx_weight: f64,
) -> Result<Advice, AppError> {
    draft.validate()?;
    let now = draft.minute;

    let your: Vec<Profile> = draft
        .teams
        .team1
        .iter()
        .map(|p| book.resolve_pick(p, heroes))
        .collect();
    let enemy: Vec<Profile> = draft
        .teams
        .team2
        .iter()
        .map(|p| book.resolve_pick(p, heroes))
        .collect();

    let your_tags: BTreeSet<Tag> = your.iter().flat_map(|p| p.tags.iter().cloned()).collect();
    let enemy_tags: BTreeSet<Tag> = enemy.iter().flat_map(|p| p.tags.iter().cloned()).collect();

    let coverage: Vec<CoverageEntry> = WANT_TAGS
        .iter()
        .map(|t| CoverageEntry { tag: t.clone(), ok: your_tags.contains(t) })
        .collect();

    let taken = draft.taken();
    let pool: Vec<&Hero> = heroes.iter().filter(|h| !taken.contains(&h.id)).collect();

    let team1_ids = draft.team1_ids();
    let team2_ids = draft.team2_ids();
    let team_auras = team_aura_count(&your);

    let mut ally: Vec<AllySuggestion> = pool
        .iter()
        .map(|&h| {
            let profile = best_profile_for(h, book, &your_tags, &enemy_tags, now);
            let items = likely_items(&profile.tags, profile.role_hint(), true);
            let curve = profile.curve_or_default();

            let mut deltas = curve_value(&curve, now);
            apply_items_until(&mut deltas, &items, now, team_auras);

            let mut deltas_by_minute = BTreeMap::new();
            for m in [10, 15, 20, 25, now] {
                let mut base = curve_value(&curve, m);
                apply_items_until(&mut base, &items, m, team_auras);
                deltas_by_minute.insert(m, base);
            }

            let mut reasons = reasons_for(&profile, &your_tags, &enemy_tags);
            for item in &items {
                if item.minute >= now && item.minute <= now + 10 {
                    reasons.push(format!("{} @{}", item.label, item.minute));
                }
            }

            let mut score = 0.0;
            for tag in &WANT_TAGS {
                if !your_tags.contains(tag) && profile.tags.contains(tag) {
                    score += 3.5;
                }
            }
            if profile.positions.contains(&1) {
                score += 1.5;
            }
            if profile.positions.contains(&3) {
                score += 1.0;
            }
            for theme in &SYNERGY_THEMES {
                if your_tags.contains(&theme.tag) && profile.tags.contains(&theme.tag) {
                    score += 2.0;
                }
            }
            for rule in &COUNTER_RULES {
                if enemy_tags.contains(&rule.enemy) && profile.tags.contains(&rule.answer) {
                    score += 1.5;
                }
            }
            score += combat_total(&deltas) / 100.0;
            for item in &items {
                let soon = (1.0 - (item.minute as f64 - now as f64).abs() / 8.0).max(0.0);
                score += soon * 1.5;
            }

            let ctx = context_score_for(h.id, &team1_ids, &team2_ids, matrix);
            score += ctx_weight * ctx as f64;

            AllySuggestion {
                hero_id: h.id,
                name: h.name.clone(),
                icon: h.icon.clone(),
                profile_id: profile.id.clone(),
                context_contrib: context_contrib_for(h.id, &team1_ids, &team2_ids, matrix),
                profile,
                deltas,
                deltas_by_minute,
                items_likely: items,
                reasons,
                context_score: ctx,
                score,
            }
        })
        .collect();
    ally.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| {
                push_of(&b.deltas)
                    .partial_cmp(&push_of(&a.deltas))
                    .unwrap_or(Ordering::Equal)
            })
            .then_with(|| a.hero_id.cmp(&b.hero_id))
    });
    ally.truncate(SUGGESTION_LIMIT);

    let mut bans: Vec<BanSuggestion> = pool
        .iter()
        .map(|&h| {
            // deny ranking reads the hero's primary profile, not the
            // situational best
            let best = book.primary(h);
            let deltas = curve_value(&best.curve_or_default(), now);

            let mut reasons = Vec::new();
            let mut coverage_gain = 0.0;
            for tag in &WANT_TAGS {
                if !enemy_tags.contains(tag) && best.tags.contains(tag) {
                    coverage_gain += 8.0;
                    reasons.push(format!("Fills enemy: {}", tag.words()));
                }
            }

            let items = likely_items(&best.tags, best.role_hint(), false);

            let get = |axis: Axis| deltas.get(&axis).copied().unwrap_or(0.0);
            let mut score =
                (get(Axis::Fight) + get(Axis::Pickoff) + get(Axis::Push)) / 3.0 + coverage_gain;
            let enemy_gain = enemy_gain_if_they_pick(h.id, &team1_ids, &team2_ids, matrix);
            score += ctx_weight * enemy_gain as f64;

            BanSuggestion {
                hero_id: h.id,
                name: h.name.clone(),
                icon: h.icon.clone(),
                deltas,
                reasons,
                items_likely: items,
                enemy_context_gain: enemy_gain,
                score,
            }
        })
        .collect();
    bans.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(Ordering::Equal)
            .then_with(|| {
                push_of(&b.deltas)
                    .partial_cmp(&push_of(&a.deltas))
                    .unwrap_or(Ordering::Equal)
            })
            .then_with(|| a.hero_id.cmp(&b.hero_id))
    });
    bans.truncate(SUGGESTION_LIMIT);

    let mut team_needs: Vec<Tag> = coverage
        .iter()
        .filter(|c| !c.ok)
        .map(|c| c.tag.clone())
        .collect();
    team_needs.sort_by_key(|t| {
        NEED_PRIORITY
            .iter()
            .position(|p| p == t)
            .unwrap_or(NEED_PRIORITY.len())
    });
    team_needs.truncate(TEAM_NEEDS_LIMIT);

    Ok(Advice {
        minute: now,
        coverage,
        team_needs,
        ally_suggestions: ally,
        ban_suggestions: bans,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::advisor::items::ItemKey;
    use crate::api::models::HeroRole;
    use crate::draft::{DraftPick, DraftTeams};
    use crate::matrix::topk::{TopKEntry, TopKMatrix};

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
            picked: team1.iter().chain(team2).copied().collect(),
            ..DraftState::default()
        }
    }

    #[test]
    fn pool_excludes_picked_and_banned_heroes() {
        let heroes: Vec<Hero> = (1..=10).map(|id| hero(id, &[HeroRole::Carry])).collect();
        let mut d = draft(&[1], &[2], 15);
        d.banned = vec![3];
        let advice = advise(&heroes, &ProfileBook::default(), &d, None, 0.25).unwrap();
        for s in &advice.ally_suggestions {
            assert!(![1, 2, 3].contains(&s.hero_id));
        }
        for s in &advice.ban_suggestions {
            assert!(![1, 2, 3].contains(&s.hero_id));
        }
    }

    #[test]
    fn suggestion_lists_cap_at_six() {
        let heroes: Vec<Hero> = (1..=20).map(|id| hero(id, &[])).collect();
        let advice =
            advise(&heroes, &ProfileBook::default(), &draft(&[], &[], 15), None, 0.25).unwrap();
        assert_eq!(advice.ally_suggestions.len(), SUGGESTION_LIMIT);
        assert_eq!(advice.ban_suggestions.len(), SUGGESTION_LIMIT);
    }

    #[test]
    fn minute_out_of_range_is_an_input_error() {
        let heroes = vec![hero(1, &[])];
        let d = draft(&[], &[], 61);
        let err = advise(&heroes, &ProfileBook::default(), &d, None, 0.25).unwrap_err();
        assert!(matches!(err, AppError::MalformedInput(_)));
    }

    #[test]
    fn known_scenario_scores_match_hand_computation() {
        // one initiator candidate, empty draft, minute 15, no matrix:
        //   2 want fills (stun, initiator)      7.0
        //   position 3 available                1.0
        //   combat after blink at 15            1.87
        //   blink and bkb both 3 min away       1.875
        let heroes = vec![hero(9, &[HeroRole::Initiator])];
        let advice =
            advise(&heroes, &ProfileBook::default(), &draft(&[], &[], 15), None, 0.25).unwrap();
        let s = &advice.ally_suggestions[0];
        assert!((s.score - 11.745).abs() < 1e-9);
        assert_eq!(s.items_likely[0].key, ItemKey::Blink);
        assert_eq!(s.items_likely[1].key, ItemKey::Bkb);
        assert!(s.reasons.iter().any(|r| r == "+initiator"));
        assert!(s.reasons.iter().any(|r| r == "Fits Pos 2"));
        // bkb lands at 18, inside the now..now+10 window
        assert!(s.reasons.iter().any(|r| r.ends_with("@18")));
        assert_eq!(s.context_score, 0);
    }

    #[test]
    fn tag_fills_outrank_redundant_candidates() {
        let heroes = vec![hero(1, &[]), hero(2, &[HeroRole::Initiator])];
        let advice =
            advise(&heroes, &ProfileBook::default(), &draft(&[], &[], 15), None, 0.25).unwrap();
        assert_eq!(advice.ally_suggestions[0].hero_id, 2);
    }

    #[test]
    fn counter_rules_reward_answers_to_enemy_tags() {
        let healer = hero(50, &[HeroRole::Support]);
        let mut healer_profile = default_profile(&healer);
        healer_profile.tags.insert(Tag::SustainHeals);

        let heroes = vec![hero(1, &[]), hero(2, &[]), healer.clone()];
        let mut book = ProfileBook::default();
        let mut burst = default_profile(&heroes[1]);
        burst.tags.insert(Tag::Burst);
        book.profiles_by_hero.insert(2, vec![burst]);

        let mut d = draft(&[], &[50], 15);
        d.teams.team2[0].profile = Some(healer_profile);

        let advice = advise(&heroes, &book, &d, None, 0.25).unwrap();
        assert_eq!(advice.ally_suggestions[0].hero_id, 2);
        assert!(advice.ally_suggestions[0]
            .reasons
            .iter()
            .any(|r| r == "Counters Sustain"));
    }

    #[test]
    fn equal_scores_fall_to_push_then_id() {
        // same totals, mirrored fight/push curves; flat everything else
        let mut book = ProfileBook::default();
        for (id, fight, push) in [(30, 20, 40), (10, 40, 20)] {
            let h = hero(id, &[]);
            let mut p = default_profile(&h);
            p.tags.clear();
            p.positions = vec![2, 3];
            p.curve.fight = vec![fight];
            p.curve.push = vec![push];
            p.curve.pickoff = vec![0];
            p.curve.rosh = vec![0];
            p.curve.scale = vec![0];
            p.curve.sustain = vec![0];
            p.curve.defense = vec![0];
            book.profiles_by_hero.insert(id, vec![p]);
        }
        let heroes = vec![hero(10, &[]), hero(30, &[])];
        let advice = advise(&heroes, &book, &draft(&[], &[], 15), None, 0.25).unwrap();
        // higher push wins the tie despite the higher id
        assert_eq!(advice.ally_suggestions[0].hero_id, 30);
        assert_eq!(advice.ally_suggestions[1].hero_id, 10);
    }

    #[test]
    fn matrix_context_blends_into_ranking() {
        let heroes = vec![hero(1, &[]), hero(2, &[]), hero(3, &[])];
        let mut top_allies = TopKMatrix::new();
        top_allies.insert(2, vec![TopKEntry { id: 1, score: 60 }]);
        let snapshot = MatrixSnapshot::new("test", top_allies, {
            let mut m = TopKMatrix::new();
            m.insert(1, vec![]);
            m
        });

        let advice = advise(
            &heroes,
            &ProfileBook::default(),
            &draft(&[1], &[], 15),
            Some(&snapshot),
            0.25,
        )
        .unwrap();
        let first = &advice.ally_suggestions[0];
        assert_eq!(first.hero_id, 2);
        assert_eq!(first.context_score, 60);
        assert_eq!(first.context_contrib.allies[0].id, 1);
        // without the matrix the tie would resolve to the lower id
        let blind = advise(
            &heroes,
            &ProfileBook::default(),
            &draft(&[1], &[], 15),
            None,
            0.25,
        )
        .unwrap();
        assert_eq!(blind.ally_suggestions[0].hero_id, 2);
        assert_eq!(blind.ally_suggestions[0].context_score, 0);
        assert!(blind.ally_suggestions[0].score < first.score);
    }

    #[test]
    fn ban_candidates_score_enemy_fills() {
        let heroes = vec![hero(1, &[]), hero(2, &[HeroRole::Carry])];
        let advice =
            advise(&heroes, &ProfileBook::default(), &draft(&[], &[], 15), None, 0.25).unwrap();
        let top_ban = &advice.ban_suggestions[0];
        assert_eq!(top_ban.hero_id, 2);
        assert!(top_ban
            .reasons
            .iter()
            .any(|r| r == "Fills enemy: tower damage"));
        // deny item lists never include the anti-heal pickup
        assert!(top_ban.items_likely.iter().all(|i| i.key != ItemKey::ShivasGuard));
    }

    #[test]
    fn team_needs_follow_priority_order() {
        let heroes = vec![hero(1, &[])];
        let advice =
            advise(&heroes, &ProfileBook::default(), &draft(&[], &[], 15), None, 0.25).unwrap();
        assert_eq!(
            advice.team_needs,
            vec![Tag::Stun, Tag::Dispel, Tag::Save]
        );

        // a stunner on the team shifts the priority window
        let stunner = hero(5, &[HeroRole::Initiator]);
        let heroes = vec![hero(1, &[]), stunner];
        let advice = advise(
            &heroes,
            &ProfileBook::default(),
            &draft(&[5], &[], 15),
            None,
            0.25,
        )
        .unwrap();
        assert_eq!(
            advice.team_needs,
            vec![Tag::Dispel, Tag::Save, Tag::Waveclear]
        );
        let stun_cov = advice.coverage.iter().find(|c| c.tag == Tag::Stun).unwrap();
        assert!(stun_cov.ok);
    }

    #[test]
    fn deltas_by_minute_includes_the_current_minute() {
        let heroes = vec![hero(1, &[HeroRole::Carry])];
        let advice =
            advise(&heroes, &ProfileBook::default(), &draft(&[], &[], 17), None, 0.25).unwrap();
        let table = &advice.ally_suggestions[0].deltas_by_minute;
        for m in [10, 15, 17, 20, 25] {
            assert!(table.contains_key(&m), "missing minute {}", m);
        }
    }

    #[test]
    fn payload_uses_wire_field_names() {
        let heroes = vec![hero(1, &[HeroRole::Carry])];
        let advice =
            advise(&heroes, &ProfileBook::default(), &draft(&[], &[], 15), None, 0.25).unwrap();
        let v = serde_json::to_value(&advice).unwrap();
        assert!(v["teamNeeds"].is_array());
        let s = &v["allySuggestions"][0];
        assert!(s["profileId"].is_string());
        assert!(s["deltasByMinute"]["15"].is_object());
        assert!(s["itemsLikely"].is_array());
        assert!(s["contextScore"].is_number());
        assert!(s.get("score").is_none());
        let b = &v["banSuggestions"][0];
        assert!(b["enemyContextGain"].is_number());
    }
}
