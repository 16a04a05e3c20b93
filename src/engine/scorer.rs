//! Coverage candidate scoring and ranking.

use std::collections::HashMap;

use crate::models::{Availability, SkillScore, Suggestion, Task, TeamMember};

/// Weight of calendar availability in the combined score.
pub const CALENDAR_WEIGHT: f64 = 0.7;
/// Weight of skill match in the combined score.
pub const SKILL_WEIGHT: f64 = 0.3;

/// Weighted ranking score. Availability dominates skill match.
pub fn combined_score(skill_match_pct: f64, calendar_free_pct: f64) -> f64 {
    calendar_free_pct * CALENDAR_WEIGHT + skill_match_pct * SKILL_WEIGHT
}

/// Members eligible to cover `task`: everyone except the assignee and members currently OOO.
pub fn candidates_for<'a>(task: &Task, roster: &'a [TeamMember]) -> Vec<&'a TeamMember> {
    roster
        .iter()
        .filter(|m| task.assignee_id.as_deref() != Some(m.id.as_str()))
        .filter(|m| m.availability != Availability::Ooo)
        .collect()
}

/// Join candidates with externally supplied skill scores and order them.
///
/// A candidate without a score gets 0. Ties keep input order.
pub fn rank(candidates: &[&TeamMember], scores: &[SkillScore]) -> Vec<Suggestion> {
    let by_member: HashMap<&str, &SkillScore> = scores
        .iter()
        .map(|s| (s.member_id.as_str(), s))
        .collect();

    let mut suggestions: Vec<Suggestion> = candidates
        .iter()
        .map(|member| {
            let score = by_member.get(member.id.as_str());
            let skill_match_pct = score.map_or(0.0, |s| s.skill_match_pct);
            Suggestion {
                member_id: member.id.clone(),
                member_name: member.name.clone(),
                skill_match_pct,
                calendar_free_pct: member.calendar_free_pct,
                combined_score: combined_score(skill_match_pct, member.calendar_free_pct),
                context_reason: score.and_then(|s| s.context_reason.clone()),
            }
        })
        .collect();

    // `sort_by` is stable
    suggestions.sort_by(|a, b| b.combined_score.total_cmp(&a.combined_score));
    suggestions
}
