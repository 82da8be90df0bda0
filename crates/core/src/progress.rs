//! Completion maths for study-plan milestones and course progress.
//!
//! Every function here is pure; persistence lives in the services crate.

use std::collections::BTreeSet;

use crate::model::{Milestone, MilestoneId};

/// Flip `completed` on the milestone with `id`.
///
/// An unknown id leaves the list untouched.
#[must_use]
pub fn toggle_milestone(milestones: &[Milestone], id: &MilestoneId) -> Vec<Milestone> {
    milestones
        .iter()
        .map(|m| {
            if &m.id == id {
                let mut flipped = m.clone();
                flipped.completed = !m.completed;
                flipped
            } else {
                m.clone()
            }
        })
        .collect()
}

/// Percentage of completed milestones, 0 for an empty list.
#[must_use]
pub fn overall_progress(milestones: &[Milestone]) -> u8 {
    completion(milestones.iter())
}

/// Percentage of completed milestones in `week`, 0 when the week is empty.
#[must_use]
pub fn week_progress(milestones: &[Milestone], week: u32) -> u8 {
    completion(milestones.iter().filter(|m| m.week == week))
}

/// Distinct week numbers in ascending order.
#[must_use]
pub fn weeks(milestones: &[Milestone]) -> Vec<u32> {
    milestones
        .iter()
        .map(|m| m.week)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

/// Number of completed milestones.
#[must_use]
pub fn completed_count(milestones: &[Milestone]) -> usize {
    milestones.iter().filter(|m| m.completed).count()
}

fn completion<'a>(milestones: impl Iterator<Item = &'a Milestone>) -> u8 {
    let (done, total) = milestones.fold((0_u32, 0_u32), |(done, total), m| {
        (done + u32::from(m.completed), total + 1)
    });
    crate::model::percent(done, total)
}

/// Course progress shown to the learner: a local overlay wins over the
/// server value; absence of both is 0. Values are capped at 100.
#[must_use]
pub fn merge_progress(server: Option<u8>, overlay: Option<u8>) -> u8 {
    overlay.or(server).unwrap_or(0).min(100)
}
