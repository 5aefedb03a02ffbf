//! Spell selections against recomputed spell limits.
//!
//! Spells are walked in selection order and kept first-come-first-kept: a
//! spell survives only if it is still on a surviving class's list for the
//! edition, within the maximum spell level, under its per-level cap given the
//! spells already kept, and (for pure known casters) under the overall
//! known-spell cap. Cantrips count toward that overall tally but are never
//! dropped by it.
//!
//! Resolution works on positions, so a repeated spell loses only the
//! occurrences that no longer fit.

use std::collections::{HashMap, HashSet};

use crate::build_state::{BuildField, BuildState, StepId};
use crate::derive::combined_spell_limits;
use crate::invalidation::surviving::surviving_classes;
use crate::invalidation::{InvalidationRule, RuleContext};

use super::listed;

/// Re-checks the spell list whenever anything the limits depend on changes.
///
/// A level change also rewrites class levels, so a single rule covers every
/// upstream field and each transition reports a spell at most once.
#[derive(Debug, Clone, Copy, Default)]
pub struct SpellRule;

/// Positions in `state.spells` that no longer fit, in selection order.
pub(crate) fn dropped_spells(ctx: &RuleContext<'_>, state: &BuildState) -> Vec<usize> {
    let Some(edition) = state.edition.as_ref() else {
        return Vec::new();
    };
    let survivors = surviving_classes(ctx, state);
    let classes: Vec<_> = survivors
        .iter()
        .filter_map(|entry| entry.class_id.as_ref().map(|class| (class, entry.level)))
        .collect();
    let limits = combined_spell_limits(ctx.catalog, edition, classes.iter().copied());
    let known_cap = limits.known_cap();

    let mut kept_at: HashMap<u8, u32> = HashMap::new();
    let mut kept_total = 0u32;
    let mut dropped = Vec::new();

    for (index, spell) in state.spells.iter().enumerate() {
        let Some(data) = ctx
            .catalog
            .spell(spell)
            .and_then(|entry| entry.edition_data(edition))
        else {
            dropped.push(index);
            continue;
        };
        let on_list = classes.iter().any(|(class, _)| data.available_to(class));
        let level = data.level;
        let kept_here = kept_at.get(&level).copied().unwrap_or(0);

        let fits = on_list
            && (level == 0 || level <= limits.max_spell_level)
            && kept_here < limits.cap_at(level)
            && (level == 0 || known_cap.map_or(true, |cap| kept_total < cap));
        if fits {
            kept_at.insert(level, kept_here + 1);
            kept_total += 1;
        } else {
            dropped.push(index);
        }
    }
    dropped
}

impl InvalidationRule for SpellRule {
    fn id(&self) -> &str {
        "spells"
    }

    fn triggers(&self) -> &[BuildField] {
        &[
            BuildField::Edition,
            BuildField::Setting,
            BuildField::Classes,
            BuildField::Race,
            BuildField::Alignment,
            BuildField::TotalLevel,
        ]
    }

    fn step(&self) -> StepId {
        StepId::Spells
    }

    fn label(&self) -> &str {
        "Spells"
    }

    fn detect(&self, ctx: &RuleContext<'_>, _prev: &BuildState, next: &BuildState) -> Vec<String> {
        dropped_spells(ctx, next)
            .into_iter()
            .map(|index| ctx.catalog.spell_name(&next.spells[index]))
            .collect()
    }

    fn resolve(&self, ctx: &RuleContext<'_>, mut state: BuildState, items: &[String]) -> BuildState {
        let dropped: HashSet<usize> = dropped_spells(ctx, &state)
            .into_iter()
            .filter(|&index| listed(items, &ctx.catalog.spell_name(&state.spells[index])))
            .collect();
        let mut index = 0;
        state.spells.retain(|_| {
            let keep = !dropped.contains(&index);
            index += 1;
            keep
        });
        state
    }
}
