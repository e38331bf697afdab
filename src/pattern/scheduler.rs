use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use log::debug;

use super::catalog::PatternCatalog;
use super::Pattern;
use crate::intent::IntentAnalysis;
use crate::mode::{Mode, Phase};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    Visiting,
    Placed,
}

#[derive(Debug, Clone, Copy)]
pub struct PatternScheduler<'a> {
    catalog: &'a PatternCatalog,
}

impl<'a> PatternScheduler<'a> {
    pub fn new(catalog: &'a PatternCatalog) -> Self {
        Self { catalog }
    }

    /// Ordered patterns to apply for this analysis, mode and phase.
    pub fn schedule(
        &self,
        analysis: &IntentAnalysis,
        mode: Mode,
        phase: Option<Phase>,
    ) -> Vec<Arc<dyn Pattern>> {
        let filtered = self.filter(analysis, mode, phase);
        let candidates = self.resolve_exclusions(filtered);
        let ordered = self.order(candidates);
        debug!(
            "scheduled {} pattern(s) for {} in {mode} mode: [{}]",
            ordered.len(),
            analysis.primary_intent,
            ordered.iter().map(|p| p.id()).collect::<Vec<_>>().join(", ")
        );
        ordered
    }

    fn filter(
        &self,
        analysis: &IntentAnalysis,
        mode: Mode,
        phase: Option<Phase>,
    ) -> Vec<Arc<dyn Pattern>> {
        let resolved = mode.resolve(phase);
        self.catalog
            .iter()
            .filter(|p| {
                let meta = p.meta();
                !self.catalog.is_pattern_disabled(&meta.id)
                    && meta.mode.admits(resolved)
                    && meta.intents.contains(&analysis.primary_intent)
                    && meta.phases.admits(phase)
            })
            .cloned()
            .collect()
    }

    /// Highest effective priority first, id order on ties.
    fn sort_by_priority(&self, patterns: &mut [Arc<dyn Pattern>]) {
        patterns.sort_by(|a, b| {
            self.catalog
                .effective_priority(b.as_ref())
                .cmp(&self.catalog.effective_priority(a.as_ref()))
                .then_with(|| a.id().cmp(b.id()))
        });
    }

    fn resolve_exclusions(&self, mut patterns: Vec<Arc<dyn Pattern>>) -> Vec<Arc<dyn Pattern>> {
        self.sort_by_priority(&mut patterns);

        let mut excluded: BTreeSet<&str> = BTreeSet::new();
        for pattern in &patterns {
            if excluded.contains(pattern.id()) {
                continue;
            }
            for other in &pattern.meta().dependencies.excludes_with {
                excluded.insert(other.as_str());
            }
        }
        if excluded.is_empty() {
            return patterns;
        }

        debug!(
            "excluded by higher-priority patterns: {}",
            excluded.iter().copied().collect::<Vec<_>>().join(", ")
        );
        let excluded: BTreeSet<String> = excluded.into_iter().map(str::to_string).collect();
        patterns
            .into_iter()
            .filter(|p| !excluded.contains(p.id()))
            .collect()
    }

    fn order(&self, mut patterns: Vec<Arc<dyn Pattern>>) -> Vec<Arc<dyn Pattern>> {
        self.sort_by_priority(&mut patterns);

        let index: HashMap<&str, usize> = patterns
            .iter()
            .enumerate()
            .map(|(i, p)| (p.id(), i))
            .collect();
        let mut marks = vec![Mark::Unvisited; patterns.len()];
        let mut placed: Vec<usize> = Vec::with_capacity(patterns.len());

        for i in 0..patterns.len() {
            place(i, &patterns, &index, &mut marks, &mut placed);
        }

        placed.into_iter().map(|i| Arc::clone(&patterns[i])).collect()
    }
}

fn place(
    i: usize,
    patterns: &[Arc<dyn Pattern>],
    index: &HashMap<&str, usize>,
    marks: &mut [Mark],
    placed: &mut Vec<usize>,
) {
    match marks[i] {
        Mark::Placed => return,
        Mark::Visiting => {
            debug!("dependency cycle through '{}', skipping back-edge", patterns[i].id());
            return;
        }
        Mark::Unvisited => {}
    }
    marks[i] = Mark::Visiting;
    for dep in &patterns[i].meta().dependencies.run_after {
        if let Some(&j) = index.get(dep.as_str()) {
            place(j, patterns, index, marks, placed);
        }
    }
    marks[i] = Mark::Placed;
    placed.push(i);
}
