// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>

use core::fmt;
use core::future::Future;
use core::hash::Hash;
use core::pin::Pin;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::task::JoinSet;
use tracing::{debug, info, instrument, warn};

use crate::error::StepError;
use crate::signal::Signal;

/// Resource tags that steps require and produce.
///
/// Any small closed enum works; the blanket impl covers every type with the
/// listed bounds.
pub trait Resource: Copy + Eq + Hash + Ord + fmt::Debug + Send + Sync + 'static {}

impl<T> Resource for T where T: Copy + Eq + Hash + Ord + fmt::Debug + Send + Sync + 'static {}

/// Boxed future returned by a step body.
pub type StepFuture = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send>>;

type StepFn<C> = Box<dyn Fn(Arc<C>) -> StepFuture + Send + Sync>;

struct Step<C, R> {
    name: String,
    prereqs: BTreeSet<R>,
    results: BTreeSet<R>,
    func: StepFn<C>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mark {
    Unvisited,
    OnPath,
    Done,
}

/// An ordered set of async steps sharing a context of type `C`.
///
/// Register steps with [`StepOrder::add_step`], then call [`StepOrder::run`].
/// Once a run has started the order is locked and no more steps can be added.
pub struct StepOrder<C, R> {
    steps: Vec<Arc<Step<C, R>>>,
    locked: AtomicBool,
}

impl<C, R> Default for StepOrder<C, R> {
    fn default() -> Self {
        Self {
            steps: Vec::new(),
            locked: AtomicBool::new(false),
        }
    }
}

impl<C, R: fmt::Debug> fmt::Debug for StepOrder<C, R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StepOrder")
            .field(
                "steps",
                &self.steps.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(),
            )
            .field("locked", &self.locked.load(Ordering::Relaxed))
            .finish()
    }
}

impl<C, R> StepOrder<C, R>
where
    C: Send + Sync + 'static,
    R: Resource,
{
    /// Creates an empty, unlocked step order.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of registered steps.
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Returns `true` if no steps are registered.
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Registers a step.
    ///
    /// `func` is called once per run with the shared context. The step starts
    /// only after every producer of each tag in `prereqs` finished, and counts
    /// as a producer for each tag in `results`.
    ///
    /// # Errors
    /// [`StepError::Locked`] if a run has already started.
    pub fn add_step<F, Fut>(
        &mut self,
        name: impl Into<String>,
        prereqs: impl IntoIterator<Item = R>,
        results: impl IntoIterator<Item = R>,
        func: F,
    ) -> Result<(), StepError<R>>
    where
        F: Fn(Arc<C>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let name = name.into();
        if self.locked.load(Ordering::Acquire) {
            return Err(StepError::Locked(name));
        }
        self.steps.push(Arc::new(Step {
            name,
            prereqs: prereqs.into_iter().collect(),
            results: results.into_iter().collect(),
            func: Box::new(move |ctx| Box::pin(func(ctx)) as StepFuture),
        }));
        Ok(())
    }

    fn producers(&self) -> BTreeMap<R, Vec<usize>> {
        let mut producers: BTreeMap<R, Vec<usize>> = BTreeMap::new();
        for (idx, step) in self.steps.iter().enumerate() {
            for &tag in &step.results {
                producers.entry(tag).or_default().push(idx);
            }
        }
        producers
    }

    /// Checks that the step graph has no cycles.
    ///
    /// An edge runs from each producer of a tag to each step requiring it.
    /// Called by [`StepOrder::run`] before anything executes.
    ///
    /// # Errors
    /// [`StepError::Deadlock`] for the first step needing a tag nothing
    /// produces, or [`StepError::Cycle`] describing the first cycle found.
    pub fn validate(&self) -> Result<(), StepError<R>> {
        let producers = self.producers();
        for step in &self.steps {
            let missing: Vec<R> = step
                .prereqs
                .iter()
                .filter(|tag| !producers.contains_key(*tag))
                .copied()
                .collect();
            if !missing.is_empty() {
                return Err(StepError::Deadlock {
                    step: step.name.clone(),
                    tags: missing,
                });
            }
        }
        let mut edges: Vec<Vec<(usize, R)>> = vec![Vec::new(); self.steps.len()];
        for (idx, step) in self.steps.iter().enumerate() {
            for tag in &step.prereqs {
                for &from in producers.get(tag).into_iter().flatten() {
                    edges[from].push((idx, *tag));
                }
            }
        }

        let mut marks = vec![Mark::Unvisited; self.steps.len()];
        let mut path = Vec::new();
        for start in 0..self.steps.len() {
            if marks[start] != Mark::Unvisited {
                continue;
            }
            if let Some(cycle) = visit(start, &edges, &mut marks, &mut path) {
                return Err(self.cycle_error(&cycle));
            }
        }
        Ok(())
    }

    fn cycle_error(&self, cycle: &[(usize, R)]) -> StepError<R> {
        let mut description = String::new();
        for (from, tag) in cycle {
            description.push_str(&format!("{} -[{tag:?}]-> ", self.steps[*from].name));
        }
        if let Some((first, _)) = cycle.first() {
            description.push_str(&self.steps[*first].name);
        }
        StepError::Cycle {
            description,
            tags: cycle.iter().map(|(_, tag)| *tag).collect(),
        }
    }

    /// Runs every step to completion.
    ///
    /// Locks the order, validates it, then launches all steps at once; each
    /// waits on its prerequisites before running. The first failure cancels
    /// every other in-flight step and is returned. Dropping the returned
    /// future cancels all outstanding steps as well.
    ///
    /// # Errors
    /// [`StepError::Deadlock`] or [`StepError::Cycle`] before anything runs,
    /// or the first [`StepError::Step`] / [`StepError::Panicked`] raised by a
    /// step.
    #[instrument(skip_all, fields(steps = self.steps.len()))]
    pub async fn run(&self, ctx: Arc<C>) -> Result<(), StepError<R>> {
        self.locked.store(true, Ordering::Release);
        self.validate()?;

        let producers = self.producers();
        let signals: BTreeMap<R, Signal> = producers
            .iter()
            .map(|(tag, steps)| (*tag, Signal::new(steps.len())))
            .collect();
        let signals = Arc::new(signals);

        info!("running steps");
        let mut tasks = JoinSet::new();
        for step in &self.steps {
            let step = Arc::clone(step);
            let signals = Arc::clone(&signals);
            let ctx = Arc::clone(&ctx);
            tasks.spawn(async move {
                for tag in &step.prereqs {
                    if let Some(signal) = signals.get(tag) {
                        signal.wait().await;
                    }
                }
                debug!(step = %step.name, "step started");
                (step.func)(ctx).await.map_err(|source| StepError::Step {
                    name: step.name.clone(),
                    source,
                })?;
                debug!(step = %step.name, "step finished");
                for tag in &step.results {
                    if let Some(signal) = signals.get(tag) {
                        signal.announce();
                    }
                }
                Ok::<(), StepError<R>>(())
            });
        }

        while let Some(joined) = tasks.join_next().await {
            let failure = match joined {
                Ok(Ok(())) => continue,
                Ok(Err(err)) => err,
                Err(join) => StepError::Panicked(join.to_string()),
            };
            warn!(error = %failure, "step failed; cancelling remaining steps");
            tasks.abort_all();
            return Err(failure);
        }
        info!("all steps complete");
        Ok(())
    }
}

fn visit<R: Copy>(
    node: usize,
    edges: &[Vec<(usize, R)>],
    marks: &mut [Mark],
    path: &mut Vec<(usize, R)>,
) -> Option<Vec<(usize, R)>> {
    marks[node] = Mark::OnPath;
    for &(next, tag) in &edges[node] {
        path.push((node, tag));
        match marks[next] {
            Mark::OnPath => {
                let start = path.iter().position(|(from, _)| *from == next).unwrap_or(0);
                return Some(path[start..].to_vec());
            }
            Mark::Unvisited => {
                if let Some(cycle) = visit(next, edges, marks, path) {
                    return Some(cycle);
                }
            }
            Mark::Done => {}
        }
        path.pop();
    }
    marks[node] = Mark::Done;
    None
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::panic)]
    use super::*;

    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
    enum Tag {
        A,
        B,
    }

    async fn noop(_: Arc<()>) -> anyhow::Result<()> {
        Ok(())
    }

    #[test]
    fn self_dependency_is_a_cycle() {
        let mut order = StepOrder::<(), Tag>::new();
        order.add_step("loopy", [Tag::A], [Tag::A], noop).unwrap();
        let err = order.validate().unwrap_err();
        match err {
            StepError::Cycle { description, tags } => {
                assert_eq!(description, "loopy -[A]-> loopy");
                assert_eq!(tags, [Tag::A]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn cycle_description_names_every_edge() {
        let mut order = StepOrder::<(), Tag>::new();
        order.add_step("first", [Tag::B], [Tag::A], noop).unwrap();
        order.add_step("second", [Tag::A], [Tag::B], noop).unwrap();
        let err = order.validate().unwrap_err();
        assert_eq!(
            err.to_string(),
            "steps depend on each other in a loop: first -[A]-> second -[B]-> first"
        );
    }

    #[test]
    fn diamond_is_acyclic() {
        let mut order = StepOrder::<(), Tag>::new();
        order.add_step("root", [], [Tag::A], noop).unwrap();
        order.add_step("left", [Tag::A], [Tag::B], noop).unwrap();
        order.add_step("right", [Tag::A], [Tag::B], noop).unwrap();
        order.add_step("sink", [Tag::B], [], noop).unwrap();
        assert!(order.validate().is_ok());
        assert_eq!(order.len(), 4);
    }
}
