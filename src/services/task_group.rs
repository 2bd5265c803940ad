//! Fan-out/join over independent work items.
//!
//! Items run on the rayon pool and come back in input order. What happens
//! when one of them fails is decided by the group's [`FailurePolicy`].

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FailurePolicy {
    /// The first failure aborts the whole group.
    #[default]
    FailFast,
    /// Every item runs; failures are collected next to the successes.
    BestEffort,
}

#[derive(Debug)]
pub struct TaskFailure<E> {
    /// Position of the failed item in the input slice.
    pub index: usize,
    pub error: E,
}

#[derive(Debug)]
pub struct GroupOutcome<T, E> {
    /// Successful outputs in input order.
    pub completed: Vec<T>,
    pub failures: Vec<TaskFailure<E>>,
}

#[derive(Debug, Clone, Copy)]
pub struct TaskGroup {
    policy: FailurePolicy,
}

impl TaskGroup {
    pub fn new(policy: FailurePolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> FailurePolicy {
        self.policy
    }

    /// Runs `task` over every item and joins the results.
    ///
    /// Blocks the calling thread; call from `spawn_blocking` when on the
    /// async runtime.
    pub fn run<I, T, E, F>(&self, items: &[I], task: F) -> Result<GroupOutcome<T, E>, TaskFailure<E>>
    where
        I: Sync,
        T: Send,
        E: Send,
        F: Fn(&I) -> Result<T, E> + Sync + Send,
    {
        match self.policy {
            FailurePolicy::FailFast => {
                let completed = items
                    .par_iter()
                    .enumerate()
                    .map(|(index, item)| task(item).map_err(|error| TaskFailure { index, error }))
                    .collect::<Result<Vec<T>, TaskFailure<E>>>()?;
                Ok(GroupOutcome {
                    completed,
                    failures: Vec::new(),
                })
            }
            FailurePolicy::BestEffort => {
                let results: Vec<Result<T, E>> = items.par_iter().map(|item| task(item)).collect();

                let mut completed = Vec::with_capacity(results.len());
                let mut failures = Vec::new();
                for (index, result) in results.into_iter().enumerate() {
                    match result {
                        Ok(value) => completed.push(value),
                        Err(error) => failures.push(TaskFailure { index, error }),
                    }
                }
                Ok(GroupOutcome { completed, failures })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn halve_even(n: &u32) -> Result<u32, String> {
        if n % 2 == 0 {
            Ok(n / 2)
        } else {
            Err(format!("{} is odd", n))
        }
    }

    #[test]
    fn test_preserves_input_order() {
        let items: Vec<u32> = (0..200).map(|n| n * 2).collect();
        let outcome = TaskGroup::new(FailurePolicy::FailFast)
            .run(&items, halve_even)
            .unwrap();
        assert_eq!(outcome.completed, (0..200).collect::<Vec<u32>>());
        assert!(outcome.failures.is_empty());
    }

    #[test]
    fn test_fail_fast_aborts() {
        let items = vec![2, 4, 5, 8];
        let failure = TaskGroup::new(FailurePolicy::FailFast)
            .run(&items, halve_even)
            .unwrap_err();
        assert_eq!(failure.index, 2);
        assert_eq!(failure.error, "5 is odd");
    }

    #[test]
    fn test_best_effort_collects_failures() {
        let items = vec![1, 2, 3, 4];
        let outcome = TaskGroup::new(FailurePolicy::BestEffort)
            .run(&items, halve_even)
            .unwrap();
        assert_eq!(outcome.completed, vec![1, 2]);
        let indices: Vec<usize> = outcome.failures.iter().map(|f| f.index).collect();
        assert_eq!(indices, vec![0, 2]);
    }

    #[test]
    fn test_empty_input() {
        let items: Vec<u32> = Vec::new();
        let outcome = TaskGroup::new(FailurePolicy::BestEffort)
            .run(&items, halve_even)
            .unwrap();
        assert!(outcome.completed.is_empty());
        assert!(outcome.failures.is_empty());
    }
}
