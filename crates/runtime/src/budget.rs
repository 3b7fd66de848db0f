/// Deterministic iteration budget for relaxation loops.
///
/// Budgets count abstract steps rather than wall-clock time, so a layout run
/// performs the same work on every machine.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct StepBudget {
    remaining_steps: u32,
}

impl StepBudget {
    pub fn new(steps: u32) -> Self {
        Self {
            remaining_steps: steps,
        }
    }

    /// Attempts to take one step from the budget.
    ///
    /// Returns `true` if a step was available.
    pub fn try_step(&mut self) -> bool {
        if self.remaining_steps == 0 {
            return false;
        }
        self.remaining_steps -= 1;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::StepBudget;

    #[test]
    fn consumes_steps() {
        let mut b = StepBudget::new(2);
        assert!(b.try_step());
        assert!(b.try_step());
        assert!(!b.try_step());
        assert!(!b.try_step());
        assert!(!StepBudget::new(0).try_step());
    }
}
